//! Glowing sine waves at three depths: layered glow passes, a palette-colored core and a white
//! highlight, each sharing one wave path.

use crate::color::Rgba;
use crate::error::RenderResult;
use crate::layers::{self, Frame, LayerKind};
use crate::math::pi;
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::{LayerRng, RandomSource};
use crate::surface::{self, Surface};

const DEPTH_LEVELS: usize = 3;
const GLOW_PASSES: usize = 3;
const STEP: f64 = 5.0;
const HIGHLIGHT: Rgba = Rgba::rgb(255, 255, 255);

struct Wave {
    base_y: f64,
    amplitude: f64,
    frequency: f64,
    phase: f64,
    speed: f64,
}

impl Wave {
    fn y(&self, x: f64, time: f64) -> f64 {
        self.base_y
            + (x * self.frequency + self.phase + time).sin() * self.amplitude
            + (x * self.frequency * 2.5 + self.phase * 0.8 + time * 1.3).sin()
                * (self.amplitude * 0.3)
    }

    fn points(&self, width: f64, time: f64) -> Vec<(f64, f64)> {
        let mut points = vec![(0.0, self.base_y + self.phase.sin() * self.amplitude)];
        let mut x = STEP;
        while x <= width {
            points.push((x, self.y(x, time)));
            x += STEP;
        }
        points
    }
}

pub fn render(
    surface: &mut Surface,
    palette: &Palette,
    frame: &Frame,
    params: &Params,
    opacity: f64,
    rng: &mut dyn RandomSource,
) -> RenderResult<()> {
    let (w, h) = layers::canvas(surface, params)?;
    let d = layers::density(params, LayerKind::NeonWaves);
    let mut rng = LayerRng::new(params.seed(), rng);
    surface.set_alpha(opacity);

    let waves = 2 + (d * 15.0).floor() as usize;
    let per_depth = (waves + DEPTH_LEVELS - 1) / DEPTH_LEVELS;
    let amplitude_factor = params.number_or("factor", 1.0);
    let line_width = params.number("lineWidth").filter(|w| *w > 0.0).unwrap_or(2.0);
    let pointer = params.pointer();

    for depth in 0..DEPTH_LEVELS {
        let depth_opacity = 1.0 - depth as f64 * 0.2;
        let depth_scale = 1.0 - depth as f64 * 0.15;

        for _ in 0..per_depth {
            let color = palette.pick_rgba(&mut rng);
            let mut wave = Wave {
                amplitude: rng.uniform(30.0, 70.0) * depth_scale * amplitude_factor,
                frequency: rng.uniform(0.01, 0.04),
                phase: rng.uniform(0.0, pi(2.0)),
                speed: rng.uniform(0.0005, 0.0015),
                base_y: rng.uniform(0.0, h),
            };
            let thickness = (line_width + rng.uniform(0.0, 3.0)) * depth_scale;
            if let Some((_, my)) = pointer {
                let influence = (1.0 - (wave.base_y - my).abs().min(h) / (h * 0.5)).max(0.0);
                wave.amplitude += influence * 50.0;
                wave.frequency += influence * 0.01;
            }

            let time = if frame.animating {
                frame.time_ms * wave.speed
            } else {
                0.0
            };
            let path = surface::polyline(&wave.points(w, time));

            let glow_size = thickness * 3.0;
            for pass in 0..GLOW_PASSES {
                let alpha = (GLOW_PASSES - pass) as f64 / GLOW_PASSES as f64 * 0.6 * depth_opacity;
                let width = thickness + pass as f64 * glow_size / GLOW_PASSES as f64;
                surface.stroke_color(&path, color, alpha, width);
            }
            surface.stroke_color(&path, color, 1.0, thickness * 0.6);
            surface.stroke_color(&path, HIGHLIGHT, 0.7 * depth_opacity, thickness * 0.2);
        }
    }
    Ok(())
}
