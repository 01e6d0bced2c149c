use crate::color::Rgba;
use crate::error::RenderResult;
use crate::layers::{self, Frame, LayerKind};
use crate::math::dist;
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::{LayerRng, RandomSource};
use crate::surface::{self, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DotStyle {
    Filled,
    Hollow,
    Square,
}

const POINTER_RADIUS: f64 = 120.0;

/// Scales each channel by `factor`, keeping alpha.
fn dim(color: Rgba, factor: f64) -> Rgba {
    let ch = |c: u8| (f64::from(c) * factor).floor().clamp(0.0, 255.0) as u8;
    Rgba {
        r: ch(color.r),
        g: ch(color.g),
        b: ch(color.b),
        a: color.a,
    }
}

/// Halftone falloff: dots shrink toward the edges of the canvas.
fn halftone_size(grid: f64, (x, y): (f64, f64), (w, h): (f64, f64)) -> f64 {
    let from_center = dist((x / w, y / h), (0.5, 0.5));
    grid * (0.2 + (1.0 - from_center) * 0.7)
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
    let d = layers::density(params, LayerKind::DotMatrix);
    let mut rng = LayerRng::new(params.seed(), rng);
    surface.set_alpha(opacity);

    let grid = (20.0 - d * 16.0).floor().max(4.0);
    let (cols, rows) = ((w / grid).ceil() as usize, (h / grid).ceil() as usize);
    let style = if rng.odds(0.6) {
        DotStyle::Filled
    } else if rng.odds(0.8) {
        DotStyle::Hollow
    } else {
        DotStyle::Square
    };
    let monochrome = rng.odds(0.4);
    let base = palette.pick_rgba(&mut rng);

    let time = frame.seconds();
    let amplitude = if frame.animating {
        rng.uniform(2.0, 5.0)
    } else {
        0.0
    };
    let frequency = rng.uniform(0.1, 0.3);
    let skip_above = 0.9 - d * 0.3;
    let pointer = params.pointer();

    for row in 0..rows {
        for col in 0..cols {
            let x = col as f64 * grid + grid / 2.0;
            let y = row as f64 * grid + grid / 2.0
                + (col as f64 * frequency + time).sin() * amplitude;

            let mut size = halftone_size(grid, (x, y), (w, h)) * rng.uniform(0.7, 1.3);
            if rng.rnd() > skip_above {
                continue;
            }
            if let Some(p) = pointer {
                size *= 1.0 + (1.0 - dist((x, y), p) / POINTER_RADIUS).max(0.0) * 0.8;
            }
            let color = if monochrome {
                dim(base, rng.uniform(0.3, 1.0))
            } else {
                palette.pick_rgba(&mut rng)
            };

            match style {
                DotStyle::Filled => {
                    surface.fill_color(&surface::circle(x, y, size / 2.0), color, 1.0);
                }
                DotStyle::Hollow => {
                    let path = surface::circle(x, y, size / 2.0);
                    surface.stroke_color(&path, color, 1.0, (size / 8.0).max(1.0));
                }
                DotStyle::Square => {
                    let path = surface::rect(x - size / 2.0, y - size / 2.0, size, size);
                    surface.fill_color(&path, color, 1.0);
                }
            }
        }
    }
    Ok(())
}
