use raqote::BlendMode;

use crate::error::RenderResult;
use crate::layers::{self, Frame, LayerKind};
use crate::math::{pi, pull_toward};
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::{LayerRng, RandomSource};
use crate::surface::{self, Surface};

pub fn render(
    surface: &mut Surface,
    palette: &Palette,
    frame: &Frame,
    params: &Params,
    opacity: f64,
    rng: &mut dyn RandomSource,
) -> RenderResult<()> {
    let (w, h) = layers::canvas(surface, params)?;
    let d = layers::density(params, LayerKind::OrganicSplatters);
    let mut rng = LayerRng::new(params.seed(), rng);
    surface.set_alpha(opacity);

    let count = 5 + (d * 50.0).floor() as usize;
    let scale = (w.min(h) / 600.0).clamp(0.2, 3.0);
    let t = frame.millis() * 0.001;
    let pointer = params.pointer();

    for i in 0..count {
        let mut center = (rng.uniform(0.0, w), rng.uniform(0.0, h));
        if frame.animating {
            center.0 += (t + i as f64).sin() * 5.0;
            center.1 += (t + i as f64).cos() * 5.0;
        }
        if let Some(p) = pointer {
            center = pull_toward(center, p, 300.0, 0.05);
        }
        let radius = rng.uniform(10.0, 40.0) * scale;
        let color = palette.pick_rgba(&mut rng);
        let blend = if rng.odds(0.5) {
            BlendMode::Multiply
        } else {
            BlendMode::Screen
        };

        // Soft halo in place of a canvas shadow blur.
        let halo = radius * rng.uniform(1.3, 1.8);
        let glow = surface::radial_gradient(
            &[(0.0, color.with_alpha(0.35)), (1.0, color.with_alpha(0.0))],
            1.0,
            center,
            halo,
        );
        surface.set_blend(BlendMode::SrcOver);
        surface.fill(&surface::circle(center.0, center.1, halo), &glow);

        surface.set_blend(blend);
        surface.fill_color(&surface::circle(center.0, center.1, radius), color, 1.0);

        let droplets = rng.range(0, 6);
        for _ in 0..droplets {
            let angle = rng.uniform(0.0, pi(2.0));
            let reach = radius * rng.uniform(1.1, 2.2);
            let r = radius * rng.uniform(0.05, 0.2);
            let (dx, dy) = (center.0 + angle.cos() * reach, center.1 + angle.sin() * reach);
            surface.fill_color(&surface::circle(dx, dy, r), color, 0.8);
        }
    }
    Ok(())
}
