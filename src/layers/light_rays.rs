//! Crepuscular rays fanning out from a point on the canvas edge.

use crate::color::{self, Rgba};
use crate::error::RenderResult;
use crate::layers::{self, Frame, LayerKind};
use crate::math::angle;
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::{LayerRng, RandomSource};
use crate::surface::{self, Surface};

const DEFAULT_INTENSITY: f64 = 0.7;
const DEFAULT_SPREAD: f64 = 60.0;
const MAX_RAY_WIDTH: f64 = 50.0;

/// Ray origin on the canvas perimeter for a direction in degrees. Each quarter turn walks one
/// edge clockwise: 0–90 the top edge left to right, 90–180 the right edge downwards, and so on.
pub fn ray_origin(direction_degrees: f64, w: f64, h: f64) -> (f64, f64) {
    let turn = direction_degrees.rem_euclid(360.0) / 90.0;
    let t = turn.fract();
    match turn as u32 {
        0 => (w * t, 0.0),
        1 => (w, h * t),
        2 => (w * (1.0 - t), h),
        _ => (0.0, h * (1.0 - t)),
    }
}

/// Ray width for its offset within the cone: widest on the axis, zero at the edges.
fn ray_width(offset: f64, half_spread: f64, intensity: f64) -> f64 {
    if half_spread <= 0.0 {
        return MAX_RAY_WIDTH * intensity;
    }
    let n = (offset.abs() / half_spread).min(1.0);
    (1.0 - n * n) * MAX_RAY_WIDTH * intensity
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
    let d = layers::density(params, LayerKind::LightRays);
    let mut rng = LayerRng::new(params.seed(), rng);
    surface.set_alpha(opacity);

    let rays = 5 + (d * 30.0).floor() as usize;
    let intensity = params
        .number_or("lightRaysIntensity", DEFAULT_INTENSITY)
        .clamp(0.0, 1.0);
    let direction = params.number_or("lightRaysDirection", 0.0);
    let half_spread = params
        .number_or("lightRaysSpread", DEFAULT_SPREAD)
        .clamp(0.0, 360.0)
        .to_radians()
        / 2.0;
    let base: Rgba = match params.text("lightRaysColor") {
        Some(css) => color::parse_or_fallback(css),
        None => palette.pick_rgba(&mut rng),
    };

    let time = frame.seconds();
    let mut origin = ray_origin(direction, w, h);
    if frame.animating {
        origin.0 += (time * 0.5).sin() * w * 0.05;
        origin.1 += (time * 0.3).cos() * h * 0.05;
    }
    // The cone points into the canvas, or at the pointer when there is one.
    let target = params.pointer().unwrap_or((w / 2.0, h / 2.0));
    let axis = angle(origin, target);

    let reach = w.hypot(h) * 2.0;
    let falloff = surface::radial_gradient(
        &[(0.0, base.with_alpha(intensity)), (1.0, base.with_alpha(0.0))],
        1.0,
        origin,
        w.max(h) * 1.5,
    );

    for i in 0..rays {
        let offset = (rng.rnd() * 2.0 - 1.0) * half_spread;
        let heading = axis + offset;
        let end = (origin.0 + heading.cos() * reach, origin.1 + heading.sin() * reach);
        if frame.animating {
            let speed = rng.uniform(0.5, 2.5);
            surface.set_alpha(opacity * (0.7 + (time * speed + i as f64).sin() * 0.3));
        }
        let width = ray_width(offset, half_spread, intensity);
        surface.stroke(
            &surface::line(origin, end),
            &falloff,
            &surface::round_stroke(width),
        );
    }

    surface.set_alpha(opacity);
    let glow_radius = w.min(h) * 0.1;
    let glow = surface::radial_gradient(
        &[
            (0.0, Rgba::rgb(255, 255, 255).with_alpha(intensity)),
            (0.5, base.with_alpha(intensity * 0.5)),
            (1.0, Rgba::rgb(0, 0, 0).with_alpha(0.0)),
        ],
        1.0,
        origin,
        glow_radius,
    );
    surface.fill(&surface::circle(origin.0, origin.1, glow_radius), &glow);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layers::testing;

    #[test]
    fn layer_contract() {
        testing::check_contract(LayerKind::LightRays);
        testing::check_animates(LayerKind::LightRays);
    }

    #[test]
    fn origin_walks_the_perimeter() {
        assert_eq!(ray_origin(0.0, 100.0, 50.0), (0.0, 0.0));
        assert_eq!(ray_origin(45.0, 100.0, 50.0), (50.0, 0.0));
        assert_eq!(ray_origin(135.0, 100.0, 50.0), (100.0, 25.0));
        assert_eq!(ray_origin(180.0, 100.0, 50.0), (100.0, 50.0));
        assert_eq!(ray_origin(315.0, 100.0, 50.0), (0.0, 25.0));
        assert_eq!(ray_origin(-45.0, 100.0, 50.0), (0.0, 25.0));
    }

    #[test]
    fn rays_taper_toward_the_cone_edge() {
        assert_eq!(ray_width(0.0, 0.5, 1.0), 50.0);
        assert_eq!(ray_width(0.5, 0.5, 1.0), 0.0);
        assert!(ray_width(0.25, 0.5, 0.7) < ray_width(0.1, 0.5, 0.7));
    }

    #[test]
    fn explicit_color_overrides_the_palette() {
        let base = testing::params(LayerKind::LightRays, 3).with("lightRaysDirection", 90.0);
        let green = testing::draw(
            LayerKind::LightRays,
            Frame::still(),
            &base.clone().with("lightRaysColor", "#00ff00"),
            1.0,
        );
        let red = testing::draw(
            LayerKind::LightRays,
            Frame::still(),
            &base.with("lightRaysColor", "#ff0000"),
            1.0,
        );
        assert_ne!(green.data(), red.data());
    }
}
