//! Fractal Perlin noise mapped through the palette, one pixel at a time.

use image::RgbaImage;

use crate::error::RenderResult;
use crate::layers::{self, Frame, LayerKind};
use crate::math::dist;
use crate::noise;
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::RandomSource;
use crate::surface::Surface;

const POINTER_RADIUS: f64 = 150.0;

pub fn render(
    surface: &mut Surface,
    palette: &Palette,
    frame: &Frame,
    params: &Params,
    opacity: f64,
    rng: &mut dyn RandomSource,
) -> RenderResult<()> {
    let (w, h) = layers::canvas(surface, params)?;
    let d = layers::density(params, LayerKind::OrganicNoise);
    surface.set_alpha(opacity);

    let scale = (0.003 + d * 0.01) * params.number_or("noiseScale", 1.0);
    let octaves = 2 + (d * 5.0).floor() as u32;
    let seed = match params.seed() {
        Some(seed) => seed as f64,
        None => (rng.rnd() * 1_000_000.0).floor(),
    };
    let depth = seed * 0.1;
    let time = frame.millis() * 0.0005;
    let pointer = params.pointer();
    let colors: Vec<_> = (0..palette.len()).map(|i| palette.rgba(i)).collect();

    let img = RgbaImage::from_fn(w.ceil() as u32, h.ceil() as u32, |px, py| {
        let (x, y) = (f64::from(px), f64::from(py));
        let mut n = noise::fractal(x * scale, y * scale, depth, octaves);
        if frame.animating {
            n = (n + (time + x * 0.01 + y * 0.01).sin() * 0.1).rem_euclid(1.0);
        }
        let mut alpha = 0.3 + n * 0.7;
        if let Some(p) = pointer {
            alpha *= 1.0 - 0.5 * (1.0 - dist((x, y), p) / POINTER_RADIUS).max(0.0);
        }
        let c = colors[(n * colors.len() as f64).floor() as usize % colors.len()];
        image::Rgba([c.r, c.g, c.b, (255.0 * alpha).round() as u8])
    });
    surface.draw_image(&img, 0.0, 0.0);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layers::testing;
    use crate::rand::Lcg;

    #[test]
    fn layer_contract() {
        testing::check_contract(LayerKind::OrganicNoise);
        testing::check_animates(LayerKind::OrganicNoise);
    }

    #[test]
    fn unseeded_renders_follow_the_callers_source() {
        let params = Params::new()
            .with("canvasWidth", testing::W)
            .with("canvasHeight", testing::H);
        let draw = |seed| {
            let mut surface = testing::backdrop();
            let mut rng = Lcg::with_seed(seed);
            LayerKind::OrganicNoise
                .render(&mut surface, &testing::palette(), &Frame::still(), &params, 1.0, &mut rng)
                .unwrap();
            surface
        };
        assert_eq!(draw(5).data(), draw(5).data());
        assert_ne!(draw(5).data(), draw(6).data());
    }

    #[test]
    fn respects_logical_canvas_height() {
        let params = testing::params(LayerKind::OrganicNoise, 3).with("canvasHeight", 20);
        let drawn = testing::draw(LayerKind::OrganicNoise, Frame::still(), &params, 1.0);
        let untouched = testing::backdrop();
        let row = |s: &Surface, y: i32| s.get_image_data(0, y, testing::W as u32, 1);
        assert_ne!(row(&drawn, 5), row(&untouched, 5));
        assert_eq!(row(&drawn, 40), row(&untouched, 40));
    }
}
