//! Surface textures laid over the artwork: a smooth noise wash, a repeating tile pattern, or
//! film grain.

use image::RgbaImage;
use raqote::BlendMode;

use crate::color::Rgba;
use crate::error::RenderResult;
use crate::layers::{self, Frame, LayerKind};
use crate::math::dist;
use crate::noise;
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::{LayerRng, RandomSource};
use crate::surface::{self, Surface};

named_enum!(
    TextureType {
        Noise = "noise",
        Pattern = "pattern",
        Grain = "grain",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Grid,
    Stripes,
    Dots,
}

/// Tile cell size in pixels for a 0–1 density.
fn tile_size(d: f64) -> f64 {
    (50.0 - d * 45.0).floor().max(5.0)
}

fn noise_wash(w: u32, h: u32, d: f64, base: Rgba, frame: &Frame, params: &Params) -> RgbaImage {
    let scale = 0.01 + (1.0 - d) * 0.1;
    let t = frame.millis() * 0.0005;
    let pointer = params.pointer();
    RgbaImage::from_fn(w, h, |px, py| {
        let (x, y) = (f64::from(px), f64::from(py));
        let mut n = (noise::perlin(x * scale + t, y * scale + t, t * 10.0 + 0.5) + 1.0) * 0.5;
        if let Some(p) = pointer {
            n = (n + (1.0 - dist((x, y), p) / 150.0).max(0.0) * 0.3).min(1.0);
        }
        let ch = |c: u8| (f64::from(c) * n) as u8;
        image::Rgba([
            ch(base.r),
            ch(base.g),
            ch(base.b),
            (255.0 * (0.2 + n * 0.8)) as u8,
        ])
    })
}

fn grain<R: RandomSource>(
    w: u32,
    h: u32,
    d: f64,
    base: Rgba,
    frame: &Frame,
    rng: &mut R,
) -> RgbaImage {
    let flicker = if frame.animating {
        0.75 + 0.25 * (frame.seconds() * 6.0).sin()
    } else {
        1.0
    };
    let intensity = d * flicker;
    RgbaImage::from_fn(w, h, |_, _| {
        let g = 1.0 + (rng.rnd() * 2.0 - 1.0) * intensity;
        let ch = |c: u8| (f64::from(c) * g).clamp(0.0, 255.0) as u8;
        image::Rgba([ch(base.r), ch(base.g), ch(base.b), 255])
    })
}

fn tile<R: RandomSource>(
    size: f64,
    palette: &Palette,
    frame: &Frame,
    rng: &mut R,
) -> RenderResult<Surface> {
    let kind = if rng.odds(0.33) {
        Pattern::Grid
    } else if rng.odds(0.66) {
        Pattern::Stripes
    } else {
        Pattern::Dots
    };
    let side = (size * 2.0) as i32;
    let mut tile = Surface::new(side, side)?;
    let (bg, fg) = (palette.pick_rgba(rng), palette.pick_rgba(rng));
    tile.fill_rect(0.0, 0.0, size * 2.0, size * 2.0, &raqote::Source::Solid(bg.solid(1.0)));

    match kind {
        Pattern::Grid => {
            let width = (size / 10.0).max(1.0);
            tile.stroke_color(&surface::line((0.0, size), (size * 2.0, size)), fg, 1.0, width);
            tile.stroke_color(&surface::line((size, 0.0), (size, size * 2.0)), fg, 1.0, width);
        }
        Pattern::Stripes => {
            let offset = (frame.seconds().sin() * 5.0).rem_euclid(size * 2.0);
            let mut x = -size * 2.0;
            while x <= size * 4.0 {
                let path = surface::line((x + offset, 0.0), (x + size * 2.0 + offset, size * 2.0));
                tile.stroke_color(&path, fg, 1.0, size / 3.0);
                x += size;
            }
        }
        Pattern::Dots => {
            let r = size / 3.0;
            tile.fill_color(&surface::circle(size / 2.0, size / 2.0, r), fg, 1.0);
            tile.fill_color(&surface::circle(size * 1.5, size * 1.5, r), fg, 1.0);
        }
    }
    Ok(tile)
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
    let d = layers::density(params, LayerKind::TextureOverlay);
    let mut rng = LayerRng::new(params.seed(), rng);
    surface.set_alpha(opacity);
    surface.set_blend(
        params
            .text("blendMode")
            .and_then(surface::blend_mode)
            .unwrap_or(BlendMode::Overlay),
    );

    let kind = params
        .text("textureType")
        .and_then(TextureType::from_name)
        .unwrap_or_else(|| {
            if rng.odds(0.33) {
                TextureType::Noise
            } else if rng.odds(0.66) {
                TextureType::Pattern
            } else {
                TextureType::Grain
            }
        });
    let (iw, ih) = (w.ceil() as u32, h.ceil() as u32);

    match kind {
        TextureType::Noise => {
            let base = palette.pick_rgba(&mut rng);
            surface.draw_image(&noise_wash(iw, ih, d, base, frame, params), 0.0, 0.0);
        }
        TextureType::Grain => {
            let base = palette.pick_rgba(&mut rng);
            surface.draw_image(&grain(iw, ih, d, base, frame, &mut rng), 0.0, 0.0);
        }
        TextureType::Pattern => {
            let size = tile_size(d);
            let tile = tile(size, palette, frame, &mut rng)?;
            if frame.animating {
                // Grid and dot tiles drift as a whole.
                let drift = (frame.seconds() * 0.5).sin() * size;
                surface.translate(drift, 0.0);
                surface.fill_rect_with_tile(&tile, -size * 2.0, 0.0, w + size * 4.0, h);
            } else {
                surface.fill_rect_with_tile(&tile, 0.0, 0.0, w, h);
            }
        }
    }
    Ok(())
}
