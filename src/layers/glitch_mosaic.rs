//! Mosaic-averages whatever is already on the surface, then stacks randomly chosen glitches on
//! top: channel shifts, displaced slices, local re-pixelation and colored noise blocks.

use image::{Rgba as Pixel, RgbaImage};

use crate::color::Rgba;
use crate::error::RenderResult;
use crate::layers::{self, Frame, LayerKind};
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::{LayerRng, RandomSource};
use crate::surface::{self, Surface};

const CLEAR: Pixel<u8> = Pixel([0, 0, 0, 0]);
const POINTER_RADIUS: f64 = 80.0;
const SCANLINE: Rgba = Rgba::rgb(255, 255, 255);
const SCANLINE_GHOST: Rgba = Rgba::rgb(0, 255, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Glitch {
    ChannelShift,
    Slices,
    Pixelate,
    Noise,
}

impl Glitch {
    const ALL: [Glitch; 4] = [
        Glitch::ChannelShift,
        Glitch::Slices,
        Glitch::Pixelate,
        Glitch::Noise,
    ];
}

/// Replaces every `cell`×`cell` block inside `(x, y, w, h)` with its average color.
pub fn mosaic(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, cell: u32) {
    let cell = cell.max(1);
    let x_end = x.saturating_add(w).min(img.width());
    let y_end = y.saturating_add(h).min(img.height());
    for by in (y..y_end).step_by(cell as usize) {
        for bx in (x..x_end).step_by(cell as usize) {
            let (bw, bh) = ((bx + cell).min(x_end), (by + cell).min(y_end));
            let mut sum = [0u64; 4];
            let mut count = 0u64;
            for py in by..bh {
                for px in bx..bw {
                    for (s, c) in sum.iter_mut().zip(img.get_pixel(px, py).0) {
                        *s += u64::from(c);
                    }
                    count += 1;
                }
            }
            if count == 0 {
                continue;
            }
            let avg = Pixel(sum.map(|s| (s / count) as u8));
            for py in by..bh {
                for px in bx..bw {
                    img.put_pixel(px, py, avg);
                }
            }
        }
    }
}

fn channel_shift<R: RandomSource>(img: &mut RgbaImage, intensity: f64, rng: &mut R) {
    let dx = ((rng.range(0, 20) - 10) as f64 * intensity) as i64;
    let dy = ((rng.range(0, 10) - 5) as f64 * intensity) as i64;
    let channel = rng.range(0, 3) as usize;
    let source = img.clone();
    let (w, h) = (i64::from(img.width()), i64::from(img.height()));
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let sx = (i64::from(x) + dx).clamp(0, w - 1) as u32;
        let sy = (i64::from(y) + dy).clamp(0, h - 1) as u32;
        pixel.0[channel] = source.get_pixel(sx, sy).0[channel];
    }
}

fn slices<R: RandomSource>(img: &mut RgbaImage, intensity: f64, rng: &mut R) {
    let (w, h) = (img.width(), img.height());
    for _ in 0..rng.range(2, 7) {
        let top = rng.range(0, i64::from(h)) as u32;
        let height = rng.range(5, 35) as u32;
        let shift = ((rng.range(0, 40) - 20) as f64 * intensity) as i64;
        if shift == 0 {
            continue;
        }
        for y in top..(top + height).min(h) {
            let row: Vec<Pixel<u8>> = (0..w).map(|x| *img.get_pixel(x, y)).collect();
            for x in 0..w {
                let sx = i64::from(x) - shift;
                let px = if (0..i64::from(w)).contains(&sx) {
                    row[sx as usize]
                } else {
                    CLEAR
                };
                img.put_pixel(x, y, px);
            }
        }
    }
}

fn pixelate<R: RandomSource>(img: &mut RgbaImage, cell: u32, rng: &mut R) {
    let (w, h) = (f64::from(img.width()), f64::from(img.height()));
    for _ in 0..rng.range(1, 4) {
        let x = (rng.rnd() * w * 0.8).floor();
        let y = (rng.rnd() * h * 0.8).floor();
        let aw = (rng.rnd() * (w - x) * 0.5).floor() + 50.0;
        let ah = (rng.rnd() * (h - y) * 0.5).floor() + 50.0;
        let size = f64::from(cell) * rng.uniform(1.0, 4.0);
        mosaic(img, x as u32, y as u32, aw as u32, ah as u32, size as u32);
    }
}

fn noise_blocks<R: RandomSource>(
    img: &mut RgbaImage,
    palette: &Palette,
    rng: &mut R,
) -> RenderResult<()> {
    let (w, h) = (f64::from(img.width()), f64::from(img.height()));
    let mut scratch = Surface::from_rgba_image(img)?;
    for _ in 0..rng.range(2, 7) {
        let x = (rng.rnd() * w * 0.9).floor();
        let y = (rng.rnd() * h * 0.9).floor();
        let bw = rng.range(20, 120) as f64;
        let bh = rng.range(10, 60) as f64;
        let color = palette.pick_rgba(rng);
        let alpha = rng.uniform(0.3, 0.7);
        scratch.fill_color(&surface::rect(x, y, bw, bh), color, alpha);
        for _ in 0..5 {
            let from = (x + rng.rnd() * bw, y + rng.rnd() * bh);
            let to = (x + rng.rnd() * bw, y + rng.rnd() * bh);
            scratch.stroke_color(&surface::line(from, to), color, alpha, 1.0);
        }
    }
    *img = scratch.to_rgba_image();
    Ok(())
}

fn scanlines(img: &mut RgbaImage, time: f64) -> RenderResult<()> {
    let (w, h) = (f64::from(img.width()), f64::from(img.height()));
    let mut scratch = Surface::from_rgba_image(img)?;
    let y1 = (h * 0.5 * (time * 2.0).sin() + h * 0.5).rem_euclid(h);
    let thickness = 2.0 + (time * 5.0).sin() * 2.0;
    scratch.fill_color(&surface::rect(0.0, y1, w, thickness), SCANLINE, 0.3);
    let y2 = (h * 0.5 * (time * 3.0 + 1.0).sin() + h * 0.5).rem_euclid(h);
    scratch.fill_color(&surface::rect(0.0, y2, w, 1.0), SCANLINE_GHOST, 0.2);
    *img = scratch.to_rgba_image();
    Ok(())
}

/// Horizontal shear keyed to row and time; alpha is left alone.
fn signal_loss(img: &mut RgbaImage, time: f64) {
    let source = img.clone();
    let w = img.width();
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let shear = (f64::from(y) * 0.1 + time * 10.0).sin() * 10.0;
        let sx = ((f64::from(x) + shear).floor() as i64).rem_euclid(i64::from(w)) as u32;
        let src = source.get_pixel(sx, y).0;
        pixel.0[..3].copy_from_slice(&src[..3]);
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
    layers::canvas(surface, params)?;
    let d = layers::density(params, LayerKind::GlitchMosaic);
    let mut rng = LayerRng::new(params.seed(), rng);
    surface.set_alpha(opacity);

    let intensity = 0.5 + params.number_or("distortion", 0.5).clamp(0.0, 1.0);
    let glitches = ((5.0 + d * 15.0) * intensity).floor() as usize;
    // The mosaic works on device pixels; logical sizes are scaled to match.
    let scale = surface.device_scale();
    let cell = ((50.0 - d * 40.0).floor().max(5.0) * scale).round().max(1.0) as u32;

    let mut img = surface.to_rgba_image();
    let (iw, ih) = img.dimensions();
    mosaic(&mut img, 0, 0, iw, ih, cell);

    if let Some((px, py)) = params.pointer() {
        // Finer tiles under the pointer.
        let (dx, dy) = surface.to_device(px, py);
        let r = POINTER_RADIUS * scale;
        let x = (dx - r).clamp(0.0, f64::from(iw)) as u32;
        let y = (dy - r).clamp(0.0, f64::from(ih)) as u32;
        let size = (2.0 * r).min(f64::from(iw.max(ih))) as u32;
        mosaic(&mut img, x, y, size, size, (cell / 3).max(2));
    }

    for _ in 0..glitches {
        match rng.choice(&Glitch::ALL) {
            Glitch::ChannelShift => channel_shift(&mut img, intensity, &mut rng),
            Glitch::Slices => slices(&mut img, intensity, &mut rng),
            Glitch::Pixelate => pixelate(&mut img, cell, &mut rng),
            Glitch::Noise => noise_blocks(&mut img, palette, &mut rng)?,
        }
    }

    if frame.animating {
        let time = frame.seconds();
        scanlines(&mut img, time)?;
        if (time * 0.5).sin() > 0.9 {
            signal_loss(&mut img, time);
        }
    }

    surface.draw_device_image(&img);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layers::testing;

    #[test]
    fn layer_contract() {
        testing::check_contract(LayerKind::GlitchMosaic);
        testing::check_animates(LayerKind::GlitchMosaic);
    }

    #[test]
    fn mosaic_averages_blocks() {
        let mut img = RgbaImage::from_fn(4, 2, |x, _| {
            if x % 2 == 0 {
                Pixel([200, 0, 0, 255])
            } else {
                Pixel([0, 100, 0, 255])
            }
        });
        mosaic(&mut img, 0, 0, 4, 2, 2);
        for p in img.pixels() {
            assert_eq!(p.0, [100, 50, 0, 255]);
        }
    }

    #[test]
    fn mosaic_clips_to_the_image() {
        let mut img = RgbaImage::from_pixel(3, 3, Pixel([10, 20, 30, 255]));
        mosaic(&mut img, 2, 2, 50, 50, 4);
        assert_eq!(img.get_pixel(2, 2).0, [10, 20, 30, 255]);
    }

    #[test]
    fn far_pointers_are_clamped_to_the_canvas() {
        for pointer in [1e12, -1e12, f64::NAN] {
            let params = testing::params(LayerKind::GlitchMosaic, 8)
                .with("isInteractive", true)
                .with("mouseX", pointer)
                .with("mouseY", pointer);
            testing::draw(LayerKind::GlitchMosaic, Frame::still(), &params, 1.0);
        }
    }

    #[test]
    fn mosaic_saturates_huge_regions() {
        let mut img = RgbaImage::from_pixel(4, 4, Pixel([10, 20, 30, 255]));
        mosaic(&mut img, u32::MAX - 1, 1, u32::MAX, u32::MAX, 2);
        mosaic(&mut img, 1, 1, u32::MAX, u32::MAX, 2);
        assert_eq!(img.get_pixel(3, 3).0, [10, 20, 30, 255]);
    }

    #[test]
    fn signal_loss_keeps_alpha() {
        let mut img =
            RgbaImage::from_fn(8, 8, |x, y| Pixel([x as u8 * 30, y as u8 * 30, 0, 128]));
        signal_loss(&mut img, 1.3);
        assert!(img.pixels().all(|p| p.0[3] == 128));
    }
}
