//! Pixel sorting over what is already drawn. Selected pixels along a row or column are sorted by
//! a metric and written back into the selected positions in ascending order.

use image::{Rgba as Pixel, RgbaImage};

use crate::color;
use crate::error::RenderResult;
use crate::layers::{self, Frame, LayerKind};
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::{LayerRng, RandomSource};
use crate::surface::Surface;

named_enum!(
    SortMethod {
        Brightness = "brightness",
        Hue = "hue",
        Rows = "rows",
        Columns = "columns",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    Row(u32),
    Column(u32),
}

pub fn brightness(p: &Pixel<u8>) -> f64 {
    (f64::from(p.0[0]) + f64::from(p.0[1]) + f64::from(p.0[2])) / (255.0 * 3.0)
}

/// Hue as a fraction of a full turn; gray pixels have hue zero.
pub fn hue(p: &Pixel<u8>) -> f64 {
    let (r, g, b) = (p.0[0], p.0[1], p.0[2]);
    if r == g && g == b {
        return 0.0;
    }
    color::rgb_to_hsl(r, g, b).0 / 360.0
}

/// Sorts the pixels of `line` whose `metric` exceeds `threshold`.
fn sort_line(img: &mut RgbaImage, line: Line, metric: fn(&Pixel<u8>) -> f64, threshold: f64) {
    let coords: Vec<(u32, u32)> = match line {
        Line::Row(y) => (0..img.width()).map(|x| (x, y)).collect(),
        Line::Column(x) => (0..img.height()).map(|y| (x, y)).collect(),
    };
    let selected: Vec<(u32, u32)> = coords
        .into_iter()
        .filter(|&(x, y)| metric(img.get_pixel(x, y)) > threshold)
        .collect();
    let mut pixels: Vec<Pixel<u8>> = selected.iter().map(|&(x, y)| *img.get_pixel(x, y)).collect();
    pixels.sort_by(|a, b| metric(a).total_cmp(&metric(b)));
    for (&(x, y), p) in selected.iter().zip(pixels) {
        img.put_pixel(x, y, p);
    }
}

pub fn sort_pixels<R: RandomSource>(
    img: &mut RgbaImage,
    method: SortMethod,
    intensity: u32,
    threshold: f64,
    rng: &mut R,
) {
    let (w, h) = (i64::from(img.width()), i64::from(img.height()));
    match method {
        SortMethod::Brightness => {
            for _ in 0..intensity {
                let line = if rng.odds(0.5) {
                    Line::Row(rng.range(0, h) as u32)
                } else {
                    Line::Column(rng.range(0, w) as u32)
                };
                sort_line(img, line, brightness, threshold);
            }
        }
        SortMethod::Hue => {
            for _ in 0..intensity {
                let row = Line::Row(rng.range(0, h) as u32);
                sort_line(img, row, hue, threshold);
            }
        }
        SortMethod::Rows => {
            for _ in 0..(h as f64 * threshold).floor() as usize {
                let row = Line::Row(rng.range(0, h) as u32);
                sort_line(img, row, brightness, -1.0);
            }
        }
        SortMethod::Columns => {
            for _ in 0..(w as f64 * threshold).floor() as usize {
                let column = Line::Column(rng.range(0, w) as u32);
                sort_line(img, column, brightness, -1.0);
            }
        }
    }
}

/// Shifts each row horizontally by a sine of its index and `time`, wrapping around.
fn wave(img: &mut RgbaImage, time: f64) {
    let source = img.clone();
    let w = i64::from(img.width());
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let offset = (f64::from(y) * 0.05 + time * 2.0).sin() * 10.0;
        let sx = ((f64::from(x) + offset).floor() as i64).rem_euclid(w) as u32;
        *pixel = *source.get_pixel(sx, y);
    }
}

pub fn render(
    surface: &mut Surface,
    _palette: &Palette,
    frame: &Frame,
    params: &Params,
    opacity: f64,
    rng: &mut dyn RandomSource,
) -> RenderResult<()> {
    layers::canvas(surface, params)?;
    let d = layers::density(params, LayerKind::PixelSort);
    let mut rng = LayerRng::new(params.seed(), rng);
    surface.set_alpha(opacity);

    let intensity = 1 + (d * 10.0).floor() as u32;
    let threshold = 0.1 + d * 0.4;
    let method = params
        .text("pixelSortMethod")
        .and_then(SortMethod::from_name)
        .unwrap_or_else(|| *rng.choice(SortMethod::ALL));

    // Sorting works on device pixels, whatever transform the caller has in place.
    let mut img = surface.to_rgba_image();
    sort_pixels(&mut img, method, intensity, threshold, &mut rng);

    if let Some((px, py)) = params.pointer() {
        let y = surface.to_device(px, py).1.floor();
        if (0.0..f64::from(img.height())).contains(&y) {
            sort_line(&mut img, Line::Row(y as u32), brightness, -1.0);
        }
    }

    if frame.animating {
        wave(&mut img, frame.seconds());
    }
    surface.draw_device_image(&img);
    Ok(())
}
