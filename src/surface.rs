//! The raster surface every layer paints onto.
//!
//! A thin stateful wrapper around [`raqote::DrawTarget`] that adds what an immediate-mode canvas
//! has and raqote does not: a `save`/`restore` stack covering the transform, global alpha, blend
//! mode and clip depth, plus unpremultiplied pixel access through [`image::RgbaImage`].

use std::path::Path as FsPath;

use image::RgbaImage;
use raqote::{
    AntialiasMode, BlendMode, DrawOptions, DrawTarget, ExtendMode, FilterMode, Gradient,
    GradientStop, Image, LineCap, LineJoin, Path, PathBuilder, Point, SolidSource, Source, Spread,
    StrokeStyle, Transform,
};

use crate::color::Rgba;
use crate::error::{RenderError, RenderResult};

#[derive(Debug, Clone, Copy, PartialEq)]
struct State {
    transform: Transform,
    alpha: f32,
    blend: BlendMode,
    clips: usize,
}

impl Default for State {
    fn default() -> Self {
        State {
            transform: Transform::identity(),
            alpha: 1.0,
            blend: BlendMode::SrcOver,
            clips: 0,
        }
    }
}

pub struct Surface {
    dt: DrawTarget,
    state: State,
    stack: Vec<State>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("depth", &self.stack.len())
            .finish()
    }
}

impl Surface {
    pub fn new(width: i32, height: i32) -> RenderResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(RenderError::canvas(format!(
                "surface dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Surface {
            dt: DrawTarget::new(width, height),
            state: State::default(),
            stack: Vec::new(),
        })
    }

    pub fn from_rgba_image(img: &RgbaImage) -> RenderResult<Self> {
        let mut surface = Surface::new(img.width() as i32, img.height() as i32)?;
        surface.put_image_data(img, 0, 0);
        Ok(surface)
    }

    pub fn width(&self) -> i32 {
        self.dt.width()
    }

    pub fn height(&self) -> i32 {
        self.dt.height()
    }

    /// Premultiplied ARGB pixels, row-major.
    pub fn data(&self) -> &[u32] {
        self.dt.get_data()
    }

    /// Replaces the backing store with a blank one of the new size. Drawing state is reset.
    pub fn resize(&mut self, width: i32, height: i32) -> RenderResult<()> {
        *self = Surface::new(width, height)?;
        Ok(())
    }

    pub fn save(&mut self) {
        self.stack.push(self.state);
    }

    /// Pops the most recent [`save`][Self::save]. Unbalanced calls are ignored.
    pub fn restore(&mut self) {
        let Some(saved) = self.stack.pop() else {
            return;
        };
        for _ in saved.clips..self.state.clips {
            self.dt.pop_clip();
        }
        self.state = saved;
        self.dt.set_transform(&self.state.transform);
    }

    /// Number of outstanding `save` calls.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn transform(&self) -> Transform {
        self.state.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.state.transform = transform;
        self.dt.set_transform(&transform);
    }

    /// Applies `local` before the current transform, like a canvas `transform()` call.
    fn prepend(&mut self, local: Transform) {
        let combined = local.then(&self.state.transform);
        self.set_transform(combined);
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        self.prepend(Transform::translation(x as f32, y as f32));
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.prepend(Transform::scale(sx as f32, sy as f32));
    }

    /// Rotates clockwise (in screen space) by `radians`.
    pub fn rotate(&mut self, radians: f64) {
        let (sin, cos) = (radians as f32).sin_cos();
        self.prepend(Transform::new(cos, sin, -sin, cos, 0.0, 0.0));
    }

    pub fn alpha(&self) -> f32 {
        self.state.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.state.alpha = alpha.clamp(0.0, 1.0) as f32;
    }

    pub fn blend(&self) -> BlendMode {
        self.state.blend
    }

    pub fn set_blend(&mut self, blend: BlendMode) {
        self.state.blend = blend;
    }

    fn options(&self) -> DrawOptions {
        DrawOptions {
            blend_mode: self.state.blend,
            alpha: self.state.alpha,
            antialias: AntialiasMode::Gray,
        }
    }

    pub fn fill(&mut self, path: &Path, src: &Source) {
        let options = self.options();
        self.dt.fill(path, src, &options);
    }

    pub fn stroke(&mut self, path: &Path, src: &Source, style: &StrokeStyle) {
        let options = self.options();
        self.dt.stroke(path, src, style, &options);
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, src: &Source) {
        let options = self.options();
        self.dt
            .fill_rect(x as f32, y as f32, w as f32, h as f32, src, &options);
    }

    pub fn fill_color(&mut self, path: &Path, color: Rgba, alpha: f64) {
        self.fill(path, &Source::Solid(color.solid(alpha)));
    }

    pub fn stroke_color(&mut self, path: &Path, color: Rgba, alpha: f64, width: f64) {
        self.stroke(path, &Source::Solid(color.solid(alpha)), &round_stroke(width));
    }

    /// Erases a rectangle to transparent, ignoring alpha and blend mode.
    pub fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let options = DrawOptions {
            blend_mode: BlendMode::Clear,
            alpha: 1.0,
            antialias: AntialiasMode::None,
        };
        let src = Source::Solid(SolidSource::from_unpremultiplied_argb(0, 0, 0, 0));
        self.dt
            .fill_rect(x as f32, y as f32, w as f32, h as f32, &src, &options);
    }

    /// Fills every pixel with `color`, ignoring transform, clip, alpha and blend mode.
    pub fn clear(&mut self, color: Rgba) {
        self.dt.clear(color.solid(1.0));
    }

    pub fn clip_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.clip_path(&rect(x, y, w, h));
    }

    /// Intersects the clip region with `path` under the current transform. Released by the
    /// matching [`restore`][Self::restore].
    pub fn clip_path(&mut self, path: &Path) {
        self.dt.push_clip(path);
        self.state.clips += 1;
    }

    /// Copies a device-space pixel rectangle out as straight RGBA. Pixels outside the surface
    /// read as transparent.
    pub fn get_image_data(&self, x: i32, y: i32, w: u32, h: u32) -> RgbaImage {
        let (sw, sh) = (self.width(), self.height());
        let data = self.dt.get_data();
        RgbaImage::from_fn(w, h, |px, py| {
            let (sx, sy) = (x + px as i32, y + py as i32);
            if sx < 0 || sy < 0 || sx >= sw || sy >= sh {
                return image::Rgba([0, 0, 0, 0]);
            }
            image::Rgba(unpremultiply(data[(sy * sw + sx) as usize]))
        })
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        self.get_image_data(0, 0, self.width() as u32, self.height() as u32)
    }

    /// Writes straight RGBA pixels directly into device space, replacing what was there.
    pub fn put_image_data(&mut self, img: &RgbaImage, x: i32, y: i32) {
        let (sw, sh) = (self.width(), self.height());
        let data = self.dt.get_data_mut();
        for (px, py, pixel) in img.enumerate_pixels() {
            let (dx, dy) = (x + px as i32, y + py as i32);
            if dx < 0 || dy < 0 || dx >= sw || dy >= sh {
                continue;
            }
            data[(dy * sw + dx) as usize] = premultiply(pixel.0);
        }
    }

    /// Composites straight RGBA pixels at `(x, y)` under the current transform, clip, alpha and
    /// blend mode.
    pub fn draw_image(&mut self, img: &RgbaImage, x: f64, y: f64) {
        let pixels: Vec<u32> = img.pixels().map(|p| premultiply(p.0)).collect();
        let image = Image {
            width: img.width() as i32,
            height: img.height() as i32,
            data: &pixels,
        };
        let options = self.options();
        self.dt.draw_image_at(x as f32, y as f32, &image, &options);
    }

    /// Composites straight RGBA pixels with their top-left at the device origin, bypassing the
    /// current transform. Clip, alpha and blend still apply. Pairs with
    /// [`to_rgba_image`][Self::to_rgba_image] for read-modify-write passes.
    pub fn draw_device_image(&mut self, img: &RgbaImage) {
        self.dt.set_transform(&Transform::identity());
        self.draw_image(img, 0.0, 0.0);
        self.dt.set_transform(&self.state.transform);
    }

    /// Device-space position of the logical point `(x, y)`.
    pub fn to_device(&self, x: f64, y: f64) -> (f64, f64) {
        let p = self.state.transform.transform_point(point(x, y));
        (f64::from(p.x), f64::from(p.y))
    }

    /// Device pixels per logical unit along the x axis of the current transform.
    pub fn device_scale(&self) -> f64 {
        let (ox, oy) = self.to_device(0.0, 0.0);
        let (ux, uy) = self.to_device(1.0, 0.0);
        (ux - ox).hypot(uy - oy)
    }

    /// Composites another surface at `(x, y)` under the current drawing state.
    pub fn draw_surface(&mut self, other: &Surface, x: f64, y: f64) {
        let image = Image {
            width: other.width(),
            height: other.height(),
            data: other.data(),
        };
        let options = self.options();
        self.dt.draw_image_at(x as f32, y as f32, &image, &options);
    }

    /// Fills a rectangle with `tile` repeated from the origin.
    pub fn fill_rect_with_tile(&mut self, tile: &Surface, x: f64, y: f64, w: f64, h: f64) {
        let image = Image {
            width: tile.width(),
            height: tile.height(),
            data: tile.data(),
        };
        let src = Source::Image(
            image,
            ExtendMode::Repeat,
            FilterMode::Nearest,
            Transform::identity(),
        );
        self.fill_rect(x, y, w, h, &src);
    }

    pub fn save_png(&self, path: impl AsRef<FsPath>) -> RenderResult<()> {
        self.to_rgba_image()
            .save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

pub fn premultiply([r, g, b, a]: [u8; 4]) -> u32 {
    let mul = |c: u8| ((u32::from(c) * u32::from(a) + 127) / 255) & 0xff;
    (u32::from(a) << 24) | (mul(r) << 16) | (mul(g) << 8) | mul(b)
}

pub fn unpremultiply(px: u32) -> [u8; 4] {
    let a = (px >> 24) & 0xff;
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let div = |c: u32| (((c & 0xff) * 255 + a / 2) / a).min(255) as u8;
    [div(px >> 16), div(px >> 8), div(px), a as u8]
}

/// Maps a CSS compositing-mode name onto raqote. `normal` and `source-over` are plain over
/// compositing.
pub fn blend_mode(name: &str) -> Option<BlendMode> {
    Some(match name.trim().to_ascii_lowercase().as_str() {
        "normal" | "source-over" => BlendMode::SrcOver,
        "multiply" => BlendMode::Multiply,
        "screen" => BlendMode::Screen,
        "overlay" => BlendMode::Overlay,
        "darken" => BlendMode::Darken,
        "lighten" => BlendMode::Lighten,
        "color-dodge" => BlendMode::ColorDodge,
        "color-burn" => BlendMode::ColorBurn,
        "hard-light" => BlendMode::HardLight,
        "soft-light" => BlendMode::SoftLight,
        "difference" => BlendMode::Difference,
        "exclusion" => BlendMode::Exclusion,
        "hue" => BlendMode::Hue,
        "saturation" => BlendMode::Saturation,
        "color" => BlendMode::Color,
        "luminosity" => BlendMode::Luminosity,
        "lighter" | "add" => BlendMode::Add,
        "xor" => BlendMode::Xor,
        "destination-over" => BlendMode::DstOver,
        "source-atop" => BlendMode::SrcAtop,
        _ => return None,
    })
}

/// Like [`blend_mode`], but unknown names become source-over.
pub fn blend_mode_or_normal(name: &str) -> BlendMode {
    blend_mode(name).unwrap_or_else(|| {
        tracing::warn!(name, "unknown blend mode; using normal");
        BlendMode::SrcOver
    })
}

/// The blend modes a layer may pick at random.
pub const ARTISTIC_BLEND_MODES: &[&str] = &[
    "multiply",
    "screen",
    "overlay",
    "darken",
    "lighten",
    "color-dodge",
    "color-burn",
    "hard-light",
    "soft-light",
    "difference",
    "exclusion",
    "hue",
    "saturation",
    "color",
    "luminosity",
];

pub fn round_stroke(width: f64) -> StrokeStyle {
    StrokeStyle {
        width: width.max(0.0) as f32,
        cap: LineCap::Round,
        join: LineJoin::Round,
        ..StrokeStyle::default()
    }
}

pub fn point(x: f64, y: f64) -> Point {
    Point::new(x as f32, y as f32)
}

pub fn circle(x: f64, y: f64, r: f64) -> Path {
    let mut pb = PathBuilder::new();
    let r = r.max(0.0) as f32;
    pb.move_to(x as f32 + r, y as f32);
    pb.arc(x as f32, y as f32, r, 0.0, std::f32::consts::TAU);
    pb.close();
    pb.finish()
}

pub fn rect(x: f64, y: f64, w: f64, h: f64) -> Path {
    let mut pb = PathBuilder::new();
    pb.rect(x as f32, y as f32, w as f32, h as f32);
    pb.finish()
}

pub fn line(from: (f64, f64), to: (f64, f64)) -> Path {
    let mut pb = PathBuilder::new();
    pb.move_to(from.0 as f32, from.1 as f32);
    pb.line_to(to.0 as f32, to.1 as f32);
    pb.finish()
}

/// Closed polygon through `points`.
pub fn polygon(points: &[(f64, f64)]) -> Path {
    let mut pb = PathBuilder::new();
    polyline_into(&mut pb, points);
    pb.close();
    pb.finish()
}

/// Open polyline through `points`.
pub fn polyline(points: &[(f64, f64)]) -> Path {
    let mut pb = PathBuilder::new();
    polyline_into(&mut pb, points);
    pb.finish()
}

fn polyline_into(pb: &mut PathBuilder, points: &[(f64, f64)]) {
    let mut iter = points.iter();
    if let Some(&(x, y)) = iter.next() {
        pb.move_to(x as f32, y as f32);
    }
    for &(x, y) in iter {
        pb.line_to(x as f32, y as f32);
    }
}

fn gradient(stops: &[(f64, Rgba)], alpha: f64) -> Gradient {
    Gradient {
        stops: stops
            .iter()
            .map(|&(position, color)| GradientStop {
                position: position.clamp(0.0, 1.0) as f32,
                color: color.gradient_color(alpha),
            })
            .collect(),
    }
}

pub fn linear_gradient(
    stops: &[(f64, Rgba)],
    alpha: f64,
    start: (f64, f64),
    end: (f64, f64),
) -> Source<'static> {
    Source::new_linear_gradient(
        gradient(stops, alpha),
        point(start.0, start.1),
        point(end.0, end.1),
        Spread::Pad,
    )
}

pub fn radial_gradient(
    stops: &[(f64, Rgba)],
    alpha: f64,
    center: (f64, f64),
    radius: f64,
) -> Source<'static> {
    Source::new_radial_gradient(
        gradient(stops, alpha),
        point(center.0, center.1),
        radius.max(0.001) as f32,
        Spread::Pad,
    )
}

/// Radial gradient between two circles, as in a canvas `createRadialGradient`.
pub fn two_circle_gradient(
    stops: &[(f64, Rgba)],
    alpha: f64,
    (c0, r0): ((f64, f64), f64),
    (c1, r1): ((f64, f64), f64),
) -> Source<'static> {
    Source::new_two_circle_radial_gradient(
        gradient(stops, alpha),
        point(c0.0, c0.1),
        r0.max(0.0) as f32,
        point(c1.0, c1.1),
        r1.max(0.001) as f32,
        Spread::Pad,
    )
}

/// Conic gradient around `center`, starting at `start_degrees`.
pub fn sweep_gradient(
    stops: &[(f64, Rgba)],
    alpha: f64,
    center: (f64, f64),
    start_degrees: f64,
) -> Source<'static> {
    Source::new_sweep_gradient(
        gradient(stops, alpha),
        point(center.0, center.1),
        start_degrees as f32,
        start_degrees as f32 + 360.0,
        Spread::Pad,
    )
}

#[cfg(test)]
mod test {
    use super::*;

    const RED: Rgba = Rgba::rgb(255, 0, 0);

    fn pixel(surface: &Surface, x: u32, y: u32) -> [u8; 4] {
        surface.get_image_data(x as i32, y as i32, 1, 1).get_pixel(0, 0).0
    }

    #[test]
    fn rejects_empty_dimensions() {
        assert!(Surface::new(0, 10).is_err());
        assert!(Surface::new(10, -1).is_err());
    }

    #[test]
    fn premultiply_round_trips_opaque_and_clear() {
        assert_eq!(unpremultiply(premultiply([12, 34, 56, 255])), [12, 34, 56, 255]);
        assert_eq!(unpremultiply(premultiply([12, 34, 56, 0])), [0, 0, 0, 0]);
        assert_eq!(premultiply([255, 255, 255, 128]), 0x80808080);
    }

    #[test]
    fn restore_resets_state() {
        let mut surface = Surface::new(8, 8).unwrap();
        surface.save();
        surface.translate(4.0, 0.0);
        surface.set_alpha(0.5);
        surface.set_blend(BlendMode::Multiply);
        surface.clip_rect(0.0, 0.0, 2.0, 2.0);
        assert_eq!(surface.depth(), 1);
        surface.restore();
        assert_eq!(surface.depth(), 0);
        assert_eq!(surface.transform(), Transform::identity());
        assert_eq!(surface.alpha(), 1.0);
        assert_eq!(surface.blend(), BlendMode::SrcOver);

        // The clip is gone, so a full-surface fill reaches the far corner.
        surface.fill_rect(0.0, 0.0, 8.0, 8.0, &Source::Solid(RED.solid(1.0)));
        assert_eq!(pixel(&surface, 7, 7), [255, 0, 0, 255]);
    }

    #[test]
    fn unbalanced_restore_is_ignored() {
        let mut surface = Surface::new(4, 4).unwrap();
        surface.restore();
        assert_eq!(surface.depth(), 0);
    }

    #[test]
    fn clip_limits_fill() {
        let mut surface = Surface::new(8, 8).unwrap();
        surface.save();
        surface.clip_rect(0.0, 0.0, 4.0, 8.0);
        surface.fill_rect(0.0, 0.0, 8.0, 8.0, &Source::Solid(RED.solid(1.0)));
        surface.restore();
        assert_eq!(pixel(&surface, 1, 1), [255, 0, 0, 255]);
        assert_eq!(pixel(&surface, 6, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn translate_moves_drawing() {
        let mut surface = Surface::new(8, 8).unwrap();
        surface.translate(4.0, 4.0);
        surface.fill_rect(0.0, 0.0, 4.0, 4.0, &Source::Solid(RED.solid(1.0)));
        assert_eq!(pixel(&surface, 1, 1), [0, 0, 0, 0]);
        assert_eq!(pixel(&surface, 5, 5), [255, 0, 0, 255]);
    }

    #[test]
    fn image_data_round_trip() {
        let mut surface = Surface::new(4, 4).unwrap();
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(1, 1, image::Rgba([10, 20, 30, 255]));
        surface.put_image_data(&img, 2, 2);
        assert_eq!(pixel(&surface, 3, 3), [10, 20, 30, 255]);
        // Out-of-bounds reads are transparent.
        let outside = surface.get_image_data(-2, -2, 2, 2);
        assert!(outside.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn device_images_ignore_the_transform() {
        let mut surface = Surface::new(8, 8).unwrap();
        surface.scale(2.0, 2.0);
        assert_eq!(surface.to_device(3.0, 1.0), (6.0, 2.0));
        assert_eq!(surface.device_scale(), 2.0);

        let mut img = RgbaImage::new(8, 8);
        img.put_pixel(7, 7, image::Rgba([10, 20, 30, 255]));
        surface.draw_device_image(&img);
        assert_eq!(pixel(&surface, 7, 7)[3], 255);
        assert_eq!(pixel(&surface, 3, 3)[3], 0);
        assert_eq!(surface.transform(), Transform::scale(2.0, 2.0));
    }

    #[test]
    fn clear_rect_erases() {
        let mut surface = Surface::new(4, 4).unwrap();
        surface.clear(RED);
        surface.clear_rect(0.0, 0.0, 2.0, 4.0);
        assert_eq!(pixel(&surface, 0, 0), [0, 0, 0, 0]);
        assert_eq!(pixel(&surface, 3, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn blend_mode_names() {
        assert_eq!(blend_mode("normal"), Some(BlendMode::SrcOver));
        assert_eq!(blend_mode("Soft-Light"), Some(BlendMode::SoftLight));
        assert_eq!(blend_mode("bogus"), None);
        assert_eq!(blend_mode_or_normal("bogus"), BlendMode::SrcOver);
        for name in ARTISTIC_BLEND_MODES {
            assert!(blend_mode(name).is_some(), "{}", name);
        }
    }
}
