//! One full-canvas gradient (linear, two-circle radial or conic) over palette stops, composited
//! with a blend mode.

use raqote::BlendMode;

use crate::error::RenderResult;
use crate::layers::{self, Frame};
use crate::math::{pi, pull_toward};
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::{LayerRng, RandomSource};
use crate::surface::{self, Surface, ARTISTIC_BLEND_MODES};

named_enum!(
    GradientShape {
        Linear = "linear",
        Radial = "radial",
        Conic = "conic",
    }
);

named_enum!(
    /// Fixed linear axis, used by callers that need a predictable sky or wash.
    GradientDirection {
        Vertical = "vertical",
        Horizontal = "horizontal",
        Diagonal = "diagonal",
    }
);

/// The blend mode for this layer: the `blendMode` param, `random` for a random artistic mode,
/// overlay when absent.
fn pick_blend<R: RandomSource>(params: &Params, rng: &mut R) -> BlendMode {
    match params.text("blendMode") {
        Some("random") => surface::blend_mode_or_normal(*rng.choice(ARTISTIC_BLEND_MODES)),
        Some(name) => surface::blend_mode(name).unwrap_or(BlendMode::Overlay),
        None => BlendMode::Overlay,
    }
}

/// Sorted stop offsets in `[0, 1]`, at least two, pinned to both ends when `style` is high.
fn stop_offsets<R: RandomSource>(palette_len: usize, style: f64, rng: &mut R) -> Vec<f64> {
    let max_stops = palette_len.min(5 + (style * 5.0).floor() as usize).max(2);
    let count = 2 + (style * (max_stops - 2) as f64).floor() as usize;
    let mut offsets: Vec<f64> = (0..count).map(|_| rng.rnd()).collect();
    offsets.sort_by(f64::total_cmp);
    offsets.dedup();
    if offsets.len() < 2 {
        return vec![0.0, 1.0];
    }
    if style > 0.3 || offsets.len() == 2 {
        offsets[0] = 0.0;
        if let Some(last) = offsets.last_mut() {
            *last = 1.0;
        }
    }
    offsets
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
    let mut rng = LayerRng::new(params.seed(), rng);
    surface.set_alpha(opacity);

    let variety = match params.number("gradientShapeVariety") {
        Some(v) => v.clamp(0.0, 1.0),
        None => rng.rnd(),
    };
    let style = match params.number("colorApplicationStyle") {
        Some(v) => v.clamp(0.0, 1.0),
        None => rng.rnd(),
    };
    let blend = pick_blend(params, &mut rng);
    surface.set_blend(blend);

    let direction = params.text("gradientDirection").and_then(GradientDirection::from_name);
    let shape = match (direction, params.text("gradientType").and_then(GradientShape::from_name)) {
        (Some(_), _) => GradientShape::Linear,
        (None, Some(shape)) => shape,
        (None, None) => *rng.choice(GradientShape::ALL),
    };

    let t = frame.seconds();
    let pointer = params.pointer();
    let stops: Vec<(f64, crate::color::Rgba)> = stop_offsets(palette.len(), style, &mut rng)
        .into_iter()
        .map(|offset| (offset, palette.pick_rgba(&mut rng)))
        .collect();

    let source = match shape {
        GradientShape::Linear => {
            let (mut start, mut end) = match direction {
                Some(GradientDirection::Vertical) => ((0.0, 0.0), (0.0, h)),
                Some(GradientDirection::Horizontal) => ((0.0, 0.0), (w, 0.0)),
                Some(GradientDirection::Diagonal) => ((0.0, 0.0), (w, h)),
                None => linear_endpoints(w, h, variety, &mut rng),
            };
            if frame.animating && direction.is_none() {
                let swing = (t * 0.5).sin() * 0.2;
                let (cx, cy) = (w / 2.0, h / 2.0);
                let spin = |(x, y): (f64, f64)| {
                    let (dx, dy) = (x - cx, y - cy);
                    (
                        cx + dx * swing.cos() - dy * swing.sin(),
                        cy + dx * swing.sin() + dy * swing.cos(),
                    )
                };
                start = spin(start);
                end = spin(end);
            }
            surface::linear_gradient(&stops, 1.0, start, end)
        }
        GradientShape::Radial => {
            let inner = (rng.uniform(0.0, w), rng.uniform(0.0, h));
            let mut outer = (w * rng.uniform(0.2, 0.8), h * rng.uniform(0.2, 0.8));
            let min_radius = w.min(h) * 0.05;
            let max_radius = w.min(h) * (0.5 + variety * 0.5);
            let mut r0 = min_radius + rng.rnd() * max_radius * 0.3;
            let mut r1 = r0 + min_radius * 0.5 + rng.rnd() * (max_radius - r0);
            if variety < 0.2 && r0 > max_radius * 0.1 {
                r0 = rng.rnd() * max_radius * 0.1;
            }
            if r1 <= r0 {
                r1 = r0 + min_radius;
            }
            if frame.animating {
                outer.0 += (t * 0.7).cos() * w * 0.05;
                outer.1 += (t * 0.7).sin() * h * 0.05;
                r1 *= 1.0 + (t * 1.3).sin() * 0.1;
            }
            if let Some(p) = pointer {
                outer = pull_toward(outer, p, w.max(h), 0.3);
            }
            surface::two_circle_gradient(&stops, 1.0, (inner, r0), (outer, r1))
        }
        GradientShape::Conic => {
            let mut start = rng.rnd() * pi(2.0) * (0.5 + variety * 0.5);
            let mut center = (
                w / 2.0 + (rng.rnd() - 0.5) * w * 0.4 * variety,
                h / 2.0 + (rng.rnd() - 0.5) * h * 0.4 * variety,
            );
            if frame.animating {
                start += t * 0.3;
            }
            if let Some(p) = pointer {
                center = pull_toward(center, p, w.max(h), 0.3);
            }
            surface::sweep_gradient(&stops, 1.0, center, start.to_degrees())
        }
    };

    surface.fill_rect(0.0, 0.0, w, h, &source);
    Ok(())
}

fn linear_endpoints<R: RandomSource>(
    w: f64,
    h: f64,
    variety: f64,
    rng: &mut R,
) -> ((f64, f64), (f64, f64)) {
    let (x0, y0) = (rng.uniform(0.0, w), rng.uniform(0.0, h));
    let (mut x1, mut y1) = (rng.uniform(0.0, w), rng.uniform(0.0, h));
    let separation = 0.1 + (1.0 - variety) * 0.4;
    if (x1 - x0).abs() < w * separation {
        let sign = if rng.odds(0.5) { -1.0 } else { 1.0 };
        x1 = (x0 + sign * w * (separation + rng.rnd() * 0.2)).clamp(0.0, w);
    }
    if (y1 - y0).abs() < h * separation {
        let sign = if rng.odds(0.5) { -1.0 } else { 1.0 };
        y1 = (y0 + sign * h * (separation + rng.rnd() * 0.2)).clamp(0.0, h);
    }
    ((x0, y0), (x1, y1))
}
