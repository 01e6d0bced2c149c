//! Long curved strokes drifting across the canvas, as smooth Bezier chains, sine-modulated
//! chains, or a jittery random walk.

use raqote::{Path, PathBuilder, Source};

use crate::error::RenderResult;
use crate::layers::{self, Frame, LayerKind};
use crate::math::{pi, pull_toward};
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::{LayerRng, RandomSource};
use crate::surface::{self, Surface};

named_enum!(
    FlowStyle {
        Smooth = "smooth",
        Wavy = "wavy",
        Chaotic = "chaotic",
    }
);

const POINTER_RADIUS: f64 = 200.0;

/// A start point plus three control points per segment, each a random step from the last and
/// clamped to the canvas.
fn control_points<R: RandomSource>(w: f64, h: f64, segments: usize, rng: &mut R) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(1 + segments * 3);
    let mut last = (rng.rnd() * w, rng.rnd() * h);
    points.push(last);
    for _ in 0..segments * 3 {
        let step = rng.uniform(50.0, 150.0);
        let angle = rng.rnd() * pi(2.0);
        last = (
            (last.0 + angle.cos() * step).clamp(0.0, w),
            (last.1 + angle.sin() * step).clamp(0.0, h),
        );
        points.push(last);
    }
    points
}

/// Circular drift with a per-point phase.
fn drift<R: RandomSource>(points: &mut [(f64, f64)], time: f64, speed: f64, rng: &mut R) {
    for (i, p) in points.iter_mut().enumerate() {
        let phase = i as f64 * 0.1 + time * speed;
        let radius = rng.uniform(5.0, 15.0);
        p.0 += phase.sin() * radius;
        p.1 += phase.cos() * radius;
    }
}

/// Cubic Bezier chain through `points`; a trailing remainder becomes a straight segment.
fn bezier_chain(points: &[(f64, f64)]) -> Path {
    let mut pb = PathBuilder::new();
    let Some(&(x, y)) = points.first() else {
        return pb.finish();
    };
    pb.move_to(x as f32, y as f32);
    let mut i = 1;
    while i < points.len() {
        if i + 2 < points.len() {
            let (c1, c2, end) = (points[i], points[i + 1], points[i + 2]);
            pb.cubic_to(
                c1.0 as f32,
                c1.1 as f32,
                c2.0 as f32,
                c2.1 as f32,
                end.0 as f32,
                end.1 as f32,
            );
        } else {
            pb.line_to(points[i].0 as f32, points[i].1 as f32);
        }
        i += 3;
    }
    pb.finish()
}

fn chaotic_walk<R: RandomSource>(
    w: f64,
    h: f64,
    segments: usize,
    frame: &Frame,
    speed: f64,
    rng: &mut R,
) -> Vec<(f64, f64)> {
    let mut at = (rng.rnd() * w, rng.rnd() * h);
    let mut heading = rng.rnd() * pi(2.0);
    let step = rng.uniform(10.0, 30.0);
    let mut points = vec![at];
    for i in 0..segments * 3 {
        heading += (rng.rnd() - 0.5) * 0.5;
        if frame.animating {
            heading += (frame.seconds() * speed + i as f64 * 0.1).sin() * 0.2;
        }
        at = (
            (at.0 + heading.cos() * step).clamp(0.0, w),
            (at.1 + heading.sin() * step).clamp(0.0, h),
        );
        points.push(at);
    }
    points
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
    let d = layers::density(params, LayerKind::FlowingLines);
    let mut rng = LayerRng::new(params.seed(), rng);
    surface.set_alpha(opacity);

    let lines = 5 + (d * 20.0).floor() as usize;
    let segments = 3 + (d * 7.0).floor() as usize;
    let style = params
        .text("flowStyle")
        .and_then(FlowStyle::from_name)
        .unwrap_or_else(|| {
            if rng.odds(0.33) {
                FlowStyle::Smooth
            } else if rng.odds(0.66) {
                FlowStyle::Wavy
            } else {
                FlowStyle::Chaotic
            }
        });
    let time = frame.seconds();
    let speed = if frame.animating {
        rng.uniform(0.2, 0.5)
    } else {
        0.0
    };
    let line_width = params.line_width();
    let pointer = params.pointer();

    for _ in 0..lines {
        let color = palette.pick_rgba(&mut rng);
        let width = line_width * rng.uniform(0.5, 1.5);

        let mut points = match style {
            FlowStyle::Chaotic => chaotic_walk(w, h, segments, frame, speed, &mut rng),
            FlowStyle::Smooth | FlowStyle::Wavy => {
                let mut points = control_points(w, h, segments, &mut rng);
                if frame.animating {
                    drift(&mut points, time, speed, &mut rng);
                }
                if style == FlowStyle::Wavy {
                    let frequency = rng.uniform(0.1, 0.3);
                    let amplitude = rng.uniform(10.0, 30.0);
                    for (i, p) in points.iter_mut().enumerate() {
                        let phase = i as f64 * frequency + time * speed;
                        p.0 += phase.sin() * amplitude;
                        p.1 += phase.cos() * amplitude;
                    }
                }
                points
            }
        };
        if let Some(p) = pointer {
            for pt in points.iter_mut() {
                *pt = pull_toward(*pt, p, POINTER_RADIUS, 0.3);
            }
        }

        let path = match style {
            FlowStyle::Chaotic => surface::polyline(&points),
            FlowStyle::Smooth | FlowStyle::Wavy => bezier_chain(&points),
        };
        surface.stroke(
            &path,
            &Source::Solid(color.solid(1.0)),
            &surface::round_stroke(width),
        );
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use raqote::PathOp;

    use super::*;
    use crate::layers::testing;
    use crate::rand::Lcg;

    #[test]
    fn layer_contract() {
        testing::check_contract(LayerKind::FlowingLines);
        testing::check_animates(LayerKind::FlowingLines);
    }

    #[test]
    fn control_points_stay_on_canvas() {
        let mut rng = Lcg::with_seed(5);
        let points = control_points(96.0, 72.0, 4, &mut rng);
        assert_eq!(points.len(), 13);
        assert!(points
            .iter()
            .all(|&(x, y)| (0.0..=96.0).contains(&x) && (0.0..=72.0).contains(&y)));
    }

    #[test]
    fn chain_uses_cubics_and_a_straight_tail() {
        let points: Vec<(f64, f64)> = (0..6).map(|i| (f64::from(i) * 10.0, 0.0)).collect();
        let ops = bezier_chain(&points).ops;
        let cubics = ops.iter().filter(|op| matches!(op, PathOp::CubicTo(..))).count();
        let lines = ops.iter().filter(|op| matches!(op, PathOp::LineTo(..))).count();
        assert_eq!((cubics, lines), (1, 1));
    }

    #[test]
    fn every_style_draws() {
        for &style in FlowStyle::ALL {
            let params = testing::params(LayerKind::FlowingLines, 17)
                .with("flowStyle", style.name())
                .with("lineWidth", 3.0);
            let drawn = testing::draw(LayerKind::FlowingLines, Frame::still(), &params, 1.0);
            assert_ne!(drawn.data(), testing::backdrop().data(), "{}", style);
        }
    }
}
