//! Symmetry patterns around the canvas center: radial spokes, mirrored reflections of a base
//! drawing, or a kaleidoscope of rotated wedge copies.

use crate::color::Rgba;
use crate::error::RenderResult;
use crate::layers::{self, Frame, LayerKind};
use crate::math::{pi, pull_toward};
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::{LayerRng, RandomSource};
use crate::surface::{self, Surface};

named_enum!(
    SymmetryKind {
        Radial = "radial",
        Reflective = "reflective",
        Kaleidoscope = "kaleidoscope",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Motif {
    Circle,
    Triangle,
    Line,
}

/// Animation state shared by every pattern. All zero on still frames.
#[derive(Debug, Clone, Copy)]
struct Motion {
    rotation: f64,
    pulse: f64,
    time: f64,
}

/// Three to five colors drawn from the palette.
fn sub_palette<R: RandomSource>(palette: &Palette, rng: &mut R) -> Vec<Rgba> {
    let count = palette.len().min(3 + rng.range(0, 3) as usize);
    (0..count.max(1)).map(|_| palette.pick_rgba(rng)).collect()
}

fn fill_or_stroke<R: RandomSource>(surface: &mut Surface, path: &raqote::Path, c: Rgba, rng: &mut R) {
    if rng.odds(0.7) {
        surface.fill_color(path, c, 1.0);
    } else {
        let width = rng.uniform(2.0, 5.0);
        surface.stroke_color(path, c, 1.0, width);
    }
}

/// A small shape centered on `(x, y)` for the reflective and kaleidoscope base drawings.
fn stamp<R: RandomSource>(surface: &mut Surface, (x, y): (f64, f64), size: f64, tilt: f64, c: Rgba, rng: &mut R) {
    let half = size / 2.0;
    if rng.odds(0.33) {
        surface.fill_color(&surface::circle(x, y, half), c, 1.0);
    } else if rng.odds(0.66) {
        surface.save();
        surface.translate(x, y);
        surface.rotate(tilt);
        surface.fill_color(&surface::rect(-half, -half, size, size), c, 1.0);
        surface.restore();
    } else {
        let tri = [(x, y - half), (x + half, y + half), (x - half, y + half)];
        surface.fill_color(&surface::polygon(&tri), c, 1.0);
    }
}

fn radial<R: RandomSource>(
    surface: &mut Surface,
    center: (f64, f64),
    max_radius: f64,
    complexity: usize,
    colors: &[Rgba],
    motion: Motion,
    rng: &mut R,
) {
    let segments = ((complexity as f64 * 1.5).floor() as usize).max(4);
    let motif = if rng.odds(0.33) {
        Motif::Circle
    } else if rng.odds(0.66) {
        Motif::Triangle
    } else {
        Motif::Line
    };
    let (cx, cy) = center;

    for i in 0..segments {
        let angle = i as f64 / segments as f64 * pi(2.0) + motion.rotation;
        let c = colors[i % colors.len()];
        let radius = max_radius * rng.uniform(0.7, 1.0) * motion.pulse;
        match motif {
            Motif::Circle => {
                let reach = radius * rng.uniform(0.3, 1.0);
                let r = radius * rng.uniform(0.05, 0.2);
                let path = surface::circle(cx + angle.cos() * reach, cy + angle.sin() * reach, r);
                fill_or_stroke(surface, &path, c, rng);
            }
            Motif::Triangle => {
                let reach = radius * rng.uniform(0.3, 1.0);
                let (x, y) = (cx + angle.cos() * reach, cy + angle.sin() * reach);
                let size = radius * rng.uniform(0.1, 0.3);
                let tri = [
                    (x, y - size),
                    (x + size * 0.866, y + size * 0.5),
                    (x - size * 0.866, y + size * 0.5),
                ];
                fill_or_stroke(surface, &surface::polygon(&tri), c, rng);
            }
            Motif::Line => {
                let inner = radius * rng.uniform(0.1, 0.4);
                let outer = radius * rng.uniform(0.7, 1.0);
                let path = surface::line(
                    (cx + angle.cos() * inner, cy + angle.sin() * inner),
                    (cx + angle.cos() * outer, cy + angle.sin() * outer),
                );
                let width = rng.uniform(2.0, 6.0);
                surface.stroke_color(&path, c, 1.0, width);
            }
        }
    }

    // Center decoration: concentric rings or a star.
    let radius = max_radius * 0.3;
    if rng.odds(0.5) {
        let rings = 3 + rng.range(0, 3) as usize;
        for i in 0..rings {
            let r = radius * (1.0 - i as f64 / rings as f64);
            let width = rng.uniform(1.0, 3.0);
            surface.stroke_color(&surface::circle(cx, cy, r), colors[i % colors.len()], 1.0, width);
        }
    } else {
        let points = 5 + rng.range(0, 4) as usize;
        let star: Vec<(f64, f64)> = (0..points * 2)
            .map(|i| {
                let r = if i % 2 == 0 { radius } else { radius * 0.4 };
                let a = i as f64 / (points * 2) as f64 * pi(2.0) + motion.time * 0.5;
                (cx + a.cos() * r, cy + a.sin() * r)
            })
            .collect();
        surface.fill_color(&surface::polygon(&star), colors[0], 1.0);
    }
}

fn reflective<R: RandomSource>(
    surface: &mut Surface,
    (w, h): (f64, f64),
    center: (f64, f64),
    complexity: usize,
    colors: &[Rgba],
    motion: Motion,
    rng: &mut R,
) -> RenderResult<()> {
    let axes = 2 + rng.range(0, 3) as usize;
    let mut base = Surface::new(w.ceil() as i32, h.ceil() as i32)?;
    for _ in 0..(5 + (complexity as f64 * 1.5).floor() as usize) {
        let at = (rng.uniform(0.0, w / 2.0), rng.uniform(0.0, h / 2.0));
        let size = rng.uniform(10.0, 40.0);
        let c = colors[rng.range(0, colors.len() as i64) as usize];
        stamp(&mut base, at, size, 0.0, c, rng);
    }

    for i in 0..axes {
        let angle = i as f64 / axes as f64 * pi(1.0) + motion.rotation;
        surface.save();
        surface.translate(center.0, center.1);
        surface.rotate(angle);
        surface.draw_surface(&base, -w / 2.0, -h / 2.0);
        surface.scale(-1.0, 1.0);
        surface.draw_surface(&base, -w / 2.0, -h / 2.0);
        surface.restore();
    }
    Ok(())
}

fn kaleidoscope<R: RandomSource>(
    surface: &mut Surface,
    center: (f64, f64),
    max_radius: f64,
    complexity: usize,
    colors: &[Rgba],
    motion: Motion,
    rng: &mut R,
) -> RenderResult<()> {
    let segments = 6 + rng.range(0, 6) as usize * 2;
    let side = max_radius.ceil().max(1.0) as i32;
    let mut wedge = Surface::new(side, side)?;
    for _ in 0..(5 + (complexity as f64 * 1.5).floor() as usize) {
        let r = rng.rnd() * max_radius;
        let theta = rng.rnd() * pi(1.0) / 6.0;
        let size = rng.uniform(5.0, 25.0);
        let c = colors[rng.range(0, colors.len() as i64) as usize];
        stamp(&mut wedge, (r * theta.cos(), r * theta.sin()), size, theta, c, rng);
    }

    for i in 0..segments {
        let angle = i as f64 / segments as f64 * pi(2.0) + motion.rotation;
        surface.save();
        surface.translate(center.0, center.1);
        surface.rotate(angle);
        if motion.pulse != 1.0 {
            surface.scale(motion.pulse, motion.pulse);
        }
        surface.draw_surface(&wedge, 0.0, 0.0);
        surface.restore();
    }
    Ok(())
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
    let d = layers::density(params, LayerKind::SymmetricalPatterns);
    let mut rng = LayerRng::new(params.seed(), rng);
    surface.set_alpha(opacity);

    let kind = params
        .text("symmetryType")
        .and_then(SymmetryKind::from_name)
        .unwrap_or_else(|| {
            if rng.odds(0.33) {
                SymmetryKind::Radial
            } else if rng.odds(0.66) {
                SymmetryKind::Reflective
            } else {
                SymmetryKind::Kaleidoscope
            }
        });
    let complexity = 3 + (d * 12.0).floor() as usize;

    let time = frame.seconds();
    let speed = rng.uniform(0.2, 0.5);
    let pulse_amount = rng.uniform(0.1, 0.3);
    let motion = Motion {
        rotation: time * speed,
        pulse: if frame.animating {
            (time * 2.0).sin() * pulse_amount + 1.0
        } else {
            1.0
        },
        time,
    };

    let mut center = (w / 2.0, h / 2.0);
    if let Some(p) = params.pointer() {
        center = pull_toward(center, p, w.max(h), 0.2);
    }
    let colors = sub_palette(palette, &mut rng);

    match kind {
        SymmetryKind::Radial => {
            let max_radius = (w / 2.0).min(h / 2.0) * 0.85;
            radial(surface, center, max_radius, complexity, &colors, motion, &mut rng);
        }
        SymmetryKind::Reflective => {
            reflective(surface, (w, h), center, complexity, &colors, motion, &mut rng)?;
        }
        SymmetryKind::Kaleidoscope => {
            let max_radius = (w / 2.0).min(h / 2.0) * 0.9;
            kaleidoscope(surface, center, max_radius, complexity, &colors, motion, &mut rng)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layers::testing;

    #[test]
    fn layer_contract() {
        testing::check_contract(LayerKind::SymmetricalPatterns);
        testing::check_animates(LayerKind::SymmetricalPatterns);
    }

    #[test]
    fn every_kind_draws_and_animates() {
        for &kind in SymmetryKind::ALL {
            let params =
                testing::params(LayerKind::SymmetricalPatterns, 31).with("symmetryType", kind.name());
            let still = testing::draw(LayerKind::SymmetricalPatterns, Frame::still(), &params, 1.0);
            assert_ne!(still.data(), testing::backdrop().data(), "{}", kind);
            let a = testing::draw(
                LayerKind::SymmetricalPatterns,
                Frame::animated(1_000.0, 1),
                &params,
                1.0,
            );
            let b = testing::draw(
                LayerKind::SymmetricalPatterns,
                Frame::animated(2_500.0, 2),
                &params,
                1.0,
            );
            assert_ne!(a.data(), b.data(), "{}", kind);
        }
    }

    #[test]
    fn sub_palette_has_three_to_five_colors() {
        let mut rng = crate::rand::Lcg::with_seed(8);
        for _ in 0..20 {
            let n = sub_palette(&testing::palette(), &mut rng).len();
            assert!((3..=5).contains(&n));
        }
    }
}
