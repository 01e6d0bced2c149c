//! Midpoint-displacement lightning: each segment splits at a perpendicularly displaced midpoint
//! until the depth budget runs out, with occasional side branches in fresh palette colors.

use crate::color::Rgba;
use crate::error::RenderResult;
use crate::layers::{self, Frame, LayerKind};
use crate::math::{dist, pull_toward};
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::{LayerRng, RandomSource};
use crate::surface::{self, Surface};

type Pt = (f64, f64);

struct Bolt<'a> {
    palette: &'a Palette,
    max_depth: u32,
    /// Scale on the perpendicular midpoint displacement.
    factor: f64,
}

struct Segment {
    from: Pt,
    to: Pt,
    start: Rgba,
    end: Rgba,
    thickness: f64,
    main: bool,
    branch_odds: f64,
}

impl Bolt<'_> {
    fn draw<R: RandomSource>(&self, surface: &mut Surface, seg: Segment, depth: u32, rng: &mut R) {
        if depth == 0 {
            self.stroke(surface, &seg);
            return;
        }

        let (dx, dy) = (seg.to.0 - seg.from.0, seg.to.1 - seg.from.1);
        let mid = ((seg.from.0 + seg.to.0) / 2.0, (seg.from.1 + seg.to.1) / 2.0);
        let displacement = 0.3 * self.factor * (1.0 - f64::from(depth) / f64::from(self.max_depth));
        let split = (
            mid.0 + dy * displacement * (rng.rnd() - 0.5),
            mid.1 - dx * displacement * (rng.rnd() - 0.5),
        );

        // Every split takes on a little of a fresh palette color.
        let fresh = self.palette.pick_rgba(rng);
        let mid_color = seg.start.mix(&seg.end, 0.5).mix(&fresh, 0.35);
        let thickness = seg.thickness * 0.85;

        self.draw(
            surface,
            Segment {
                from: seg.from,
                to: split,
                start: seg.start,
                end: mid_color,
                thickness,
                ..seg
            },
            depth - 1,
            rng,
        );
        self.draw(
            surface,
            Segment {
                from: split,
                to: seg.to,
                start: mid_color,
                end: seg.end,
                thickness,
                ..seg
            },
            depth - 1,
            rng,
        );

        if depth > 1 && rng.odds(seg.branch_odds * f64::from(depth) / f64::from(self.max_depth)) {
            let tip = (
                split.0 + (dx + dy) * 0.3 * (rng.rnd() - 0.5),
                split.1 + (dy - dx) * 0.3 * (rng.rnd() - 0.5),
            );
            let branch_color = self.palette.pick_rgba(rng);
            self.draw(
                surface,
                Segment {
                    from: split,
                    to: tip,
                    start: mid_color,
                    end: branch_color,
                    thickness: thickness * 0.7,
                    main: false,
                    branch_odds: seg.branch_odds * 0.7,
                },
                depth - 1,
                rng,
            );
        }
    }

    fn stroke(&self, surface: &mut Surface, seg: &Segment) {
        let path = surface::line(seg.from, seg.to);
        let glow_intensity = (dist(seg.from, seg.to) / 200.0).min(1.0);
        let (passes, spread) = if seg.main { (3, 3.0) } else { (2, 2.0) };
        let glow = seg.thickness * spread;
        for pass in 0..passes {
            let alpha = f64::from(passes - pass) / f64::from(passes) * 0.5 * glow_intensity;
            let width = seg.thickness + f64::from(pass) * glow / f64::from(passes);
            surface.stroke_color(&path, seg.start, alpha, width);
        }
        surface.stroke_color(&path, seg.start, 1.0, seg.thickness * 0.6);
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
    let (w, h) = layers::canvas(surface, params)?;
    let d = layers::density(params, LayerKind::FractalLines);
    let mut rng = LayerRng::new(params.seed(), rng);
    surface.set_alpha(opacity);

    let lines = 1 + (d * 8.0).floor() as usize;
    let max_depth = 3 + (d * 2.0).floor() as u32;
    let thickness = params.number("lineWidth").filter(|w| *w > 0.0).unwrap_or(2.0);
    let bolt = Bolt {
        palette,
        max_depth,
        factor: params.number_or("factor", 1.0),
    };

    let t = frame.millis();
    let wobble = (t * 0.001).sin() * 10.0;
    let rotation = (t * 0.0005).sin() * 0.05;
    let pointer = params.pointer();

    let mut anchors: Vec<Pt> = vec![
        (0.0, h / 3.0),
        (0.0, h * 2.0 / 3.0),
        (w, h / 3.0),
        (w, h * 2.0 / 3.0),
        (w / 3.0, 0.0),
        (w * 2.0 / 3.0, 0.0),
        (w / 3.0, h),
        (w * 2.0 / 3.0, h),
    ];
    while anchors.len() < lines {
        anchors.push((rng.uniform(0.0, w), rng.uniform(0.0, h)));
    }

    for (i, &anchor) in anchors.iter().take(lines).enumerate() {
        let from = if frame.animating {
            (
                anchor.0 + wobble * (i as f64).cos(),
                anchor.1 + wobble * (i as f64).sin(),
            )
        } else {
            anchor
        };

        let pull = rng.uniform(0.3, 0.7);
        let loose = 1.0 - pull;
        let mut to = (
            w / 2.0 * pull + loose * rng.rnd() * w,
            h / 2.0 * pull + loose * rng.rnd() * h,
        );
        if let Some(p) = pointer {
            to = pull_toward(to, p, 300.0, 0.2);
        }

        let start_index = palette.pick_index(&mut rng);
        let end_index = start_index + 1 + rng.range(0, palette.len() as i64 - 1) as usize;
        let segment = Segment {
            from,
            to,
            start: palette.rgba(start_index),
            end: palette.rgba(end_index),
            thickness,
            main: true,
            branch_odds: 0.7,
        };

        surface.save();
        if frame.animating {
            surface.translate(w / 2.0, h / 2.0);
            surface.rotate(rotation);
            surface.translate(-w / 2.0, -h / 2.0);
        }
        bolt.draw(surface, segment, max_depth, &mut rng);
        surface.restore();
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layers::testing;
    use crate::rand::Lcg;

    #[test]
    fn layer_contract() {
        testing::check_contract(LayerKind::FractalLines);
        testing::check_animates(LayerKind::FractalLines);
    }

    #[test]
    fn depth_zero_is_a_single_stroke() {
        let palette = testing::palette();
        let bolt = Bolt {
            palette: &palette,
            max_depth: 3,
            factor: 1.0,
        };
        let mut surface = Surface::new(20, 20).unwrap();
        let mut rng = Lcg::with_seed(1);
        let before = rng.state();
        bolt.draw(
            &mut surface,
            Segment {
                from: (0.0, 10.0),
                to: (20.0, 10.0),
                start: palette.rgba(0),
                end: palette.rgba(1),
                thickness: 2.0,
                main: true,
                branch_odds: 0.7,
            },
            0,
            &mut rng,
        );
        assert_eq!(rng.state(), before, "leaf segments draw no randomness");
        let px = surface.get_image_data(10, 10, 1, 1);
        assert!(px.get_pixel(0, 0).0[3] > 0);
    }
}
