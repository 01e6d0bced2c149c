use crate::error::RenderResult;
use crate::layers::{self, Frame, LayerKind};
use crate::math::pull_toward;
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::{LayerRng, RandomSource};
use crate::surface::{self, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Square,
    Circle,
    Triangle,
    Cross,
}

impl Shape {
    const ALL: [Shape; 4] = [Shape::Square, Shape::Circle, Shape::Triangle, Shape::Cross];

    /// Chance that a cell assigned this shape is drawn at all.
    fn draw_odds(self) -> f64 {
        match self {
            Shape::Square => 0.7,
            Shape::Circle => 0.6,
            Shape::Triangle => 0.5,
            Shape::Cross => 0.4,
        }
    }
}

/// Side of one grid cell in pixels for a 0–100 density.
fn cell_size(density: f64) -> f64 {
    (((100.0 - density) / 5.0).floor() + 5.0).max(5.0)
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
    let size = cell_size(params.density(LayerKind::GeometricGrid.prefix()));
    let mut rng = LayerRng::new(params.seed(), rng);
    surface.set_alpha(opacity);

    let cols = (w / size).ceil() as usize;
    let rows = (h / size).ceil() as usize;
    let t = frame.millis() * 0.001;
    let pointer = params.pointer();
    let half = size / 2.0;

    for i in 0..cols {
        for j in 0..rows {
            let index = palette.pick_index(&mut rng);
            let (fill, edge) = (palette.rgba(index), palette.rgba(index + 1));
            let shape = *rng.choice(&Shape::ALL);
            if !rng.odds(shape.draw_odds()) {
                continue;
            }

            let mut center = (i as f64 * size + half, j as f64 * size + half);
            if let Some(p) = pointer {
                center = pull_toward(center, p, 300.0, 0.1);
            }
            surface.save();
            surface.translate(center.0, center.1);
            if frame.animating {
                surface.translate(
                    (t * 2.0 + i as f64 * 0.5).sin() * 2.0,
                    (t * 2.0 + j as f64 * 0.5).cos() * 2.0,
                );
                surface.rotate((t + (i + j) as f64 * 0.3).sin() * 0.3);
            }

            match shape {
                Shape::Square => {
                    let path = surface::rect(-half, -half, size, size);
                    surface.fill_color(&path, fill, 1.0);
                    surface.stroke_color(&path, edge, 1.0, 1.0);
                }
                Shape::Circle => {
                    let path = surface::circle(0.0, 0.0, half);
                    surface.fill_color(&path, fill, 1.0);
                    surface.stroke_color(&path, edge, 1.0, 1.0);
                }
                Shape::Triangle => {
                    let path = surface::polygon(&[(0.0, -half), (half, half), (-half, half)]);
                    surface.fill_color(&path, fill, 1.0);
                    surface.stroke_color(&path, edge, 1.0, 1.0);
                }
                Shape::Cross => {
                    let width = size / 10.0;
                    surface.stroke_color(&surface::line((-half, 0.0), (half, 0.0)), edge, 1.0, width);
                    surface.stroke_color(&surface::line((0.0, -half), (0.0, half)), edge, 1.0, width);
                }
            }
            surface.restore();
        }
    }
    Ok(())
}
