//! The Default style: every enabled layer drawn once, in a fresh random order, each with its own
//! jittered copy of the parameters.

use crate::error::RenderResult;
use crate::layers::{Frame, LayerKind};
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::RandomSource;
use crate::surface::{self, Surface};

/// One planned layer invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDescriptor {
    pub kind: LayerKind,
    /// The shared parameters with this layer's jitter applied. `rotationAmount`, `scaleAmount`
    /// and `colorShiftAmount` hold the final per-layer values.
    pub params: Params,
    pub opacity: f64,
    pub sort_key: f64,
}

impl LayerDescriptor {
    pub fn rotation_degrees(&self) -> f64 {
        self.params.number_or("rotationAmount", 0.0)
    }

    pub fn scale(&self) -> f64 {
        self.params.number_or("scaleAmount", 1.0)
    }

    pub fn hue_shift(&self) -> f64 {
        self.params.number_or("colorShiftAmount", 0.0)
    }
}

/// Per-layer copy of `shared` with randomized line width, density, transform, color shift and
/// the free-form `factor`, `noiseScale` and `distortion` knobs.
fn jitter(kind: LayerKind, shared: &Params, rng: &mut dyn RandomSource) -> Params {
    let mut params = shared.clone();
    let prefix = kind.prefix();

    let line_width = shared.line_width() * rng.uniform(0.8, 1.2);
    let density = (shared.density(prefix) * rng.uniform(0.8, 1.2)).clamp(0.0, 100.0);
    let rotation = shared.number_or("rotationAmount", 0.0) + rng.uniform(-5.0, 5.0);
    let scale = shared.number_or("scaleAmount", 1.0) * rng.uniform(0.95, 1.05);
    let hue_shift = shared.number_or("colorShiftAmount", 0.0) + rng.uniform(-10.0, 10.0);

    params
        .set("lineWidth", line_width)
        .set(format!("{}Density", prefix), density)
        .set("rotationAmount", rotation)
        .set("scaleAmount", scale)
        .set("colorShiftAmount", hue_shift)
        .set("factor", rng.uniform(0.5, 1.5))
        .set("noiseScale", rng.uniform(0.5, 2.0))
        .set("distortion", rng.rnd());
    params
}

/// The layers this composite will draw, in draw order. Layers whose `<prefix>Opacity` is
/// absent or zero are left out.
pub fn plan(params: &Params, rng: &mut dyn RandomSource) -> Vec<LayerDescriptor> {
    let mut plan: Vec<LayerDescriptor> = LayerKind::ALL
        .iter()
        .filter_map(|&kind| {
            let opacity = params.opacity(kind.prefix());
            if opacity <= 0.0 {
                return None;
            }
            Some(LayerDescriptor {
                kind,
                params: jitter(kind, params, rng),
                opacity,
                sort_key: rng.rnd(),
            })
        })
        .collect();
    plan.sort_by(|a, b| a.sort_key.total_cmp(&b.sort_key));
    plan
}

/// Draws one composite pass. Each layer gets its rotation and scale about the canvas center, its
/// hue-shifted palette and the `blendMode` param, all undone before the next layer. The first
/// failing layer aborts the pass, leaving what was already drawn.
///
/// Returns the kinds in the order they were drawn.
#[tracing::instrument(skip_all)]
pub fn render_composite(
    surface: &mut Surface,
    palette: &Palette,
    frame: &Frame,
    params: &Params,
    rng: &mut dyn RandomSource,
) -> RenderResult<Vec<LayerKind>> {
    let plan = plan(params, rng);
    tracing::debug!(
        layers = ?plan.iter().map(|d| d.kind.name()).collect::<Vec<_>>(),
        "composite plan"
    );
    let (w, h) = params.canvas_size((surface.width(), surface.height()));
    let blend = params.text("blendMode").map(surface::blend_mode_or_normal);

    let mut drawn = Vec::with_capacity(plan.len());
    for layer in &plan {
        let shifted = palette.shifted(layer.hue_shift());
        surface.save();
        surface.translate(w / 2.0, h / 2.0);
        surface.rotate(layer.rotation_degrees().to_radians());
        surface.scale(layer.scale(), layer.scale());
        surface.translate(-w / 2.0, -h / 2.0);
        if let Some(blend) = blend {
            surface.set_blend(blend);
        }
        let result = layer
            .kind
            .render(surface, &shifted, frame, &layer.params, layer.opacity, rng);
        surface.restore();
        result?;
        drawn.push(layer.kind);
    }
    Ok(drawn)
}
