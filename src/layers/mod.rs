//! Layer renderers.
//!
//! Every layer shares one signature and one contract: it paints onto the shared surface using
//! only the logical canvas size from the parameter bag, derives its element counts from
//! `<prefix>Density`, uses its own LCG when the bag carries a `seed` (and the caller's source
//! otherwise), evolves with time on animation frames, and leans toward the pointer on
//! interactive renders. [`LayerKind::render`] enforces the rest: zero opacity draws nothing, and
//! all drawing state changes are undone afterwards, even when the layer fails.

use crate::error::{RenderError, RenderResult};
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::RandomSource;
use crate::surface::Surface;

pub mod dot_matrix;
pub mod flowing_lines;
pub mod fractal_lines;
pub mod geometric_grid;
pub mod glitch_mosaic;
pub mod gradient_overlay;
pub mod landscape;
pub mod light_rays;
pub mod neon_waves;
pub mod organic_noise;
pub mod organic_splatters;
pub mod particle_swarm;
pub mod pixel_sort;
pub mod symmetrical_patterns;
pub mod texture_overlay;
pub mod voronoi;

named_enum!(
    /// Every layer the studio can draw. The name doubles as the parameter-key prefix, so
    /// `NeonWaves` reads `neonWavesOpacity` and `neonWavesDensity`.
    LayerKind {
        Voronoi = "voronoi",
        OrganicSplatters = "organicSplatters",
        NeonWaves = "neonWaves",
        FractalLines = "fractalLines",
        GeometricGrid = "geometricGrid",
        ParticleSwarm = "particleSwarm",
        OrganicNoise = "organicNoise",
        GlitchMosaic = "glitchMosaic",
        PixelSort = "pixelSort",
        GradientOverlay = "gradientOverlay",
        DotMatrix = "dotMatrix",
        TextureOverlay = "textureOverlay",
        SymmetricalPatterns = "symmetricalPatterns",
        FlowingLines = "flowingLines",
        LightRays = "lightRays",
        Landscape = "landscape",
    }
);

/// Timing context for one render.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    pub animating: bool,
    /// Wall-clock milliseconds; only meaningful when `animating`.
    pub time_ms: f64,
    pub frame_count: u64,
}

impl Frame {
    pub fn still() -> Self {
        Self::default()
    }

    pub fn animated(time_ms: f64, frame_count: u64) -> Self {
        Frame {
            animating: true,
            time_ms,
            frame_count,
        }
    }

    /// Elapsed seconds when animating, zero otherwise.
    pub fn seconds(&self) -> f64 {
        if self.animating {
            self.time_ms / 1000.0
        } else {
            0.0
        }
    }

    /// Milliseconds when animating, zero otherwise.
    pub fn millis(&self) -> f64 {
        if self.animating {
            self.time_ms
        } else {
            0.0
        }
    }
}

pub type RenderFn = fn(
    &mut Surface,
    &Palette,
    &Frame,
    &Params,
    f64,
    &mut dyn RandomSource,
) -> RenderResult<()>;

impl LayerKind {
    pub fn prefix(self) -> &'static str {
        self.name()
    }

    pub fn renderer(self) -> RenderFn {
        match self {
            LayerKind::Voronoi => voronoi::render,
            LayerKind::OrganicSplatters => organic_splatters::render,
            LayerKind::NeonWaves => neon_waves::render,
            LayerKind::FractalLines => fractal_lines::render,
            LayerKind::GeometricGrid => geometric_grid::render,
            LayerKind::ParticleSwarm => particle_swarm::render,
            LayerKind::OrganicNoise => organic_noise::render,
            LayerKind::GlitchMosaic => glitch_mosaic::render,
            LayerKind::PixelSort => pixel_sort::render,
            LayerKind::GradientOverlay => gradient_overlay::render,
            LayerKind::DotMatrix => dot_matrix::render,
            LayerKind::TextureOverlay => texture_overlay::render,
            LayerKind::SymmetricalPatterns => symmetrical_patterns::render,
            LayerKind::FlowingLines => flowing_lines::render,
            LayerKind::LightRays => light_rays::render,
            LayerKind::Landscape => landscape::render,
        }
    }

    /// Draws this layer at `opacity`. A non-positive opacity is a no-op.
    pub fn render(
        self,
        surface: &mut Surface,
        palette: &Palette,
        frame: &Frame,
        params: &Params,
        opacity: f64,
        rng: &mut dyn RandomSource,
    ) -> RenderResult<()> {
        if opacity <= 0.0 || opacity.is_nan() {
            return Ok(());
        }
        let render = self.renderer();
        surface.save();
        let result = render(surface, palette, frame, params, opacity.min(1.0), rng);
        surface.restore();
        if let Err(err) = &result {
            tracing::debug!(layer = %self, %err, "layer failed");
        }
        result
    }
}

/// Logical canvas size for a layer, validated.
pub(crate) fn canvas(surface: &Surface, params: &Params) -> RenderResult<(f64, f64)> {
    let (w, h) = params.canvas_size((surface.width(), surface.height()));
    if !(w.is_finite() && h.is_finite()) || w < 1.0 || h < 1.0 {
        return Err(RenderError::canvas(format!(
            "canvas size must be at least 1x1, got {}x{}",
            w, h
        )));
    }
    Ok((w, h))
}

/// `<prefix>Density` for `kind`, rescaled to `[0, 1]`.
pub(crate) fn density(params: &Params, kind: LayerKind) -> f64 {
    params.density(kind.prefix()) / 100.0
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::rand::Lcg;

    pub const W: i32 = 96;
    pub const H: i32 = 72;

    pub fn palette() -> Palette {
        Palette::new(
            [
                "#e63946",
                "hsl(200, 80%, 55%)",
                "#2a9d8f",
                "rgba(244, 162, 97, 0.9)",
                "hsl(45, 90%, 60%)",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        )
    }

    pub fn params(kind: LayerKind, seed: u32) -> Params {
        Params::new()
            .with("canvasWidth", W)
            .with("canvasHeight", H)
            .with("seed", seed)
            .with(format!("{}Density", kind.prefix()), 60.0)
    }

    /// A gray backdrop so pixel-reading layers have something to transform.
    pub fn backdrop() -> Surface {
        let mut surface = Surface::new(W, H).unwrap();
        let mut rng = Lcg::with_seed(11);
        for y in (0..H).step_by(6) {
            for x in (0..W).step_by(6) {
                let v = (rng.rnd() * 255.0) as u8;
                surface.fill_rect(
                    f64::from(x),
                    f64::from(y),
                    6.0,
                    6.0,
                    &raqote::Source::Solid(crate::color::Rgba::rgb(v, 255 - v, v / 2).solid(1.0)),
                );
            }
        }
        surface
    }

    pub fn draw(kind: LayerKind, frame: Frame, params: &Params, opacity: f64) -> Surface {
        let mut surface = backdrop();
        let mut rng = Lcg::with_seed(3);
        kind.render(&mut surface, &palette(), &frame, params, opacity, &mut rng)
            .unwrap();
        surface
    }

    /// Common contract checks every layer's test module runs.
    pub fn check_contract(kind: LayerKind) {
        let params = params(kind, 1234);
        let untouched = backdrop();

        let gated = draw(kind, Frame::still(), &params, 0.0);
        assert_eq!(gated.data(), untouched.data(), "{} drew at zero opacity", kind);

        let a = draw(kind, Frame::still(), &params, 0.8);
        let b = draw(kind, Frame::still(), &params, 0.8);
        assert_eq!(a.data(), b.data(), "{} is not reproducible under a seed", kind);
        assert_ne!(a.data(), untouched.data(), "{} drew nothing", kind);

        let mut surface = backdrop();
        let mut rng = Lcg::with_seed(3);
        kind.render(&mut surface, &palette(), &Frame::still(), &params, 0.8, &mut rng)
            .unwrap();
        assert_eq!(surface.depth(), 0, "{} leaked drawing state", kind);
        assert_eq!(surface.alpha(), 1.0, "{} leaked global alpha", kind);
    }

    /// Two animation frames far enough apart must differ.
    pub fn check_animates(kind: LayerKind) {
        let params = params(kind, 99);
        let a = draw(kind, Frame::animated(1_000.0, 1), &params, 1.0);
        let b = draw(kind, Frame::animated(4_700.0, 2), &params, 1.0);
        assert_ne!(a.data(), b.data(), "{} froze during animation", kind);
    }
}
