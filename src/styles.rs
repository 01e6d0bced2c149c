use crate::composite;
use crate::error::RenderResult;
use crate::layers::{Frame, LayerKind};
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::RandomSource;
use crate::surface::Surface;

named_enum!(
    /// The closed set of art styles a render can be requested in.
    ArtStyle {
        Default = "Default",
        GeometricGrid = "Geometric Grid",
        OrganicNoise = "Organic Noise",
        FractalLines = "Fractal Lines",
        ParticleSwarm = "Particle Swarm",
        OrganicSplatters = "Organic Splatters",
        GlitchMosaic = "Glitch Mosaic",
        NeonWaves = "Neon Waves",
        PixelSort = "Pixel Sort",
        VoronoiCells = "Voronoi Cells",
        DotMatrix = "Dot Matrix",
        FlowingLines = "Flowing Lines",
        SymmetricalPatterns = "Symmetrical Patterns",
    }
);

/// What draws a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleRenderer {
    /// The randomized multi-layer composite.
    Composite,
    /// One dedicated layer at full opacity.
    Layer(LayerKind),
}

impl ArtStyle {
    /// Resolves a style name, treating anything unrecognized as [`ArtStyle::Default`].
    pub fn from_name_or_default(name: &str) -> Self {
        ArtStyle::from_name(name).unwrap_or_else(|| {
            tracing::warn!(name, "unknown art style; using Default");
            ArtStyle::Default
        })
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ArtStyle::Default => "Default Masterpiece",
            other => other.name(),
        }
    }

    pub fn renderer(self) -> StyleRenderer {
        match self {
            ArtStyle::Default => StyleRenderer::Composite,
            ArtStyle::GeometricGrid => StyleRenderer::Layer(LayerKind::GeometricGrid),
            ArtStyle::OrganicNoise => StyleRenderer::Layer(LayerKind::OrganicNoise),
            ArtStyle::FractalLines => StyleRenderer::Layer(LayerKind::FractalLines),
            ArtStyle::ParticleSwarm => StyleRenderer::Layer(LayerKind::ParticleSwarm),
            ArtStyle::OrganicSplatters => StyleRenderer::Layer(LayerKind::OrganicSplatters),
            ArtStyle::GlitchMosaic => StyleRenderer::Layer(LayerKind::GlitchMosaic),
            ArtStyle::NeonWaves => StyleRenderer::Layer(LayerKind::NeonWaves),
            ArtStyle::PixelSort => StyleRenderer::Layer(LayerKind::PixelSort),
            ArtStyle::VoronoiCells => StyleRenderer::Layer(LayerKind::Voronoi),
            ArtStyle::DotMatrix => StyleRenderer::Layer(LayerKind::DotMatrix),
            ArtStyle::FlowingLines => StyleRenderer::Layer(LayerKind::FlowingLines),
            ArtStyle::SymmetricalPatterns => StyleRenderer::Layer(LayerKind::SymmetricalPatterns),
        }
    }
}

/// Draws `style` onto `surface`. Errors from any layer propagate; the caller decides whether a
/// partially drawn surface is acceptable.
#[tracing::instrument(skip(surface, palette, params, rng))]
pub fn draw_artwork(
    surface: &mut Surface,
    style: ArtStyle,
    palette: &Palette,
    frame: &Frame,
    params: &Params,
    rng: &mut dyn RandomSource,
) -> RenderResult<()> {
    match style.renderer() {
        StyleRenderer::Composite => {
            composite::render_composite(surface, palette, frame, params, rng).map(|_| ())
        }
        StyleRenderer::Layer(kind) => kind.render(surface, palette, frame, params, 1.0, rng),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names_round_trip() {
        for &style in ArtStyle::ALL {
            assert_eq!(ArtStyle::from_name(style.name()), Some(style));
            assert_eq!(style.name().parse::<ArtStyle>(), Ok(style));
        }
        assert_eq!(ArtStyle::from_name("neon-waves"), Some(ArtStyle::NeonWaves));
        assert_eq!(ArtStyle::from_name("VORONOI CELLS"), Some(ArtStyle::VoronoiCells));
        assert!("Cubism".parse::<ArtStyle>().is_err());
    }

    #[test]
    fn unknown_names_fall_back_to_default() {
        assert_eq!(ArtStyle::from_name_or_default("Cubism"), ArtStyle::Default);
        assert_eq!(
            ArtStyle::from_name_or_default("Pixel Sort"),
            ArtStyle::PixelSort
        );
    }

    #[test]
    fn display_names() {
        assert_eq!(ArtStyle::Default.display_name(), "Default Masterpiece");
        assert_eq!(ArtStyle::NeonWaves.display_name(), "Neon Waves");
    }

    #[test]
    fn only_default_composites() {
        for &style in ArtStyle::ALL {
            let composite = style.renderer() == StyleRenderer::Composite;
            assert_eq!(composite, style == ArtStyle::Default, "{}", style);
        }
    }
}
