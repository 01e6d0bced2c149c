//! The studio: palette generation, background and style dispatch for one picture.

use crate::config::Settings;
use crate::error::RenderResult;
use crate::layers::Frame;
use crate::palette::{Palette, PaletteGenerator};
use crate::params::Params;
use crate::rand::{Ambient, RandomSource};
use crate::styles::{self, ArtStyle};
use crate::surface::Surface;

/// Owns the state shared by still renders and animation frames: the palette cache and the
/// ambient seed switch.
#[derive(Debug, Default)]
pub struct Studio {
    palettes: PaletteGenerator,
    ambient: Ambient,
}

impl Studio {
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`Ambient::set_seed`].
    pub fn set_seed(&mut self, seed: Option<&str>) {
        self.ambient.set_seed(seed);
    }

    pub fn ambient(&self) -> &Ambient {
        &self.ambient
    }

    pub fn palettes(&self) -> &PaletteGenerator {
        &self.palettes
    }

    pub fn palettes_mut(&mut self) -> &mut PaletteGenerator {
        &mut self.palettes
    }

    pub fn palette<R: RandomSource>(
        &mut self,
        style: ArtStyle,
        settings: &Settings,
        rng: &mut R,
    ) -> Palette {
        self.palettes.generate_palette(
            style,
            settings.theme(),
            settings.base_hue,
            settings.saturation,
            settings.lightness,
            rng,
        )
    }

    /// Regenerates the palette and draws `style` over whatever `surface` already holds. Palette
    /// and layers share one draw from the ambient source.
    pub fn paint(
        &mut self,
        surface: &mut Surface,
        style: ArtStyle,
        settings: &Settings,
        frame: &Frame,
        params: &Params,
    ) -> RenderResult<()> {
        let mut rng = self.ambient.source();
        let palette = self.palette(style, settings, &mut rng);
        styles::draw_artwork(surface, style, &palette, frame, params, &mut rng)
    }

    /// Renders a still picture. A failing style is logged and leaves whatever it drew before
    /// failing; only an unusable canvas size is an error.
    #[tracing::instrument(skip(self, settings))]
    pub fn render(
        &mut self,
        style: ArtStyle,
        settings: &Settings,
        width: i32,
        height: i32,
    ) -> RenderResult<Surface> {
        let mut surface = Surface::new(width, height)?;
        surface.clear(settings.background());
        let params = settings.params_for(f64::from(width), f64::from(height));
        if let Err(err) = self.paint(&mut surface, style, settings, &Frame::still(), &params) {
            tracing::error!(%style, %err, "drawing artwork failed");
        }
        Ok(surface)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn settings() -> Settings {
        let mut settings = Settings {
            background_color: "#102030".to_string(),
            ..Settings::default()
        };
        settings.params.set("neonWavesOpacity", 1.0);
        settings
    }

    #[test]
    fn background_shows_through_untouched_pixels() {
        let mut studio = Studio::new();
        studio.set_seed(Some("bg"));
        let mut settings = settings();
        settings.params = Params::new();
        // No layers enabled: the Default composite draws nothing.
        let surface = studio.render(ArtStyle::Default, &settings, 16, 12).unwrap();
        let img = surface.to_rgba_image();
        assert!(img.pixels().all(|p| p.0 == [0x10, 0x20, 0x30, 255]));
    }

    #[test]
    fn seeded_studio_is_reproducible() {
        let mut studio = Studio::new();
        studio.set_seed(Some("abc"));
        let a = studio.render(ArtStyle::NeonWaves, &settings(), 64, 48).unwrap();
        let b = studio.render(ArtStyle::NeonWaves, &settings(), 64, 48).unwrap();
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn degenerate_size_is_an_error() {
        let mut studio = Studio::new();
        assert!(studio.render(ArtStyle::Default, &settings(), 0, 10).is_err());
    }
}
