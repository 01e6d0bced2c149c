use genstudio::palette::{ColorTheme, PaletteGenerator, PaletteKey};
use genstudio::rand::{Ambient, Lcg};
use genstudio::styles::ArtStyle;

#[test]
fn neon_waves_keeps_its_dark_anchor_under_any_random_base() {
    let mut generator = PaletteGenerator::new();
    for seed in 0..20 {
        let mut rng = Lcg::with_seed(seed);
        let palette = generator.generate_palette(
            ArtStyle::NeonWaves,
            ColorTheme::Random,
            0.0,
            0.0,
            0.0,
            &mut rng,
        );
        assert_eq!(palette.len(), 5);
        assert_eq!(palette.get(4), "hsl(0, 0%, 10%)");
    }
    assert!(generator.cache().is_empty());
}

#[test]
fn themed_palettes_are_cached_and_reused() {
    let mut generator = PaletteGenerator::new();
    let mut rng = Lcg::with_seed(1);
    let first = generator.generate_palette(
        ArtStyle::Default,
        ColorTheme::Triadic,
        40.0,
        60.0,
        50.0,
        &mut rng,
    );
    let again = generator.generate_palette(
        ArtStyle::Default,
        ColorTheme::Triadic,
        40.0,
        60.0,
        50.0,
        &mut rng,
    );
    assert_eq!(first, again);

    let key = PaletteKey::new(ArtStyle::Default, ColorTheme::Triadic, 40.0, 60.0, 50.0)
        .expect("themed key");
    assert_eq!(generator.cache().entry(&key).map(|e| e.hits), Some(1));
    assert_eq!(generator.cache().stats().misses, 1);

    generator.clear_cache();
    assert!(!generator.cache().contains(&key));
}

#[test]
fn cache_is_bounded() {
    let mut generator = PaletteGenerator::with_cache_capacity(3);
    let mut rng = Lcg::with_seed(1);
    for hue in 0..10 {
        generator.generate_palette(
            ArtStyle::Default,
            ColorTheme::Analogous,
            f64::from(hue),
            50.0,
            50.0,
            &mut rng,
        );
    }
    assert_eq!(generator.cache().len(), 3);
    assert_eq!(generator.cache().stats().evictions, 7);
}

#[test]
fn every_style_and_theme_yields_at_least_two_colors() {
    let mut generator = PaletteGenerator::new();
    let mut ambient = Ambient::new();
    ambient.set_seed(Some("sweep"));
    for &style in ArtStyle::ALL {
        for &theme in ColorTheme::ALL {
            for (hue, saturation, lightness) in [(0.0, 0.0, 0.0), (180.0, 70.0, 50.0), (359.0, 100.0, 100.0)] {
                let mut rng = ambient.source();
                let palette =
                    generator.generate_palette(style, theme, hue, saturation, lightness, &mut rng);
                assert!(
                    palette.len() >= 2,
                    "{} / {} at ({}, {}, {}) gave {:?}",
                    style,
                    theme,
                    hue,
                    saturation,
                    lightness,
                    palette.colors()
                );
            }
        }
    }
}
