use genstudio::art::Studio;
use genstudio::config::Settings;
use genstudio::layers::{Frame, LayerKind};
use genstudio::palette::Palette;
use genstudio::params::Params;
use genstudio::rand::{Lcg, RandomSource};
use genstudio::styles::ArtStyle;
use genstudio::surface::Surface;

const WIDTH: i32 = 80;
const HEIGHT: i32 = 60;

fn settings(seed: &str) -> Settings {
    let mut settings = Settings {
        seed: Some(seed.to_string()),
        color_theme: "analogous".to_string(),
        ..Settings::default()
    };
    for kind in [LayerKind::NeonWaves, LayerKind::DotMatrix, LayerKind::Voronoi] {
        settings.params.set(format!("{}Opacity", kind.prefix()), 0.7);
    }
    settings
}

fn render(style: ArtStyle, settings: &Settings) -> anyhow::Result<Surface> {
    let mut studio = Studio::new();
    studio.set_seed(settings.seed.as_deref());
    Ok(studio.render(style, settings, WIDTH, HEIGHT)?)
}

#[test]
fn every_style_is_reproducible_under_a_seed() -> anyhow::Result<()> {
    let settings = settings("abc");
    for &style in ArtStyle::ALL {
        let a = render(style, &settings)?;
        let b = render(style, &settings)?;
        assert!(a.data() == b.data(), "{} differs between runs", style);
    }
    Ok(())
}

#[test]
fn every_style_marks_the_canvas() -> anyhow::Result<()> {
    let settings = settings("marks");
    let blank = {
        let mut s = Surface::new(WIDTH, HEIGHT)?;
        s.clear(settings.background());
        s
    };
    // Pixel sorting only reorders what is already there.
    for &style in ArtStyle::ALL.iter().filter(|&&s| s != ArtStyle::PixelSort) {
        let drawn = render(style, &settings)?;
        assert!(drawn.data() != blank.data(), "{} drew nothing", style);
    }
    Ok(())
}

#[test]
fn clearing_the_seed_restores_entropy() {
    let mut studio = Studio::new();
    studio.set_seed(Some("abc"));
    assert!(studio.ambient().is_seeded());
    studio.set_seed(None);
    assert!(!studio.ambient().is_seeded());
    studio.set_seed(Some(""));
    assert!(!studio.ambient().is_seeded());
}

#[test]
fn unseeded_renders_differ() -> anyhow::Result<()> {
    let mut settings = settings("abc");
    let mut studio = Studio::new();
    studio.set_seed(settings.seed.as_deref());
    let seeded = studio.render(ArtStyle::ParticleSwarm, &settings, WIDTH, HEIGHT)?;

    settings.seed = None;
    studio.set_seed(None);
    let a = studio.render(ArtStyle::ParticleSwarm, &settings, WIDTH, HEIGHT)?;
    let b = studio.render(ArtStyle::ParticleSwarm, &settings, WIDTH, HEIGHT)?;
    assert!(a.data() != b.data());
    assert!(a.data() != seeded.data());
    Ok(())
}

#[test]
fn unknown_style_names_draw_the_composite() -> anyhow::Result<()> {
    let settings = settings("fallback");
    let named = render(ArtStyle::from_name_or_default("Cubism"), &settings)?;
    let default = render(ArtStyle::Default, &settings)?;
    assert!(named.data() == default.data());
    Ok(())
}

fn layer_params(seed: Option<f64>) -> Params {
    let mut params = Params::new()
        .with("canvasWidth", WIDTH)
        .with("canvasHeight", HEIGHT);
    if let Some(seed) = seed {
        params.set("seed", seed);
    }
    params
}

fn palette() -> Palette {
    Palette::new(
        ["#e63946", "#f1faee", "#a8dadc", "#457b9d", "#1d3557"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
    )
}

fn draw_layer(
    kind: LayerKind,
    params: &Params,
    opacity: f64,
    rng: &mut dyn RandomSource,
) -> anyhow::Result<Surface> {
    let mut surface = Surface::new(WIDTH, HEIGHT)?;
    surface.clear(palette().rgba(4));
    kind.render(&mut surface, &palette(), &Frame::still(), params, opacity, rng)?;
    Ok(surface)
}

#[test]
fn zero_opacity_layers_leave_the_surface_alone() -> anyhow::Result<()> {
    let params = layer_params(None);
    let blank = draw_layer(LayerKind::NeonWaves, &params, 0.0, &mut Lcg::with_seed(1))?;
    for &kind in LayerKind::ALL {
        let mut rng = Lcg::with_seed(9);
        let before = rng.clone();
        let surface = draw_layer(kind, &params, 0.0, &mut rng)?;
        assert!(surface.data() == blank.data(), "{} drew at zero opacity", kind);
        assert_eq!(rng, before, "{} consumed randomness at zero opacity", kind);
    }
    Ok(())
}

#[test]
fn explicit_seeds_ignore_the_shared_source() -> anyhow::Result<()> {
    let params = layer_params(Some(4242.0));
    for &kind in LayerKind::ALL {
        let a = draw_layer(kind, &params, 1.0, &mut Lcg::with_seed(1))?;
        let b = draw_layer(kind, &params, 1.0, &mut Lcg::with_seed(2))?;
        assert!(a.data() == b.data(), "{} depends on the shared source", kind);
    }
    Ok(())
}

#[test]
fn degenerate_canvas_params_are_errors() -> anyhow::Result<()> {
    let params = Params::new().with("canvasWidth", 0.0).with("canvasHeight", HEIGHT);
    for &kind in LayerKind::ALL {
        let mut surface = Surface::new(WIDTH, HEIGHT)?;
        let result = kind.render(
            &mut surface,
            &palette(),
            &Frame::still(),
            &params,
            1.0,
            &mut Lcg::with_seed(3),
        );
        assert!(result.is_err(), "{} accepted a zero-width canvas", kind);
        assert_eq!(surface.depth(), 0);
    }
    Ok(())
}
