//! A scene built out of other layers: a gradient sky over distant terrain, midground strokes and
//! foreground splatters, each clipped to its horizontal band, with weather and lighting on top.

use raqote::PathBuilder;

use crate::color::Rgba;
use crate::error::RenderResult;
use crate::layers::{self, Frame, LayerKind};
use crate::palette::Palette;
use crate::params::Params;
use crate::rand::{Lcg, LayerRng, RandomSource};
use crate::surface::Surface;

named_enum!(
    LandscapeType {
        Mountain = "mountain",
        Desert = "desert",
        Ocean = "ocean",
        Forest = "forest",
    }
);

named_enum!(
    TimeOfDay {
        Day = "day",
        Sunset = "sunset",
        Night = "night",
        Dawn = "dawn",
    }
);

named_enum!(
    Weather {
        Clear = "clear",
        Cloudy = "cloudy",
        Foggy = "foggy",
        Stormy = "stormy",
    }
);

const WHITES: [&str; 2] = ["#ffffff", "#f0f0f0"];
const STARLIGHT: [&str; 2] = ["#ffffff", "#ffffcc"];

impl LandscapeType {
    /// Band height of the distant terrain as a share of the canvas.
    fn distant_height(self) -> f64 {
        match self {
            LandscapeType::Mountain => 0.25,
            LandscapeType::Forest => 0.15,
            LandscapeType::Desert => 0.1,
            LandscapeType::Ocean => 0.05,
        }
    }
}

impl TimeOfDay {
    /// Light-ray direction in degrees and intensity.
    fn light(self) -> (f64, f64) {
        match self {
            TimeOfDay::Dawn => (90.0, 0.6),
            TimeOfDay::Day => (0.0, 0.4),
            TimeOfDay::Sunset => (270.0, 0.7),
            TimeOfDay::Night => (180.0, 0.3),
        }
    }
}

/// The palette split into one group per scene element.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenePalette {
    pub sky: Palette,
    pub distant: Palette,
    pub midground: Palette,
    pub foreground: Palette,
    pub atmosphere: Palette,
    pub light: Palette,
}

impl ScenePalette {
    /// Shuffles the palette and deals it out in order: two colors each to sky, distant,
    /// midground and foreground, then one each to atmosphere and light. Short palettes wrap
    /// around.
    pub fn partition<R: RandomSource>(palette: &Palette, rng: &mut R) -> Self {
        let shuffled: Vec<String> = rng.shuffle(palette.iter().cloned());
        let group = |start: usize, len: usize| {
            Palette::new(
                (start..start + len)
                    .map(|i| shuffled[i % shuffled.len()].clone())
                    .collect(),
            )
        };
        ScenePalette {
            sky: group(0, 2),
            distant: group(2, 2),
            midground: group(4, 2),
            foreground: group(6, 2),
            atmosphere: group(8, 1),
            light: group(9, 1),
        }
    }
}

/// Shared state for one landscape render.
struct Scene<'a> {
    frame: &'a Frame,
    outer: &'a Params,
    width: f64,
    seed: u64,
    opacity: f64,
}

impl Scene<'_> {
    /// Parameters for a child layer: the logical canvas, the pointer and a seed offset from the
    /// scene's own.
    fn params(&self, offset: u64, height: f64) -> Params {
        let mut params = Params::new()
            .with("canvasWidth", self.width)
            .with("canvasHeight", height)
            .with("seed", self.seed.wrapping_add(offset) as f64);
        for key in ["isInteractive", "mouseX", "mouseY"] {
            if let Some(v) = self.outer.get(key) {
                params.set(key, v.clone());
            }
        }
        params
    }

    /// Draws `kind` clipped to a horizontal band, at `opacity` scaled by the scene's own.
    #[allow(clippy::too_many_arguments)]
    fn band(
        &self,
        surface: &mut Surface,
        kind: LayerKind,
        palette: &Palette,
        params: &Params,
        (top, band_height): (f64, f64),
        opacity: f64,
        rng: &mut dyn RandomSource,
    ) -> RenderResult<()> {
        surface.save();
        surface.clip_rect(0.0, top, self.width, band_height);
        let result = kind.render(surface, palette, self.frame, params, opacity * self.opacity, rng);
        surface.restore();
        result
    }
}

/// Fills two or three mountain ranges above `horizon`, nearer ranges taller, with snow on the
/// front range.
fn mountains(
    surface: &mut Surface,
    palette: &Palette,
    horizon: f64,
    width: f64,
    height: f64,
    complexity: f64,
    seed: u64,
) {
    let mut rng = Lcg::with_seed(seed);
    let peaks = 3 + (complexity / 20.0).floor() as usize;
    let ranges = 2 + rng.range(0, 2) as usize;

    for range in 0..ranges {
        let distance = range as f64 / ranges as f64;
        let range_height = height * (1.0 - distance * 0.7);
        let range_peaks = ((peaks as f64 * (1.0 - distance * 0.5)).floor() as usize).max(2);
        let peak_width = width / (range_peaks - 1) as f64;

        let mut pb = PathBuilder::new();
        pb.move_to(0.0, horizon as f32);
        for i in 0..range_peaks {
            let x = i as f64 * peak_width;
            let lift = if rng.odds(0.3) {
                rng.uniform(0.7, 1.0)
            } else {
                rng.uniform(0.3, 0.7)
            };
            let y = horizon - range_height * lift;
            if i == 0 {
                pb.line_to(x as f32, y as f32);
                continue;
            }
            let prev = (i - 1) as f64 * peak_width;
            let bumps = 1 + rng.range(0, 3) as usize;
            let spacing = peak_width / (bumps + 1) as f64;
            for j in 1..=bumps {
                let bx = prev + spacing * j as f64;
                let bump = range_height * rng.uniform(0.1, 0.3);
                let by = horizon - bump;
                let cy = by - bump * rng.rnd() * 0.5;
                pb.quad_to((bx - spacing / 2.0) as f32, cy as f32, bx as f32, by as f32);
            }
            let cy = y - range_height * 0.1 * rng.rnd();
            pb.quad_to((x - peak_width / 4.0) as f32, cy as f32, x as f32, y as f32);
        }
        pb.line_to(width as f32, horizon as f32);
        pb.close();
        surface.fill_color(&pb.finish(), palette.rgba(range), 1.0);

        if range == 0 {
            snow_caps(surface, horizon, range_height, range_peaks, peak_width, seed.wrapping_add(100));
        }
    }
}

fn snow_caps(
    surface: &mut Surface,
    horizon: f64,
    height: f64,
    peaks: usize,
    peak_width: f64,
    seed: u64,
) {
    let mut rng = Lcg::with_seed(seed);
    let snow = Rgba::rgb(255, 255, 255).with_alpha(0.8);
    for i in 0..peaks {
        if !rng.odds(0.7) {
            continue;
        }
        let x = i as f64 * peak_width;
        let peak = height * rng.uniform(0.7, 1.0);
        let depth = peak * rng.uniform(0.1, 0.3);
        let top = horizon - peak;
        let cap = crate::surface::polygon(&[
            (x - peak_width * 0.2, top + depth),
            (x, top),
            (x + peak_width * 0.2, top + depth),
        ]);
        surface.fill_color(&cap, snow, 1.0);
    }
}

fn palette_of(colors: &[&str]) -> Palette {
    Palette::new(colors.iter().map(|c| c.to_string()).collect())
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
    let complexity = params
        .number("landscapeComplexity")
        .unwrap_or_else(|| params.density(LayerKind::Landscape.prefix()))
        .clamp(0.0, 100.0);
    let kind = params
        .text("landscapeType")
        .and_then(LandscapeType::from_name)
        .unwrap_or(LandscapeType::Mountain);
    let time = params
        .text("timeOfDay")
        .and_then(TimeOfDay::from_name)
        .unwrap_or(TimeOfDay::Day);
    let weather = params
        .text("weatherCondition")
        .and_then(Weather::from_name)
        .unwrap_or(Weather::Clear);

    let mut local = LayerRng::new(params.seed(), &mut *rng);
    let seed = params
        .seed()
        .unwrap_or_else(|| local.range(0, 1_000_000) as u64);
    let horizon = h * local.uniform(0.4, 0.6);
    let groups = ScenePalette::partition(palette, &mut local);
    drop(local);

    tracing::debug!(%kind, %time, %weather, horizon, "landscape");
    let scene = Scene {
        frame,
        outer: params,
        width: w,
        seed,
        opacity,
    };

    // Sky.
    let direction = match time {
        TimeOfDay::Dawn | TimeOfDay::Sunset => "horizontal",
        TimeOfDay::Day | TimeOfDay::Night => "vertical",
    };
    let sky = scene
        .params(0, horizon)
        .with("gradientType", "linear")
        .with("gradientDirection", direction)
        .with("blendMode", "source-over");
    let sky_band = (0.0, horizon);
    scene.band(surface, LayerKind::GradientOverlay, &groups.sky, &sky, sky_band, 1.0, rng)?;

    if matches!(weather, Weather::Cloudy | Weather::Stormy) {
        let density = if weather == Weather::Stormy { 70.0 } else { 40.0 };
        let clouds = scene.params(1, horizon).with("voronoiDensity", density);
        let whites = palette_of(&WHITES);
        scene.band(surface, LayerKind::Voronoi, &whites, &clouds, sky_band, 0.6, rng)?;
    }
    if weather == Weather::Foggy {
        let fog = scene.params(2, horizon).with("organicNoiseDensity", 30.0);
        let whites = palette_of(&WHITES);
        scene.band(surface, LayerKind::OrganicNoise, &whites, &fog, sky_band, 0.8, rng)?;
    }
    if time == TimeOfDay::Night && matches!(weather, Weather::Clear | Weather::Foggy) {
        let stars = scene.params(3, horizon).with("dotMatrixDensity", 80.0);
        let starlight = palette_of(&STARLIGHT);
        scene.band(surface, LayerKind::DotMatrix, &starlight, &stars, sky_band, 0.7, rng)?;
    }

    // Distant terrain.
    let distant_height = h * kind.distant_height();
    // Terrain rises from just below the horizon.
    let distant_band = (horizon - distant_height, distant_height + 10.0);
    if kind == LandscapeType::Mountain {
        surface.save();
        surface.set_alpha(opacity);
        surface.clip_rect(0.0, distant_band.0, w, distant_band.1);
        mountains(
            surface,
            &groups.distant,
            horizon,
            w,
            distant_height,
            complexity * 0.5,
            seed.wrapping_add(1),
        );
        surface.restore();
    } else {
        let terrain = scene
            .params(1, h)
            .with("organicNoiseDensity", 30.0 + complexity * 0.15);
        scene.band(
            surface,
            LayerKind::OrganicNoise,
            &groups.distant,
            &terrain,
            distant_band,
            0.8,
            rng,
        )?;
        surface.save();
        surface.set_alpha(opacity * 0.7);
        surface.fill_rect(
            0.0,
            horizon - 2.0,
            w,
            4.0,
            &raqote::Source::Solid(groups.distant.rgba(0).solid(1.0)),
        );
        surface.restore();
    }

    // Midground and foreground.
    let midground = scene
        .params(2, h)
        .with("flowingLinesDensity", 20.0 + complexity * 0.8 * 0.4);
    let mid_band = (horizon, h * 0.3);
    scene.band(surface, LayerKind::FlowingLines, &groups.midground, &midground, mid_band, 0.9, rng)?;

    let foreground = scene
        .params(3, h)
        .with("organicSplattersDensity", 40.0 + complexity * 0.6);
    let fore_band = (horizon + h * 0.3, h * 0.7);
    scene.band(
        surface,
        LayerKind::OrganicSplatters,
        &groups.foreground,
        &foreground,
        fore_band,
        1.0,
        rng,
    )?;

    // Weather over the whole scene.
    let full = (0.0, h);
    match weather {
        Weather::Stormy => {
            let rain = scene.params(4, h).with("neonWavesDensity", 70.0);
            scene.band(surface, LayerKind::NeonWaves, &groups.atmosphere, &rain, full, 0.42, rng)?;
        }
        Weather::Foggy => {
            let fog = scene.params(4, h).with("organicNoiseDensity", 20.0);
            let whites = palette_of(&WHITES);
            scene.band(surface, LayerKind::OrganicNoise, &whites, &fog, full, 0.35, rng)?;
        }
        Weather::Clear | Weather::Cloudy => {}
    }

    if weather != Weather::Stormy {
        let (direction, intensity) = time.light();
        let light = scene
            .params(5, h)
            .with("lightRaysDirection", direction)
            .with("lightRaysIntensity", intensity)
            .with("lightRaysSpread", 60.0)
            .with("lightRaysColor", groups.light.get(0));
        let strength = if time == TimeOfDay::Night { 0.32 } else { 0.8 };
        scene.band(surface, LayerKind::LightRays, &groups.light, &light, full, strength, rng)?;
    }
    Ok(())
}
