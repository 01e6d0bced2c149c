//! Studio settings, loadable from JSON, and the command-line flags that override them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::{self, Rgba};
use crate::error::{RenderError, RenderResult};
use crate::palette::ColorTheme;
use crate::params::{Params, Value};

/// Everything a render needs besides the style: palette inputs, background, global stroke
/// settings, animation controls and any extra layer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub color_theme: String,
    pub base_hue: f64,
    pub saturation: f64,
    pub lightness: f64,
    pub background_color: String,
    pub line_width: f64,
    pub num_shapes: f64,
    /// Animation speed, 1–100.
    pub animation_speed: f64,
    pub is_interactive: bool,
    /// Seed text for the ambient random source; absent means non-deterministic.
    pub seed: Option<String>,
    /// Extra parameters passed to every layer, such as `neonWavesOpacity` or `timeOfDay`.
    pub params: Params,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            color_theme: ColorTheme::Random.name().to_string(),
            base_hue: 180.0,
            saturation: 70.0,
            lightness: 50.0,
            background_color: "#ffffff".to_string(),
            line_width: 1.0,
            num_shapes: 100.0,
            animation_speed: 50.0,
            is_interactive: false,
            seed: None,
            params: Params::new(),
        }
    }
}

impl Settings {
    pub fn from_json(text: &str) -> RenderResult<Self> {
        serde_json::from_str(text).map_err(|e| RenderError::settings(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| RenderError::settings(format!("reading {}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    /// The palette theme; unknown names fall back to random.
    pub fn theme(&self) -> ColorTheme {
        ColorTheme::from_name(&self.color_theme).unwrap_or_else(|| {
            tracing::warn!(theme = %self.color_theme, "unknown color theme; using random");
            ColorTheme::Random
        })
    }

    pub fn background(&self) -> Rgba {
        color::parse_or_fallback(&self.background_color)
    }

    /// The parameter bag for a render at the given logical size.
    pub fn params_for(&self, width: f64, height: f64) -> Params {
        let mut params = self.params.clone();
        params
            .set("canvasWidth", width)
            .set("canvasHeight", height)
            .set("lineWidth", self.line_width)
            .set("numShapes", self.num_shapes);
        params
    }
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct RenderConfig {
    /// Art style by name, e.g. "Neon Waves" or "neon-waves". Unknown names draw the Default
    /// composite.
    #[clap(long, default_value = "Default")]
    pub style: String,

    #[clap(long, default_value_t = 800)]
    pub width: i32,

    #[clap(long, default_value_t = 600)]
    pub height: i32,

    /// JSON settings file; flags below override its values.
    #[clap(long)]
    pub settings: Option<PathBuf>,

    /// Seed text for reproducible output.
    #[clap(long)]
    pub seed: Option<String>,

    /// Palette theme: random, custom, monochrome, complementary, analogous or triadic.
    #[clap(long)]
    pub theme: Option<String>,

    #[clap(long)]
    pub hue: Option<f64>,

    #[clap(long)]
    pub saturation: Option<f64>,

    #[clap(long)]
    pub lightness: Option<f64>,

    #[clap(long)]
    pub background: Option<String>,

    /// Layer parameter as `key=value`, e.g. `--param voronoiOpacity=0.8`. Repeatable.
    #[clap(long = "param", value_parser = parse_param)]
    pub params: Vec<(String, Value)>,
}

impl RenderConfig {
    /// The settings file (or defaults) with every flag applied on top.
    pub fn settings(&self) -> RenderResult<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(seed) = &self.seed {
            settings.seed = Some(seed.clone());
        }
        if let Some(theme) = &self.theme {
            settings.color_theme = theme.clone();
        }
        if let Some(hue) = self.hue {
            settings.base_hue = hue;
        }
        if let Some(s) = self.saturation {
            settings.saturation = s;
        }
        if let Some(l) = self.lightness {
            settings.lightness = l;
        }
        if let Some(bg) = &self.background {
            settings.background_color = bg.clone();
        }
        for (key, value) in &self.params {
            settings.params.set(key.clone(), value.clone());
        }
        Ok(settings)
    }
}

/// Parses `key=value`. Values read as a flag, then a number, then text.
fn parse_param(arg: &str) -> Result<(String, Value), String> {
    let (key, raw) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {:?}", arg))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in {:?}", arg));
    }
    let raw = raw.trim();
    let value = match raw {
        "true" => Value::Flag(true),
        "false" => Value::Flag(false),
        _ => match raw.parse::<f64>() {
            Ok(n) => Value::Number(n),
            Err(_) => Value::Text(raw.to_string()),
        },
    };
    Ok((key.to_string(), value))
}
