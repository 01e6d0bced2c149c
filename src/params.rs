//! The open parameter bag handed to every renderer.
//!
//! Keys are camelCase strings (`canvasWidth`, `voronoiDensity`, `lightRaysDirection`, ...). Each
//! renderer reads only the keys it recognizes and supplies its own defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Flag(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

pub const DEFAULT_DENSITY: f64 = 50.0;
pub const DEFAULT_LINE_WIDTH: f64 = 1.0;
pub const DEFAULT_NUM_SHAPES: f64 = 100.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params {
    values: BTreeMap<String, Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder-style [`set`][Self::set].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Copies every entry of `other` over this bag.
    pub fn merge(&mut self, other: &Params) {
        for (k, v) in &other.values {
            self.values.insert(k.clone(), v.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Numeric value of `key`. Numeric strings are accepted; non-finite numbers are not.
    pub fn number(&self, key: &str) -> Option<f64> {
        let v = match self.values.get(key)? {
            Value::Number(n) => *n,
            Value::Text(t) => t.trim().parse().ok()?,
            Value::Flag(_) => return None,
        };
        v.is_finite().then_some(v)
    }

    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        self.number(key).unwrap_or(default)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key)? {
            Value::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    pub fn text_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.text(key).unwrap_or(default)
    }

    pub fn flag(&self, key: &str) -> bool {
        match self.values.get(key) {
            Some(Value::Flag(b)) => *b,
            Some(Value::Number(n)) => *n != 0.0,
            _ => false,
        }
    }

    /// `<prefix>Density` on the 0–100 scale; 50 when absent.
    pub fn density(&self, prefix: &str) -> f64 {
        self.number_or(&format!("{}Density", prefix), DEFAULT_DENSITY)
            .clamp(0.0, 100.0)
    }

    /// `<prefix>Opacity` in `[0, 1]`; 0 (disabled) when absent.
    pub fn opacity(&self, prefix: &str) -> f64 {
        self.number_or(&format!("{}Opacity", prefix), 0.0)
            .clamp(0.0, 1.0)
    }

    /// Logical canvas size, falling back to the given surface size for missing keys.
    pub fn canvas_size(&self, fallback: (i32, i32)) -> (f64, f64) {
        (
            self.number_or("canvasWidth", f64::from(fallback.0)),
            self.number_or("canvasHeight", f64::from(fallback.1)),
        )
    }

    /// The explicit layer seed, reduced to the LCG's state range. Zero and non-finite values
    /// count as absent.
    pub fn seed(&self) -> Option<u64> {
        self.number("seed")
            .filter(|s| s.is_finite() && *s != 0.0)
            .map(|s| (s.abs().trunc() as u64) % crate::rand::MODULUS)
    }

    /// Pointer position, present only for interactive renders that carry both coordinates.
    pub fn pointer(&self) -> Option<(f64, f64)> {
        if !self.flag("isInteractive") {
            return None;
        }
        Some((self.number("mouseX")?, self.number("mouseY")?))
    }

    pub fn line_width(&self) -> f64 {
        self.number("lineWidth")
            .filter(|w| *w > 0.0)
            .unwrap_or(DEFAULT_LINE_WIDTH)
    }

    pub fn num_shapes(&self) -> f64 {
        self.number("numShapes")
            .filter(|n| *n > 0.0)
            .unwrap_or(DEFAULT_NUM_SHAPES)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_for_absent_keys() {
        let params = Params::new();
        assert_eq!(params.density("voronoi"), 50.0);
        assert_eq!(params.opacity("voronoi"), 0.0);
        assert_eq!(params.canvas_size((640, 480)), (640.0, 480.0));
        assert_eq!(params.seed(), None);
        assert_eq!(params.pointer(), None);
        assert_eq!(params.line_width(), 1.0);
        assert_eq!(params.num_shapes(), 100.0);
    }

    #[test]
    fn clamps_density_and_opacity() {
        let params = Params::new()
            .with("neonWavesDensity", 180.0)
            .with("neonWavesOpacity", -1.0);
        assert_eq!(params.density("neonWaves"), 100.0);
        assert_eq!(params.opacity("neonWaves"), 0.0);
    }

    #[test]
    fn pointer_requires_interactive_flag() {
        let params = Params::new().with("mouseX", 10.0).with("mouseY", 20.0);
        assert_eq!(params.pointer(), None);
        let params = params.with("isInteractive", true);
        assert_eq!(params.pointer(), Some((10.0, 20.0)));
        let params = Params::new()
            .with("isInteractive", true)
            .with("mouseX", 10.0);
        assert_eq!(params.pointer(), None);
    }

    #[test]
    fn numbers_from_text_and_seed_truncation() {
        let params = Params::new().with("seed", "-42.7").with("lineWidth", 0.0);
        assert_eq!(params.seed(), Some(42));
        assert_eq!(params.line_width(), 1.0);
    }

    #[test]
    fn seeds_are_reduced_and_zero_is_absent() {
        assert_eq!(Params::new().with("seed", 0.0).seed(), None);
        assert_eq!(Params::new().with("seed", f64::INFINITY).seed(), None);
        assert_eq!(Params::new().with("seed", 233_281.0).seed(), Some(1));
        let huge = Params::new().with("seed", 1e20).seed().unwrap();
        assert!(huge < crate::rand::MODULUS);
    }

    #[test]
    fn deserializes_json_object() {
        let params: Params = serde_json::from_str(
            r#"{"canvasWidth": 800, "blendMode": "screen", "isInteractive": true}"#,
        )
        .unwrap();
        assert_eq!(params.number("canvasWidth"), Some(800.0));
        assert_eq!(params.text("blendMode"), Some("screen"));
        assert!(params.flag("isInteractive"));
    }

    #[test]
    fn merge_overrides() {
        let mut base = Params::new().with("a", 1.0).with("b", 2.0);
        base.merge(&Params::new().with("b", 3.0));
        assert_eq!(base.number("a"), Some(1.0));
        assert_eq!(base.number("b"), Some(3.0));
    }
}
