//! CSS color strings.
//!
//! Palettes are lists of plain strings (`#rrggbb`, `rgb(...)`, `rgba(...)`, `hsl(...)`,
//! `hsla(...)`), so every consumer parses on use. Broken input never aborts a render: callers go
//! through [`parse_or_fallback`], which substitutes a warm orange.

use raqote::SolidSource;

use crate::math::modulo;

/// Substituted for any color string that fails to parse.
pub const FALLBACK: Rgba = Rgba {
    r: 255,
    g: 200,
    b: 100,
    a: 1.0,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColorError {
    #[error("empty color string")]
    Empty,
    #[error("unrecognized color format: {0:?}")]
    UnknownFormat(String),
    #[error("invalid hex color: {0:?}")]
    InvalidHex(String),
    #[error("invalid color component {component:?} in {input:?}")]
    InvalidComponent { input: String, component: String },
}

/// An sRGB color with straight (non-premultiplied) alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

/// A color in HSL form. `s` and `l` are percentages in `[0, 100]`; `h` is in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
    pub a: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Rgba {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Relative brightness in `[0, 1]`, as a plain channel average.
    pub fn brightness(&self) -> f64 {
        (f64::from(self.r) + f64::from(self.g) + f64::from(self.b)) / (3.0 * 255.0)
    }

    pub fn to_hsl(&self) -> Hsl {
        let (h, s, l) = rgb_to_hsl(self.r, self.g, self.b);
        Hsl { h, s, l, a: self.a }
    }

    /// Solid raqote source carrying this color's alpha times `alpha`.
    pub fn solid(&self, alpha: f64) -> SolidSource {
        SolidSource::from_unpremultiplied_argb(unit_to_byte(self.a * alpha), self.r, self.g, self.b)
    }

    /// Gradient-stop color carrying this color's alpha times `alpha`.
    pub fn gradient_color(&self, alpha: f64) -> raqote::Color {
        raqote::Color::new(unit_to_byte(self.a * alpha), self.r, self.g, self.b)
    }

    /// Channel-wise interpolation between two colors.
    pub fn mix(&self, other: &Rgba, t: f64) -> Rgba {
        let ch = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgba {
            r: ch(self.r, other.r),
            g: ch(self.g, other.g),
            b: ch(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }
}

impl Hsl {
    pub fn to_rgba(&self) -> Rgba {
        let (r, g, b) = hsl_to_rgb(self.h, self.s, self.l);
        Rgba { r, g, b, a: self.a }
    }
}

fn unit_to_byte(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub fn parse(input: &str) -> Result<Rgba, ColorError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(ColorError::Empty);
    }
    if let Some(digits) = text.strip_prefix('#') {
        return parse_hex(text, digits);
    }
    let lower = text.to_ascii_lowercase();
    let (name, args) = lower
        .split_once('(')
        .and_then(|(name, rest)| Some((name.trim(), rest.strip_suffix(')')?)))
        .ok_or_else(|| ColorError::UnknownFormat(text.to_string()))?;
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    match (name, parts.len()) {
        ("rgb" | "rgba", 3 | 4) => {
            let channel = |i: usize| -> Result<u8, ColorError> {
                let v = match parts[i].strip_suffix('%') {
                    Some(pct) => number(text, pct)? / 100.0 * 255.0,
                    None => number(text, parts[i])?,
                };
                Ok(v.round().clamp(0.0, 255.0) as u8)
            };
            Ok(Rgba {
                r: channel(0)?,
                g: channel(1)?,
                b: channel(2)?,
                a: alpha(text, parts.get(3).copied())?,
            })
        }
        ("hsl" | "hsla", 3 | 4) => {
            let h = number(text, parts[0].trim_end_matches("deg"))?;
            let s = number(text, parts[1].trim_end_matches('%'))?;
            let l = number(text, parts[2].trim_end_matches('%'))?;
            let a = alpha(text, parts.get(3).copied())?;
            Ok(Hsl { h, s, l, a }.to_rgba())
        }
        _ => Err(ColorError::UnknownFormat(text.to_string())),
    }
}

fn parse_hex(text: &str, digits: &str) -> Result<Rgba, ColorError> {
    let invalid = || ColorError::InvalidHex(text.to_string());
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).map_err(|_| invalid());
    let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    match digits.len() {
        3 => Ok(Rgba::rgb(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
        6 => Ok(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Ok(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?).with_alpha(f64::from(byte(6)?) / 255.0)),
        _ => Err(invalid()),
    }
}

fn number(input: &str, component: &str) -> Result<f64, ColorError> {
    component
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ColorError::InvalidComponent {
            input: input.to_string(),
            component: component.to_string(),
        })
}

fn alpha(input: &str, component: Option<&str>) -> Result<f64, ColorError> {
    match component {
        None => Ok(1.0),
        Some(c) => match c.strip_suffix('%') {
            Some(pct) => Ok((number(input, pct)? / 100.0).clamp(0.0, 1.0)),
            None => Ok(number(input, c)?.clamp(0.0, 1.0)),
        },
    }
}

/// Parses `input`, logging and substituting [`FALLBACK`] on failure.
pub fn parse_or_fallback(input: &str) -> Rgba {
    match parse(input) {
        Ok(color) => color,
        Err(err) => {
            tracing::warn!(%err, "using fallback color");
            FALLBACK
        }
    }
}

/// Extracts HSL components from any parseable color string.
pub fn hsl_components(input: &str) -> Option<Hsl> {
    parse(input).ok().map(|c| c.to_hsl())
}

pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let h = modulo(h, 360.0) / 360.0;
    let s = (s / 100.0).clamp(0.0, 1.0);
    let l = (l / 100.0).clamp(0.0, 1.0);
    if s == 0.0 {
        let v = unit_to_byte(l);
        return (v, v, v);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        unit_to_byte(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        unit_to_byte(hue_to_rgb(p, q, h)),
        unit_to_byte(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Returns `(h, s, l)` with `h` in degrees and `s`, `l` in percent.
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let (r, g, b) = (
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
    );
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return (0.0, 0.0, l * 100.0);
    }
    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h * 60.0, s * 100.0, l * 100.0)
}

/// Formats a number with at most one decimal place, dropping a trailing `.0`.
fn fmt_num(v: f64) -> String {
    let rounded = (v * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{:.1}", rounded)
    }
}

pub fn hsl(h: f64, s: f64, l: f64) -> String {
    format!(
        "hsl({}, {}%, {}%)",
        fmt_num(modulo(h, 360.0)),
        fmt_num(s.clamp(0.0, 100.0)),
        fmt_num(l.clamp(0.0, 100.0))
    )
}

pub fn hsla(h: f64, s: f64, l: f64, a: f64) -> String {
    format!(
        "hsla({}, {}%, {}%, {})",
        fmt_num(modulo(h, 360.0)),
        fmt_num(s.clamp(0.0, 100.0)),
        fmt_num(l.clamp(0.0, 100.0)),
        format_alpha(a)
    )
}

pub fn rgba(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({}, {}, {}, {})", r, g, b, format_alpha(a))
}

pub fn hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

fn format_alpha(a: f64) -> String {
    let rounded = (a.clamp(0.0, 1.0) * 1000.0).round() / 1000.0;
    format!("{}", rounded)
}

/// Rotates the hue of a color string, keeping its format family as HSL.
pub fn shift_hue(input: &str, degrees: f64) -> String {
    let c = parse_or_fallback(input).to_hsl();
    if c.a < 1.0 {
        hsla(c.h + degrees, c.s, c.l, c.a)
    } else {
        hsl(c.h + degrees, c.s, c.l)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_formats() {
        const TEST_CASES: &[(&str, (u8, u8, u8), f64)] = &[
            ("#fff", (255, 255, 255), 1.0),
            ("#FF9900", (255, 153, 0), 1.0),
            ("#00000080", (0, 0, 0), 128.0 / 255.0),
            ("rgb(10, 20, 30)", (10, 20, 30), 1.0),
            ("rgba(10,20,30,0.5)", (10, 20, 30), 0.5),
            ("rgb(100%, 0%, 50%)", (255, 0, 128), 1.0),
            ("hsl(0, 100%, 50%)", (255, 0, 0), 1.0),
            ("hsl(120, 100%, 25%)", (0, 128, 0), 1.0),
            ("hsla(240, 100%, 50%, 0.25)", (0, 0, 255), 0.25),
            ("hsl(0, 0%, 10%)", (26, 26, 26), 1.0),
            ("hsl(200.5, 70.2%, 55.1%)", (60, 166, 221), 1.0),
        ];
        for &(input, (r, g, b), a) in TEST_CASES {
            let got = parse(input).unwrap_or_else(|e| panic!("parse({:?}): {}", input, e));
            if (got.r, got.g, got.b) != (r, g, b) || (got.a - a).abs() > 1e-9 {
                panic!("parse({:?}): got {:?}, want {:?}", input, got, ((r, g, b), a));
            }
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse(""), Err(ColorError::Empty));
        assert!(matches!(parse("#12"), Err(ColorError::InvalidHex(_))));
        assert!(matches!(parse("#gggggg"), Err(ColorError::InvalidHex(_))));
        assert!(matches!(parse("chartreuse"), Err(ColorError::UnknownFormat(_))));
        assert!(matches!(parse("rgb(1, 2)"), Err(ColorError::UnknownFormat(_))));
        assert!(matches!(
            parse("rgb(a, 2, 3)"),
            Err(ColorError::InvalidComponent { .. })
        ));
    }

    #[test]
    fn test_fallback() {
        assert_eq!(parse_or_fallback("not a color"), FALLBACK);
        assert_eq!(parse_or_fallback("#000"), Rgba::rgb(0, 0, 0));
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(hsl(180.0, 70.0, 50.0), "hsl(180, 70%, 50%)");
        assert_eq!(hsl(-30.0, 70.25, 49.96), "hsl(330, 70.3%, 50%)");
        assert_eq!(hsl(400.0, 120.0, -5.0), "hsl(40, 100%, 0%)");
        assert_eq!(hsla(10.0, 20.0, 30.0, 0.5), "hsla(10, 20%, 30%, 0.5)");
        assert_eq!(rgba(1, 2, 3, 0.25), "rgba(1, 2, 3, 0.25)");
        assert_eq!(hex(255, 153, 0), "#ff9900");
    }

    #[test]
    fn test_hsl_round_trip_components() {
        let c = hsl_components("hsl(210, 60%, 40%)").unwrap();
        assert!((c.h - 210.0).abs() < 1.0, "got {:?}", c);
        assert!((c.s - 60.0).abs() < 1.0, "got {:?}", c);
        assert!((c.l - 40.0).abs() < 1.0, "got {:?}", c);
        assert!(hsl_components("bogus").is_none());
    }

    #[test]
    fn test_shift_hue() {
        let wrapped = hsl_components(&shift_hue("hsl(350, 100%, 50%)", 20.0)).unwrap();
        assert!((wrapped.h - 10.0).abs() < 1.0, "got {:?}", wrapped);
        assert_eq!(shift_hue("#ff0000", 120.0), "hsl(120, 100%, 50%)");
    }

    #[test]
    fn test_mix_and_brightness() {
        let black = Rgba::rgb(0, 0, 0);
        let white = Rgba::rgb(255, 255, 255);
        assert_eq!(black.mix(&white, 0.5), Rgba::rgb(128, 128, 128));
        assert_eq!(white.brightness(), 1.0);
        assert_eq!(black.brightness(), 0.0);
    }
}
