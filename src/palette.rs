//! Palette generation and caching.
//!
//! A palette is an ordered list of CSS color strings. Layers index it positionally
//! (`palette.get(i)` wraps) and sample from it at random, so order matters and duplicates are
//! allowed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::color::{self, Rgba};
use crate::rand::{hash_seed, Lcg, RandomSource};
use crate::styles::ArtStyle;

named_enum!(
    /// How a palette's hues relate to each other.
    #[derive(Serialize, Deserialize)]
    #[serde(try_from = "String", into = "String")]
    ColorTheme {
        Random = "random",
        Custom = "custom",
        Monochrome = "monochrome",
        Complementary = "complementary",
        Analogous = "analogous",
        Triadic = "triadic",
    }
);

/// Returned whenever generation fails.
pub const FALLBACK_COLORS: [&str; 5] = ["#ff6b6b", "#feca57", "#48dbfb", "#1dd1a1", "#5f27cd"];

pub const MAX_CACHE_ENTRIES: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    /// Wraps `colors`; an empty list becomes the fallback palette so indexing is always safe.
    pub fn new(colors: Vec<String>) -> Self {
        if colors.is_empty() {
            return Palette::fallback();
        }
        Palette { colors }
    }

    pub fn fallback() -> Self {
        Palette {
            colors: FALLBACK_COLORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    /// The color at `index`, wrapping around the palette.
    pub fn get(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }

    pub fn rgba(&self, index: usize) -> Rgba {
        color::parse_or_fallback(self.get(index))
    }

    pub fn pick<R: RandomSource>(&self, rng: &mut R) -> &str {
        rng.choice(&self.colors).as_str()
    }

    pub fn pick_rgba<R: RandomSource>(&self, rng: &mut R) -> Rgba {
        color::parse_or_fallback(self.pick(rng))
    }

    /// A random index into the palette.
    pub fn pick_index<R: RandomSource>(&self, rng: &mut R) -> usize {
        rng.range(0, self.colors.len() as i64) as usize
    }

    /// Copy with every hue rotated by `degrees`. A zero shift returns an unchanged copy.
    pub fn shifted(&self, degrees: f64) -> Palette {
        if degrees == 0.0 {
            return self.clone();
        }
        Palette::new(
            self.colors
                .iter()
                .map(|c| color::shift_hue(c, degrees))
                .collect(),
        )
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.colors.iter()
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;
    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PaletteError {
    #[error("palette parameter {name} is not finite")]
    NonFinite { name: &'static str },
    #[error("palette has {0} colors, need at least 2")]
    TooFew(usize),
    #[error("palette produced an unparseable color: {0}")]
    InvalidColor(#[from] color::ColorError),
}

/// Identifies a cacheable palette request. The numeric parts are stored as bit patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaletteKey {
    pub style: ArtStyle,
    pub theme: ColorTheme,
    hue: u64,
    saturation: u64,
    lightness: u64,
}

impl PaletteKey {
    /// `None` for the random theme, which must never be cached.
    pub fn new(
        style: ArtStyle,
        theme: ColorTheme,
        hue: f64,
        saturation: f64,
        lightness: f64,
    ) -> Option<Self> {
        if theme == ColorTheme::Random {
            return None;
        }
        Some(PaletteKey {
            style,
            theme,
            hue: hue.to_bits(),
            saturation: saturation.to_bits(),
            lightness: lightness.to_bits(),
        })
    }

    /// Seed for the stochastic parts of a non-random palette, so the same key always yields the
    /// same colors whether or not it is cached.
    fn seed(&self) -> u64 {
        hash_seed(&format!(
            "{}|{}|{}|{}|{}",
            self.style.name(),
            self.theme.name(),
            f64::from_bits(self.hue),
            f64::from_bits(self.saturation),
            f64::from_bits(self.lightness)
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub palette: Palette,
    /// Logical access time: the cache's tick counter at insert or most recent hit.
    pub last_access: u64,
    pub hits: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Bounded least-recently-accessed cache of generated palettes.
#[derive(Debug)]
pub struct PaletteCache {
    entries: HashMap<PaletteKey, CacheEntry>,
    capacity: usize,
    tick: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl Default for PaletteCache {
    fn default() -> Self {
        PaletteCache::with_capacity(MAX_CACHE_ENTRIES)
    }
}

impl PaletteCache {
    pub fn with_capacity(capacity: usize) -> Self {
        PaletteCache {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            tick: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Returns a copy of the cached palette, refreshing its access time and hit count.
    pub fn get(&mut self, key: &PaletteKey) -> Option<Palette> {
        let tick = self.next_tick();
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.last_access = tick;
                entry.hits += 1;
                self.hits += 1;
                Some(entry.palette.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: PaletteKey, palette: Palette) {
        if !self.entries.contains_key(&key) {
            while self.entries.len() >= self.capacity {
                self.evict_oldest();
            }
        }
        let tick = self.next_tick();
        self.entries.insert(
            key,
            CacheEntry {
                palette,
                last_access: tick,
                hits: 0,
            },
        );
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| *key);
        if let Some(key) = oldest {
            tracing::debug!(?key, "evicting palette cache entry");
            self.entries.remove(&key);
            self.evictions += 1;
        }
    }

    /// Inspects an entry without touching its access time.
    pub fn entry(&self, key: &PaletteKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &PaletteKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }
}

/// Base color a palette is derived from. `saturation` and `lightness` are percentages.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Base {
    h: f64,
    s: f64,
    l: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Profile {
    Vibrant,
    Pastel,
    Muted,
    HighContrast,
}

#[derive(Debug, Default)]
pub struct PaletteGenerator {
    cache: PaletteCache,
}

impl PaletteGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        PaletteGenerator {
            cache: PaletteCache::with_capacity(capacity),
        }
    }

    pub fn cache(&self) -> &PaletteCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Produces the palette for a style and theme. Never fails: any generation error yields the
    /// fallback palette. Only the random theme consults `rng`.
    pub fn generate_palette<R: RandomSource>(
        &mut self,
        style: ArtStyle,
        theme: ColorTheme,
        base_hue: f64,
        saturation: f64,
        lightness: f64,
        rng: &mut R,
    ) -> Palette {
        let key = PaletteKey::new(style, theme, base_hue, saturation, lightness);
        if let Some(key) = &key {
            if let Some(palette) = self.cache.get(key) {
                tracing::debug!(%style, %theme, "palette cache hit");
                return palette;
            }
        }

        let generated = match &key {
            Some(key) => {
                let mut local = Lcg::with_seed(key.seed());
                let base = Base {
                    h: base_hue,
                    s: saturation,
                    l: lightness,
                };
                build(style, theme, base, &mut local)
            }
            None => {
                let base = random_base(rng);
                build(style, theme, base, rng)
            }
        };

        match generated {
            Ok(palette) => {
                if let Some(key) = key {
                    self.cache.insert(key, palette.clone());
                }
                palette
            }
            Err(err) => {
                tracing::warn!(%err, %style, %theme, "palette generation failed; using fallback");
                Palette::fallback()
            }
        }
    }
}

fn random_base<R: RandomSource>(rng: &mut R) -> Base {
    let profile = *rng.choice(&[
        Profile::Vibrant,
        Profile::Pastel,
        Profile::Muted,
        Profile::HighContrast,
    ]);
    let h = rng.uniform(0.0, 360.0);
    let (s, l) = match profile {
        Profile::Vibrant => (rng.uniform(70.0, 100.0), rng.uniform(45.0, 60.0)),
        Profile::Pastel => (rng.uniform(40.0, 70.0), rng.uniform(75.0, 88.0)),
        Profile::Muted => (rng.uniform(15.0, 40.0), rng.uniform(35.0, 60.0)),
        Profile::HighContrast => (rng.uniform(80.0, 100.0), rng.uniform(25.0, 75.0)),
    };
    Base { h, s, l }
}

fn build<R: RandomSource>(
    style: ArtStyle,
    theme: ColorTheme,
    base: Base,
    rng: &mut R,
) -> Result<Palette, PaletteError> {
    for (name, v) in [
        ("hue", base.h),
        ("saturation", base.s),
        ("lightness", base.l),
    ] {
        if !v.is_finite() {
            return Err(PaletteError::NonFinite { name });
        }
    }
    let colors = match theme {
        ColorTheme::Monochrome => monochrome(base),
        ColorTheme::Complementary => complementary(base),
        ColorTheme::Analogous => analogous(base),
        ColorTheme::Triadic => triadic(base),
        ColorTheme::Random | ColorTheme::Custom => for_style(style, base, rng),
    };
    if colors.len() < 2 {
        return Err(PaletteError::TooFew(colors.len()));
    }
    for c in &colors {
        color::parse(c)?;
    }
    Ok(Palette::new(colors))
}

fn monochrome(Base { h, s, l: _ }: Base) -> Vec<String> {
    (0..5)
        .map(|i| color::hsl(h, s, 30.0 + f64::from(i) * 60.0 / 5.0))
        .collect()
}

fn complementary(Base { h, s, l }: Base) -> Vec<String> {
    vec![
        color::hsl(h, s, l),
        color::hsl(h + 180.0, s, l),
        color::hsl(h, s * 0.8, l * 1.2),
        color::hsl(h + 180.0, s * 0.8, l * 1.2),
        color::hsl(h, s * 0.6, l * 0.8),
    ]
}

fn analogous(Base { h, s, l }: Base) -> Vec<String> {
    (0..5)
        .map(|i| color::hsl(h + f64::from(i - 2) * 30.0, s, l))
        .collect()
}

fn triadic(Base { h, s, l }: Base) -> Vec<String> {
    let mut colors = Vec::with_capacity(9);
    for i in 0..3 {
        let hue = h + f64::from(i) * 120.0;
        colors.push(color::hsl(hue, s, l));
        colors.push(color::hsl(hue, s * 0.8, (l * 1.3).min(95.0)));
        colors.push(color::hsl(hue, s * 1.1, l * 0.7));
    }
    colors
}

fn for_style<R: RandomSource>(style: ArtStyle, base: Base, rng: &mut R) -> Vec<String> {
    let Base { h, s, l } = base;
    match style {
        ArtStyle::Default => masterpiece(base, rng),
        ArtStyle::GeometricGrid => {
            let n = *rng.choice(&[3, 5]);
            let bold = rng.odds(0.5);
            (0..n)
                .map(|i| {
                    let i = f64::from(i);
                    if bold {
                        color::hsl(
                            h + i * 360.0 / f64::from(n),
                            rng.uniform(70.0, 90.0),
                            rng.uniform(40.0, 60.0),
                        )
                    } else {
                        color::hsl(
                            h + i * 180.0 / f64::from(n),
                            rng.uniform(30.0, 50.0),
                            rng.uniform(70.0, 85.0),
                        )
                    }
                })
                .collect()
        }
        ArtStyle::OrganicNoise => {
            let step = rng.uniform(15.0, 35.0);
            (0..7)
                .map(|i| {
                    color::hsl(
                        h + f64::from(i) * step,
                        rng.uniform(60.0, 85.0),
                        rng.uniform(55.0, 75.0),
                    )
                })
                .collect()
        }
        ArtStyle::FractalLines => vec![
            color::hsl(h, rng.uniform(80.0, 100.0), rng.uniform(30.0, 50.0)),
            color::hsl(
                h + 180.0 + rng.uniform(-30.0, 30.0),
                rng.uniform(80.0, 100.0),
                rng.uniform(70.0, 90.0),
            ),
        ],
        ArtStyle::ParticleSwarm => {
            let n = rng.range(3, 6);
            let step = rng.uniform(120.0, 180.0);
            (0..n)
                .map(|i| {
                    color::hsl(
                        h + i as f64 * step,
                        rng.uniform(90.0, 100.0),
                        rng.uniform(50.0, 60.0),
                    )
                })
                .collect()
        }
        ArtStyle::OrganicSplatters => {
            let step = rng.uniform(90.0, 120.0);
            (0..4)
                .map(|i| {
                    color::hsl(
                        h + f64::from(i) * step,
                        rng.uniform(75.0, 100.0),
                        rng.uniform(45.0, 60.0),
                    )
                })
                .collect()
        }
        ArtStyle::GlitchMosaic => {
            if rng.odds(0.5) {
                // Rainbow burst.
                (0..6)
                    .map(|_| {
                        color::hsl(
                            rng.uniform(0.0, 360.0),
                            rng.uniform(70.0, 100.0),
                            rng.uniform(50.0, 75.0),
                        )
                    })
                    .collect()
            } else {
                vec![
                    color::hsl(h, rng.uniform(80.0, 100.0), rng.uniform(50.0, 60.0)),
                    color::hsl(0.0, 0.0, rng.uniform(20.0, 30.0)),
                    color::hsl(0.0, 0.0, rng.uniform(50.0, 60.0)),
                    color::hsl(0.0, 0.0, rng.uniform(80.0, 90.0)),
                ]
            }
        }
        ArtStyle::NeonWaves => vec![
            color::hsl(h, 100.0, 60.0),
            color::hsl(h + 60.0, 100.0, 60.0),
            color::hsl(h + 180.0, 100.0, 60.0),
            color::hsl(h + 240.0, 100.0, 60.0),
            color::hsl(0.0, 0.0, 10.0),
        ],
        ArtStyle::PixelSort => {
            let n = rng.range(3, 6);
            (0..n)
                .map(|i| {
                    color::hsl(
                        h + i as f64 * 360.0 / n as f64,
                        rng.uniform(70.0, 100.0),
                        rng.uniform(40.0, 70.0),
                    )
                })
                .collect()
        }
        ArtStyle::VoronoiCells => {
            let n = rng.range(5, 8);
            (0..n)
                .map(|i| {
                    color::hsl(
                        h + i as f64 * 360.0 / n as f64,
                        rng.uniform(50.0, 80.0),
                        rng.uniform(60.0, 80.0),
                    )
                })
                .collect()
        }
        ArtStyle::DotMatrix | ArtStyle::FlowingLines | ArtStyle::SymmetricalPatterns => (0..5)
            .map(|i| color::hsl(h + f64::from(i) * 72.0, s, l))
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    MonochromeAccent,
    ComplementaryVariation,
    TriadicHarmony,
    WideAnalogous,
    HarmonicWalk,
}

/// The Default style's palette: one of five macro-strategies, then optional neutrals.
fn masterpiece<R: RandomSource>(Base { h, s, l }: Base, rng: &mut R) -> Vec<String> {
    let strategy = *rng.choice(&[
        Strategy::MonochromeAccent,
        Strategy::ComplementaryVariation,
        Strategy::TriadicHarmony,
        Strategy::WideAnalogous,
        Strategy::HarmonicWalk,
    ]);
    let mut colors = match strategy {
        Strategy::MonochromeAccent => {
            let mut colors: Vec<String> = (0..4)
                .map(|i| {
                    color::hsl(
                        h,
                        s * rng.uniform(0.6, 1.0),
                        25.0 + f64::from(i) * 20.0,
                    )
                })
                .collect();
            colors.push(color::hsl(
                h + 180.0 + rng.uniform(-20.0, 20.0),
                s.max(80.0),
                55.0,
            ));
            colors
        }
        Strategy::ComplementaryVariation => {
            let mut colors = Vec::with_capacity(6);
            for side in [0.0, 180.0] {
                for _ in 0..3 {
                    colors.push(color::hsl(
                        h + side + rng.uniform(-10.0, 10.0),
                        s * rng.uniform(0.7, 1.1),
                        l * rng.uniform(0.7, 1.3),
                    ));
                }
            }
            colors
        }
        Strategy::TriadicHarmony => {
            let mut colors = Vec::with_capacity(6);
            for i in 0..3 {
                let hue = h + f64::from(i) * 120.0;
                colors.push(color::hsl(hue, s, l));
                colors.push(color::hsl(hue, s * 0.7, (l * 1.25).min(92.0)));
            }
            colors
        }
        Strategy::WideAnalogous => {
            let n = rng.range(5, 8);
            let spread = rng.uniform(90.0, 150.0);
            (0..n)
                .map(|i| {
                    let t = i as f64 / (n - 1) as f64;
                    color::hsl(
                        h - spread / 2.0 + t * spread,
                        rng.uniform(s * 0.8, (s * 1.1).min(100.0)),
                        35.0 + t * 40.0,
                    )
                })
                .collect()
        }
        Strategy::HarmonicWalk => {
            let n = rng.range(5, 9);
            let mut hue = h;
            let mut colors = Vec::with_capacity(n as usize);
            for _ in 0..n {
                colors.push(color::hsl(
                    hue,
                    (s + rng.uniform(-10.0, 10.0)).clamp(20.0, 100.0),
                    (l + rng.uniform(-10.0, 10.0)).clamp(20.0, 85.0),
                ));
                let step = *rng.choice(&[30.0, 60.0, 120.0, 180.0]);
                hue += if rng.odds(0.5) { step } else { -step };
            }
            colors
        }
    };
    if rng.odds(0.6) {
        if rng.odds(0.5) {
            colors.push(color::hsl(h, 10.0, 95.0));
        }
        if rng.odds(0.5) {
            colors.push(color::hsl(h, 15.0, 8.0));
        }
        if rng.odds(0.5) {
            colors.push(color::hsl(h, s * 0.25, l));
        }
    }
    colors
}

#[cfg(test)]
mod test {
    use super::*;

    fn generator() -> PaletteGenerator {
        PaletteGenerator::new()
    }

    #[test]
    fn monochrome_ramps_lightness() {
        let mut rng = Lcg::with_seed(1);
        let palette = generator().generate_palette(
            ArtStyle::Default,
            ColorTheme::Monochrome,
            200.0,
            60.0,
            50.0,
            &mut rng,
        );
        assert_eq!(
            palette.colors(),
            [
                "hsl(200, 60%, 30%)",
                "hsl(200, 60%, 42%)",
                "hsl(200, 60%, 54%)",
                "hsl(200, 60%, 66%)",
                "hsl(200, 60%, 78%)",
            ]
        );
    }

    #[test]
    fn complementary_analogous_triadic_shapes() {
        let mut rng = Lcg::with_seed(1);
        let mut gen = generator();
        let comp = gen.generate_palette(
            ArtStyle::Default,
            ColorTheme::Complementary,
            10.0,
            50.0,
            50.0,
            &mut rng,
        );
        assert_eq!(comp.len(), 5);
        assert_eq!(comp.get(1), "hsl(190, 50%, 50%)");
        assert_eq!(comp.get(2), "hsl(10, 40%, 60%)");

        let ana = gen.generate_palette(
            ArtStyle::Default,
            ColorTheme::Analogous,
            10.0,
            50.0,
            50.0,
            &mut rng,
        );
        assert_eq!(ana.get(0), "hsl(310, 50%, 50%)");
        assert_eq!(ana.get(2), "hsl(10, 50%, 50%)");
        assert_eq!(ana.get(4), "hsl(70, 50%, 50%)");

        let tri = gen.generate_palette(
            ArtStyle::Default,
            ColorTheme::Triadic,
            0.0,
            80.0,
            80.0,
            &mut rng,
        );
        assert_eq!(tri.len(), 9);
        assert_eq!(tri.get(1), "hsl(0, 64%, 95%)");
        assert_eq!(tri.get(3), "hsl(120, 80%, 80%)");
    }

    #[test]
    fn palette_get_wraps() {
        let palette = Palette::new(vec!["#000".into(), "#fff".into()]);
        assert_eq!(palette.get(3), "#fff");
        assert_eq!(Palette::new(Vec::new()), Palette::fallback());
    }

    #[test]
    fn non_finite_input_falls_back() {
        let mut rng = Lcg::with_seed(1);
        let palette = generator().generate_palette(
            ArtStyle::NeonWaves,
            ColorTheme::Custom,
            f64::NAN,
            70.0,
            50.0,
            &mut rng,
        );
        assert_eq!(palette, Palette::fallback());
    }

    #[test]
    fn custom_theme_is_stable_without_cache() {
        let mut rng = Lcg::with_seed(1);
        let a = generator().generate_palette(
            ArtStyle::GlitchMosaic,
            ColorTheme::Custom,
            33.0,
            70.0,
            50.0,
            &mut rng,
        );
        let b = generator().generate_palette(
            ArtStyle::GlitchMosaic,
            ColorTheme::Custom,
            33.0,
            70.0,
            50.0,
            &mut rng,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn cache_evicts_least_recently_accessed() {
        let mut cache = PaletteCache::with_capacity(2);
        let key = |h: f64| {
            PaletteKey::new(ArtStyle::Default, ColorTheme::Custom, h, 50.0, 50.0).unwrap()
        };
        cache.insert(key(1.0), Palette::fallback());
        cache.insert(key(2.0), Palette::fallback());
        // Touch the older entry so the other one becomes the eviction candidate.
        assert!(cache.get(&key(1.0)).is_some());
        cache.insert(key(3.0), Palette::fallback());
        assert!(cache.contains(&key(1.0)));
        assert!(!cache.contains(&key(2.0)));
        assert!(cache.contains(&key(3.0)));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn hit_totals_survive_eviction() {
        let mut cache = PaletteCache::with_capacity(1);
        let key = |h: f64| {
            PaletteKey::new(ArtStyle::Default, ColorTheme::Custom, h, 50.0, 50.0).unwrap()
        };
        cache.insert(key(1.0), Palette::fallback());
        assert!(cache.get(&key(1.0)).is_some());
        assert!(cache.get(&key(1.0)).is_some());
        cache.insert(key(2.0), Palette::fallback());
        assert!(!cache.contains(&key(1.0)));
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.evictions, stats.entries), (2, 1, 1));
    }

    #[test]
    fn random_theme_has_no_key() {
        assert!(PaletteKey::new(ArtStyle::Default, ColorTheme::Random, 0.0, 0.0, 0.0).is_none());
    }

    #[test]
    fn theme_names_parse() {
        assert_eq!("Triadic".parse::<ColorTheme>(), Ok(ColorTheme::Triadic));
        let theme: ColorTheme = serde_json::from_str(r#""monochrome""#).unwrap();
        assert_eq!(theme, ColorTheme::Monochrome);
        assert!(serde_json::from_str::<ColorTheme>(r#""plaid""#).is_err());
    }
}
