use rand::Rng as _;

// Linear congruential generator parameters. States stay below the modulus, well inside the
// exactly-representable integer range of an `f64`.
const MUL: u64 = 9301;
const INC: u64 = 49297;
pub const MODULUS: u64 = 233280;

/// Advances an LCG state by one step, returning the new state and its uniform deviate.
pub fn lcg_next(state: u64) -> (u64, f64) {
    let next = (state.wrapping_mul(MUL).wrapping_add(INC)) % MODULUS;
    (next, next as f64 / MODULUS as f64)
}

/// Polynomial string hash (`h = 31 * h + c` over UTF-16 code units, with 32-bit signed
/// wraparound), folded to its absolute value.
pub fn hash_seed(text: &str) -> u64 {
    let mut hash: i32 = 0;
    for unit in text.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    u64::from(hash.unsigned_abs())
}

/// A stream of uniform deviates in `[0, 1)`, plus the derived sampling helpers every renderer
/// uses.
pub trait RandomSource {
    /// Picks a random value uniformly distributed between `0.0` (inclusive) and `1.0`
    /// (exclusive).
    fn rnd(&mut self) -> f64;

    /// Picks a random value uniformly distributed between `min` (inclusive) and `max`
    /// (exclusive).
    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        self.rnd() * (max - min) + min
    }

    /// Picks an integer uniformly from `lo..hi`. Returns `lo` when the range is empty.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        lo + (self.rnd() * (hi - lo) as f64).floor() as i64
    }

    /// Picks `true` with probability roughly `p`, or `false` otherwise.
    fn odds(&mut self, p: f64) -> bool {
        self.rnd() < p
    }

    /// Chooses an item from `items` at a uniformly random index.
    ///
    /// # Panics
    ///
    /// Panics if `items.is_empty()`.
    fn choice<'a, T>(&mut self, items: &'a [T]) -> &'a T
    where
        Self: Sized,
    {
        let index = (self.rnd() * items.len() as f64) as usize;
        &items[index.min(items.len() - 1)]
    }

    /// Given a slice of `(item, weight)` pairs, chooses an `item` with probability proportional
    /// to its `weight`. (The name `wc` is short for *weighted choice*.)
    ///
    /// # Panics
    ///
    /// Panics if `weighted_items.is_empty()`.
    fn wc<'a, T, Weight: Into<f64> + Copy>(&mut self, weighted_items: &'a [(T, Weight)]) -> &'a T
    where
        Self: Sized,
    {
        let sum_weight: f64 = weighted_items.iter().map(|(_, w)| (*w).into()).sum();
        let bisection = sum_weight * self.rnd();

        let mut cum_weight: f64 = 0.0;
        for (value, weight) in weighted_items {
            cum_weight += (*weight).into();
            if cum_weight > bisection {
                return value;
            }
        }
        &weighted_items[weighted_items.len() - 1].0
    }

    /// Constructs a new vector with a random permutation of `xs`: every element draws an
    /// independent sort key and the result is ordered by key, ascending.
    fn shuffle<T, I: IntoIterator<Item = T>>(&mut self, xs: I) -> Vec<T>
    where
        Self: Sized,
    {
        let mut result: Vec<(f64, T)> = xs.into_iter().map(|x| (self.rnd(), x)).collect();
        result.sort_by(|(k1, _), (k2, _)| k1.total_cmp(k2));
        result.into_iter().map(|(_, x)| x).collect()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn rnd(&mut self) -> f64 {
        (**self).rnd()
    }
}

/// The seeded source: a small LCG whose stream depends only on its starting state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn with_seed(seed: u64) -> Self {
        Lcg { state: seed }
    }

    /// Seeds from arbitrary text through [`hash_seed`].
    pub fn from_text(text: &str) -> Self {
        Lcg::with_seed(hash_seed(text))
    }

    pub fn state(&self) -> u64 {
        self.state
    }
}

impl RandomSource for Lcg {
    fn rnd(&mut self) -> f64 {
        let (state, value) = lcg_next(self.state);
        self.state = state;
        value
    }
}

/// Non-deterministic source backed by the thread-local generator.
#[derive(Debug, Default)]
pub struct EntropySource {
    _private: (),
}

impl EntropySource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RandomSource for EntropySource {
    fn rnd(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// The studio-wide seed switch. Renderers never consult a global: each draw asks the switch for
/// a source and threads it through explicitly.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Ambient {
    seed: Option<u64>,
}

impl Ambient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a seed derived from `seed`, or restores non-deterministic randomness when `seed`
    /// is absent or empty.
    pub fn set_seed(&mut self, seed: Option<&str>) {
        self.seed = seed.filter(|s| !s.is_empty()).map(hash_seed);
        match self.seed {
            Some(state) => tracing::debug!(state, "ambient random source seeded"),
            None => tracing::debug!("ambient random source restored to entropy"),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn is_seeded(&self) -> bool {
        self.seed.is_some()
    }

    /// Returns the source for one draw. Seeded draws restart the stream from the installed seed,
    /// so two draws with identical inputs consume identical values.
    pub fn source(&self) -> AmbientSource {
        match self.seed {
            Some(state) => AmbientSource::Seeded(Lcg::with_seed(state)),
            None => AmbientSource::Entropy(EntropySource::new()),
        }
    }
}

#[derive(Debug)]
pub enum AmbientSource {
    Seeded(Lcg),
    Entropy(EntropySource),
}

impl RandomSource for AmbientSource {
    fn rnd(&mut self) -> f64 {
        match self {
            AmbientSource::Seeded(lcg) => lcg.rnd(),
            AmbientSource::Entropy(entropy) => entropy.rnd(),
        }
    }
}

/// The source a layer draws from: its own LCG when the parameter bag carries an explicit seed, or
/// the caller's source otherwise.
pub enum LayerRng<'a> {
    Local(Lcg),
    Shared(&'a mut dyn RandomSource),
}

impl<'a> LayerRng<'a> {
    pub fn new(seed: Option<u64>, shared: &'a mut dyn RandomSource) -> Self {
        match seed {
            Some(seed) => LayerRng::Local(Lcg::with_seed(seed)),
            None => LayerRng::Shared(shared),
        }
    }
}

impl RandomSource for LayerRng<'_> {
    fn rnd(&mut self) -> f64 {
        match self {
            LayerRng::Local(lcg) => lcg.rnd(),
            LayerRng::Shared(shared) => shared.rnd(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_hash_seed() {
        assert_eq!(hash_seed(""), 0);
        assert_eq!(hash_seed("abc"), 96354);
        assert_eq!(hash_seed("hello world"), 1794106052);
    }

    #[test]
    fn test_lcg_next() {
        assert_eq!(lcg_next(42), (206659, 0.8858839163237311));
        assert_eq!(lcg_next(206659).0, 190736);
    }

    #[test]
    fn test_rnd_sequence() {
        let mut rng = Lcg::with_seed(42);
        let us: [f64; 5] = std::array::from_fn(|_| rng.rnd());
        assert_eq!(
            us,
            [
                0.8858839163237311,
                0.8176268861454047,
                0.9589891975308642,
                0.7698473936899863,
                0.5619298696844993
            ]
        );
        assert_eq!(rng.state(), 131087);

        let mut rng = Lcg::from_text("abc");
        let us: [f64; 6] = std::array::from_fn(|_| rng.rnd());
        assert_eq!(
            us,
            [
                0.8975094307270233,
                0.9465363511659808,
                0.945923353909465,
                0.24443587105624143,
                0.709357853223594,
                0.9487139917695473
            ]
        );
    }

    #[test]
    fn test_uniform_and_range_bounds() {
        let mut rng = Lcg::with_seed(7);
        for _ in 0..1000 {
            let v = rng.uniform(-3.0, 5.0);
            assert!((-3.0..5.0).contains(&v), "got {}", v);
            let i = rng.range(2, 9);
            assert!((2..9).contains(&i), "got {}", i);
        }
        assert_eq!(rng.range(4, 4), 4);
    }

    #[test]
    fn test_choice_covers_all_items() {
        let mut rng = Lcg::with_seed(1);
        let colors = &["red", "green", "blue"];
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            seen.insert(*rng.choice(colors));
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_wc_respects_zero_weights() {
        let mut rng = Lcg::with_seed(3);
        let weighted_items = &[("never", 0.0), ("always", 2.0)];
        for _ in 0..200 {
            assert_eq!(*rng.wc(weighted_items), "always");
        }
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = Lcg::with_seed(99);
        assert_eq!(rng.shuffle(Vec::<()>::new()), Vec::<()>::new());
        assert_eq!(rng.shuffle(vec![777]), vec![777]);

        let colors = vec!['r', 'o', 'y', 'g', 'b', 'i', 'v'];
        let mut shuffled = rng.shuffle(colors.clone());
        shuffled.sort();
        let mut sorted = colors;
        sorted.sort();
        assert_eq!(shuffled, sorted);
    }

    #[test]
    fn test_ambient_seeded_draws_repeat() {
        let mut ambient = Ambient::new();
        ambient.set_seed(Some("abc"));
        let a: [f64; 4] = {
            let mut src = ambient.source();
            std::array::from_fn(|_| src.rnd())
        };
        let b: [f64; 4] = {
            let mut src = ambient.source();
            std::array::from_fn(|_| src.rnd())
        };
        assert_eq!(a, b);
        assert_eq!(a[0], 0.8975094307270233);
    }

    #[test]
    fn test_ambient_empty_seed_means_entropy() {
        let mut ambient = Ambient::new();
        ambient.set_seed(Some("abc"));
        assert!(ambient.is_seeded());
        ambient.set_seed(Some(""));
        assert!(!ambient.is_seeded());
        ambient.set_seed(Some("abc"));
        ambient.set_seed(None);
        assert!(matches!(ambient.source(), AmbientSource::Entropy(_)));
    }

    #[test]
    fn test_layer_rng_prefers_explicit_seed() {
        let mut shared = Lcg::with_seed(5);
        let mut local = LayerRng::new(Some(42), &mut shared);
        assert_eq!(local.rnd(), 0.8858839163237311);
        drop(local);
        // The shared stream was untouched.
        assert_eq!(shared.state(), 5);

        let mut borrowed = LayerRng::new(None, &mut shared);
        borrowed.rnd();
        drop(borrowed);
        assert_ne!(shared.state(), 5);
    }
}
