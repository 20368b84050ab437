use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

/// Seedable random stream backing all spawn-time jitter (colors, sizes,
/// rotation speeds). Recursive generators never draw from the shared
/// stream directly; they run against a private sub-stream via
/// [`with_seed`], so interleaving generation with spawn randomness can
/// never perturb either side.
#[derive(Debug, Clone)]
pub struct SceneRng {
    inner: SmallRng,
}

impl SceneRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_os_entropy() -> Self {
        Self {
            inner: SmallRng::from_os_rng(),
        }
    }

    pub fn next_int(&mut self) -> u32 {
        self.inner.next_u32()
    }

    /// Uniform draw in `[lo, hi)`. A degenerate range yields `lo`.
    pub fn next_in_range(&mut self, lo: f32, hi: f32) -> f32 {
        if lo >= hi {
            return lo;
        }
        self.inner.random_range(lo..hi)
    }
}

/// Runs `f` against a fresh stream seeded with `seed`. Any shared
/// [`SceneRng`] is left bit-for-bit untouched, which is what makes
/// seeded generation reproducible regardless of draw order.
pub fn with_seed<T>(seed: u64, f: impl FnOnce(&mut SceneRng) -> T) -> T {
    let mut local = SceneRng::seeded(seed);
    f(&mut local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_streams_repeat_exactly() {
        let mut a = SceneRng::seeded(42);
        let mut b = SceneRng::seeded(42);
        for _ in 0..64 {
            assert_eq!(a.next_int(), b.next_int());
        }
    }

    #[test]
    fn with_seed_leaves_shared_stream_untouched() {
        let mut reference = SceneRng::seeded(7);
        let expected: Vec<u32> = (0..16).map(|_| reference.next_int()).collect();

        let mut shared = SceneRng::seeded(7);
        let mut observed = Vec::new();
        for _ in 0..8 {
            observed.push(shared.next_int());
        }
        with_seed(999, |local| {
            for _ in 0..100 {
                local.next_int();
                local.next_in_range(0.0, 1.0);
            }
        });
        for _ in 0..8 {
            observed.push(shared.next_int());
        }

        assert_eq!(observed, expected);
    }

    #[test]
    fn with_seed_is_deterministic_per_seed() {
        let first = with_seed(31, |rng| (rng.next_int(), rng.next_int()));
        let second = with_seed(31, |rng| (rng.next_int(), rng.next_int()));
        let other = with_seed(32, |rng| (rng.next_int(), rng.next_int()));
        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn degenerate_range_returns_lo() {
        let mut rng = SceneRng::seeded(1);
        assert_eq!(rng.next_in_range(5.0, 5.0), 5.0);
        assert_eq!(rng.next_in_range(5.0, 2.0), 5.0);
    }

    #[test]
    fn range_draws_stay_in_bounds() {
        let mut rng = SceneRng::seeded(3);
        for _ in 0..256 {
            let value = rng.next_in_range(-2.0, 3.0);
            assert!((-2.0..3.0).contains(&value));
        }
    }
}
