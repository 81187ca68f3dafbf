//! Random number generator abstraction for determinism.
//!
//! In production, this wraps a real RNG. In tests, a seeded or
//! sequence-driven implementation is injected so answer shuffles and
//! category offers are repeatable.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;

    /// Generate a random `f64` in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64;
}

/// Production RNG backed by an OS-seeded `StdRng`.
#[derive(Debug)]
pub struct SystemRng(StdRng);

impl SystemRng {
    /// Creates a new RNG seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self(StdRng::from_os_rng())
    }
}

impl Default for SystemRng {
    fn default() -> Self {
        Self::new()
    }
}

impl DeterministicRng for SystemRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.0.random_range(min..=max)
    }

    fn next_f64(&mut self) -> f64 {
        self.0.random()
    }
}

/// Picks a uniformly random index in `0..len`.
///
/// Out-of-range values from a scripted RNG are clamped into range.
///
/// # Panics
///
/// Panics if `len` is zero.
#[allow(clippy::cast_possible_truncation)]
pub fn choose_index(rng: &mut dyn DeterministicRng, len: usize) -> usize {
    assert!(len > 0, "cannot choose from an empty range");
    let max = u32::try_from(len - 1).unwrap_or(u32::MAX);
    (rng.next_u32_range(0, max) as usize).min(len - 1)
}

/// Fisher-Yates shuffle driven by the injected RNG.
pub fn shuffle<T>(rng: &mut dyn DeterministicRng, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = choose_index(rng, i + 1);
        items.swap(i, j);
    }
}

/// Draws `count` distinct elements from `pool` without replacement.
///
/// Returns fewer than `count` elements when the pool is smaller.
pub fn sample_distinct<T: Clone>(
    rng: &mut dyn DeterministicRng,
    pool: &[T],
    count: usize,
) -> Vec<T> {
    let mut remaining: Vec<T> = pool.to_vec();
    let mut picked = Vec::with_capacity(count.min(remaining.len()));
    while picked.len() < count && !remaining.is_empty() {
        let idx = choose_index(rng, remaining.len());
        picked.push(remaining.swap_remove(idx));
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(Vec<u32>, usize);

    impl DeterministicRng for Scripted {
        fn next_u32_range(&mut self, _min: u32, _max: u32) -> u32 {
            let v = self.0[self.1];
            self.1 += 1;
            v
        }

        fn next_f64(&mut self) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_choose_index_clamps_out_of_range_values() {
        let mut rng = Scripted(vec![99], 0);
        assert_eq!(choose_index(&mut rng, 3), 2);
    }

    #[test]
    fn test_sample_distinct_never_repeats_an_element() {
        let mut rng = Scripted(vec![0, 0, 0], 0);
        let picked = sample_distinct(&mut rng, &[10, 20, 30, 40], 3);
        assert_eq!(picked, vec![10, 40, 30]);
    }

    #[test]
    fn test_sample_distinct_stops_when_pool_is_exhausted() {
        let mut rng = Scripted(vec![0, 0], 0);
        let picked = sample_distinct(&mut rng, &[1, 2], 3);
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn test_shuffle_with_zero_draws_rotates_deterministically() {
        let mut rng = Scripted(vec![0, 0, 0], 0);
        let mut items = vec!['a', 'b', 'c', 'd'];
        shuffle(&mut rng, &mut items);
        assert_eq!(items, vec!['b', 'c', 'd', 'a']);
    }

    #[test]
    fn test_system_rng_stays_within_bounds() {
        let mut rng = SystemRng::new();
        for _ in 0..100 {
            let v = rng.next_u32_range(2, 4);
            assert!((2..=4).contains(&v));
        }
    }
}
