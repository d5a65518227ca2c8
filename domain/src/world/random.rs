//! Injectable randomness
//!
//! Grouping, speaking order, group sizes and the thought-bubble sample are all
//! randomized. Every such decision goes through [`RandomSource`] so production
//! code can use an entropy-seeded generator while tests script exact outcomes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Source of uniform random choices
pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..upper`. Returns 0 when `upper` is 0.
    fn next_index(&self, upper: usize) -> usize;
}

/// Fisher-Yates shuffle driven by `random`
pub fn shuffle<T>(items: &mut [T], random: &dyn RandomSource) {
    for i in (1..items.len()).rev() {
        let j = random.next_index(i + 1).min(i);
        items.swap(i, j);
    }
}

/// Up to `count` items chosen without replacement
pub fn sample<T: Clone>(items: &[T], count: usize, random: &dyn RandomSource) -> Vec<T> {
    let mut pool = items.to_vec();
    shuffle(&mut pool, random);
    pool.truncate(count);
    pool
}

/// Uniform integer in `low..=high` (returns `low` when `high <= low`)
pub fn between(low: usize, high: usize, random: &dyn RandomSource) -> usize {
    if high <= low {
        return low;
    }
    low + random.next_index(high - low + 1).min(high - low)
}

/// [`RandomSource`] backed by a seedable standard generator
pub struct StdRandom {
    rng: Mutex<StdRng>,
}

impl StdRandom {
    /// Seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for StdRandom {
    fn next_index(&self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(0..upper)
    }
}

/// Deterministic [`RandomSource`] for tests and replays
pub enum ScriptedRandom {
    /// Always `upper - 1`: shuffles keep their input order, sizes take the maximum
    Highest,
    /// Always 0: sizes take the minimum
    Lowest,
    /// Cycles through the given values, each reduced modulo `upper`
    Sequence(Mutex<(Vec<usize>, usize)>),
}

impl ScriptedRandom {
    pub fn sequence(values: Vec<usize>) -> Self {
        Self::Sequence(Mutex::new((values, 0)))
    }
}

impl RandomSource for ScriptedRandom {
    fn next_index(&self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        match self {
            ScriptedRandom::Highest => upper - 1,
            ScriptedRandom::Lowest => 0,
            ScriptedRandom::Sequence(state) => {
                let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
                let (values, cursor) = &mut *guard;
                if values.is_empty() {
                    return 0;
                }
                let value = values[*cursor % values.len()];
                *cursor += 1;
                value % upper
            }
        }
    }
}
