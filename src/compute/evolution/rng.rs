//! Random source used by initialization, breeding and mutation.

use rand::prelude::*;

/// Abstract random source.
///
/// Breeding tasks run in parallel, so each task gets its own source from
/// [`RandomSource::fork`] before the parallel section starts.
pub trait RandomSource {
    /// Uniform integer in `0..bound`. `bound` must be positive.
    fn index(&mut self, bound: usize) -> usize;

    /// Fair coin flip.
    fn coin(&mut self) -> bool;

    /// Independent source for a parallel task.
    fn fork(&mut self) -> Self
    where
        Self: Sized;

    /// True with probability `percent / 100`. Non-positive rates never fire.
    fn chance_percent(&mut self, percent: i32) -> bool {
        percent > 0 && (self.index(100) as i32) < percent
    }

    /// Uniform shuffle.
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }

    /// Index in `0..len` that avoids the top `band` entries.
    ///
    /// A draw below `band` is moved up by `band`; if that leaves the range it
    /// wraps back into `band..len`. With `band >= len` every index is allowed.
    fn index_outside_band(&mut self, len: usize, band: usize) -> usize {
        let drawn = self.index(len);
        if band >= len || drawn >= band {
            return drawn;
        }
        let remapped = drawn + band;
        if remapped < len {
            remapped
        } else {
            band + (remapped - band) % (len - band)
        }
    }
}

/// Seedable random source backed by [`StdRng`].
pub struct SolverRng {
    rng: StdRng,
}

impl SolverRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SolverRng {
    fn index(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }

    fn coin(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn fork(&mut self) -> Self {
        Self::new(self.rng.next_u64())
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}
