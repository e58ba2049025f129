//! Uniform range sampling behind a trait so generation can run against a
//! seeded source in tests and a session source in play.

use crate::error::EstateError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform samples over inclusive ranges.
pub trait RandomRangeProvider {
    /// Uniform integer in `[min, max]`.
    fn uniform_int(&mut self, min: i64, max: i64) -> Result<i64, EstateError>;
    /// Uniform real in `[min, max]`.
    fn uniform_real(&mut self, min: f64, max: f64) -> Result<f64, EstateError>;
}

impl<R: RandomRangeProvider + ?Sized> RandomRangeProvider for &mut R {
    fn uniform_int(&mut self, min: i64, max: i64) -> Result<i64, EstateError> {
        (**self).uniform_int(min, max)
    }

    fn uniform_real(&mut self, min: f64, max: f64) -> Result<f64, EstateError> {
        (**self).uniform_real(min, max)
    }
}

/// ChaCha8-backed provider; the same seed yields the same sequence.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomRangeProvider for SeededRandom {
    fn uniform_int(&mut self, min: i64, max: i64) -> Result<i64, EstateError> {
        if min > max {
            return Err(EstateError::InvalidRange {
                field: "uniform_int",
                min: min as f64,
                max: max as f64,
            });
        }
        Ok(self.rng.gen_range(min..=max))
    }

    fn uniform_real(&mut self, min: f64, max: f64) -> Result<f64, EstateError> {
        if !(min.is_finite() && max.is_finite()) || min > max {
            return Err(EstateError::InvalidRange {
                field: "uniform_real",
                min,
                max,
            });
        }
        if min == max {
            return Ok(min);
        }
        Ok(self.rng.gen_range(min..=max))
    }
}

/// Fisher-Yates shuffle driven by the provider, so shuffles replay under a seed.
pub fn shuffle<T, R: RandomRangeProvider + ?Sized>(
    items: &mut [T],
    rng: &mut R,
) -> Result<(), EstateError> {
    for i in (1..items.len()).rev() {
        let j = rng.uniform_int(0, i as i64)? as usize;
        items.swap(i, j);
    }
    Ok(())
}

/// Weighted selection over a fixed set of entries.
///
/// Each entry stores the running total of weights up to and including itself;
/// a draw in `[0, total]` selects the first entry whose running total covers it.
#[derive(Clone, Debug)]
pub struct WeightedBag<T> {
    entries: Vec<(T, f64)>,
    total: f64,
}

impl<T> Default for WeightedBag<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            total: 0.0,
        }
    }
}

impl<T> WeightedBag<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Non-positive or non-finite weights are ignored.
    pub fn add_entry(&mut self, item: T, weight: f64) {
        if !(weight.is_finite() && weight > 0.0) {
            return;
        }
        self.total += weight;
        self.entries.push((item, self.total));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draw one entry. Returns `None` when the bag is empty.
    pub fn pick<R: RandomRangeProvider + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Option<&T>, EstateError> {
        if self.entries.is_empty() {
            return Ok(None);
        }
        let r = rng.uniform_real(0.0, self.total)?;
        let hit = self
            .entries
            .iter()
            .find(|(_, acc)| *acc >= r)
            .or_else(|| self.entries.last());
        Ok(hit.map(|(item, _)| item))
    }
}
