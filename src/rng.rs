//! Random number sources.
//!
//! The zoo never touches a global generator. Everything random (shop stock,
//! animal measurements, visitor counts) is drawn from a [`RandomSource`]
//! handed in at construction, so tests can script the draws.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform integers and Gaussian floats.
pub trait RandomSource: Send {
    /// Returns an integer uniformly drawn from the closed interval `[low, high]`.
    ///
    /// If `low > high` the bounds are swapped.
    fn uniform_int(&mut self, low: i64, high: i64) -> i64;

    /// Returns a sample from a normal distribution with the given mean and deviation.
    fn gaussian(&mut self, mean: f64, deviation: f64) -> f64;
}

fn ordered(low: i64, high: i64) -> (i64, i64) {
    if low <= high {
        (low, high)
    } else {
        (high, low)
    }
}

/// [`RandomSource`] backed by `rand`'s standard generator.
#[derive(Debug, Clone)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Creates a generator seeded from system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a reproducible generator.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for StdRandom {
    fn uniform_int(&mut self, low: i64, high: i64) -> i64 {
        let (low, high) = ordered(low, high);
        self.rng.gen_range(low..=high)
    }

    fn gaussian(&mut self, mean: f64, deviation: f64) -> f64 {
        // Box-Muller; u1 is kept in (0, 1] so ln(u1) stays finite.
        let u1: f64 = 1.0 - self.rng.gen::<f64>();
        let u2: f64 = self.rng.gen();
        let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
        mean + z * deviation
    }
}

/// Deterministic [`RandomSource`] that replays queued values.
///
/// Queued integers are clamped into the requested interval. Once a queue
/// runs dry, integers fall back to the lower bound and Gaussian samples
/// fall back to the mean.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    ints: VecDeque<i64>,
    gaussians: VecDeque<f64>,
}

impl ScriptedRandom {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues integers returned by successive `uniform_int` calls.
    #[must_use]
    pub fn with_ints(mut self, values: impl IntoIterator<Item = i64>) -> Self {
        self.ints.extend(values);
        self
    }

    /// Queues samples returned verbatim by successive `gaussian` calls.
    #[must_use]
    pub fn with_gaussians(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.gaussians.extend(values);
        self
    }

    /// Appends integers to the queue.
    pub fn push_ints(&mut self, values: impl IntoIterator<Item = i64>) {
        self.ints.extend(values);
    }

    /// Appends Gaussian samples to the queue.
    pub fn push_gaussians(&mut self, values: impl IntoIterator<Item = f64>) {
        self.gaussians.extend(values);
    }

    /// Number of integers still queued.
    #[must_use]
    pub fn remaining_ints(&self) -> usize {
        self.ints.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn uniform_int(&mut self, low: i64, high: i64) -> i64 {
        let (low, high) = ordered(low, high);
        self.ints.pop_front().map_or(low, |v| v.clamp(low, high))
    }

    fn gaussian(&mut self, mean: f64, _deviation: f64) -> f64 {
        self.gaussians.pop_front().unwrap_or(mean)
    }
}
