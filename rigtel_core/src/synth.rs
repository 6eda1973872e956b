//! Synthetic telemetry: a bounded random walk per channel.
//!
//! Used when no transport can be opened, so downstream consumers see the
//! same interface with synthetic provenance. Baselines and step bounds match
//! the bench simulator the rig shipped with.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::channel::Channel;
use crate::util::round_to;

/// Walk baselines in wire order: W, V, dB, Nm, rpm, Hz.
const BASELINES: [f64; Channel::COUNT] = [200.0, 240.0, 50.0, 300.0, 12_000.0, 0.5];

/// Per-tick step bound for each channel (uniform in ±step).
const STEPS: [f64; Channel::COUNT] = [50.0, 20.0, 10.0, 50.0, 1_000.0, 0.2];

/// Seedable per-channel random walk, clamped at zero.
#[derive(Debug)]
pub struct SyntheticGenerator {
    rng: StdRng,
    values: [f64; Channel::COUNT],
}

impl SyntheticGenerator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic generator for reproducible runs and tests.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            values: BASELINES,
        }
    }

    /// Advance the walk one tick and return the six values in wire order,
    /// rounded to channel precision.
    pub fn next_values(&mut self) -> [f64; Channel::COUNT] {
        let mut out = [0f64; Channel::COUNT];
        for channel in Channel::ALL {
            let i = channel.index();
            let step = self.rng.gen_range(-STEPS[i]..=STEPS[i]);
            // Plausibility floor: none of these quantities goes negative.
            self.values[i] = (self.values[i] + step).max(0.0);
            out[i] = round_to(self.values[i], channel.decimals());
        }
        out
    }
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self::new()
    }
}
