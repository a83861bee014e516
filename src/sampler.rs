// Random range sampler: the only source of nondeterminism in a session.
// Uses rand's uniform distribution, seeded through StdRng for reproducible runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::*;

/// Draws one simulated measurement from a range.
pub trait UniformSampler {
    /// Uniform draw from `[low, high]`. Bounds may arrive in either order.
    fn draw_uniform(&mut self, low: f64, high: f64) -> f64;
}

/// Sampler backed by any `rand` generator.
pub struct RandomSampler<R: Rng = StdRng> {
    rng: R,
}

impl RandomSampler<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl<R: Rng> RandomSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> UniformSampler for RandomSampler<R> {
    fn draw_uniform(&mut self, low: f64, high: f64) -> f64 {
        let (lo, hi) = if low <= high { (low, high) } else { (high, low) };
        // gen_range panics on NaN and infinite bounds; collapse those to `lo`
        if !(lo.is_finite() && hi.is_finite()) || lo == hi {
            return lo;
        }
        // finite bounds whose span overflows f64: draw on the halved range and scale back
        if !(hi - lo).is_finite() {
            let half = self.rng.gen_range(lo / 2.0..=hi / 2.0);
            return (half * 2.0).clamp(lo, hi);
        }
        self.rng.gen_range(lo..=hi)
    }
}

fn draw(sampler: &mut impl UniformSampler, bounds: BoundPair) -> f64 {
    sampler.draw_uniform(bounds.low, bounds.high)
}

/// Three independent draws for one vessel.
pub fn sample_reading(sampler: &mut impl UniformSampler, bounds: &ReadingBounds) -> BloodGasReading {
    BloodGasReading {
        hemoglobin: draw(sampler, bounds.hemoglobin),
        saturation: draw(sampler, bounds.saturation),
        partial_pressure: draw(sampler, bounds.partial_pressure),
    }
}

/// Raw values of one sampling event: arterial, venous and flow rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub arterial: BloodGasReading,
    pub venous: BloodGasReading,
    pub flow_rate: f64,
}

/// Six blood-gas draws plus one flow draw, arterial first.
pub fn sample_tier(sampler: &mut impl UniformSampler, bounds: &TierBounds) -> RawSample {
    let arterial = sample_reading(sampler, &bounds.arterial);
    let venous = sample_reading(sampler, &bounds.venous);
    let flow_rate = draw(sampler, bounds.flow);
    RawSample {
        arterial,
        venous,
        flow_rate,
    }
}
