use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// Source of every random decision made during turn resolution.
///
/// Each draw carries a `reason` so scripted sources can report what asked for
/// a value. Implementations must be synchronous.
pub trait RandomSource {
    /// Uniform integer in `low..=high`.
    fn int_range(&mut self, low: u32, high: u32, reason: &str) -> u32;

    /// Uniform float in `[low, high]`.
    fn float_range(&mut self, low: f64, high: f64, reason: &str) -> f64;

    /// Percentage roll. 0 never succeeds and 100 always does; neither draws.
    fn chance(&mut self, percent: u8, reason: &str) -> bool {
        match percent {
            0 => false,
            100.. => true,
            _ => self.int_range(1, 100, reason) <= percent as u32,
        }
    }
}

/// Seedable source for live battles and batch simulation.
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRng {
    fn int_range(&mut self, low: u32, high: u32, reason: &str) -> u32 {
        let value = if high <= low {
            low
        } else {
            self.inner.random_range(low..=high)
        };
        trace!(reason, value, "rng int draw");
        value
    }

    fn float_range(&mut self, low: f64, high: f64, reason: &str) -> f64 {
        let value = if high <= low {
            low
        } else {
            self.inner.random_range(low..=high)
        };
        trace!(reason, value, "rng float draw");
        value
    }
}

/// Replays pre-chosen percentile outcomes (1..=100).
///
/// An outcome of 1 maps to the bottom of any requested range and 100 to the
/// top, so `chance(p)` succeeds exactly when the outcome is at most `p`.
pub struct ScriptedRng {
    outcomes: Vec<u8>,
    index: usize,
    fallback: Option<u8>,
}

impl ScriptedRng {
    pub fn new_for_test(outcomes: Vec<u8>) -> Self {
        Self {
            outcomes,
            index: 0,
            fallback: None,
        }
    }

    /// Every draw returns the same outcome.
    pub fn repeating(outcome: u8) -> Self {
        Self::new_for_test(Vec::new()).with_fallback(outcome)
    }

    /// Outcome used once the script runs out.
    pub fn with_fallback(mut self, outcome: u8) -> Self {
        self.fallback = Some(outcome);
        self
    }

    pub fn consumed(&self) -> usize {
        self.index
    }

    pub fn next_outcome(&mut self, reason: &str) -> u8 {
        let outcome = match self.outcomes.get(self.index) {
            Some(outcome) => *outcome,
            None => match self.fallback {
                Some(fallback) => fallback,
                None => panic!(
                    "ScriptedRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                    reason
                ),
            },
        };
        self.index += 1;
        let outcome = outcome.clamp(1, 100);
        trace!(reason, outcome, "scripted rng draw");
        outcome
    }
}

impl RandomSource for ScriptedRng {
    fn int_range(&mut self, low: u32, high: u32, reason: &str) -> u32 {
        let outcome = self.next_outcome(reason) as u64;
        if high <= low {
            return low;
        }
        let span = (high - low) as u64 + 1;
        low + ((outcome - 1) * span / 100).min(span - 1) as u32
    }

    fn float_range(&mut self, low: f64, high: f64, reason: &str) -> f64 {
        match self.next_outcome(reason) {
            1 => low,
            100 => high,
            outcome => low + (high - low) * (outcome as f64 - 1.0) / 99.0,
        }
    }
}
