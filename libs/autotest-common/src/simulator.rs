//! Run Simulator - synthetic execution of stored test cases
//!
//! Nothing is executed. A run waits `min(400ms, 50ms * count)` and then draws,
//! per test case and in input order:
//! - status: `pass` when a uniform draw in [0, 1) is above 0.2, else `fail`
//! - duration: `floor(150 + draw * 600)` ms, so always in [150, 750)
//!
//! The random source is injected so callers can script the draws.

use crate::types::{RunResult, RunStatus, TestCase};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::debug;

pub const FAIL_THRESHOLD: f64 = 0.2;
pub const MIN_DURATION_MS: f64 = 150.0;
pub const DURATION_SPREAD_MS: f64 = 600.0;
pub const DELAY_PER_CASE: Duration = Duration::from_millis(50);
pub const MAX_DELAY: Duration = Duration::from_millis(400);

/// Source of uniform draws in [0, 1)
pub trait RandomSource: Send {
    fn next_unit(&mut self) -> f64;
}

/// Entropy-seeded default source
pub struct SystemRandom(StdRng);

impl SystemRandom {
    pub fn new() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SystemRandom {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Artificial latency for a run over `count` test cases
pub fn simulated_delay(count: usize) -> Duration {
    if count == 0 {
        return Duration::ZERO;
    }
    let count = u32::try_from(count).unwrap_or(u32::MAX);
    DELAY_PER_CASE.saturating_mul(count).min(MAX_DELAY)
}

pub fn status_for(draw: f64) -> RunStatus {
    if draw > FAIL_THRESHOLD {
        RunStatus::Pass
    } else {
        RunStatus::Fail
    }
}

pub fn duration_for(draw: f64) -> u64 {
    (MIN_DURATION_MS + draw * DURATION_SPREAD_MS).floor() as u64
}

/// Draw one result; status is drawn before duration
pub fn simulate_one(test_case: &TestCase, source: &mut dyn RandomSource) -> RunResult {
    let status = status_for(source.next_unit());
    let duration_ms = duration_for(source.next_unit());
    RunResult {
        id: test_case.id,
        name: test_case.name.clone(),
        status,
        duration_ms,
    }
}

pub struct RunSimulator {
    source: Mutex<Box<dyn RandomSource>>,
}

impl RunSimulator {
    pub fn new() -> Self {
        Self::with_source(SystemRandom::new())
    }

    pub fn with_source<R: RandomSource + 'static>(source: R) -> Self {
        Self {
            source: Mutex::new(Box::new(source)),
        }
    }

    /// Simulate a run; returns immediately for an empty input.
    /// The delay yields to the runtime, other requests keep being served.
    pub async fn run(&self, test_cases: &[TestCase]) -> Vec<RunResult> {
        if test_cases.is_empty() {
            return Vec::new();
        }

        let delay = simulated_delay(test_cases.len());
        debug!(count = test_cases.len(), delay_ms = delay.as_millis() as u64, "Simulating run");
        tokio::time::sleep(delay).await;

        let mut source = self.source.lock();
        test_cases
            .iter()
            .map(|tc| simulate_one(tc, &mut **source))
            .collect()
    }
}

impl Default for RunSimulator {
    fn default() -> Self {
        Self::new()
    }
}
