//! Timed suspension and hold sampling.
//!
//! Stage holds are cooperative: the engine awaits [`Scheduler::hold`], which
//! yields back to the runtime until the delay elapses.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::workflow::HoldRange;

/// Suspends the current run for a stage hold.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn hold(&self, duration: Duration);
}

/// Scheduler backed by `tokio::time::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn hold(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Scheduler that returns immediately. Used by `--fast` runs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateScheduler;

#[async_trait]
impl Scheduler for ImmediateScheduler {
    async fn hold(&self, _duration: Duration) {
        tokio::task::yield_now().await;
    }
}

/// Draws stage holds uniformly from a [`HoldRange`].
pub struct DelaySampler {
    rng: Mutex<StdRng>,
}

impl Default for DelaySampler {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl DelaySampler {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sampler for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn sample(&self, range: HoldRange) -> Duration {
        if range.jitter_ms == 0 {
            return range.min();
        }
        let extra = match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..range.jitter_ms),
            // A poisoned lock only means another sampler call panicked.
            Err(poisoned) => poisoned.into_inner().gen_range(0..range.jitter_ms),
        };
        Duration::from_millis(range.base_ms + extra)
    }
}
