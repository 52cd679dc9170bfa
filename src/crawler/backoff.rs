//! Linear backoff for transient fetch failures
//!
//! The delay starts at the configured base and grows by a fixed step after
//! every failure. Once it passes the ceiling the URL is given up.

use crate::config::RetryConfig;
use std::time::Duration;

/// Backoff state for a single URL
#[derive(Debug, Clone)]
pub struct Backoff {
    delay: Duration,
    step: Duration,
    ceiling: Duration,
    retries: u32,
}

impl Backoff {
    pub fn new(base: Duration, step: Duration, ceiling: Duration) -> Self {
        Self {
            delay: base,
            step,
            ceiling,
            retries: 0,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.base_delay(), config.step(), config.ceiling())
    }

    /// Registers a failure and returns how long to sleep before retrying
    ///
    /// Returns None once the grown delay exceeds the ceiling; the caller
    /// should give up. Successive `Some` values are strictly increasing as
    /// long as the step is non-zero.
    pub fn next_delay(&mut self) -> Option<Duration> {
        self.delay = self.delay.saturating_add(self.step);

        if self.delay > self.ceiling {
            return None;
        }

        self.retries += 1;
        Some(self.delay)
    }

    /// Number of retries granted so far
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// The delay most recently computed
    pub fn current_delay(&self) -> Duration {
        self.delay
    }
}
