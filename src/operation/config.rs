//! Run configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeout and stagger settings for one run
///
/// Zero disables either setting: a zero timeout waits indefinitely and a zero
/// delay releases every task without stagger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Bound on the whole batch, in milliseconds
    pub timeout_ms: u64,

    /// Extra sleep per task position after release, in milliseconds
    pub delay_ms: u64,
}

impl RunConfig {
    /// Configuration with no timeout and no stagger
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batch timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = duration_to_ms(timeout);
        self
    }

    /// Set the per-position stagger delay
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_ms = duration_to_ms(delay);
        self
    }

    /// Batch timeout; zero means none
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Per-position stagger; zero means none
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`
pub(crate) fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Stagger for the task at `position`, saturating on overflow
pub(crate) fn stagger(position: usize, delay: Duration) -> Duration {
    u32::try_from(position)
        .ok()
        .and_then(|n| delay.checked_mul(n))
        .unwrap_or(Duration::MAX)
}
