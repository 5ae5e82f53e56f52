//! Sweep configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use tminus_core::constants::{
    DEFAULT_MAX_TRACKED_DATES, DEFAULT_SWEEP_BUDGET, DEFAULT_WINDOW_MINUTES,
};
use tminus_core::error::{CountdownError, Result};

/// Sweep configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SweepConfig {
    /// One-minute offsets covered by a sweep
    pub window_minutes: u32,
    /// Wall-clock budget after which a sweep stops early
    pub budget: Duration,
    /// Dates whose window expiry is remembered before the oldest is forgotten
    pub max_tracked_dates: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            window_minutes: DEFAULT_WINDOW_MINUTES,
            budget: DEFAULT_SWEEP_BUDGET,
            max_tracked_dates: DEFAULT_MAX_TRACKED_DATES,
        }
    }
}

impl SweepConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the window length in minutes.
    pub fn window_minutes(mut self, minutes: u32) -> Self {
        self.window_minutes = minutes;
        self
    }

    /// Sets the time budget.
    pub fn budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Sets how many dates keep their window expiry.
    pub fn max_tracked_dates(mut self, n: usize) -> Self {
        self.max_tracked_dates = n;
        self
    }

    /// Length of one window.
    pub fn window(&self) -> Duration {
        Duration::from_secs(u64::from(self.window_minutes) * 60)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.window_minutes == 0 {
            return Err(CountdownError::InvalidConfig("window_minutes must be positive".into()));
        }
        if self.max_tracked_dates == 0 {
            return Err(CountdownError::InvalidConfig(
                "max_tracked_dates must be positive".into(),
            ));
        }
        Ok(())
    }
}
