//! DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use tminus_cache::CacheStats;

/// Query string of `GET /countdown`.
#[derive(Debug, Deserialize)]
pub struct CountdownQuery {
    /// Target date, `YYYY-MM-DD`
    pub date: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status
    pub status: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Entries currently cached
    pub cached_countdowns: usize,
}

/// Cache and sweep statistics.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Cache counters
    pub cache: CacheStats,
    /// Dates with a remembered sweep window
    pub tracked_dates: usize,
    /// Minutes pre-generated per sweep
    pub window_minutes: u32,
    /// Sweep budget in seconds
    pub sweep_budget_secs: u64,
}
