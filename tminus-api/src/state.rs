//! App state: cache, renderer, coordinator, config.

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::warn;

use tminus_cache::{CacheConfig, RecencyCache};
use tminus_core::constants::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_TRACKED_DATES, DEFAULT_PORT, DEFAULT_SWEEP_BUDGET,
    DEFAULT_WINDOW_MINUTES,
};
use tminus_core::error::Result;
use tminus_core::traits::Renderer;
use tminus_render::GifRenderer;
use tminus_sweep::{GenerationCoordinator, SweepConfig};

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Listening port
    pub port: u16,
    /// Rendered countdowns kept in memory
    pub cache_capacity: usize,
    /// Minutes pre-generated per sweep
    pub window_minutes: u32,
    /// Wall-clock budget per sweep, in seconds
    pub sweep_budget_secs: u64,
    /// Dates whose sweep window is remembered
    pub max_tracked_dates: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            window_minutes: DEFAULT_WINDOW_MINUTES,
            sweep_budget_secs: DEFAULT_SWEEP_BUDGET.as_secs(),
            max_tracked_dates: DEFAULT_MAX_TRACKED_DATES,
        }
    }
}

impl ApiConfig {
    /// Reads configuration from the environment, loading `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Self {
            port: env_or("PORT", defaults.port),
            cache_capacity: env_or("CACHE_CAPACITY", defaults.cache_capacity),
            window_minutes: env_or("SWEEP_WINDOW_MINUTES", defaults.window_minutes),
            sweep_budget_secs: env_or("SWEEP_BUDGET_SECS", defaults.sweep_budget_secs),
            max_tracked_dates: env_or("MAX_TRACKED_DATES", defaults.max_tracked_dates),
        }
    }

    /// Cache section.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            capacity: self.cache_capacity,
        }
    }

    /// Sweep section.
    pub fn sweep_config(&self) -> SweepConfig {
        SweepConfig::new()
            .window_minutes(self.window_minutes)
            .budget(Duration::from_secs(self.sweep_budget_secs))
            .max_tracked_dates(self.max_tracked_dates)
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(var = name, value = %raw, "Ignoring unparsable environment variable");
            default
        }),
        Err(_) => default,
    }
}

/// Shared state handed to every request handler.
pub struct AppState {
    /// Cache lookups and miss handling
    pub coordinator: Arc<GenerationCoordinator>,
    /// When the state was created
    pub started_at: Instant,
}

impl AppState {
    /// Builds the state with the GIF renderer.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Self::with_renderer(config, Arc::new(GifRenderer::new()))
    }

    /// Builds the state around any renderer.
    pub fn with_renderer(config: ApiConfig, renderer: Arc<dyn Renderer>) -> Result<Self> {
        let cache = Arc::new(RecencyCache::with_config(config.cache_config())?);
        let coordinator = GenerationCoordinator::new(cache, renderer, config.sweep_config())?;

        Ok(Self {
            coordinator: Arc::new(coordinator),
            started_at: Instant::now(),
        })
    }
}
