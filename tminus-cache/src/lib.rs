//! Bounded recency cache for rendered countdowns.
//!
//! Fixed-capacity key → value store with least-recently-used eviction,
//! safe to share between request handlers and background sweeps.

mod cache;

pub use cache::{CacheConfig, CacheStats, RecencyCache};
