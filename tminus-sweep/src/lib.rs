//! # tminus Sweep
//!
//! Background pre-generation of countdown frames.
//!
//! ## Features
//!
//! - **Placeholder on miss**: a cheap render answers the request immediately
//! - **Window sweeps**: the next hour of minute-quantized keys is rendered in a detached task
//! - **Deduplication**: at most one sweep per date, not repeated until its window expires
//! - **Time budget**: sweeps stop early once they exceed their wall-clock budget
//! - **Graceful shutdown**: running sweeps stop at their next offset
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tminus_cache::RecencyCache;
//! use tminus_render::GifRenderer;
//! use tminus_sweep::{GenerationCoordinator, SweepConfig};
//!
//! let coordinator = Arc::new(GenerationCoordinator::new(
//!     Arc::new(RecencyCache::new()),
//!     Arc::new(GifRenderer::new()),
//!     SweepConfig::default(),
//! )?);
//!
//! let placeholder = coordinator.handle_miss("2025-01-01", remaining).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod config;
mod coordinator;
mod state;

pub use config::SweepConfig;
pub use coordinator::{GenerationCoordinator, SweepOutcome, SweepReport};
pub use state::{GenerationState, SkipReason};
