//! # tminus Core
//!
//! Core types, errors, and traits shared by every tminus crate.
//!
//! - **Types**: countdown targets, quantized remaining time, cache keys
//! - **Errors**: a single `thiserror` hierarchy used across the workspace
//! - **Constants**: cache, sweep, and frame defaults
//! - **Traits**: the [`Renderer`] seam between the coordinator and the GIF engine
//!
//! ## Example
//!
//! ```rust
//! use chrono::Duration;
//! use tminus_core::CacheKey;
//!
//! let key = CacheKey::derive("2025-01-01", Duration::hours(5) + Duration::minutes(3));
//! assert_eq!(key.as_str(), "2025-01-01-05h03m");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{CountdownError, Result};
pub use traits::*;
pub use types::*;
