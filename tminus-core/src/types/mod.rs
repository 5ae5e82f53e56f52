//! Domain types for tminus.
//!
//! - [`CountdownTarget`]: a validated target date and its instant
//! - [`Remaining`]: remaining time quantized to whole hours and minutes
//! - [`CacheKey`]: the stable `"<date>-<HH>h<MM>m"` identifier

mod key;
mod target;

pub use key::*;
pub use target::*;

/// Encoded animation bytes, shared cheaply between the cache and responses.
pub type Payload = bytes::Bytes;
