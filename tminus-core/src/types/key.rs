//! Cache key derivation.
//!
//! Every request inside the same minute collapses onto one key, so the key
//! only carries the date and the remaining time rounded down to minutes.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Remaining time rounded down to whole hours and minutes.
///
/// Negative durations (targets in the past) clamp to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Remaining {
    /// Whole hours remaining (not wrapped at 24)
    pub hours: u64,
    /// Minutes past the whole hour (0..60)
    pub minutes: u8,
}

impl Remaining {
    /// Quantizes a signed duration.
    pub fn from_duration(remaining: Duration) -> Self {
        let total = u64::try_from(remaining.num_minutes()).unwrap_or(0);
        Self {
            hours: total / 60,
            minutes: (total % 60) as u8,
        }
    }

    /// Total whole minutes represented.
    pub fn total_minutes(&self) -> u64 {
        self.hours * 60 + u64::from(self.minutes)
    }

    /// Returns true once the target has been reached.
    pub fn is_elapsed(&self) -> bool {
        self.total_minutes() == 0
    }
}

/// Stable cache key: `"<dateIdentifier>-<HH>h<MM>m"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for `date_id` with `remaining` time left.
    pub fn derive(date_id: &str, remaining: Duration) -> Self {
        Self::from_parts(date_id, Remaining::from_duration(remaining))
    }

    /// Builds the key from an already quantized remaining time.
    pub fn from_parts(date_id: &str, remaining: Remaining) -> Self {
        Self(format!(
            "{}-{:02}h{:02}m",
            date_id, remaining.hours, remaining.minutes
        ))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key, returning the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}
