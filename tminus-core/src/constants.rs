//! Defaults for the cache, the sweep coordinator, and the renderer.

use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Number of rendered countdowns kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 2000;

// ═══════════════════════════════════════════════════════════════════════════════
// SWEEP
// ═══════════════════════════════════════════════════════════════════════════════

/// Number of one-minute offsets a sweep pre-generates.
pub const DEFAULT_WINDOW_MINUTES: u32 = 60;

/// Wall-clock budget for a single sweep.
pub const DEFAULT_SWEEP_BUDGET: Duration = Duration::from_secs(30);

/// Upper bound on dates whose window expiry is remembered.
pub const DEFAULT_MAX_TRACKED_DATES: usize = 1024;

// ═══════════════════════════════════════════════════════════════════════════════
// FRAMES
// ═══════════════════════════════════════════════════════════════════════════════

/// Full-size drawing width in pixels.
pub const FRAME_WIDTH: u32 = 900;

/// Full-size drawing height in pixels.
pub const FRAME_HEIGHT: u32 = 250;

/// Output frames are the full-size drawing divided by this factor.
pub const OUTPUT_SCALE_DIVISOR: u32 = 3;

/// Frames per animation, one per minute.
pub const FRAME_COUNT: u32 = 60;

/// Display time of a single frame (one minute).
pub const FRAME_DELAY_MS: u32 = 60_000;

// ═══════════════════════════════════════════════════════════════════════════════
// REQUESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// `chrono` format of the `date` query parameter.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 8080;
