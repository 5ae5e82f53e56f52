//! Error types for tminus.
//!
//! A cache miss is not an error and never appears here; it is signalled by
//! `Option::None` from the cache.

use thiserror::Error;

/// Result type alias using `CountdownError`.
pub type Result<T> = std::result::Result<T, CountdownError>;

/// Main error type for all tminus operations.
#[derive(Debug, Error)]
pub enum CountdownError {
    // ═══════════════════════════════════════════════════════════════════════════
    // INPUT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The date parameter was missing or not `YYYY-MM-DD`.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Construction-time configuration was rejected.
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // RENDERING ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The renderer could not draw or encode the animation.
    #[error("Render failed: {0}")]
    Render(String),

    /// A background render task panicked or was cancelled by the runtime.
    #[error("Render task failed: {0}")]
    TaskFailed(String),
}

impl CountdownError {
    /// Returns true if the error came out of the rendering path.
    pub fn is_render_error(&self) -> bool {
        matches!(self, CountdownError::Render(_) | CountdownError::TaskFailed(_))
    }
}
