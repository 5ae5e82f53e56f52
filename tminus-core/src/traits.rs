//! Common traits for tminus.
//!
//! The coordinator only ever talks to the rendering engine through
//! [`Renderer`], which keeps the sweep logic testable with stub renderers.

use bytes::Bytes;
use chrono::Duration;

use crate::error::Result;

// ═══════════════════════════════════════════════════════════════════════════════
// RENDERER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Produces an encoded countdown animation.
///
/// Implementations are CPU-bound and may take a noticeable amount of
/// wall-clock time. Callers must not hold any cache lock while rendering.
pub trait Renderer: Send + Sync {
    /// Renders the animation for `remaining` time until the target.
    ///
    /// `placeholder` selects the cheap, reduced-fidelity mode used to answer
    /// a cache miss immediately.
    fn render(&self, remaining: Duration, placeholder: bool) -> Result<Bytes>;
}
