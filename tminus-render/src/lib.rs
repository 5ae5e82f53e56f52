//! # tminus Render
//!
//! Draws the `DD : HH : MM` countdown as an animated GIF, one frame per
//! minute, and encodes it with the `image` crate.
//!
//! Glyphs are seven-segment digits built from filled rectangles, so the
//! renderer needs no font files at runtime.
//!
//! ## Example
//!
//! ```rust,ignore
//! use chrono::Duration;
//! use tminus_core::Renderer;
//! use tminus_render::GifRenderer;
//!
//! let renderer = GifRenderer::new();
//! let gif = renderer.render(Duration::hours(5), false)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod display;
mod glyph;
mod renderer;

pub use display::{CountdownDisplay, Glyph};
pub use renderer::{GifRenderer, RenderConfig};
