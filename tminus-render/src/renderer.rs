//! GIF countdown renderer.

use std::time::Instant;

use bytes::Bytes;
use chrono::Duration;
use image::codecs::gif::{GifEncoder, Repeat};
use image::imageops::{self, FilterType};
use image::{Delay, Frame, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use tminus_core::constants::{
    FRAME_COUNT, FRAME_DELAY_MS, FRAME_HEIGHT, FRAME_WIDTH, OUTPUT_SCALE_DIVISOR,
};
use tminus_core::error::{CountdownError, Result};
use tminus_core::traits::Renderer;

use crate::display::CountdownDisplay;
use crate::glyph;

const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);
const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Renderer configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Full-size drawing width
    pub width: u32,
    /// Full-size drawing height
    pub height: u32,
    /// Output frames are `width / scale_divisor` by `height / scale_divisor`
    pub scale_divisor: u32,
    /// Maximum frames per animation, one per minute
    pub frames: u32,
    /// Display time of each frame in milliseconds
    pub frame_delay_ms: u32,
    /// GIF quantizer speed, 1 (best) to 30 (fastest)
    pub encode_speed: i32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            scale_divisor: OUTPUT_SCALE_DIVISOR,
            frames: FRAME_COUNT,
            frame_delay_ms: FRAME_DELAY_MS,
            encode_speed: 10,
        }
    }
}

impl RenderConfig {
    /// Size of every emitted frame.
    pub fn output_size(&self) -> (u32, u32) {
        (self.width / self.scale_divisor, self.height / self.scale_divisor)
    }

    fn validate(&self) -> Result<()> {
        if self.scale_divisor == 0 {
            return Err(CountdownError::InvalidConfig("scale_divisor must be positive".into()));
        }
        let (w, h) = self.output_size();
        if w == 0 || h == 0 {
            return Err(CountdownError::InvalidConfig(format!(
                "output size {}x{} is empty",
                w, h
            )));
        }
        if self.frames == 0 {
            return Err(CountdownError::InvalidConfig("frames must be positive".into()));
        }
        if !(1..=30).contains(&self.encode_speed) {
            return Err(CountdownError::InvalidConfig(format!(
                "encode_speed {} outside 1..=30",
                self.encode_speed
            )));
        }
        Ok(())
    }
}

/// Renders countdowns as looping GIFs.
///
/// Frame `i` shows the remaining time minus `i` minutes. The animation stops
/// early once the countdown reaches zero.
///
/// Full mode draws at the configured size and downsamples with Lanczos3;
/// placeholder mode draws straight onto the output canvas and skips the
/// resampling pass.
#[derive(Clone, Debug)]
pub struct GifRenderer {
    config: RenderConfig,
}

impl GifRenderer {
    /// Creates a renderer with default configuration.
    pub fn new() -> Self {
        Self {
            config: RenderConfig::default(),
        }
    }

    /// Creates a renderer with custom configuration.
    pub fn with_config(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Remaining time shown on each frame.
    fn frame_times(&self, remaining: Duration) -> Vec<Duration> {
        let mut times = Vec::with_capacity(self.config.frames as usize);
        for i in 0..self.config.frames {
            let frame_remaining = remaining - Duration::minutes(i64::from(i));
            times.push(frame_remaining);
            if frame_remaining - Duration::minutes(1) <= Duration::zero() {
                break;
            }
        }
        times
    }

    fn draw_frame(&self, remaining: Duration, placeholder: bool) -> RgbaImage {
        let (out_w, out_h) = self.config.output_size();
        let glyphs = CountdownDisplay::from_duration(remaining).glyphs();

        if placeholder {
            let mut canvas = RgbaImage::from_pixel(out_w, out_h, PAPER);
            glyph::draw_centered(&mut canvas, &glyphs, INK);
            return canvas;
        }

        let mut canvas = RgbaImage::from_pixel(self.config.width, self.config.height, PAPER);
        glyph::draw_centered(&mut canvas, &glyphs, INK);
        imageops::resize(&canvas, out_w, out_h, FilterType::Lanczos3)
    }

    fn encode(&self, frames: Vec<RgbaImage>) -> Result<Bytes> {
        let delay = Delay::from_numer_denom_ms(self.config.frame_delay_ms, 1);
        let mut buf = Vec::new();
        {
            let mut encoder = GifEncoder::new_with_speed(&mut buf, self.config.encode_speed);
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(|e| CountdownError::Render(format!("GIF header: {e}")))?;
            encoder
                .encode_frames(frames.into_iter().map(|f| Frame::from_parts(f, 0, 0, delay)))
                .map_err(|e| CountdownError::Render(format!("GIF encode: {e}")))?;
        }
        Ok(Bytes::from(buf))
    }
}

impl Default for GifRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for GifRenderer {
    fn render(&self, remaining: Duration, placeholder: bool) -> Result<Bytes> {
        let start = Instant::now();
        let frames: Vec<RgbaImage> = self
            .frame_times(remaining)
            .into_iter()
            .map(|t| self.draw_frame(t, placeholder))
            .collect();
        let frame_count = frames.len();
        let gif = self.encode(frames)?;

        debug!(
            frames = frame_count,
            placeholder,
            bytes = gif.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Rendered countdown"
        );
        Ok(gif)
    }
}
