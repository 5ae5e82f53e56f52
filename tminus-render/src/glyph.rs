//! Seven-segment glyph geometry.
//!
//! ```text
//!  aaa
//! f   b
//!  ggg
//! e   c
//!  ddd
//! ```

use image::{Rgba, RgbaImage};

use crate::display::Glyph;

const SEG_A: u8 = 1 << 0;
const SEG_B: u8 = 1 << 1;
const SEG_C: u8 = 1 << 2;
const SEG_D: u8 = 1 << 3;
const SEG_E: u8 = 1 << 4;
const SEG_F: u8 = 1 << 5;
const SEG_G: u8 = 1 << 6;

/// Lit segments for digits 0..=9.
const DIGIT_SEGMENTS: [u8; 10] = [
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,
    SEG_B | SEG_C,
    SEG_A | SEG_B | SEG_D | SEG_E | SEG_G,
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_G,
    SEG_B | SEG_C | SEG_F | SEG_G,
    SEG_A | SEG_C | SEG_D | SEG_F | SEG_G,
    SEG_A | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,
    SEG_A | SEG_B | SEG_C,
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_F | SEG_G,
];

/// Sizes derived from the canvas height.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GlyphMetrics {
    digit_width: u32,
    digit_height: u32,
    stroke: u32,
    spacing: u32,
}

impl GlyphMetrics {
    /// Digits take 60% of the canvas height.
    pub(crate) fn for_canvas(height: u32) -> Self {
        let digit_height = (height * 3 / 5).max(5);
        let stroke = (digit_height / 9).max(1);
        Self {
            digit_width: digit_height / 2,
            digit_height,
            stroke,
            spacing: stroke,
        }
    }

    fn advance(&self, glyph: Glyph) -> u32 {
        match glyph {
            Glyph::Digit(_) => self.digit_width + self.spacing,
            // " : " gets breathing room on both sides
            Glyph::Colon => self.stroke * 5 + self.spacing,
        }
    }

    /// Width of the whole sequence, without trailing spacing.
    pub(crate) fn text_width(&self, glyphs: &[Glyph]) -> u32 {
        let total: u32 = glyphs.iter().map(|g| self.advance(*g)).sum();
        total.saturating_sub(self.spacing)
    }
}

/// Draws `glyphs` centred on `canvas`.
pub(crate) fn draw_centered(canvas: &mut RgbaImage, glyphs: &[Glyph], ink: Rgba<u8>) {
    let metrics = GlyphMetrics::for_canvas(canvas.height());
    let width = metrics.text_width(glyphs);
    let mut x = canvas.width().saturating_sub(width) / 2;
    let y = canvas.height().saturating_sub(metrics.digit_height) / 2;

    for glyph in glyphs {
        match *glyph {
            Glyph::Digit(d) => draw_digit(canvas, &metrics, x, y, d, ink),
            Glyph::Colon => draw_colon(canvas, &metrics, x, y, ink),
        }
        x += metrics.advance(*glyph);
    }
}

fn draw_digit(canvas: &mut RgbaImage, m: &GlyphMetrics, x: u32, y: u32, digit: u8, ink: Rgba<u8>) {
    let segments = DIGIT_SEGMENTS[usize::from(digit % 10)];
    let (w, h, t) = (m.digit_width, m.digit_height, m.stroke);
    let half = h / 2;
    let inner = w.saturating_sub(2 * t);
    let upper = half.saturating_sub(t);
    let lower = (h - half).saturating_sub(t);

    let rects = [
        (SEG_A, t, 0, inner, t),
        (SEG_B, w - t, t, t, upper),
        (SEG_C, w - t, half, t, lower),
        (SEG_D, t, h - t, inner, t),
        (SEG_E, 0, half, t, lower),
        (SEG_F, 0, t, t, upper),
        (SEG_G, t, half.saturating_sub(t / 2), inner, t),
    ];
    for (segment, dx, dy, rw, rh) in rects {
        if segments & segment != 0 {
            fill_rect(canvas, x + dx, y + dy, rw, rh, ink);
        }
    }
}

fn draw_colon(canvas: &mut RgbaImage, m: &GlyphMetrics, x: u32, y: u32, ink: Rgba<u8>) {
    let t = m.stroke;
    let dot_x = x + 2 * t;
    fill_rect(canvas, dot_x, y + m.digit_height / 3 - t / 2, t, t, ink);
    fill_rect(canvas, dot_x, y + 2 * m.digit_height / 3 - t / 2, t, t, ink);
}

/// Fills a rectangle, clipped to the canvas.
fn fill_rect(canvas: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, ink: Rgba<u8>) {
    let x_end = x.saturating_add(w).min(canvas.width());
    let y_end = y.saturating_add(h).min(canvas.height());
    for py in y..y_end {
        for px in x..x_end {
            canvas.put_pixel(px, py, ink);
        }
    }
}
