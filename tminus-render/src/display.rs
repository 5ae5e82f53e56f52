//! Countdown text: days, hours, and minutes as a glyph sequence.

use chrono::Duration;

use tminus_core::Remaining;

/// A single drawable symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glyph {
    /// Decimal digit 0..=9
    Digit(u8),
    /// The `:` separator
    Colon,
}

/// The values shown on one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountdownDisplay {
    /// Whole days remaining
    pub days: u64,
    /// Hours past the whole day (0..24)
    pub hours: u8,
    /// Minutes past the whole hour (0..60)
    pub minutes: u8,
}

impl CountdownDisplay {
    /// Splits a signed duration; anything at or below zero shows `00 : 00 : 00`.
    pub fn from_duration(remaining: Duration) -> Self {
        let remaining = Remaining::from_duration(remaining);
        Self {
            days: remaining.hours / 24,
            hours: (remaining.hours % 24) as u8,
            minutes: remaining.minutes,
        }
    }

    /// Glyphs for `DD : HH : MM`, each field at least two digits wide.
    pub fn glyphs(&self) -> Vec<Glyph> {
        let text = self.to_string();
        text.chars()
            .filter_map(|c| match c {
                ':' => Some(Glyph::Colon),
                _ => c.to_digit(10).map(|d| Glyph::Digit(d as u8)),
            })
            .collect()
    }
}

impl std::fmt::Display for CountdownDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02} : {:02} : {:02}", self.days, self.hours, self.minutes)
    }
}
