//! Countdown targets parsed from the `date` request parameter.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DATE_FORMAT;
use crate::error::{CountdownError, Result};

/// A validated countdown target: midnight UTC of a calendar date.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountdownTarget {
    date: NaiveDate,
    id: String,
}

impl CountdownTarget {
    /// Parses a `YYYY-MM-DD` date.
    ///
    /// The identifier used in cache keys is the canonical re-formatting of
    /// the parsed date, so equivalent spellings share cache entries.
    pub fn parse(input: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
            .map_err(|e| CountdownError::InvalidDate(format!("{input:?}: {e}")))?;
        Ok(Self::from_date(date))
    }

    /// Wraps an already valid date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            id: date.format(DATE_FORMAT).to_string(),
            date,
        }
    }

    /// The date identifier used in cache keys and generation state.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The instant the countdown reaches zero.
    pub fn instant(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.date.and_time(NaiveTime::MIN))
    }

    /// Signed time left at `now`; negative once the target has passed.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        self.instant() - now
    }

    /// Signed time left right now.
    pub fn remaining(&self) -> Duration {
        self.remaining_at(Utc::now())
    }
}
