//! Per-date generation state.
//!
//! One mutex guards both the in-flight set and the window expiries, so the
//! "is a sweep running / is the window still fresh / claim it" decision is a
//! single critical section. The lock is never held across an await.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;

/// Snapshot of one date's generation state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationState {
    /// A sweep for this date is running
    pub in_progress: bool,
    /// Until this instant the last sweep's window is considered fresh
    pub next_window_expiry: Option<Instant>,
}

/// Why a sweep did not start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Another sweep for the same date holds the claim
    InProgress,
    /// The previous sweep's window has not expired yet
    WindowFresh,
}

struct LedgerInner {
    in_flight: HashSet<String>,
    // Bounded so a stream of distinct dates cannot grow this forever.
    expiries: LruCache<String, Instant>,
}

pub(crate) struct GenerationLedger {
    inner: Mutex<LedgerInner>,
}

impl GenerationLedger {
    pub(crate) fn new(max_tracked_dates: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(LedgerInner {
                in_flight: HashSet::new(),
                expiries: LruCache::new(max_tracked_dates),
            }),
        }
    }

    /// Atomically checks both conditions and claims the date.
    pub(crate) fn try_begin(
        self: &Arc<Self>,
        date: &str,
        now: Instant,
    ) -> Result<SweepClaim, SkipReason> {
        let mut inner = self.inner.lock();
        if inner.in_flight.contains(date) {
            return Err(SkipReason::InProgress);
        }
        if let Some(expiry) = inner.expiries.peek(date) {
            if now < *expiry {
                return Err(SkipReason::WindowFresh);
            }
        }
        inner.in_flight.insert(date.to_owned());
        Ok(SweepClaim {
            ledger: Arc::clone(self),
            date: date.to_owned(),
            expiry: None,
        })
    }

    pub(crate) fn state(&self, date: &str) -> GenerationState {
        let inner = self.inner.lock();
        GenerationState {
            in_progress: inner.in_flight.contains(date),
            next_window_expiry: inner.expiries.peek(date).copied(),
        }
    }

    pub(crate) fn tracked_dates(&self) -> usize {
        self.inner.lock().expiries.len()
    }

    fn release(&self, date: &str, expiry: Option<Instant>) {
        let mut inner = self.inner.lock();
        if let Some(expiry) = expiry {
            inner.expiries.put(date.to_owned(), expiry);
        }
        inner.in_flight.remove(date);
    }
}

/// Exclusive right to sweep one date.
///
/// The claim owns a handle to its ledger so it can be taken on the request
/// path and moved into the background task. Dropping it clears
/// `in_progress` even if the sweep future is dropped or panics part-way.
pub(crate) struct SweepClaim {
    ledger: Arc<GenerationLedger>,
    date: String,
    expiry: Option<Instant>,
}

impl SweepClaim {
    /// Records the window expiry and releases the claim.
    pub(crate) fn complete(mut self, next_window_expiry: Instant) {
        self.expiry = Some(next_window_expiry);
    }
}

impl Drop for SweepClaim {
    fn drop(&mut self) {
        self.ledger.release(&self.date, self.expiry.take());
    }
}
