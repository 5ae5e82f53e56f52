//! Generation coordinator: placeholder on miss, window sweep in the background.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use chrono::Duration;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use tminus_cache::RecencyCache;
use tminus_core::error::{CountdownError, Result};
use tminus_core::traits::Renderer;
use tminus_core::types::{CacheKey, Payload};

use crate::config::SweepConfig;
use crate::state::{GenerationLedger, GenerationState, SkipReason, SweepClaim};

/// Counters for one sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Offsets rendered and stored
    pub rendered: u32,
    /// Offsets skipped because their key was already cached
    pub already_cached: u32,
    /// Offsets whose render failed
    pub failed: u32,
    /// Wall-clock time spent
    pub elapsed: StdDuration,
}

impl SweepReport {
    /// Offsets visited before the sweep ended.
    pub fn visited(&self) -> u32 {
        self.rendered + self.already_cached + self.failed
    }
}

/// How a call to [`GenerationCoordinator::run_sweep`] ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SweepOutcome {
    /// No sweep ran
    Skipped {
        /// Why the claim was refused
        reason: SkipReason,
    },
    /// Every offset in the window was visited
    Completed(SweepReport),
    /// The time budget ran out first
    BudgetExhausted(SweepReport),
    /// Shutdown was requested mid-sweep
    Cancelled(SweepReport),
}

impl SweepOutcome {
    /// The report, if a sweep actually ran.
    pub fn report(&self) -> Option<&SweepReport> {
        match self {
            SweepOutcome::Skipped { .. } => None,
            SweepOutcome::Completed(r)
            | SweepOutcome::BudgetExhausted(r)
            | SweepOutcome::Cancelled(r) => Some(r),
        }
    }
}

enum Stop {
    Budget,
    Cancelled,
}

/// Decides, per cache miss, what to serve now and what to render next.
///
/// On a miss the caller gets a placeholder straight away while a detached
/// task fills the cache with the next `window_minutes` keys for that date.
/// At most one sweep per date runs at a time, and a finished sweep is not
/// repeated until its window expires.
///
/// Renders always run on the blocking pool and never under a cache lock.
pub struct GenerationCoordinator {
    cache: Arc<RecencyCache<Payload>>,
    renderer: Arc<dyn Renderer>,
    config: SweepConfig,
    ledger: Arc<GenerationLedger>,
    shutdown: watch::Sender<bool>,
}

impl GenerationCoordinator {
    /// Creates a coordinator over a shared cache and renderer.
    pub fn new(
        cache: Arc<RecencyCache<Payload>>,
        renderer: Arc<dyn Renderer>,
        config: SweepConfig,
    ) -> Result<Self> {
        config.validate()?;
        let max_tracked = NonZeroUsize::new(config.max_tracked_dates).ok_or_else(|| {
            CountdownError::InvalidConfig("max_tracked_dates must be positive".into())
        })?;
        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            cache,
            renderer,
            config,
            ledger: Arc::new(GenerationLedger::new(max_tracked)),
            shutdown,
        })
    }

    /// The cache this coordinator fills.
    pub fn cache(&self) -> &Arc<RecencyCache<Payload>> {
        &self.cache
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Cache lookup for the request path.
    pub fn lookup(&self, key: &CacheKey) -> Option<Payload> {
        self.cache.fetch(key.as_str())
    }

    /// Answers a cache miss with a placeholder and schedules a sweep.
    ///
    /// Returns as soon as the placeholder is drawn; the sweep is never
    /// awaited. The date is claimed before this returns, so a concurrent miss
    /// for the same date sees it as in progress. A placeholder failure is
    /// returned to the caller. The sweep is scheduled either way.
    #[instrument(skip(self), fields(remaining_min = remaining.num_minutes()))]
    pub async fn handle_miss(self: &Arc<Self>, date: &str, remaining: Duration) -> Result<Payload> {
        let placeholder = self.render(remaining, true).await;
        if let Err(e) = &placeholder {
            warn!(date, error = %e, "Placeholder render failed");
        }

        if !self.is_shutting_down() {
            match self.ledger.try_begin(date, Instant::now()) {
                Ok(claim) => {
                    let this = Arc::clone(self);
                    let date = date.to_owned();
                    tokio::spawn(async move { this.sweep(claim, &date, remaining).await });
                }
                Err(reason) => debug!(date, ?reason, "Sweep not due"),
            }
        }
        placeholder
    }

    /// Starts [`run_sweep`](Self::run_sweep) on a detached task.
    pub fn spawn_sweep(
        self: &Arc<Self>,
        date: &str,
        remaining: Duration,
    ) -> JoinHandle<SweepOutcome> {
        let this = Arc::clone(self);
        let date = date.to_owned();
        tokio::spawn(async move { this.run_sweep(&date, remaining).await })
    }

    /// Pre-generates the window for `date`, starting at `remaining`.
    ///
    /// Offsets are visited from the furthest from expiry (the current
    /// minute) to the nearest (`window_minutes - 1` minutes ahead). Cached
    /// keys are skipped; failed renders are logged and skipped. The budget
    /// and the shutdown signal are checked once per offset.
    pub async fn run_sweep(&self, date: &str, remaining: Duration) -> SweepOutcome {
        match self.ledger.try_begin(date, Instant::now()) {
            Ok(claim) => self.sweep(claim, date, remaining).await,
            Err(reason) => {
                debug!(date, ?reason, "Sweep skipped");
                SweepOutcome::Skipped { reason }
            }
        }
    }

    #[instrument(skip(self, claim), fields(remaining_min = remaining.num_minutes()))]
    async fn sweep(&self, claim: SweepClaim, date: &str, remaining: Duration) -> SweepOutcome {
        let start = Instant::now();
        info!(window_minutes = self.config.window_minutes, "Starting sweep");

        let offsets = self.window_offsets(remaining);
        let total = offsets.len();
        let mut report = SweepReport::default();
        let mut stop = None;

        for (i, offset) in offsets.into_iter().enumerate() {
            if self.is_shutting_down() {
                stop = Some(Stop::Cancelled);
                break;
            }

            let key = CacheKey::derive(date, offset);
            if self.cache.contains(key.as_str()) {
                debug!(key = %key, "Already cached");
                report.already_cached += 1;
            } else {
                match self.render(offset, false).await {
                    Ok(gif) => {
                        debug!(key = %key, bytes = gif.len(), "Caching countdown");
                        self.cache.store(key.into_string(), gif);
                        report.rendered += 1;
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "Render failed, skipping offset");
                        report.failed += 1;
                    }
                }
            }

            if i + 1 < total && start.elapsed() > self.config.budget {
                stop = Some(Stop::Budget);
                break;
            }
        }

        report.elapsed = start.elapsed();
        claim.complete(start + self.config.window());

        let outcome = match stop {
            None => SweepOutcome::Completed(report),
            Some(Stop::Budget) => SweepOutcome::BudgetExhausted(report),
            Some(Stop::Cancelled) => SweepOutcome::Cancelled(report),
        };
        if let Some(r) = outcome.report() {
            info!(
                rendered = r.rendered,
                already_cached = r.already_cached,
                failed = r.failed,
                skipped_offsets = total as u32 - r.visited(),
                duration_ms = r.elapsed.as_millis() as u64,
                "Sweep finished"
            );
        }
        outcome
    }

    /// Current generation state for `date`.
    pub fn generation_state(&self, date: &str) -> GenerationState {
        self.ledger.state(date)
    }

    /// Number of dates whose window expiry is remembered.
    pub fn tracked_dates(&self) -> usize {
        self.ledger.tracked_dates()
    }

    /// Asks running sweeps to stop at their next offset and refuses new ones.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Returns true once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Remaining time for each offset, in visiting order.
    fn window_offsets(&self, remaining: Duration) -> Vec<Duration> {
        let window = self.config.window_minutes;
        (1..=window)
            .rev()
            .map(|i| remaining - Duration::minutes(i64::from(window - i)))
            .collect()
    }

    async fn render(&self, remaining: Duration, placeholder: bool) -> Result<Payload> {
        let renderer = Arc::clone(&self.renderer);
        tokio::task::spawn_blocking(move || renderer.render(remaining, placeholder))
            .await
            .map_err(|e| CountdownError::TaskFailed(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tminus_cache::CacheConfig;

    const DATE: &str = "2025-01-01";

    type FailWhen = Box<dyn Fn(Duration, bool) -> bool + Send + Sync>;

    /// Records every call; optionally slow or failing.
    struct StubRenderer {
        calls: AtomicUsize,
        seen: Mutex<Vec<(Duration, bool)>>,
        delay: StdDuration,
        fail_when: FailWhen,
    }

    impl StubRenderer {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
                delay: StdDuration::ZERO,
                fail_when: Box::new(|_, _| false),
            }
        }

        fn slow(mut self, delay: StdDuration) -> Self {
            self.delay = delay;
            self
        }

        fn failing(mut self, f: impl Fn(Duration, bool) -> bool + Send + Sync + 'static) -> Self {
            self.fail_when = Box::new(f);
            self
        }

        fn full_renders(&self) -> Vec<Duration> {
            self.seen.lock().iter().filter(|(_, p)| !p).map(|(d, _)| *d).collect()
        }
    }

    impl Renderer for StubRenderer {
        fn render(&self, remaining: Duration, placeholder: bool) -> Result<Payload> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().push((remaining, placeholder));
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
            if (self.fail_when)(remaining, placeholder) {
                return Err(CountdownError::Render("stub failure".into()));
            }
            let kind = if placeholder { "placeholder" } else { "full" };
            Ok(Bytes::from(format!("{kind}:{}", remaining.num_minutes())))
        }
    }

    struct PanickingRenderer;

    impl Renderer for PanickingRenderer {
        fn render(&self, _remaining: Duration, _placeholder: bool) -> Result<Payload> {
            panic!("renderer exploded");
        }
    }

    fn coordinator_with(
        renderer: Arc<dyn Renderer>,
        config: SweepConfig,
    ) -> Arc<GenerationCoordinator> {
        let cache = Arc::new(RecencyCache::with_config(CacheConfig { capacity: 500 }).unwrap());
        Arc::new(GenerationCoordinator::new(cache, renderer, config).unwrap())
    }

    fn setup(renderer: StubRenderer) -> (Arc<GenerationCoordinator>, Arc<StubRenderer>) {
        let renderer = Arc::new(renderer);
        let coordinator = coordinator_with(renderer.clone(), SweepConfig::default());
        (coordinator, renderer)
    }

    fn remaining() -> Duration {
        Duration::hours(5) + Duration::seconds(30)
    }

    #[tokio::test]
    async fn test_sweep_fills_window() {
        let (coordinator, renderer) = setup(StubRenderer::new());

        let outcome = coordinator.run_sweep(DATE, remaining()).await;
        let report = match outcome {
            SweepOutcome::Completed(r) => r,
            other => panic!("unexpected outcome: {other:?}"),
        };

        assert_eq!(report.rendered, 60);
        assert_eq!(report.failed, 0);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 60);
        assert_eq!(coordinator.cache().len(), 60);
        assert!(coordinator.cache().contains("2025-01-01-05h00m"));
        assert!(coordinator.cache().contains("2025-01-01-04h01m"));
        assert!(!coordinator.cache().contains("2025-01-01-04h00m"));
    }

    #[tokio::test]
    async fn test_sweep_order_descending() {
        let (coordinator, renderer) = setup(StubRenderer::new());
        coordinator.run_sweep(DATE, remaining()).await;

        let rendered = renderer.full_renders();
        assert_eq!(rendered.first(), Some(&remaining()));
        assert_eq!(rendered.last(), Some(&(remaining() - Duration::minutes(59))));
        assert!(rendered.windows(2).all(|w| w[0] > w[1]));
    }

    #[tokio::test]
    async fn test_skip_on_present() {
        let (coordinator, renderer) = setup(StubRenderer::new());
        let precached = [0i64, 10, 59];
        for m in precached {
            let key = CacheKey::derive(DATE, remaining() - Duration::minutes(m));
            coordinator.cache().store(key.into_string(), Bytes::from_static(b"old"));
        }

        let outcome = coordinator.run_sweep(DATE, remaining()).await;
        let report = outcome.report().unwrap();
        assert_eq!(report.already_cached, 3);
        assert_eq!(report.rendered, 57);

        let rendered = renderer.full_renders();
        for m in precached {
            assert!(!rendered.contains(&(remaining() - Duration::minutes(m))));
        }
    }

    #[tokio::test]
    async fn test_concurrent_sweeps_deduplicated() {
        let (coordinator, renderer) = setup(StubRenderer::new().slow(StdDuration::from_millis(2)));

        let (a, b) = tokio::join!(
            coordinator.run_sweep(DATE, remaining()),
            coordinator.run_sweep(DATE, remaining()),
        );

        let completed = [&a, &b]
            .iter()
            .filter(|o| matches!(o, SweepOutcome::Completed(_)))
            .count();
        assert_eq!(completed, 1);
        assert!([&a, &b].contains(&&SweepOutcome::Skipped { reason: SkipReason::InProgress }));
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 60);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_spawned_sweeps_deduplicated() {
        let (coordinator, renderer) = setup(StubRenderer::new().slow(StdDuration::from_millis(1)));

        let handles: Vec<_> = (0..8)
            .map(|_| coordinator.spawn_sweep(DATE, remaining()))
            .collect();
        let mut ran = 0;
        for handle in handles {
            if handle.await.unwrap().report().is_some() {
                ran += 1;
            }
        }

        assert_eq!(ran, 1);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 60);
    }

    #[tokio::test]
    async fn test_window_fresh_skips_rerun() {
        let (coordinator, renderer) = setup(StubRenderer::new());
        coordinator.run_sweep(DATE, remaining()).await;

        let state = coordinator.generation_state(DATE);
        assert!(!state.in_progress);
        assert!(state.next_window_expiry.unwrap() > Instant::now());

        let again = coordinator.run_sweep(DATE, remaining()).await;
        assert_eq!(again, SweepOutcome::Skipped { reason: SkipReason::WindowFresh });
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 60);
    }

    #[tokio::test]
    async fn test_dates_are_independent() {
        let (coordinator, _) = setup(StubRenderer::new());

        let (a, b) = tokio::join!(
            coordinator.run_sweep("2025-01-01", remaining()),
            coordinator.run_sweep("2025-06-01", remaining()),
        );

        assert!(matches!(a, SweepOutcome::Completed(_)));
        assert!(matches!(b, SweepOutcome::Completed(_)));
        assert_eq!(coordinator.cache().len(), 120);
    }

    #[tokio::test]
    async fn test_budget_enforced() {
        let renderer = Arc::new(StubRenderer::new().slow(StdDuration::from_millis(20)));
        let config = SweepConfig::new().budget(StdDuration::from_millis(50));
        let coordinator = coordinator_with(renderer.clone(), config);

        let outcome = coordinator.run_sweep(DATE, remaining()).await;
        let report = match outcome {
            SweepOutcome::BudgetExhausted(r) => r,
            other => panic!("unexpected outcome: {other:?}"),
        };

        assert!(report.rendered >= 1);
        assert!(report.rendered < 60);
        assert_eq!(coordinator.cache().len() as u32, report.rendered);
        assert!(!coordinator.generation_state(DATE).in_progress);
    }

    #[tokio::test]
    async fn test_render_failures_do_not_abort() {
        let renderer = StubRenderer::new().failing(|d, _| d.num_minutes() % 2 == 0);
        let (coordinator, _) = setup(renderer);

        let outcome = coordinator.run_sweep(DATE, remaining()).await;
        let report = match outcome {
            SweepOutcome::Completed(r) => r,
            other => panic!("unexpected outcome: {other:?}"),
        };
        assert_eq!(report.failed, 30);
        assert_eq!(report.rendered, 30);
        assert!(!coordinator.generation_state(DATE).in_progress);
    }

    #[tokio::test]
    async fn test_renderer_panic_is_a_failure() {
        let coordinator = coordinator_with(
            Arc::new(PanickingRenderer),
            SweepConfig::new().window_minutes(2),
        );

        let outcome = coordinator.run_sweep(DATE, remaining()).await;
        assert_eq!(outcome.report().unwrap().failed, 2);

        let err = coordinator.handle_miss("2025-02-01", remaining()).await.unwrap_err();
        assert!(matches!(err, CountdownError::TaskFailed(_)));
    }

    #[tokio::test]
    async fn test_handle_miss_returns_placeholder_and_fills_cache() {
        let (coordinator, renderer) = setup(StubRenderer::new());

        let placeholder = coordinator.handle_miss(DATE, remaining()).await.unwrap();
        assert_eq!(placeholder, Bytes::from("placeholder:300"));

        tokio::time::timeout(StdDuration::from_secs(5), async {
            while coordinator.cache().len() < 60 || coordinator.generation_state(DATE).in_progress {
                tokio::time::sleep(StdDuration::from_millis(5)).await;
            }
        })
        .await
        .expect("sweep did not finish");

        let seen = renderer.seen.lock();
        assert_eq!(seen.iter().filter(|(_, p)| *p).count(), 1);
        assert_eq!(seen.iter().filter(|(_, p)| !p).count(), 60);
        drop(seen);

        let key = CacheKey::derive(DATE, remaining());
        assert_eq!(coordinator.lookup(&key), Some(Bytes::from("full:300")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_handle_miss_does_not_wait_for_sweep() {
        let renderer = StubRenderer::new().slow(StdDuration::from_millis(50));
        let (coordinator, renderer) = setup(renderer);

        let started = Instant::now();
        let placeholder = coordinator.handle_miss(DATE, remaining()).await.unwrap();
        let elapsed = started.elapsed();

        // 60 full renders at 50ms each would take at least 3s.
        assert_eq!(placeholder, Bytes::from("placeholder:300"));
        assert!(elapsed < StdDuration::from_secs(1), "handle_miss took {elapsed:?}");
        assert!(coordinator.generation_state(DATE).in_progress);
        assert!(coordinator.cache().len() < 60);

        // A second miss while the sweep runs serves a placeholder and starts nothing.
        coordinator.handle_miss(DATE, remaining()).await.unwrap();

        coordinator.shutdown();
        tokio::time::timeout(StdDuration::from_secs(5), async {
            while coordinator.generation_state(DATE).in_progress {
                tokio::time::sleep(StdDuration::from_millis(5)).await;
            }
        })
        .await
        .expect("sweep did not stop");

        assert!(coordinator.cache().len() < 60);
        assert_eq!(renderer.seen.lock().iter().filter(|(_, p)| *p).count(), 2);
    }

    #[tokio::test]
    async fn test_handle_miss_placeholder_failure_propagates() {
        let (coordinator, _) = setup(StubRenderer::new().failing(|_, placeholder| placeholder));

        let err = coordinator.handle_miss(DATE, remaining()).await.unwrap_err();
        assert!(err.is_render_error());

        let outcome = coordinator.spawn_sweep("2025-03-01", remaining()).await.unwrap();
        assert!(matches!(outcome, SweepOutcome::Completed(_)));
    }

    #[tokio::test]
    async fn test_shutdown_cancels_sweep() {
        let (coordinator, renderer) = setup(StubRenderer::new());
        coordinator.shutdown();
        assert!(coordinator.is_shutting_down());

        let outcome = coordinator.run_sweep(DATE, remaining()).await;
        assert!(matches!(outcome, SweepOutcome::Cancelled(ref r) if r.visited() == 0));
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_forgotten_date_can_sweep_again() {
        let renderer = Arc::new(StubRenderer::new());
        let config = SweepConfig::new().window_minutes(3).max_tracked_dates(1);
        let coordinator = coordinator_with(renderer.clone(), config);

        coordinator.run_sweep("2025-01-01", remaining()).await;
        coordinator.run_sweep("2025-01-02", remaining()).await;
        assert_eq!(coordinator.tracked_dates(), 1);

        let outcome = coordinator.run_sweep("2025-01-01", remaining()).await;
        let report = outcome.report().unwrap();
        assert_eq!(report.already_cached, 3);
        assert_eq!(report.rendered, 0);
    }

    #[tokio::test]
    async fn test_past_target_collapses_keys() {
        let (coordinator, renderer) = setup(StubRenderer::new());

        let outcome = coordinator.run_sweep("2020-01-01", Duration::days(-1)).await;
        let report = outcome.report().unwrap();
        assert_eq!(report.rendered, 1);
        assert_eq!(report.already_cached, 59);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
        assert!(coordinator.cache().contains("2020-01-01-00h00m"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cache = Arc::new(RecencyCache::new());
        let result = GenerationCoordinator::new(
            cache,
            Arc::new(StubRenderer::new()),
            SweepConfig::new().window_minutes(0),
        );
        assert!(matches!(result, Err(CountdownError::InvalidConfig(_))));
    }
}
