//! Interval-driven fetching of one data domain.
//!
//! A [`Poller`] fetches immediately on [`Poller::start`] and then at a fixed
//! rate. Every tick spawns its own fetch task, so a slow backend can have
//! several requests in flight; each attempt carries a sequence number and a
//! result older than the last applied one is dropped. State is published on a
//! `watch` channel and every write happens under the channel lock after
//! checking the poller's cancellation token, so nothing is written once
//! [`Poller::stop`] has returned.

mod fetch;
mod result;

pub use fetch::{Fetch, HttpFetch};
pub use result::{PollResult, PollStatus};

use chrono::Utc;
use futures::FutureExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Message shown when a failure carries no server detail.
pub const DEFAULT_ERROR_MESSAGE: &str = "Data could not be loaded. Please try again later.";

/// Owns the refresh lifecycle of one endpoint.
pub struct Poller<F: Fetch> {
    name: String,
    fetcher: Arc<F>,
    interval: Duration,
    generic_error: Arc<str>,
    state: Arc<watch::Sender<PollResult<F::Output>>>,
    sequence: Arc<AtomicU64>,
    refresh: Arc<Notify>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl<F: Fetch> Poller<F> {
    /// Create a stopped poller.
    pub fn new(name: impl Into<String>, fetcher: F, interval: Duration) -> Self {
        let (state, _) = watch::channel(PollResult::default());
        Self {
            name: name.into(),
            fetcher: Arc::new(fetcher),
            interval,
            generic_error: Arc::from(DEFAULT_ERROR_MESSAGE),
            state: Arc::new(state),
            sequence: Arc::new(AtomicU64::new(0)),
            refresh: Arc::new(Notify::new()),
            cancel: CancellationToken::new(),
            handle: None,
        }
    }

    /// Set the message used when a failure carries no server detail.
    pub fn with_generic_error(mut self, message: impl Into<String>) -> Self {
        self.generic_error = Arc::from(message.into());
        self
    }

    /// Poller name used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Refresh interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the poll loop is running.
    pub fn is_running(&self) -> bool {
        self.handle.is_some() && !self.cancel.is_cancelled()
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<PollResult<F::Output>> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn snapshot(&self) -> PollResult<F::Output> {
        self.state.borrow().clone()
    }

    /// Fetch now, then every `interval` measured from the start of the
    /// previous attempt. Calling `start` on a running poller does nothing.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        // The immediate fetch covers a refresh requested while stopped.
        let _ = self.refresh.notified().now_or_never();

        info!(
            poller = %self.name,
            source = %self.fetcher.describe(),
            interval_secs = self.interval.as_secs(),
            "Starting poller"
        );

        let attempt = Attempt {
            name: self.name.clone(),
            fetcher: self.fetcher.clone(),
            generic_error: self.generic_error.clone(),
            state: self.state.clone(),
            sequence: self.sequence.clone(),
            cancel: self.cancel.clone(),
        };
        let refresh = self.refresh.clone();
        let cancel = self.cancel.clone();
        let period = self.interval;

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                    _ = refresh.notified() => {}
                }
                attempt.spawn();
            }
        }));
    }

    /// Trigger an immediate out-of-band fetch. The regular schedule is kept.
    pub fn refresh(&self) {
        if self.is_running() {
            debug!(poller = %self.name, "Manual refresh");
            self.refresh.notify_one();
        }
    }

    /// Cloneable trigger for [`Poller::refresh`], for components that
    /// cannot hold a reference to the poller.
    pub fn refresh_handle(&self) -> RefreshHandle {
        RefreshHandle {
            notify: self.refresh.clone(),
        }
    }

    /// Cancel the schedule and abandon in-flight fetches. No state update is
    /// published after this returns.
    pub fn stop(&mut self) {
        // Cancelling under the channel lock orders this against every writer.
        self.state.send_if_modified(|_| {
            self.cancel.cancel();
            false
        });
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!(poller = %self.name, "Stopped poller");
        }
    }
}

impl<F: Fetch> Drop for Poller<F> {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Requests an out-of-band fetch from a poller. A refresh requested while the
/// poller is stopped is folded into the fetch made when it is next started.
#[derive(Debug, Clone, Default)]
pub struct RefreshHandle {
    notify: Arc<Notify>,
}

impl RefreshHandle {
    pub fn trigger(&self) {
        self.notify.notify_one();
    }

    /// Resolves once a refresh has been requested.
    #[cfg(test)]
    pub(crate) async fn requested(&self) {
        self.notify.notified().await;
    }
}

/// Everything one fetch task needs.
struct Attempt<F: Fetch> {
    name: String,
    fetcher: Arc<F>,
    generic_error: Arc<str>,
    state: Arc<watch::Sender<PollResult<F::Output>>>,
    sequence: Arc<AtomicU64>,
    cancel: CancellationToken,
}

impl<F: Fetch> Attempt<F> {
    fn spawn(&self) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = self.cancel.clone();

        self.state
            .send_if_modified(|current| !cancel.is_cancelled() && current.begin_attempt());

        let name = self.name.clone();
        let fetcher = self.fetcher.clone();
        let generic_error = self.generic_error.clone();
        let state = self.state.clone();

        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => return,
                outcome = fetcher.fetch() => outcome,
            };

            state.send_if_modified(|current| {
                if cancel.is_cancelled() {
                    return false;
                }
                if sequence < current.sequence {
                    debug!(
                        poller = %name,
                        sequence,
                        applied = current.sequence,
                        "Dropping stale response"
                    );
                    return false;
                }
                match outcome {
                    Ok(data) => current.apply_success(data, sequence, Utc::now()),
                    Err(err) => {
                        warn!(poller = %name, sequence, error = %err, "Fetch failed");
                        current.apply_failure(err.user_message(&generic_error), sequence, Utc::now());
                    }
                }
                true
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::sleep;

    /// Replays scripted responses, each after its own delay.
    struct ScriptedFetch {
        script: Mutex<VecDeque<(Duration, Result<u32>)>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedFetch {
        fn new(script: Vec<(Duration, Result<u32>)>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn immediate(outcomes: Vec<Result<u32>>) -> Self {
            Self::new(outcomes.into_iter().map(|o| (Duration::ZERO, o)).collect())
        }
    }

    #[async_trait]
    impl Fetch for ScriptedFetch {
        type Output = u32;

        async fn fetch(&self) -> Result<u32> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some((delay, outcome)) => {
                    sleep(delay).await;
                    outcome
                }
                None => Err(Error::application("script exhausted")),
            }
        }

        fn describe(&self) -> String {
            "script".to_string()
        }
    }

    /// Let spawned tasks run until they block on the (paused) clock.
    async fn settle() {
        sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_fail_succeed_clears_error() {
        let fetch = ScriptedFetch::immediate(vec![
            Err(Error::from_response(503, r#"{"detail": "model offline"}"#)),
            Err(Error::network("connection refused")),
            Ok(42),
        ]);
        let mut poller =
            Poller::new("predictions", fetch, Duration::from_secs(10)).with_generic_error("generic");
        poller.start();

        settle().await;
        let state = poller.snapshot();
        assert_eq!(state.status, PollStatus::Error);
        assert_eq!(state.error_message.as_deref(), Some("model offline"));
        assert_eq!(state.data, None);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(poller.snapshot().error_message.as_deref(), Some("generic"));

        sleep(Duration::from_secs(10)).await;
        let state = poller.snapshot();
        assert_eq!(state.status, PollStatus::Success);
        assert_eq!(state.data, Some(42));
        assert_eq!(state.error_message, None);
        assert_eq!(state.sequence, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_stale_data() {
        let fetch = ScriptedFetch::immediate(vec![Ok(7), Err(Error::network("timeout"))]);
        let mut poller = Poller::new("alerts", fetch, Duration::from_secs(60));
        poller.start();

        settle().await;
        sleep(Duration::from_secs(60)).await;
        let state = poller.snapshot();
        assert_eq!(state.data, Some(7));
        assert!(state.is_stale());
        assert_eq!(state.error_message.as_deref(), Some(DEFAULT_ERROR_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_shows_loading() {
        let fetch = ScriptedFetch::new(vec![(Duration::from_secs(3), Ok(1))]);
        let mut poller = Poller::new("news", fetch, Duration::from_secs(300));
        assert_eq!(poller.snapshot().status, PollStatus::Idle);
        poller.start();

        settle().await;
        assert!(poller.snapshot().is_loading());

        sleep(Duration::from_secs(3)).await;
        assert_eq!(poller.snapshot().data, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_further_updates() {
        let fetch = ScriptedFetch::immediate(vec![Ok(1), Ok(2), Ok(3)]);
        let calls = fetch.calls.clone();
        let mut poller = Poller::new("signals", fetch, Duration::from_secs(10));
        let mut rx = poller.subscribe();
        poller.start();

        settle().await;
        assert_eq!(poller.snapshot().data, Some(1));
        rx.borrow_and_update();

        poller.stop();
        sleep(Duration::from_secs(60)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!rx.has_changed().unwrap());
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_fetch_does_not_write_after_stop() {
        let fetch = ScriptedFetch::new(vec![(Duration::from_secs(5), Ok(9))]);
        let mut poller = Poller::new("portfolio", fetch, Duration::from_secs(300));
        poller.start();

        sleep(Duration::from_secs(1)).await;
        poller.stop();
        sleep(Duration::from_secs(10)).await;

        let state = poller.snapshot();
        assert_eq!(state.data, None);
        assert_eq!(state.status, PollStatus::Loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_requests_latest_attempt_wins() {
        // Attempt 1 (t=0) answers at t=15, attempt 2 (t=10) answers at t=11.
        let fetch = ScriptedFetch::new(vec![
            (Duration::from_secs(15), Ok(1)),
            (Duration::from_secs(1), Ok(2)),
            (Duration::from_secs(30), Ok(3)),
        ]);
        let calls = fetch.calls.clone();
        let mut poller = Poller::new("coins", fetch, Duration::from_secs(10));
        poller.start();

        sleep(Duration::from_secs(12)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(poller.snapshot().data, Some(2));

        sleep(Duration::from_secs(4)).await;
        let state = poller.snapshot();
        assert_eq!(state.data, Some(2));
        assert_eq!(state.sequence, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_fetches_immediately() {
        let fetch = ScriptedFetch::immediate(vec![Err(Error::network("down")), Ok(5)]);
        let calls = fetch.calls.clone();
        let mut poller = Poller::new("calendar", fetch, Duration::from_secs(3600));
        poller.start();

        settle().await;
        assert_eq!(poller.snapshot().status, PollStatus::Error);

        poller.refresh();
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(poller.snapshot().data, Some(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_handle_triggers_fetch() {
        let fetch = ScriptedFetch::immediate(vec![Ok(1), Ok(2)]);
        let calls = fetch.calls.clone();
        let mut poller = Poller::new("predictions", fetch, Duration::from_secs(300));
        let handle = poller.refresh_handle();
        poller.start();
        settle().await;

        handle.trigger();
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(poller.snapshot().data, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_while_stopped_folds_into_start() {
        let fetch = ScriptedFetch::immediate(vec![Ok(1), Ok(2), Ok(3)]);
        let calls = fetch.calls.clone();
        let mut poller = Poller::new("predictions", fetch, Duration::from_secs(300));
        let handle = poller.refresh_handle();

        handle.trigger();
        poller.start();
        settle().await;
        sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(poller.snapshot().data, Some(1));

        // Refreshes while running still fetch.
        handle.trigger();
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let fetch = ScriptedFetch::immediate(vec![Ok(1), Ok(2)]);
        let mut poller = Poller::new("social", fetch, Duration::from_secs(300));
        poller.start();
        settle().await;
        poller.stop();

        poller.start();
        settle().await;
        assert!(poller.is_running());
        assert_eq!(poller.snapshot().data, Some(2));
    }

    /// Serves the same 30-point series, counting requests.
    struct SharedSeries {
        requests: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Fetch for SharedSeries {
        type Output = Vec<u32>;

        async fn fetch(&self) -> Result<Vec<u32>> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok((1..=30).collect())
        }

        fn describe(&self) -> String {
            "series".to_string()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_pollers_on_same_endpoint() {
        let requests = Arc::new(AtomicUsize::new(0));
        let mut weekly = Poller::new(
            "predictions-7d",
            SharedSeries {
                requests: requests.clone(),
            },
            Duration::from_secs(300),
        );
        let mut monthly = Poller::new(
            "predictions-30d",
            SharedSeries {
                requests: requests.clone(),
            },
            Duration::from_secs(300),
        );

        weekly.start();
        sleep(Duration::from_secs(7)).await;
        monthly.start();
        settle().await;

        let week: Vec<u32> = weekly.snapshot().data.unwrap().into_iter().take(7).collect();
        let month: Vec<u32> = monthly.snapshot().data.unwrap().into_iter().take(30).collect();
        assert_eq!(week, (1..=7).collect::<Vec<_>>());
        assert_eq!(month.len(), 30);
        assert_eq!(requests.load(Ordering::SeqCst), 2);
    }
}
