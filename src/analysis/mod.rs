//! Model run trigger.
//!
//! Starting a run POSTs to the model service and, independently, advances a
//! client-side progress estimate once per second. The estimate reaches 100%
//! at the configured duration whether or not the server has answered; only
//! the POST response completes or fails the run.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::{ApiClient, Endpoint};
use crate::error::Result;
use crate::poller::RefreshHandle;

/// Message shown when a failed run carries no server detail.
pub const DEFAULT_ERROR_MESSAGE: &str = "The model could not be started.";

/// Backend operations behind a model run.
#[async_trait]
pub trait ModelService: Send + Sync + 'static {
    /// Run the model for `coin`; resolves when the server answers.
    async fn start_model(&self, coin: &str) -> Result<()>;

    /// Ask the server to stop the current run.
    async fn stop_model(&self) -> Result<()>;
}

#[async_trait]
impl ModelService for ApiClient {
    async fn start_model(&self, coin: &str) -> Result<()> {
        self.execute(&Endpoint::start_model(coin)).await
    }

    async fn stop_model(&self) -> Result<()> {
        self.execute(&Endpoint::stop_model()).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// Observable state of the current run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisState {
    pub status: AnalysisStatus,
    /// Estimated progress, 0..=100.
    pub progress_percent: u8,
    pub elapsed_secs: u64,
    pub error: Option<String>,
}

impl AnalysisState {
    pub fn is_running(&self) -> bool {
        self.status == AnalysisStatus::Running
    }

    /// Seconds left on the estimate.
    pub fn remaining_secs(&self, estimate: Duration) -> u64 {
        estimate.as_secs().saturating_sub(self.elapsed_secs)
    }
}

fn estimated_percent(elapsed_secs: u64, estimate_secs: u64) -> u8 {
    if estimate_secs == 0 {
        return 100;
    }
    let percent = (elapsed_secs.saturating_mul(100) / estimate_secs).min(100);
    u8::try_from(percent).unwrap_or(100)
}

/// Starts and stops model runs and tracks their estimated progress.
pub struct AnalysisRunner<S: ModelService> {
    service: Arc<S>,
    coin: String,
    estimate: Duration,
    on_complete: Option<RefreshHandle>,
    state: Arc<watch::Sender<AnalysisState>>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl<S: ModelService> AnalysisRunner<S> {
    pub fn new(service: S, coin: impl Into<String>, estimate: Duration) -> Self {
        let (state, _) = watch::channel(AnalysisState::default());
        Self {
            service: Arc::new(service),
            coin: coin.into(),
            estimate,
            on_complete: None,
            state: Arc::new(state),
            cancel: CancellationToken::new(),
            handle: None,
        }
    }

    /// Refresh `poller` after a successful run.
    pub fn refresh_on_complete(mut self, poller: RefreshHandle) -> Self {
        self.on_complete = Some(poller);
        self
    }

    pub fn estimate(&self) -> Duration {
        self.estimate
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> AnalysisState {
        self.state.borrow().clone()
    }

    /// Start a run. Ignored while one is already running.
    pub fn start(&mut self) {
        if self.snapshot().is_running() {
            return;
        }
        self.cancel_run();
        let cancel = CancellationToken::new();
        self.cancel = cancel.clone();

        info!(coin = %self.coin, estimate_secs = self.estimate.as_secs(), "Starting model run");
        self.state.send_replace(AnalysisState {
            status: AnalysisStatus::Running,
            ..AnalysisState::default()
        });

        let service = self.service.clone();
        let coin = self.coin.clone();
        let estimate_secs = self.estimate.as_secs();
        let state = self.state.clone();
        let on_complete = self.on_complete.clone();

        self.handle = Some(tokio::spawn(async move {
            let second = Duration::from_secs(1);
            let mut ticker = tokio::time::interval_at(Instant::now() + second, second);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let job = service.start_model(&coin);
            tokio::pin!(job);

            let outcome = loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    outcome = &mut job => break outcome,
                    _ = ticker.tick() => {
                        state.send_if_modified(|s| {
                            if cancel.is_cancelled() || s.elapsed_secs >= estimate_secs {
                                return false;
                            }
                            s.elapsed_secs += 1;
                            s.progress_percent = estimated_percent(s.elapsed_secs, estimate_secs);
                            true
                        });
                    }
                }
            };

            let applied = state.send_if_modified(|s| {
                if cancel.is_cancelled() {
                    return false;
                }
                match &outcome {
                    Ok(()) => {
                        s.status = AnalysisStatus::Completed;
                        s.progress_percent = 100;
                    }
                    Err(err) => {
                        s.status = AnalysisStatus::Failed;
                        s.error = Some(err.user_message(DEFAULT_ERROR_MESSAGE));
                    }
                }
                true
            });

            match outcome {
                Ok(()) if applied => {
                    info!(%coin, "Model run completed");
                    if let Some(poller) = on_complete {
                        poller.trigger();
                    }
                }
                Ok(()) => {}
                Err(err) => warn!(%coin, error = %err, "Model run failed"),
            }
        }));
    }

    /// Stop the progress timer and reset the run.
    ///
    /// The reset happens immediately; the returned future carries the stop
    /// request to the server and can be spawned.
    pub fn stop(&mut self) -> impl Future<Output = Result<()>> + Send + use<S> {
        self.cancel_run();
        self.state.send_replace(AnalysisState::default());
        info!(coin = %self.coin, "Stopping model run");

        let service = self.service.clone();
        let state = self.state.clone();
        async move {
            if let Err(err) = service.stop_model().await {
                warn!(error = %err, "Stop request failed");
                state.send_if_modified(|s| {
                    if s.is_running() {
                        return false;
                    }
                    s.error = Some(err.user_message(DEFAULT_ERROR_MESSAGE));
                    true
                });
                return Err(err);
            }
            Ok(())
        }
    }

    fn cancel_run(&mut self) {
        self.state.send_if_modified(|_| {
            self.cancel.cancel();
            false
        });
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl<S: ModelService> Drop for AnalysisRunner<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use tokio::time::sleep;

    /// Answers `start_model` once `release` is notified.
    #[derive(Clone)]
    struct GatedModel {
        release: Arc<Notify>,
        failure: Arc<Mutex<Option<&'static str>>>,
        stops: Arc<AtomicUsize>,
    }

    impl GatedModel {
        fn new() -> Self {
            Self {
                release: Arc::new(Notify::new()),
                failure: Arc::new(Mutex::new(None)),
                stops: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing(detail: &'static str) -> Self {
            let model = Self::new();
            *model.failure.lock().unwrap() = Some(detail);
            model
        }
    }

    #[async_trait]
    impl ModelService for GatedModel {
        async fn start_model(&self, _coin: &str) -> Result<()> {
            self.release.notified().await;
            match *self.failure.lock().unwrap() {
                Some(detail) => Err(Error::from_response(
                    400,
                    &format!(r#"{{"detail": "{detail}"}}"#),
                )),
                None => Ok(()),
            }
        }

        async fn stop_model(&self) -> Result<()> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn runner(model: GatedModel) -> AnalysisRunner<GatedModel> {
        AnalysisRunner::new(model, "BTC", Duration::from_secs(70))
    }

    #[test]
    fn test_estimated_percent() {
        assert_eq!(estimated_percent(0, 70), 0);
        assert_eq!(estimated_percent(35, 70), 50);
        assert_eq!(estimated_percent(69, 70), 98);
        assert_eq!(estimated_percent(70, 70), 100);
        assert_eq!(estimated_percent(500, 70), 100);
        assert_eq!(estimated_percent(1, 0), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_is_cosmetic_until_response() {
        let model = GatedModel::new();
        let release = model.release.clone();
        let mut runner = runner(model);
        runner.start();

        sleep(Duration::from_millis(35_500)).await;
        let state = runner.snapshot();
        assert_eq!(state.status, AnalysisStatus::Running);
        assert_eq!(state.progress_percent, 50);

        // The bar fills at the estimate while the server is still working.
        sleep(Duration::from_secs(35)).await;
        let state = runner.snapshot();
        assert_eq!(state.status, AnalysisStatus::Running);
        assert_eq!(state.progress_percent, 100);
        assert_eq!(state.elapsed_secs, 70);

        sleep(Duration::from_secs(100)).await;
        let state = runner.snapshot();
        assert_eq!(state.status, AnalysisStatus::Running);
        assert_eq!(state.elapsed_secs, 70);

        release.notify_one();
        sleep(Duration::from_millis(1)).await;
        let state = runner.snapshot();
        assert_eq!(state.status, AnalysisStatus::Completed);
        assert_eq!(state.progress_percent, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_completion_refreshes_predictions() {
        let model = GatedModel::new();
        let release = model.release.clone();
        let predictions = RefreshHandle::default();
        let mut runner = runner(model).refresh_on_complete(predictions.clone());
        runner.start();

        sleep(Duration::from_millis(10_500)).await;
        release.notify_one();

        tokio::time::timeout(Duration::from_secs(1), predictions.requested())
            .await
            .unwrap();
        assert_eq!(runner.snapshot().progress_percent, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_stops_timer_and_surfaces_detail() {
        let model = GatedModel::failing("coin parametresi gerekli");
        let release = model.release.clone();
        let mut runner = runner(model);
        runner.start();

        sleep(Duration::from_millis(7_500)).await;
        release.notify_one();
        sleep(Duration::from_millis(1)).await;

        let state = runner.snapshot();
        assert_eq!(state.status, AnalysisStatus::Failed);
        assert_eq!(state.error.as_deref(), Some("coin parametresi gerekli"));
        assert_eq!(state.progress_percent, 10);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(runner.snapshot().progress_percent, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_timer_and_notifies_server() {
        let model = GatedModel::new();
        let stops = model.stops.clone();
        let release = model.release.clone();
        let mut runner = runner(model);
        let mut rx = runner.subscribe();
        runner.start();

        sleep(Duration::from_millis(5_500)).await;
        let request = runner.stop();
        // Reset is visible before the server has been asked.
        assert_eq!(runner.snapshot(), AnalysisState::default());
        assert_eq!(stops.load(Ordering::SeqCst), 0);

        request.await.unwrap();
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        rx.borrow_and_update();

        release.notify_one();
        sleep(Duration::from_secs(30)).await;
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_running_is_ignored() {
        let model = GatedModel::new();
        let mut runner = runner(model);
        runner.start();
        sleep(Duration::from_millis(3_500)).await;

        runner.start();
        assert_eq!(runner.snapshot().elapsed_secs, 3);
    }
}
