//! Main application module.
//!
//! `App` owns the terminal, the store and every background source: one
//! poller per data domain, the ticker stream, the model runner and the swap
//! widget. Sources publish on watch channels; small forwarder tasks turn
//! each change into an [`Action`] so the store is only mutated on the UI
//! loop.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::analysis::AnalysisRunner;
use crate::api::{ApiClient, Endpoint, TickerStream};
use crate::auth::SessionStore;
use crate::config::{self, Config};
use crate::error::Result;
use crate::events::EventHandler;
use crate::poller::{Fetch, HttpFetch, PollResult, Poller, RefreshHandle};
use crate::state::{Action, AppState, Notification, Store, SwapFormState, View};
use crate::swap::{JsonRpcWallet, SwapWidget, WalletProvider};
use crate::ui::Ui;

/// Lifecycle shared by every poller regardless of its payload type.
trait Scoped {
    fn start(&mut self);
    fn stop(&mut self);
    fn refresh(&self);
    fn is_running(&self) -> bool;
}

impl<F: Fetch> Scoped for Poller<F> {
    fn start(&mut self) {
        Poller::start(self);
    }

    fn stop(&mut self) {
        Poller::stop(self);
    }

    fn refresh(&self) {
        Poller::refresh(self);
    }

    fn is_running(&self) -> bool {
        Poller::is_running(self)
    }
}

/// A poller plus the tabs that show its data.
struct ViewPoller {
    views: &'static [View],
    poller: Box<dyn Scoped>,
}

/// Forward every change of `rx` to the action channel until shutdown.
fn forward<T, M>(
    mut rx: watch::Receiver<T>,
    tx: mpsc::UnboundedSender<Action>,
    shutdown: CancellationToken,
    into_action: M,
) where
    T: Clone + Send + Sync + 'static,
    M: Fn(T) -> Action + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let value = rx.borrow_and_update().clone();
                    if tx.send(into_action(value)).is_err() {
                        break;
                    }
                }
            }
        }
    });
}

/// Start the pollers that belong to `view` and stop all others.
fn sync_pollers(pollers: &mut [ViewPoller], view: View) {
    for entry in pollers {
        let visible = entry.views.contains(&view);
        if visible && !entry.poller.is_running() {
            entry.poller.start();
        } else if !visible && entry.poller.is_running() {
            entry.poller.stop();
        }
    }
}

/// Builds pollers, wires their forwarders and records their tabs.
struct PollerSet<'a> {
    client: &'a ApiClient,
    tx: &'a mpsc::UnboundedSender<Action>,
    shutdown: &'a CancellationToken,
    pollers: Vec<ViewPoller>,
}

impl PollerSet<'_> {
    fn add<T>(
        &mut self,
        name: &str,
        endpoint: Endpoint,
        interval_secs: u64,
        views: &'static [View],
        into_action: fn(PollResult<T>) -> Action,
    ) -> RefreshHandle
    where
        T: serde::de::DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let poller = Poller::new(
            name,
            HttpFetch::<T>::new(self.client.clone(), endpoint),
            Duration::from_secs(interval_secs.max(1)),
        )
        .with_generic_error(format!("Could not load {name}. Please try again later."));
        forward(
            poller.subscribe(),
            self.tx.clone(),
            self.shutdown.clone(),
            into_action,
        );
        let handle = poller.refresh_handle();
        self.pollers.push(ViewPoller {
            views,
            poller: Box::new(poller),
        });
        handle
    }
}

/// The main application.
pub struct App {
    /// Terminal.
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application store.
    store: Store,
    /// Renderer.
    ui: Ui,
    /// Event handler.
    event_handler: EventHandler,
    /// Action sender, cloned into background tasks.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver.
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// API client.
    client: ApiClient,
    /// Pollers, started and stopped with the tabs that show them.
    pollers: Vec<ViewPoller>,
    /// Refresh trigger of the shared predictions poller.
    predictions: RefreshHandle,
    /// Market ticker WebSocket.
    tickers: TickerStream,
    /// Model run trigger.
    analysis: AnalysisRunner<ApiClient>,
    /// Swap widget.
    swap: Arc<SwapWidget>,
    /// Persisted login.
    sessions: SessionStore,
    /// When the current notification was shown.
    notification_shown_at: Option<Instant>,
    /// Stops the forwarder tasks.
    shutdown: CancellationToken,
    /// Configuration.
    config: Config,
}

impl App {
    /// Create a new application.
    pub async fn new(config: Config) -> Result<Self> {
        let client = ApiClient::new(config.api.clone())?;
        let sessions = SessionStore::new(config::data_dir()?);
        let session = sessions.load();

        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        let mut store = Store::new(action_tx.clone());
        store.app = AppState::new(session);
        store.swap = SwapFormState::with_slippage(config.wallet.slippage_percent);

        let polling = &config.polling;
        let mut set = PollerSet {
            client: &client,
            tx: &action_tx,
            shutdown: &shutdown,
            pollers: Vec::new(),
        };

        let predictions_refresh = set.add(
            "predictions",
            Endpoint::predictions(),
            polling.predictions_secs,
            &[View::Dashboard, View::Strategy],
            Action::PredictionsUpdated,
        );
        set.add(
            "coins",
            Endpoint::coins(),
            polling.coins_secs,
            &[View::Dashboard],
            Action::CoinsUpdated,
        );
        set.add(
            "signals",
            Endpoint::signals(),
            polling.signals_secs,
            &[View::Strategy],
            Action::SignalsUpdated,
        );
        set.add(
            "analyzed coins",
            Endpoint::analyzed_coins(),
            polling.analyzed_coins_secs,
            &[View::Strategy],
            Action::AnalyzedCoinsUpdated,
        );
        set.add(
            "alerts",
            Endpoint::alerts(),
            polling.alerts_secs,
            &[View::Alerts],
            Action::AlertsUpdated,
        );
        set.add(
            "calendar",
            Endpoint::calendar(),
            polling.calendar_secs,
            &[View::Calendar],
            Action::CalendarUpdated,
        );
        set.add(
            "portfolio",
            Endpoint::portfolio(),
            polling.portfolio_secs,
            &[View::Portfolio],
            Action::PortfolioUpdated,
        );
        set.add(
            "news",
            Endpoint::news(),
            polling.news_secs,
            &[View::News],
            Action::NewsUpdated,
        );
        set.add(
            "posts",
            Endpoint::social(&config.ui.social_username),
            polling.social_secs,
            &[View::News],
            Action::SocialUpdated,
        );

        let pollers = set.pollers;

        let tickers = TickerStream::new(config.api.ws_url.clone());
        forward(
            tickers.subscribe(),
            action_tx.clone(),
            shutdown.clone(),
            Action::TickersUpdated,
        );

        let analysis = AnalysisRunner::new(
            client.clone(),
            config.analysis.coin.clone(),
            Duration::from_secs(config.analysis.estimate_secs),
        )
        .refresh_on_complete(predictions_refresh.clone());
        forward(
            analysis.subscribe(),
            action_tx.clone(),
            shutdown.clone(),
            Action::AnalysisUpdated,
        );

        let provider: Option<Arc<dyn WalletProvider>> = match &config.wallet.rpc_url {
            Some(url) => match JsonRpcWallet::new(url.clone()) {
                Ok(wallet) => Some(Arc::new(wallet) as Arc<dyn WalletProvider>),
                Err(err) => {
                    warn!(%url, error = %err, "Wallet provider unavailable");
                    None
                }
            },
            None => None,
        };
        let swap = Arc::new(SwapWidget::new(provider, &config.wallet)?);
        forward(
            swap.subscribe(),
            action_tx.clone(),
            shutdown.clone(),
            Action::SwapUpdated,
        );

        // Terminal last, so a failed setup above leaves the shell untouched.
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if config.ui.mouse_support {
            execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        } else {
            execute!(stdout, EnterAlternateScreen)?;
        }
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            store,
            ui: Ui::new(&config),
            event_handler: EventHandler::new(config.keybindings.clone()),
            action_tx,
            action_rx,
            client,
            pollers,
            predictions: predictions_refresh,
            tickers,
            analysis,
            swap,
            sessions,
            notification_shown_at: None,
            shutdown,
            config,
        })
    }

    /// Run the application event loop.
    pub async fn run(&mut self) -> Result<()> {
        info!(base_url = %self.client.base_url(), "Starting MarketDeck");
        self.tickers.start();
        self.sync_pollers();

        let mut tick = tokio::time::interval(Duration::from_millis(
            self.config.ui.tick_rate_ms.max(16),
        ));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            self.event_handler.update_store_snapshot(&self.store);

            self.terminal.draw(|frame| {
                self.ui.render(frame, &self.store);
            })?;

            tokio::select! {
                result = self.event_handler.next() => {
                    if let Some(action) = result? {
                        self.handle_action(action).await?;
                    }
                }

                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action).await?;
                }

                _ = tick.tick() => self.expire_notification(),
            }

            if self.store.app.should_quit {
                break;
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Handle an action: run its side effect, then let the store reduce it.
    async fn handle_action(&mut self, action: Action) -> Result<()> {
        match &action {
            Action::Refresh => self.refresh_current_view(),
            Action::StartModel => self.analysis.start(),
            Action::StopModel => self.stop_model(),
            Action::ConnectWallet => self.connect_wallet(),
            Action::SubmitSwap => self.submit_swap(),
            Action::Login { username, password } => {
                self.login(username.clone(), password.clone());
            }
            Action::Logout => self.logout(),
            _ => {}
        }

        let changes_view = matches!(
            action,
            Action::SetView(_) | Action::NextView | Action::PreviousView
        );
        let shows_notification = matches!(action, Action::ShowNotification(_));
        self.store.reduce(action);

        if changes_view {
            self.sync_pollers();
        }
        if shows_notification {
            self.notification_shown_at = Some(Instant::now());
        }
        Ok(())
    }

    fn sync_pollers(&mut self) {
        let view = self.store.app.current_view;
        sync_pollers(&mut self.pollers, view);
        debug!(view = view.title(), "Synced pollers");
    }

    fn refresh_current_view(&self) {
        let view = self.store.app.current_view;
        if view == View::Dashboard {
            // Ask the model service to regenerate, then re-read its output.
            let client = self.client.clone();
            let predictions = self.predictions.clone();
            tokio::spawn(async move {
                match client.execute(&Endpoint::update_predictions()).await {
                    Ok(()) => predictions.trigger(),
                    Err(err) => warn!(error = %err, "Prediction update failed"),
                }
            });
        }
        for entry in self.pollers.iter().filter(|e| e.views.contains(&view)) {
            entry.poller.refresh();
        }
    }

    fn stop_model(&mut self) {
        let request = self.analysis.stop();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            if let Err(err) = request.await {
                let notification = Notification::error(
                    err.user_message(crate::analysis::DEFAULT_ERROR_MESSAGE),
                );
                let _ = tx.send(Action::ShowNotification(notification));
            }
        });
    }

    fn connect_wallet(&self) {
        let swap = self.swap.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let notification = match swap.connect().await {
                Ok(account) => Notification::success(format!("Wallet connected: {account}")),
                Err(err) => Notification::error(err.user_message("Wallet connection failed")),
            };
            let _ = tx.send(Action::ShowNotification(notification));
        });
    }

    fn submit_swap(&mut self) {
        let request = match self.store.swap.request() {
            Ok(request) => request,
            Err(err) => {
                self.notify(Notification::warning(err.user_message("Invalid swap")));
                return;
            }
        };
        let swap = self.swap.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let notification = match swap.swap(&request).await {
                Ok(hash) => Notification::success(format!("Swap submitted: {hash}")),
                Err(err) => Notification::error(err.user_message("Swap failed")),
            };
            let _ = tx.send(Action::ShowNotification(notification));
        });
    }

    fn login(&self, username: String, password: String) {
        let sessions = self.sessions.clone();
        let client = self.client.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match sessions.login(&client, &username, &password).await {
                Ok(session) => {
                    let message = format!("Logged in as {}", session.username);
                    let _ = tx.send(Action::SessionChanged(Some(session)));
                    let _ = tx.send(Action::ShowNotification(Notification::success(message)));
                }
                Err(err) => {
                    warn!(error = %err, "Login failed");
                    let message = err.user_message("Login failed");
                    let notification = if err.is_recoverable() {
                        Notification::warning(format!("{message} Please try again."))
                    } else {
                        Notification::error(message)
                    };
                    let _ = tx.send(Action::ShowNotification(notification));
                }
            }
        });
    }

    fn logout(&mut self) {
        match self.sessions.logout() {
            Ok(()) => {
                self.store.reduce(Action::SessionChanged(None));
                self.notify(Notification::info("Logged out"));
            }
            Err(err) => self.notify(Notification::error(err.user_message("Logout failed"))),
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.store.reduce(Action::ShowNotification(notification));
        self.notification_shown_at = Some(Instant::now());
    }

    fn expire_notification(&mut self) {
        let Some(notification) = &self.store.app.notification else {
            self.notification_shown_at = None;
            return;
        };
        let expired = self
            .notification_shown_at
            .is_none_or(|at| at.elapsed() >= Duration::from_secs(notification.duration_secs));
        if expired {
            self.store.reduce(Action::DismissNotification);
            self.notification_shown_at = None;
        }
    }

    fn shutdown(&mut self) {
        for entry in &mut self.pollers {
            entry.poller.stop();
        }
        self.tickers.stop();
        self.swap.disconnect();
        self.shutdown.cancel();
        info!("MarketDeck stopped");
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown.cancel();
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        starts: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
        running: bool,
    }

    impl Scoped for Counting {
        fn start(&mut self) {
            self.running = true;
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn stop(&mut self) {
            self.running = false;
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
        fn refresh(&self) {}
        fn is_running(&self) -> bool {
            self.running
        }
    }

    #[tokio::test]
    async fn test_forwarder_turns_changes_into_actions() {
        let (state, rx) = watch::channel(PollResult::<Vec<crate::state::NewsItem>>::default());
        let (tx, mut actions) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        forward(rx, tx, shutdown.clone(), Action::NewsUpdated);

        state.send_replace(PollResult::with_data(Vec::new()));
        match actions.recv().await {
            Some(Action::NewsUpdated(result)) => assert!(result.data.is_some()),
            other => panic!("unexpected action: {other:?}"),
        }

        shutdown.cancel();
        state.send_replace(PollResult::default());
        assert!(actions.recv().await.is_none());
    }

    #[test]
    fn test_pollers_follow_visible_view() {
        let starts = Arc::new(AtomicUsize::new(0));
        let stops = Arc::new(AtomicUsize::new(0));
        let mut pollers = vec![ViewPoller {
            views: &[View::Dashboard, View::Strategy],
            poller: Box::new(Counting {
                starts: starts.clone(),
                stops: stops.clone(),
                running: false,
            }),
        }];

        sync_pollers(&mut pollers, View::Alerts);
        assert_eq!(starts.load(Ordering::SeqCst), 0);

        sync_pollers(&mut pollers, View::Dashboard);
        sync_pollers(&mut pollers, View::Strategy);
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert_eq!(stops.load(Ordering::SeqCst), 0);

        sync_pollers(&mut pollers, View::News);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(!pollers[0].poller.is_running());
    }
}
