//! State management for MarketDeck.
//!
//! This module provides centralized state management with a unidirectional
//! data flow pattern inspired by Redux/Elm architecture. Pollers and the
//! ticker stream publish snapshots that arrive here as actions; the render
//! layer only ever reads the store.

mod alert_state;
mod app_state;
mod calendar_state;
pub(crate) mod de;
mod market_state;
mod news_state;
mod portfolio_state;
mod swap_state;

pub use alert_state::{Alert, AlertState, Priority, ReadSet};
pub use app_state::{AppState, InputMode, InputTarget, View};
pub use calendar_state::{CalendarState, EconomicEvent, EventType, Impact, bundled_events};
pub use market_state::{
    AnalyzedCoin, CoinTicker, MarketSignal, MarketState, PredictionSet, PricePrediction,
    SignalKind, Ticker, TickerState,
};
pub use news_state::{NewsItem, NewsState, PostMetrics, SocialPost};
pub use portfolio_state::{
    Holding, Portfolio, PortfolioCategory, PortfolioPosition, PortfolioState, PositionAnalysis,
    Trend,
};
pub use swap_state::SwapFormState;

use crate::analysis::AnalysisState;
use crate::auth::AuthSession;
use crate::error::Result;
use crate::poller::PollResult;
use crate::swap::SwapState;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

/// Actions that can be dispatched to modify state.
///
/// Commands (`Refresh`, `StartModel`, `ConnectWallet`, ...) carry side
/// effects and are executed by the app before reaching the reducer.
#[derive(Debug, Clone)]
pub enum Action {
    // Navigation
    SetView(View),
    NextView,
    PreviousView,
    SetInputMode(InputMode),

    // Published snapshots
    PredictionsUpdated(PollResult<PredictionSet>),
    SignalsUpdated(PollResult<Vec<MarketSignal>>),
    AnalyzedCoinsUpdated(PollResult<Vec<AnalyzedCoin>>),
    CoinsUpdated(PollResult<Vec<CoinTicker>>),
    TickersUpdated(TickerState),
    AlertsUpdated(PollResult<Vec<Alert>>),
    CalendarUpdated(PollResult<Vec<EconomicEvent>>),
    PortfolioUpdated(PollResult<Portfolio>),
    NewsUpdated(PollResult<Vec<NewsItem>>),
    SocialUpdated(PollResult<Vec<SocialPost>>),
    AnalysisUpdated(AnalysisState),
    SwapUpdated(SwapState),
    SessionChanged(Option<AuthSession>),

    // Alerts
    MarkSelectedRead,
    CycleAlertPriority,
    CycleAlertCategory,
    CycleAlertKind,
    CycleAlertDateRange,
    ToggleUnreadOnly,
    ResetAlertFilter,

    // Calendar
    CycleEventType,
    CycleEventCountry,
    CycleEventMonth,
    ResetEventFilter,

    // Swap form
    CycleSwapFrom,
    CycleSwapTo,
    FlipSwapTokens,
    IncreaseSlippage,
    DecreaseSlippage,
    EditSwapAmount,

    // Text input
    BeginLogin,
    InputChar(char),
    InputBackspace,
    InputLeft,
    InputRight,
    SubmitInput,
    CancelInput,

    // Commands
    Refresh,
    StartModel,
    StopModel,
    ConnectWallet,
    SubmitSwap,
    Login { username: String, password: String },
    Logout,

    // UI actions
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    ToggleHelp,
    ShowNotification(Notification),
    DismissNotification,

    // Error handling
    SetError(String),
    ClearError,

    // Quit
    Quit,
}

/// A notification to display to the user.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub duration_secs: u64,
}

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Info,
            duration_secs: 3,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Success,
            duration_secs: 3,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Warning,
            duration_secs: 5,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Error,
            duration_secs: 10,
        }
    }
}

/// The global state store.
#[derive(Debug)]
pub struct Store {
    /// Application state.
    pub app: AppState,
    /// Predictions, signals, coins and tickers.
    pub market: MarketState,
    /// Alert feed and read markers.
    pub alerts: AlertState,
    /// Economic calendar.
    pub calendar: CalendarState,
    /// Portfolio snapshot.
    pub portfolio: PortfolioState,
    /// News and social feed.
    pub news: NewsState,
    /// Model run progress.
    pub analysis: AnalysisState,
    /// Swap form and wallet status.
    pub swap: SwapFormState,
    /// Action sender for dispatching actions.
    action_tx: mpsc::UnboundedSender<Action>,
}

impl Store {
    /// Create a new store with the given action sender.
    pub fn new(action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            app: AppState::default(),
            market: MarketState::default(),
            alerts: AlertState::default(),
            calendar: CalendarState::default(),
            portfolio: PortfolioState::default(),
            news: NewsState::default(),
            analysis: AnalysisState::default(),
            swap: SwapFormState::default(),
            action_tx,
        }
    }

    /// Dispatch an action to the store.
    pub fn dispatch(&self, action: Action) -> Result<()> {
        self.action_tx
            .send(action)
            .map_err(|e| crate::Error::channel(e.to_string()))
    }

    /// Apply an action to update state.
    pub fn reduce(&mut self, action: Action) {
        self.reduce_at(action, Utc::now());
    }

    /// Apply an action with an explicit "now" for date-relative views.
    pub fn reduce_at(&mut self, action: Action, now: DateTime<Utc>) {
        match action {
            // Navigation
            Action::SetView(view) => self.app.current_view = view,
            Action::NextView => self.app.current_view = self.app.current_view.next(),
            Action::PreviousView => self.app.current_view = self.app.current_view.previous(),
            Action::SetInputMode(mode) => self.app.input_mode = mode,

            // Published snapshots
            Action::PredictionsUpdated(result) => self.market.predictions = result,
            Action::SignalsUpdated(result) => {
                self.market.signals = result;
                self.market.selected_signal =
                    clamp_selection(self.market.selected_signal, self.market.signal_count());
            }
            Action::AnalyzedCoinsUpdated(result) => self.market.analyzed_coins = result,
            Action::CoinsUpdated(result) => self.market.coins = result,
            Action::TickersUpdated(tickers) => self.market.tickers = tickers,
            Action::AlertsUpdated(result) => {
                self.alerts.feed = result;
                self.clamp_alert_selection();
            }
            Action::CalendarUpdated(result) => {
                self.calendar.feed = result;
                self.clamp_calendar_selection(now);
            }
            Action::PortfolioUpdated(result) => {
                self.portfolio.feed = result;
                self.portfolio.selected_index =
                    clamp_selection(self.portfolio.selected_index, self.portfolio.position_count());
            }
            Action::NewsUpdated(result) => {
                self.news.articles = result;
                self.news.selected_index =
                    clamp_selection(self.news.selected_index, self.news.article_count());
            }
            Action::SocialUpdated(result) => self.news.social = result,
            Action::AnalysisUpdated(state) => self.analysis = state,
            Action::SwapUpdated(state) => self.swap.wallet = state,
            Action::SessionChanged(session) => self.app.session = session,

            // Alerts
            Action::MarkSelectedRead => {
                if let Some(alert) = self.alerts.selected() {
                    self.alerts.mark_read(alert.id);
                    self.clamp_alert_selection();
                }
            }
            Action::CycleAlertPriority => {
                self.alerts.filter.cycle_priority();
                self.clamp_alert_selection();
            }
            Action::CycleAlertCategory => {
                let alerts = self.alerts.feed.data.clone().unwrap_or_default();
                self.alerts.filter.cycle_category(&alerts);
                self.clamp_alert_selection();
            }
            Action::CycleAlertKind => {
                let alerts = self.alerts.feed.data.clone().unwrap_or_default();
                self.alerts.filter.cycle_kind(&alerts);
                self.clamp_alert_selection();
            }
            Action::CycleAlertDateRange => {
                self.alerts.filter.cycle_date_range(now);
                self.clamp_alert_selection();
            }
            Action::ToggleUnreadOnly => {
                self.alerts.filter.only_unread = !self.alerts.filter.only_unread;
                self.clamp_alert_selection();
            }
            Action::ResetAlertFilter => {
                self.alerts.filter.reset();
                self.clamp_alert_selection();
            }

            // Calendar
            Action::CycleEventType => {
                self.calendar.filter.cycle_type();
                self.clamp_calendar_selection(now);
            }
            Action::CycleEventCountry => {
                let events = self.calendar.events().to_vec();
                self.calendar.filter.cycle_country(&events);
                self.clamp_calendar_selection(now);
            }
            Action::CycleEventMonth => {
                self.calendar.filter.cycle_month(now);
                self.clamp_calendar_selection(now);
            }
            Action::ResetEventFilter => {
                self.calendar.filter = Default::default();
                self.clamp_calendar_selection(now);
            }

            // Swap form
            Action::CycleSwapFrom => self.swap.from = self.next_token(self.swap.from),
            Action::CycleSwapTo => self.swap.to = self.next_token(self.swap.to),
            Action::FlipSwapTokens => self.swap.flip(),
            Action::IncreaseSlippage => self.swap.increase_slippage(),
            Action::DecreaseSlippage => self.swap.decrease_slippage(),
            Action::EditSwapAmount => {
                let amount = self.swap.amount.clone();
                self.app.begin_input(InputTarget::SwapAmount, &amount);
            }

            // Text input
            Action::BeginLogin => {
                self.app.pending_username = None;
                self.app.begin_input(InputTarget::LoginUsername, "");
            }
            Action::InputChar(c) => self.app.push_char(c),
            Action::InputBackspace => self.app.pop_char(),
            Action::InputLeft => self.app.cursor_left(),
            Action::InputRight => self.app.cursor_right(),
            Action::SubmitInput => self.submit_input(),
            Action::CancelInput => {
                self.app.take_input();
                self.app.pending_username = None;
            }

            // Commands are executed by the app; nothing to record here.
            Action::Refresh
            | Action::StartModel
            | Action::StopModel
            | Action::ConnectWallet
            | Action::SubmitSwap
            | Action::Login { .. }
            | Action::Logout => {}

            // UI actions
            Action::ScrollUp => self.scroll(-1, now),
            Action::ScrollDown => self.scroll(1, now),
            Action::PageUp => self.scroll(-10, now),
            Action::PageDown => self.scroll(10, now),
            Action::GoToTop => self.scroll(i64::MIN / 2, now),
            Action::GoToBottom => self.scroll(i64::MAX / 2, now),
            Action::ToggleHelp => self.app.show_help = !self.app.show_help,
            Action::ShowNotification(notification) => {
                self.app.notification = Some(notification);
            }
            Action::DismissNotification => {
                self.app.notification = None;
            }

            // Error handling
            Action::SetError(error) => {
                self.app.error = Some(error);
            }
            Action::ClearError => {
                self.app.error = None;
            }

            // Quit
            Action::Quit => {
                self.app.should_quit = true;
            }
        }
    }

    /// Finish the active input. The login step that completes a
    /// username/password pair queues a `Login` command.
    fn submit_input(&mut self) {
        let target = self.app.input_target;
        let text = self.app.take_input();
        match target {
            InputTarget::SwapAmount => self.swap.amount = text.trim().to_string(),
            InputTarget::LoginUsername => {
                if text.trim().is_empty() {
                    return;
                }
                self.app.pending_username = Some(text.trim().to_string());
                self.app.begin_input(InputTarget::LoginPassword, "");
            }
            InputTarget::LoginPassword => {
                if let Some(username) = self.app.pending_username.take() {
                    let _ = self.dispatch(Action::Login {
                        username,
                        password: text,
                    });
                }
            }
        }
    }

    fn next_token(&self, symbol: &str) -> &'static str {
        crate::swap::TokenRegistry::default().next_symbol(symbol)
    }

    /// Number of selectable rows in the current view.
    fn row_count(&self, now: DateTime<Utc>) -> usize {
        match self.app.current_view {
            View::Strategy => self.market.signal_count(),
            View::Alerts => self.alerts.visible().len(),
            View::Calendar => self.calendar.visible(now).len(),
            View::Portfolio => self.portfolio.position_count(),
            View::News => self.news.article_count(),
            View::Dashboard | View::Swap => 0,
        }
    }

    fn selection_mut(&mut self) -> Option<&mut Option<usize>> {
        match self.app.current_view {
            View::Strategy => Some(&mut self.market.selected_signal),
            View::Alerts => Some(&mut self.alerts.selected_index),
            View::Calendar => Some(&mut self.calendar.selected_index),
            View::Portfolio => Some(&mut self.portfolio.selected_index),
            View::News => Some(&mut self.news.selected_index),
            View::Dashboard | View::Swap => None,
        }
    }

    fn scroll(&mut self, delta: i64, now: DateTime<Utc>) {
        let count = self.row_count(now);
        let Some(selection) = self.selection_mut() else {
            return;
        };
        if count == 0 {
            *selection = None;
            return;
        }
        let current = selection.map_or(0, |i| i as i64);
        let max = (count - 1) as i64;
        *selection = Some((current.saturating_add(delta)).clamp(0, max) as usize);
    }

    fn clamp_alert_selection(&mut self) {
        self.alerts.selected_index =
            clamp_selection(self.alerts.selected_index, self.alerts.visible().len());
    }

    fn clamp_calendar_selection(&mut self, now: DateTime<Utc>) {
        self.calendar.selected_index =
            clamp_selection(self.calendar.selected_index, self.calendar.visible(now).len());
    }
}

fn clamp_selection(selection: Option<usize>, len: usize) -> Option<usize> {
    match (selection, len) {
        (_, 0) => None,
        (Some(i), len) => Some(i.min(len - 1)),
        (None, _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn store() -> (Store, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Store::new(tx), rx)
    }

    fn alerts() -> Vec<Alert> {
        serde_json::from_str(
            r#"[
                {"id": 1, "priority": "high", "category": "crypto", "type": "price",
                 "title": "BTC", "timestamp": "2025-02-01T09:00:00"},
                {"id": 2, "priority": "low", "category": "forex", "type": "news",
                 "title": "EUR", "timestamp": "2025-02-01T10:00:00"},
                {"id": 3, "priority": "medium", "category": "crypto", "type": "news",
                 "title": "ETH", "timestamp": "2025-02-01T11:00:00"}
            ]"#,
        )
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_view_navigation() {
        let (mut store, _rx) = store();
        store.reduce(Action::SetView(View::Swap));
        store.reduce(Action::NextView);
        assert_eq!(store.app.current_view, View::Dashboard);
        store.reduce(Action::PreviousView);
        assert_eq!(store.app.current_view, View::Swap);
    }

    #[test]
    fn test_mark_read_hides_alert_from_unread_view() {
        let (mut store, _rx) = store();
        store.reduce(Action::AlertsUpdated(PollResult::with_data(alerts())));
        store.reduce(Action::SetView(View::Alerts));
        store.reduce(Action::ScrollDown);
        assert_eq!(store.alerts.selected().map(|a| a.id), Some("2".to_string()));

        store.reduce(Action::MarkSelectedRead);
        assert_eq!(store.alerts.unread_count(), 2);
        let ids: Vec<String> = store.alerts.visible().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["1", "3"]);

        store.reduce(Action::ToggleUnreadOnly);
        assert_eq!(store.alerts.visible().len(), 3);
    }

    #[test]
    fn test_date_range_narrows_alert_feed() {
        let (mut store, _rx) = store();
        store.reduce(Action::AlertsUpdated(PollResult::with_data(alerts())));
        store.reduce(Action::SetView(View::Alerts));
        store.reduce(Action::GoToBottom);

        // 2025-02-01 09:00..11:00; "today" at 10:30 keeps the first two.
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 10, 30, 0).unwrap();
        store.reduce_at(Action::CycleAlertDateRange, now);
        let ids: Vec<String> = store.alerts.visible().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(store.alerts.selected_index, Some(1));

        let later = Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap();
        store.reduce_at(Action::CycleAlertDateRange, later);
        assert!(store.alerts.visible().is_empty());

        store.reduce(Action::ResetAlertFilter);
        assert_eq!(store.alerts.visible().len(), 3);
    }

    #[test]
    fn test_selection_is_clamped_when_feed_shrinks() {
        let (mut store, _rx) = store();
        store.reduce(Action::AlertsUpdated(PollResult::with_data(alerts())));
        store.reduce(Action::SetView(View::Alerts));
        store.reduce(Action::GoToBottom);
        assert_eq!(store.alerts.selected_index, Some(2));

        let mut fewer = alerts();
        fewer.truncate(1);
        store.reduce(Action::AlertsUpdated(PollResult::with_data(fewer)));
        assert_eq!(store.alerts.selected_index, Some(0));

        store.reduce(Action::AlertsUpdated(PollResult::with_data(vec![])));
        assert_eq!(store.alerts.selected_index, None);
    }

    #[test]
    fn test_calendar_scroll_uses_filtered_rows() {
        let (mut store, _rx) = store();
        store.reduce(Action::SetView(View::Calendar));
        let visible = store.calendar.visible(now()).len();
        assert!(visible > 0);

        store.reduce_at(Action::GoToBottom, now());
        assert_eq!(store.calendar.selected_index, Some(visible - 1));
        store.reduce_at(Action::PageUp, now());
        assert_eq!(
            store.calendar.selected_index,
            Some(visible.saturating_sub(11))
        );
    }

    #[test]
    fn test_login_flow_queues_command() {
        let (mut store, mut rx) = store();
        store.reduce(Action::BeginLogin);
        for c in "ivy".chars() {
            store.reduce(Action::InputChar(c));
        }
        store.reduce(Action::SubmitInput);
        assert_eq!(store.app.input_target, InputTarget::LoginPassword);
        assert!(store.app.is_editing());

        for c in "pw".chars() {
            store.reduce(Action::InputChar(c));
        }
        store.reduce(Action::SubmitInput);
        assert!(!store.app.is_editing());

        match rx.try_recv().unwrap() {
            Action::Login { username, password } => {
                assert_eq!(username, "ivy");
                assert_eq!(password, "pw");
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn test_swap_amount_editing() {
        let (mut store, _rx) = store();
        store.reduce(Action::EditSwapAmount);
        for c in "2.5".chars() {
            store.reduce(Action::InputChar(c));
        }
        store.reduce(Action::SubmitInput);
        assert_eq!(store.swap.amount, "2.5");

        store.reduce(Action::CycleSwapFrom);
        assert_eq!(store.swap.from, "WBNB");
    }

    #[test]
    fn test_snapshots_replace_previous_state() {
        let (mut store, _rx) = store();
        let mut analysis = AnalysisState::default();
        analysis.progress_percent = 42;
        store.reduce(Action::AnalysisUpdated(analysis.clone()));
        assert_eq!(store.analysis, analysis);

        store.reduce(Action::SessionChanged(Some(AuthSession {
            username: "ivy".to_string(),
        })));
        assert_eq!(store.app.session.as_ref().map(|s| s.username.as_str()), Some("ivy"));
    }
}
