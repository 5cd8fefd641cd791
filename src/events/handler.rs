//! Event handler for processing input events.

use crate::config::KeyBindings;
use crate::error::Result;
use crate::state::{Action, InputMode, Store, View};
use crate::swap::SwapStatus;
use crossterm::event::{
    Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, MouseEvent,
    MouseEventKind,
};
use futures::StreamExt;

use super::InputEvent;

/// Handles input events and produces actions.
pub struct EventHandler {
    /// Terminal event stream, opened on first read.
    events: Option<EventStream>,
    /// Key bindings.
    keybindings: KeyBindings,
    /// Store reference for state-aware handling.
    store_snapshot: Option<StoreSnapshot>,
}

/// Snapshot of relevant store state for event handling.
#[derive(Debug, Clone)]
struct StoreSnapshot {
    input_mode: InputMode,
    current_view: View,
    show_help: bool,
    has_notification: bool,
    logged_in: bool,
    wallet_connected: bool,
}

impl StoreSnapshot {
    fn of(store: &Store) -> Self {
        Self {
            input_mode: store.app.input_mode,
            current_view: store.app.current_view,
            show_help: store.app.show_help,
            has_notification: store.app.notification.is_some(),
            logged_in: store.app.session.is_some(),
            wallet_connected: store.swap.wallet.status == SwapStatus::Connected,
        }
    }
}

impl EventHandler {
    /// Create a new event handler using `keybindings`.
    pub fn new(keybindings: KeyBindings) -> Self {
        Self {
            events: None,
            keybindings,
            store_snapshot: None,
        }
    }

    /// Update the store snapshot for state-aware event handling.
    pub fn update_store_snapshot(&mut self, store: &Store) {
        self.store_snapshot = Some(StoreSnapshot::of(store));
    }

    /// Wait for the next terminal event and map it to an action.
    /// `Ok(None)` means the event needs no action.
    pub async fn next(&mut self) -> Result<Option<Action>> {
        let events = self.events.get_or_insert_with(EventStream::new);
        let Some(event) = events.next().await else {
            return Ok(Some(Action::Quit));
        };
        Ok(match event? {
            CrosstermEvent::Key(key) => self.handle_key(key),
            CrosstermEvent::Mouse(mouse) => self.handle_mouse(mouse),
            // Terminal will automatically redraw
            _ => None,
        })
    }

    /// Handle a key event and return an optional action.
    fn handle_key(&self, key: KeyEvent) -> Option<Action> {
        // Only process key press events
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let snapshot = self.store_snapshot.as_ref()?;

        match snapshot.input_mode {
            InputMode::Normal => self.handle_normal_mode(key, snapshot),
            InputMode::Insert => self.handle_insert_mode(key),
        }
    }

    /// Handle a mouse event and return an optional action.
    fn handle_mouse(&self, mouse: MouseEvent) -> Option<Action> {
        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Action::ScrollUp),
            MouseEventKind::ScrollDown => Some(Action::ScrollDown),
            _ => None,
        }
    }

    fn handle_normal_mode(&self, key: KeyEvent, snapshot: &StoreSnapshot) -> Option<Action> {
        let input = InputEvent::from(key);
        let keys = &self.keybindings;

        if input.matches(&keys.quit) {
            return Some(Action::Quit);
        }
        if input.matches(&keys.help) {
            return Some(Action::ToggleHelp);
        }
        if input.matches(&keys.back) {
            if snapshot.show_help {
                return Some(Action::ToggleHelp);
            }
            if snapshot.has_notification {
                return Some(Action::DismissNotification);
            }
            return Some(Action::ClearError);
        }
        if input.matches(&keys.refresh) {
            return Some(Action::Refresh);
        }
        if input.matches(&keys.login) {
            return Some(if snapshot.logged_in {
                Action::Logout
            } else {
                Action::BeginLogin
            });
        }

        // View switching
        let views = [
            (&keys.dashboard, View::Dashboard),
            (&keys.strategy, View::Strategy),
            (&keys.alerts, View::Alerts),
            (&keys.calendar, View::Calendar),
            (&keys.portfolio, View::Portfolio),
            (&keys.news, View::News),
            (&keys.swap, View::Swap),
        ];
        if let Some((_, view)) = views.iter().find(|(binding, _)| input.matches(binding)) {
            return Some(Action::SetView(*view));
        }
        match key.code {
            KeyCode::Tab => return Some(Action::NextView),
            KeyCode::BackTab => return Some(Action::PreviousView),
            _ => {}
        }

        // Navigation
        if input.matches(&keys.up) || key.code == KeyCode::Up {
            return Some(Action::ScrollUp);
        }
        if input.matches(&keys.down) || key.code == KeyCode::Down {
            return Some(Action::ScrollDown);
        }
        match key.code {
            KeyCode::PageUp => return Some(Action::PageUp),
            KeyCode::PageDown => return Some(Action::PageDown),
            KeyCode::Home => return Some(Action::GoToTop),
            KeyCode::End => return Some(Action::GoToBottom),
            _ => {}
        }

        // View-specific actions
        match snapshot.current_view {
            View::Strategy => self.handle_strategy_view(input),
            View::Alerts => self.handle_alerts_view(input),
            View::Calendar => self.handle_calendar_view(key),
            View::Swap => self.handle_swap_view(input, key, snapshot),
            View::Dashboard | View::Portfolio | View::News => None,
        }
    }

    fn handle_strategy_view(&self, input: InputEvent) -> Option<Action> {
        if input.matches(&self.keybindings.start_model) {
            return Some(Action::StartModel);
        }
        if input.matches(&self.keybindings.stop_model) {
            return Some(Action::StopModel);
        }
        None
    }

    fn handle_alerts_view(&self, input: InputEvent) -> Option<Action> {
        if input.matches(&self.keybindings.mark_read) || input.matches(&self.keybindings.select) {
            return Some(Action::MarkSelectedRead);
        }
        match input.char()? {
            'p' => Some(Action::CycleAlertPriority),
            'g' => Some(Action::CycleAlertCategory),
            't' => Some(Action::CycleAlertKind),
            'd' => Some(Action::CycleAlertDateRange),
            'u' => Some(Action::ToggleUnreadOnly),
            '0' => Some(Action::ResetAlertFilter),
            _ => None,
        }
    }

    fn handle_calendar_view(&self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('t') => Some(Action::CycleEventType),
            KeyCode::Char('n') => Some(Action::CycleEventCountry),
            KeyCode::Char('o') => Some(Action::CycleEventMonth),
            KeyCode::Char('0') => Some(Action::ResetEventFilter),
            _ => None,
        }
    }

    fn handle_swap_view(
        &self,
        input: InputEvent,
        key: KeyEvent,
        snapshot: &StoreSnapshot,
    ) -> Option<Action> {
        if input.matches(&self.keybindings.connect) {
            return Some(Action::ConnectWallet);
        }
        if input.matches(&self.keybindings.select) {
            return snapshot.wallet_connected.then_some(Action::SubmitSwap);
        }
        match key.code {
            KeyCode::Char('f') => Some(Action::CycleSwapFrom),
            KeyCode::Char('t') => Some(Action::CycleSwapTo),
            KeyCode::Char('x') => Some(Action::FlipSwapTokens),
            KeyCode::Char('a') | KeyCode::Char('i') => Some(Action::EditSwapAmount),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::IncreaseSlippage),
            KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::DecreaseSlippage),
            _ => None,
        }
    }

    fn handle_insert_mode(&self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => Some(Action::CancelInput),
            KeyCode::Enter => Some(Action::SubmitInput),
            KeyCode::Backspace => Some(Action::InputBackspace),
            KeyCode::Left => Some(Action::InputLeft),
            KeyCode::Right => Some(Action::InputRight),
            KeyCode::Char(c) => Some(Action::InputChar(c)),
            _ => None,
        }
    }
}
