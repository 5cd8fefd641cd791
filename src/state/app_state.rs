//! Application-level state.

use super::Notification;
use crate::auth::AuthSession;

/// The current tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Strategy,
    Alerts,
    Calendar,
    Portfolio,
    News,
    Swap,
}

impl View {
    /// All tabs in display order.
    pub const ALL: [View; 7] = [
        View::Dashboard,
        View::Strategy,
        View::Alerts,
        View::Calendar,
        View::Portfolio,
        View::News,
        View::Swap,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Strategy => "Strategy",
            View::Alerts => "Alerts",
            View::Calendar => "Calendar",
            View::Portfolio => "Portfolio",
            View::News => "News",
            View::Swap => "Swap",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn next(&self) -> View {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> View {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Input mode for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Insert,
}

/// What the input line is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputTarget {
    #[default]
    SwapAmount,
    LoginUsername,
    LoginPassword,
}

impl InputTarget {
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::SwapAmount => "Amount",
            Self::LoginUsername => "Username",
            Self::LoginPassword => "Password",
        }
    }

    /// Whether typed characters are masked.
    pub fn is_secret(&self) -> bool {
        matches!(self, Self::LoginPassword)
    }
}

/// Global application state.
#[derive(Debug, Default)]
pub struct AppState {
    /// Current view.
    pub current_view: View,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Field being edited in insert mode.
    pub input_target: InputTarget,
    /// Whether to show help overlay.
    pub show_help: bool,
    /// Current notification.
    pub notification: Option<Notification>,
    /// Current error message.
    pub error: Option<String>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Current input.
    pub input_buffer: String,
    /// Cursor position in input buffer, in characters.
    pub cursor_position: usize,
    /// Username entered in the first login step.
    pub pending_username: Option<String>,
    /// Logged-in user, read once at startup.
    pub session: Option<AuthSession>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(session: Option<AuthSession>) -> Self {
        Self {
            session,
            ..Default::default()
        }
    }

    /// Check if in an input mode.
    pub fn is_editing(&self) -> bool {
        self.input_mode == InputMode::Insert
    }

    /// Start editing `target` with an initial value.
    pub fn begin_input(&mut self, target: InputTarget, initial: &str) {
        self.input_mode = InputMode::Insert;
        self.input_target = target;
        self.input_buffer = initial.to_string();
        self.cursor_position = initial.chars().count();
    }

    /// Leave insert mode and return the entered text.
    pub fn take_input(&mut self) -> String {
        self.input_mode = InputMode::Normal;
        self.cursor_position = 0;
        std::mem::take(&mut self.input_buffer)
    }

    /// Clear the input buffer.
    pub fn clear_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.input_buffer
            .char_indices()
            .nth(chars)
            .map_or(self.input_buffer.len(), |(i, _)| i)
    }

    /// Add a character to the input buffer.
    pub fn push_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor_position);
        self.input_buffer.insert(at, c);
        self.cursor_position += 1;
    }

    /// Remove the character before the cursor.
    pub fn pop_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let at = self.byte_index(self.cursor_position);
            self.input_buffer.remove(at);
        }
    }

    /// Move cursor left.
    pub fn cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn cursor_right(&mut self) {
        if self.cursor_position < self.input_buffer.chars().count() {
            self.cursor_position += 1;
        }
    }

    /// Input line as displayed, masking secrets.
    pub fn display_input(&self) -> String {
        if self.input_target.is_secret() {
            "*".repeat(self.input_buffer.chars().count())
        } else {
            self.input_buffer.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_cycle_wraps() {
        assert_eq!(View::Dashboard.next(), View::Strategy);
        assert_eq!(View::Swap.next(), View::Dashboard);
        assert_eq!(View::Dashboard.previous(), View::Swap);
        assert_eq!(View::Calendar.index(), 3);
    }

    #[test]
    fn test_input_editing_handles_multibyte() {
        let mut app = AppState::default();
        app.begin_input(InputTarget::LoginUsername, "zé");
        app.push_char('!');
        assert_eq!(app.input_buffer, "zé!");
        app.cursor_left();
        app.pop_char();
        assert_eq!(app.input_buffer, "z!");
        assert_eq!(app.take_input(), "z!");
        assert!(!app.is_editing());
    }

    #[test]
    fn test_password_is_masked() {
        let mut app = AppState::default();
        app.begin_input(InputTarget::LoginPassword, "");
        for c in "hunter2".chars() {
            app.push_char(c);
        }
        assert_eq!(app.display_input(), "*******");
    }
}
