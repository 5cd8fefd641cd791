//! UI rendering using ratatui.
//!
//! Every frame is drawn from the store alone; widgets never fetch.

mod layout;
mod widgets;

pub use layout::{Layout, centered_rect};

use std::time::Duration;

use chrono::Utc;
use ratatui::Frame;

use crate::config::{Config, MinOutPolicy};
use crate::state::{Store, View};
use widgets::{
    AlertList, CalendarView, Dashboard, HelpPanel, InputLine, NewsFeed, PortfolioView, StatusBar,
    StrategyView, SwapPanel, TabBar,
};

/// Main UI renderer.
#[derive(Debug, Clone)]
pub struct Ui {
    show_status_bar: bool,
    analysis_estimate: Duration,
    min_out_policy: MinOutPolicy,
}

impl Ui {
    pub fn new(config: &Config) -> Self {
        Self {
            show_status_bar: config.ui.show_status_bar,
            analysis_estimate: Duration::from_secs(config.analysis.estimate_secs),
            min_out_policy: config.wallet.min_out_policy,
        }
    }

    /// Render the entire UI.
    pub fn render(&self, frame: &mut Frame, store: &Store) {
        let now = Utc::now();
        let layout = Layout::new(frame.area(), self.show_status_bar, store.app.is_editing());

        if self.show_status_bar {
            StatusBar::render(frame, layout.status_area, store);
        }
        TabBar::render(frame, layout.tab_area, store);

        match store.app.current_view {
            View::Dashboard => Dashboard::render(frame, layout.main_area, store),
            View::Strategy => {
                StrategyView::render(frame, layout.main_area, store, self.analysis_estimate)
            }
            View::Alerts => AlertList::render(frame, layout.main_area, store),
            View::Calendar => CalendarView::render(frame, layout.main_area, store, now),
            View::Portfolio => PortfolioView::render(frame, layout.main_area, store),
            View::News => NewsFeed::render(frame, layout.main_area, store, now),
            View::Swap => SwapPanel::render(frame, layout.main_area, store, self.min_out_policy),
        }

        if store.app.is_editing() {
            InputLine::render(frame, layout.input_area, store);
        }

        if store.app.show_help {
            HelpPanel::render(frame, frame.area());
        }

        if let Some(notification) = &store.app.notification {
            widgets::render_notification(frame, layout.notification_area, notification);
        }

        if let Some(error) = &store.app.error {
            widgets::render_error(frame, layout.notification_area, error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::PollResult;
    use crate::state::{Action, PredictionSet, PricePrediction};
    use ratatui::{Terminal, backend::TestBackend};
    use rust_decimal_macros::dec;
    use tokio::sync::mpsc;

    fn draw(store: &Store) -> String {
        let ui = Ui::new(&Config::default());
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| ui.render(frame, store)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn store() -> Store {
        let (tx, _rx) = mpsc::unbounded_channel();
        Store::new(tx)
    }

    #[test]
    fn test_every_view_renders() {
        let mut store = store();
        for view in View::ALL {
            store.reduce(Action::SetView(view));
            let screen = draw(&store);
            assert!(screen.contains(view.title()), "{view:?} missing its title");
        }
    }

    #[test]
    fn test_dashboard_shows_predictions_and_error_banner() {
        let mut store = store();
        let set = PredictionSet {
            predictions: vec![PricePrediction {
                date: "2025-03-01".to_string(),
                current_price: dec!(100),
                predicted_price: dec!(110),
                lower_bound: dec!(95),
                upper_bound: dec!(120),
                accuracy: None,
            }],
            last_update: Some("2025-02-28 12:00".to_string()),
        };
        let mut result = PollResult::with_data(set);
        result.apply_failure("Network error. Check your connection.".to_string(), 2, Utc::now());
        store.reduce(Action::PredictionsUpdated(result));

        let screen = draw(&store);
        assert!(screen.contains("2025-03-01"));
        assert!(screen.contains("+10.00%"));
        assert!(screen.contains("Network error"));
    }

    #[test]
    fn test_password_prompt_is_masked() {
        let mut store = store();
        store.reduce(Action::BeginLogin);
        for c in "alice".chars() {
            store.reduce(Action::InputChar(c));
        }
        store.reduce(Action::SubmitInput);
        for c in "hunter2".chars() {
            store.reduce(Action::InputChar(c));
        }

        let screen = draw(&store);
        assert!(screen.contains("Password: *******"));
        assert!(!screen.contains("hunter2"));
    }
}
