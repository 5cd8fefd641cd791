//! Status bar widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::state::Store;
use crate::swap::SwapStatus;

/// Status bar widget.
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let stream_status = if store.market.tickers.connected {
            Span::styled("● Live", Style::default().fg(Color::Green))
        } else {
            Span::styled("○ Offline", Style::default().fg(Color::Red))
        };

        let session = match &store.app.session {
            Some(session) => Span::styled(
                format!("👤 {}", session.username),
                Style::default().fg(Color::White),
            ),
            None => Span::styled("Guest", Style::default().fg(Color::DarkGray)),
        };

        let wallet = match store.swap.wallet.status {
            SwapStatus::Connected | SwapStatus::Submitting => {
                Span::styled(" Wallet ✓ ", Style::default().fg(Color::Green))
            }
            SwapStatus::Connecting => Span::styled(
                " Wallet... ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            ),
            SwapStatus::Disconnected => Span::raw(""),
        };

        let running = if store.analysis.is_running() {
            Span::styled(
                format!(" Model {}% ", store.analysis.progress_percent),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            Span::raw("")
        };

        let help_hint = Span::styled(" Press ? for help ", Style::default().fg(Color::DarkGray));

        let left_content = vec![
            Span::styled(
                " 📈 MarketDeck ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            stream_status,
            Span::raw(" | "),
            session,
            wallet,
            running,
        ];

        let status_line = Line::from(left_content);

        let left_len = status_line.width();
        let right_len = help_hint.width();
        let padding = usize::from(area.width).saturating_sub(left_len + right_len);

        let mut full_line = status_line.spans;
        full_line.push(Span::raw(" ".repeat(padding)));
        full_line.push(help_hint);

        let paragraph =
            Paragraph::new(Line::from(full_line)).style(Style::default().bg(Color::DarkGray));

        frame.render_widget(paragraph, area);
    }
}
