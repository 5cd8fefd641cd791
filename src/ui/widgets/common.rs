//! Helpers shared by the view widgets.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row},
};
use rust_decimal::Decimal;

use crate::poller::{PollResult, PollStatus};

pub fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    Row::new(cells).height(1).bottom_margin(1)
}

pub fn bordered(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
}

pub fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

/// Green for gains, red for losses, grey when unknown.
pub fn change_style(change: Option<Decimal>) -> Style {
    match change {
        Some(c) if c >= Decimal::ZERO => Style::default().fg(Color::Green),
        Some(_) => Style::default().fg(Color::Red),
        None => Style::default().fg(Color::DarkGray),
    }
}

/// Block title suffix describing the poll status, e.g. `" (updated 12:00:05)"`.
pub fn poll_suffix<T>(result: &PollResult<T>) -> String {
    match (result.status, result.fetched_at) {
        (PollStatus::Loading, _) => " (loading...)".to_string(),
        (PollStatus::Error, Some(at)) => format!(" (stale, {})", at.format("%H:%M:%S")),
        (PollStatus::Error, None) => " (unavailable)".to_string(),
        (_, Some(at)) => format!(" (updated {})", at.format("%H:%M:%S")),
        (_, None) => String::new(),
    }
}

/// Draw the poll's error banner on the last inner line of `area`.
pub fn render_poll_banner<T>(frame: &mut Frame, area: Rect, result: &PollResult<T>) {
    let Some(message) = result.error_message.as_deref() else {
        return;
    };
    if area.height < 3 || area.width < 4 {
        return;
    }
    let banner_area = Rect {
        x: area.x + 1,
        y: area.y + area.height - 2,
        width: area.width - 2,
        height: 1,
    };
    let banner = Line::from(vec![
        Span::styled(
            "✗ ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::styled(message.to_string(), Style::default().fg(Color::Red)),
        Span::styled("  [r] retry", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(banner), banner_area);
}

/// Placeholder text for an empty table.
pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    if area.height < 4 || area.width < 4 {
        return;
    }
    let inner = Rect {
        x: area.x + 2,
        y: area.y + 2,
        width: area.width - 4,
        height: 1,
    };
    let text = Span::styled(
        message.to_string(),
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    );
    frame.render_widget(Paragraph::new(Line::from(text)), inner);
}

pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
