//! Help panel widget.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::super::layout::centered_rect;

const GENERAL: &[(&str, &str)] = &[
    ("j/↓  k/↑", "Move down / up"),
    ("PgDn PgUp", "Page down / up"),
    ("Home End", "First / last row"),
    ("1-7", "Jump to tab"),
    ("Tab", "Next tab"),
    ("r", "Refresh this tab"),
    ("l", "Log in / log out"),
    ("Esc", "Close popup"),
    ("?", "Toggle help"),
    ("q", "Quit"),
];

const STRATEGY: &[(&str, &str)] = &[("m", "Start model run"), ("s", "Stop model run")];

const ALERTS: &[(&str, &str)] = &[
    ("x/Enter", "Mark read"),
    ("p g t", "Priority / category / type"),
    ("d", "Today / 7d / 30d / all"),
    ("u", "Unread only"),
    ("0", "Clear filter"),
];

const CALENDAR: &[(&str, &str)] = &[
    ("t n o", "Type / country / month"),
    ("0", "Clear filter"),
];

const SWAP: &[(&str, &str)] = &[
    ("c", "Connect wallet"),
    ("f t x", "From / to / flip"),
    ("a", "Edit amount"),
    ("+/-", "Slippage"),
    ("Enter", "Submit swap"),
];

fn section(title: &'static str, keys: &[(&'static str, &'static str)]) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )])];
    lines.extend(keys.iter().map(|(key, description)| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), Style::default().fg(Color::Cyan)),
            Span::raw(*description),
        ])
    }));
    lines.push(Line::from(""));
    lines
}

/// Help panel showing keybindings.
pub struct HelpPanel;

impl HelpPanel {
    /// Render the help panel.
    pub fn render(frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(70, 70, area);

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);

        let left = section("General", GENERAL);
        let mut right = section("Strategy", STRATEGY);
        right.extend(section("Alerts", ALERTS));
        right.extend(section("Calendar", CALENDAR));
        right.extend(section("Swap", SWAP));

        let style = Style::default().fg(Color::White);
        frame.render_widget(Paragraph::new(left).style(style), columns[0]);
        frame.render_widget(Paragraph::new(right).style(style), columns[1]);
    }
}
