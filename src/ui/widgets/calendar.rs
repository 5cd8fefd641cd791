//! Economic calendar view.

use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Cell, Paragraph, Row, Table, TableState, Wrap},
};

use super::common::{
    bordered, header_row, poll_suffix, render_empty, render_poll_banner, selected_style,
    truncate_string,
};
use crate::state::{Impact, Store};
use crate::transform::{days_until, days_until_text, is_upcoming};

/// Calendar widget.
pub struct CalendarView;

impl CalendarView {
    pub fn render(frame: &mut Frame, area: Rect, store: &Store, now: DateTime<Utc>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(5)])
            .split(area);

        let calendar = &store.calendar;
        let visible = calendar.visible(now);
        let selected = calendar.selected_index;

        let rows: Vec<Row> = visible
            .iter()
            .enumerate()
            .map(|(i, event)| {
                let days = days_until(event, now);
                let impact_style = match event.impact {
                    Impact::Critical => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    Impact::High => Style::default().fg(Color::Red),
                    Impact::Medium => Style::default().fg(Color::Yellow),
                    Impact::Low | Impact::Unknown => Style::default().fg(Color::DarkGray),
                };
                let when_style = if is_upcoming(days) {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(event.date.format("%Y-%m-%d").to_string()),
                    Cell::from(days_until_text(days)).style(when_style),
                    Cell::from(truncate_string(&event.name, 40)),
                    Cell::from(format!("{:?}", event.kind)),
                    Cell::from(format!("{:?}", event.impact)).style(impact_style),
                    Cell::from(truncate_string(&event.countries.join(", "), 24)),
                ])
                .style(selected_style(selected == Some(i)))
            })
            .collect();

        let source = if calendar.feed.data.is_some() {
            poll_suffix(&calendar.feed)
        } else {
            " (bundled)".to_string()
        };
        let title = format!(" Calendar [{}]{source} ", calendar.filter.describe());

        let empty = rows.is_empty();
        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Length(12),
                Constraint::Min(20),
                Constraint::Length(9),
                Constraint::Length(8),
                Constraint::Length(24),
            ],
        )
        .header(header_row(&["Date", "When", "Event", "Type", "Impact", "Countries"]))
        .block(bordered(title))
        .row_highlight_style(selected_style(true));

        let mut state = TableState::default();
        state.select(selected);
        frame.render_stateful_widget(table, chunks[0], &mut state);

        if empty {
            render_empty(frame, chunks[0], "No upcoming events match the filter");
        }
        render_poll_banner(frame, chunks[0], &calendar.feed);

        let detail = selected
            .and_then(|i| visible.get(i))
            .map(|event| {
                let mut text = event.description.clone();
                if let Some(duration) = &event.duration {
                    text.push_str(&format!(" ({duration})"));
                }
                text
            })
            .unwrap_or_default();
        frame.render_widget(
            Paragraph::new(Line::from(detail))
                .wrap(Wrap { trim: true })
                .block(bordered(" Details ".to_string())),
            chunks[1],
        );
    }
}
