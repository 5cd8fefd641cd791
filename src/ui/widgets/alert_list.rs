//! Alerts view: filtered feed plus the selected alert's message.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState, Wrap},
};

use super::common::{
    bordered, header_row, poll_suffix, render_empty, render_poll_banner, selected_style,
    truncate_string,
};
use crate::state::{Priority, Store};

/// Alert list widget.
pub struct AlertList;

impl AlertList {
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(6)])
            .split(area);

        let alerts = &store.alerts;
        let visible = alerts.visible();
        let selected = alerts.selected_index;

        let rows: Vec<Row> = visible
            .iter()
            .enumerate()
            .map(|(i, alert)| {
                let unread = !alerts.read.contains(&alert.id);
                let priority_style = match alert.priority {
                    Priority::High => Style::default().fg(Color::Red),
                    Priority::Medium => Style::default().fg(Color::Yellow),
                    Priority::Low => Style::default().fg(Color::Green),
                };
                let title_style = if unread {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                Row::new(vec![
                    Cell::from(if unread { "●" } else { " " }).style(Style::default().fg(Color::Cyan)),
                    Cell::from(alert.priority.to_string()).style(priority_style),
                    Cell::from(alert.category.clone()),
                    Cell::from(alert.kind.clone()),
                    Cell::from(truncate_string(&alert.title, 60)).style(title_style),
                    Cell::from(alert.timestamp.format("%m-%d %H:%M").to_string()),
                ])
                .style(selected_style(selected == Some(i)))
            })
            .collect();

        let title = format!(
            " Alerts [{}] · {} unread{} ",
            alerts.filter.describe(),
            alerts.unread_count(),
            poll_suffix(&alerts.feed)
        );

        let empty = rows.is_empty();
        let table = Table::new(
            rows,
            [
                Constraint::Length(1),
                Constraint::Length(7),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Min(20),
                Constraint::Length(12),
            ],
        )
        .header(header_row(&["", "Prio", "Category", "Type", "Title", "Time"]))
        .block(bordered(title))
        .row_highlight_style(selected_style(true));

        let mut state = TableState::default();
        state.select(selected);
        frame.render_stateful_widget(table, chunks[0], &mut state);

        if empty {
            let message = if alerts.feed.is_loading() {
                "Loading..."
            } else if alerts.feed.data.as_ref().is_some_and(|a| !a.is_empty()) {
                "No alerts match the filter (0 to clear)"
            } else {
                "No alerts"
            };
            render_empty(frame, chunks[0], message);
        }
        render_poll_banner(frame, chunks[0], &alerts.feed);

        let detail = match selected.and_then(|i| visible.get(i)) {
            Some(alert) => vec![
                Line::from(Span::styled(
                    alert.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(alert.message.clone()),
            ],
            None => vec![Line::from(Span::styled(
                "Select an alert to read it",
                Style::default().fg(Color::DarkGray),
            ))],
        };
        frame.render_widget(
            Paragraph::new(detail)
                .wrap(Wrap { trim: true })
                .block(bordered(" Message ".to_string())),
            chunks[1],
        );
    }
}
