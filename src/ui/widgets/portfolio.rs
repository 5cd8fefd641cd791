//! Portfolio view.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState, Wrap},
};

use super::common::{
    bordered, change_style, header_row, poll_suffix, render_empty, render_poll_banner,
    selected_style, truncate_string,
};
use crate::state::{PortfolioPosition, Store, Trend};
use crate::transform::format_change;

/// Portfolio widget.
pub struct PortfolioView;

impl PortfolioView {
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);

        let state = &store.portfolio;
        let positions = state
            .feed
            .data
            .as_ref()
            .map(|p| p.positions())
            .unwrap_or_default();

        let rows: Vec<Row> = positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let pnl = Some(p.position.profit_loss);
                Row::new(vec![
                    Cell::from(p.symbol.clone()),
                    Cell::from(truncate_string(&p.category, 12)),
                    Cell::from(p.position.amount.normalize().to_string()),
                    Cell::from(format!("{:.4}", p.position.avg_price)),
                    Cell::from(format!("{:.4}", p.price)),
                    Cell::from(format!("${:.2}", p.market_value())),
                    Cell::from(format_change(pnl)).style(change_style(pnl)),
                    Cell::from(format!("{:?}", p.analysis.trend)).style(trend_style(p.analysis.trend)),
                ])
                .style(selected_style(state.selected_index == Some(i)))
            })
            .collect();

        let summary = match state.feed.data.as_ref() {
            Some(portfolio) => format!(
                " · ${:.2} · avg {} · {}/{} in profit",
                portfolio.total_value(),
                format_change(portfolio.average_profit_loss()),
                portfolio.profitable_positions().len(),
                positions.len()
            ),
            None => String::new(),
        };
        let title = format!(" Portfolio{summary}{} ", poll_suffix(&state.feed));

        let empty = rows.is_empty();
        let table = Table::new(
            rows,
            [
                Constraint::Length(8),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(14),
                Constraint::Length(9),
                Constraint::Min(8),
            ],
        )
        .header(header_row(&[
            "Symbol", "Category", "Amount", "Avg Price", "Price", "Value", "P&L", "Trend",
        ]))
        .block(bordered(title))
        .row_highlight_style(selected_style(true));

        let mut table_state = TableState::default();
        table_state.select(state.selected_index);
        frame.render_stateful_widget(table, chunks[0], &mut table_state);

        if empty {
            let message = if state.feed.is_loading() {
                "Loading..."
            } else {
                "No positions"
            };
            render_empty(frame, chunks[0], message);
        }
        render_poll_banner(frame, chunks[0], &state.feed);

        let detail = state.selected().map(analysis_lines).unwrap_or_else(|| {
            vec![Line::from(Span::styled(
                "Select a position to see its analysis",
                Style::default().fg(Color::DarkGray),
            ))]
        });
        frame.render_widget(
            Paragraph::new(detail)
                .wrap(Wrap { trim: true })
                .block(bordered(" Analysis ".to_string())),
            chunks[1],
        );
    }
}

fn trend_style(trend: Trend) -> Style {
    match trend {
        Trend::Bullish => Style::default().fg(Color::Green),
        Trend::Bearish => Style::default().fg(Color::Red),
        Trend::Neutral => Style::default().fg(Color::Yellow),
    }
}

fn analysis_lines(position: &PortfolioPosition) -> Vec<Line<'static>> {
    let analysis = &position.analysis;
    let label = Style::default().fg(Color::Yellow);
    let price = |v: Option<rust_decimal::Decimal>| {
        v.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v))
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} ({})", position.name, position.symbol),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Trend: ", label),
            Span::styled(format!("{:?}", analysis.trend), trend_style(analysis.trend)),
            Span::raw(format!("  strength {}/10", analysis.strength)),
        ]),
        Line::from(vec![
            Span::styled("Target: ", label),
            Span::raw(price(analysis.target_price)),
            Span::styled("  Stop: ", label),
            Span::raw(price(analysis.stop_loss)),
        ]),
        Line::from(""),
    ];
    lines.extend(analysis.key_metrics.iter().map(|(key, value)| {
        Line::from(vec![
            Span::styled(format!("{key}: "), label),
            Span::raw(value.clone()),
        ])
    }));
    if !analysis.highlights.is_empty() {
        lines.push(Line::from(""));
        lines.extend(
            analysis
                .highlights
                .iter()
                .map(|h| Line::from(format!("• {h}"))),
        );
    }
    lines
}
