//! Strategy view: trading signals, analyzed coins and the model run.

use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Gauge, Paragraph, Row, Table, TableState},
};

use super::common::{
    bordered, change_style, header_row, poll_suffix, render_empty, render_poll_banner,
    selected_style,
};
use crate::analysis::AnalysisStatus;
use crate::state::{SignalKind, Store};
use crate::transform::format_change;

/// Strategy widget.
pub struct StrategyView;

impl StrategyView {
    pub fn render(frame: &mut Frame, area: Rect, store: &Store, estimate: Duration) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[2]);

        Self::render_model(frame, rows[0], store, estimate);
        Self::render_stats(frame, rows[1], store);
        Self::render_signals(frame, columns[0], store);
        Self::render_coins(frame, columns[1], store);
    }

    fn render_model(frame: &mut Frame, area: Rect, store: &Store, estimate: Duration) {
        let state = &store.analysis;
        let (label, color) = match state.status {
            AnalysisStatus::Idle => ("Idle. Press m to start".to_string(), Color::DarkGray),
            AnalysisStatus::Running => (
                format!(
                    "{}% · about {}s left · s to stop",
                    state.progress_percent,
                    state.remaining_secs(estimate)
                ),
                Color::Yellow,
            ),
            AnalysisStatus::Completed => ("Completed".to_string(), Color::Green),
            AnalysisStatus::Failed => (
                state
                    .error
                    .clone()
                    .unwrap_or_else(|| "Failed".to_string()),
                Color::Red,
            ),
        };

        let gauge = Gauge::default()
            .block(bordered(" Strategy · Prediction Model ".to_string()))
            .gauge_style(Style::default().fg(color).bg(Color::Black))
            .percent(u16::from(state.progress_percent.min(100)))
            .label(Span::styled(
                label,
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ));
        frame.render_widget(gauge, area);
    }

    fn render_stats(frame: &mut Frame, area: Rect, store: &Store) {
        let stats = store.market.signal_stats();
        let line = Line::from(vec![
            Span::raw(format!(" Total {}  ", stats.total)),
            Span::styled(
                format!("BUY {}  ", stats.buy),
                Style::default().fg(Color::Green),
            ),
            Span::styled(
                format!("SELL {}  ", stats.sell),
                Style::default().fg(Color::Red),
            ),
            Span::styled(
                format!("WAIT {}", stats.wait()),
                Style::default().fg(Color::Yellow),
            ),
        ]);
        frame.render_widget(
            Paragraph::new(line).block(bordered(" Signal Summary ".to_string())),
            area,
        );
    }

    fn render_signals(frame: &mut Frame, area: Rect, store: &Store) {
        let result = &store.market.signals;
        let selected = store.market.selected_signal;
        let rows: Vec<Row> = result
            .data
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, s)| {
                let signal_style = match s.signal {
                    SignalKind::Buy => Style::default().fg(Color::Green),
                    SignalKind::Sell => Style::default().fg(Color::Red),
                    SignalKind::Wait => Style::default().fg(Color::Yellow),
                };
                let optional = |v: Option<rust_decimal::Decimal>| {
                    v.map_or_else(|| "-".to_string(), |v| format!("{:.1}", v))
                };
                Row::new(vec![
                    Cell::from(s.symbol.clone()),
                    Cell::from(s.timeframe.clone()),
                    Cell::from(s.signal.to_string()).style(signal_style),
                    Cell::from(optional(s.rsi)),
                    Cell::from(optional(s.stochastic)),
                    Cell::from(
                        s.price
                            .map_or_else(|| "-".to_string(), |p| p.normalize().to_string()),
                    ),
                    Cell::from(format_change(s.price_change_24h))
                        .style(change_style(s.price_change_24h)),
                ])
                .style(selected_style(selected == Some(i)))
            })
            .collect();

        let empty = rows.is_empty();
        let table = Table::new(
            rows,
            [
                Constraint::Length(11),
                Constraint::Length(5),
                Constraint::Length(6),
                Constraint::Length(6),
                Constraint::Length(6),
                Constraint::Length(12),
                Constraint::Min(8),
            ],
        )
        .header(header_row(&["Symbol", "TF", "Signal", "RSI", "Stoch", "Price", "24h"]))
        .block(bordered(format!(" Signals{} ", poll_suffix(result))))
        .row_highlight_style(selected_style(true));

        let mut state = TableState::default();
        state.select(selected);
        frame.render_stateful_widget(table, area, &mut state);

        if empty {
            render_empty(frame, area, if result.is_loading() { "Loading..." } else { "No signals" });
        }
        render_poll_banner(frame, area, result);
    }

    fn render_coins(frame: &mut Frame, area: Rect, store: &Store) {
        let result = &store.market.analyzed_coins;
        let rows: Vec<Row> = result
            .data
            .iter()
            .flatten()
            .map(|c| {
                let change = Some(c.change_24h);
                Row::new(vec![
                    Cell::from(c.symbol.clone()),
                    Cell::from(c.price.normalize().to_string()),
                    Cell::from(format_change(change)).style(change_style(change)),
                ])
            })
            .collect();

        let empty = rows.is_empty();
        let table = Table::new(
            rows,
            [
                Constraint::Length(11),
                Constraint::Length(12),
                Constraint::Min(8),
            ],
        )
        .header(header_row(&["Coin", "Price", "24h"]))
        .block(bordered(format!(" Analyzed Coins{} ", poll_suffix(result))));
        frame.render_widget(table, area);

        if empty {
            render_empty(frame, area, if result.is_loading() { "Loading..." } else { "No coins" });
        }
        render_poll_banner(frame, area, result);
    }
}
