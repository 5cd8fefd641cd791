//! Dashboard: live tickers plus the 7- and 30-day forecasts.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Cell, Row, Table},
};
use rust_decimal::Decimal;

use super::common::{
    bordered, change_style, header_row, poll_suffix, render_empty, render_poll_banner,
};
use crate::state::{PricePrediction, Store};
use crate::transform::format_change;

/// Dashboard widget.
pub struct Dashboard;

impl Dashboard {
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        Self::render_tickers(frame, rows[0], store);
        Self::render_forecast(frame, columns[0], store, 7);
        Self::render_forecast(frame, columns[1], store, 30);
    }

    /// Streamed tickers, falling back to the polled coin list while the
    /// stream has nothing.
    fn render_tickers(frame: &mut Frame, area: Rect, store: &Store) {
        let stream = &store.market.tickers;
        let rows: Vec<Row> = if stream.tickers.is_empty() {
            store
                .market
                .coins
                .data
                .iter()
                .flatten()
                .map(|coin| {
                    ticker_row(
                        &coin.symbol,
                        coin.price,
                        coin.price_change_24h,
                        coin.high_24h,
                        coin.low_24h,
                        coin.volume,
                    )
                })
                .collect()
        } else {
            stream
                .tickers
                .iter()
                .map(|t| {
                    let row = ticker_row(&t.symbol, t.price, t.change, t.high, t.low, t.volume);
                    if t.market_open {
                        row
                    } else {
                        row.style(Style::default().fg(Color::DarkGray))
                    }
                })
                .collect()
        };

        let title = if stream.tickers.is_empty() {
            format!(" Dashboard · Markets{} ", poll_suffix(&store.market.coins))
        } else {
            let at = stream
                .last_update
                .map(|t| format!(" (live {})", t.format("%H:%M:%S")))
                .unwrap_or_default();
            format!(" Dashboard · Markets{at} ")
        };

        let empty = rows.is_empty();
        let table = Table::new(
            rows,
            [
                Constraint::Length(12),
                Constraint::Length(14),
                Constraint::Length(10),
                Constraint::Length(14),
                Constraint::Length(14),
                Constraint::Min(14),
            ],
        )
        .header(header_row(&["Symbol", "Price", "24h", "High", "Low", "Volume"]))
        .block(bordered(title));
        frame.render_widget(table, area);

        if empty {
            let message = if store.market.coins.is_loading() {
                "Loading..."
            } else {
                "No market data yet"
            };
            render_empty(frame, area, message);
        }
        if stream.tickers.is_empty() {
            render_poll_banner(frame, area, &store.market.coins);
        }
    }

    fn render_forecast(frame: &mut Frame, area: Rect, store: &Store, days: usize) {
        let result = &store.market.predictions;
        let points: &[PricePrediction] = result
            .data
            .as_ref()
            .map(|set| set.horizon(days))
            .unwrap_or_default();

        let rows: Vec<Row> = points
            .iter()
            .map(|p| {
                let change = p.change_percent();
                Row::new(vec![
                    Cell::from(p.date.clone()),
                    Cell::from(format!("{:.2}", p.predicted_price)),
                    Cell::from(format!("{:.2}-{:.2}", p.lower_bound, p.upper_bound)),
                    Cell::from(format_change(change)).style(change_style(change)),
                ])
            })
            .collect();

        let updated = result
            .data
            .as_ref()
            .and_then(|set| set.last_update.as_deref())
            .map(|at| format!(" · model {at}"))
            .unwrap_or_default();
        let title = format!(" {days}-Day Forecast{}{updated} ", poll_suffix(result));

        let empty = rows.is_empty();
        let table = Table::new(
            rows,
            [
                Constraint::Length(11),
                Constraint::Length(12),
                Constraint::Min(18),
                Constraint::Length(9),
            ],
        )
        .header(header_row(&["Date", "Predicted", "Range", "Change"]))
        .block(bordered(title));
        frame.render_widget(table, area);

        if empty {
            let message = if result.is_loading() {
                "Loading..."
            } else {
                "No forecast available"
            };
            render_empty(frame, area, message);
        }
        render_poll_banner(frame, area, result);
    }
}

fn ticker_row(
    symbol: &str,
    price: Decimal,
    change: Decimal,
    high: Decimal,
    low: Decimal,
    volume: Decimal,
) -> Row<'static> {
    let change = Some(change);
    Row::new(vec![
        Cell::from(symbol.to_string()),
        Cell::from(format!("{:.4}", price.normalize())),
        Cell::from(format_change(change)).style(change_style(change)),
        Cell::from(format!("{:.4}", high.normalize())),
        Cell::from(format!("{:.4}", low.normalize())),
        Cell::from(format!("{:.0}", volume)),
    ])
}
