//! Swap view: form, wallet status and the last outcome.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use super::common::bordered;
use crate::config::MinOutPolicy;
use crate::state::{InputTarget, Store};
use crate::swap::{SwapOutcome, SwapStatus};

/// Swap widget.
pub struct SwapPanel;

impl SwapPanel {
    pub fn render(frame: &mut Frame, area: Rect, store: &Store, policy: MinOutPolicy) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(9),
                Constraint::Min(0),
            ])
            .split(area);

        Self::render_wallet(frame, chunks[0], store);
        Self::render_form(frame, chunks[1], store, policy);
        Self::render_outcome(frame, chunks[2], store);
    }

    fn render_wallet(frame: &mut Frame, area: Rect, store: &Store) {
        let wallet = &store.swap.wallet;
        let status_style = match wallet.status {
            SwapStatus::Connected => Style::default().fg(Color::Green),
            SwapStatus::Connecting | SwapStatus::Submitting => Style::default().fg(Color::Yellow),
            SwapStatus::Disconnected => Style::default().fg(Color::Red),
        };
        let mut lines = vec![Line::from(vec![
            Span::styled("Wallet: ", Style::default().fg(Color::Yellow)),
            Span::styled(wallet.status.label(), status_style),
            Span::raw("  "),
            Span::raw(
                wallet
                    .account
                    .map(|a| a.to_checksum(None))
                    .unwrap_or_else(|| "press c to connect".to_string()),
            ),
        ])];
        if let Some(error) = &wallet.last_error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        frame.render_widget(
            Paragraph::new(lines).block(bordered(" Swap · Wallet ".to_string())),
            area,
        );
    }

    fn render_form(frame: &mut Frame, area: Rect, store: &Store, policy: MinOutPolicy) {
        let form = &store.swap;
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        let editing_amount =
            store.app.is_editing() && store.app.input_target == InputTarget::SwapAmount;
        let amount = if editing_amount {
            format!("{}▏", store.app.input_buffer)
        } else if form.amount.is_empty() {
            "-".to_string()
        } else {
            form.amount.clone()
        };

        let mut lines = vec![
            Line::from(vec![
                Span::styled("From:     ", label),
                Span::styled(form.from, value),
                Span::styled("   [f] change  [x] flip", Style::default().fg(Color::DarkGray)),
            ]),
            Line::from(vec![
                Span::styled("To:       ", label),
                Span::styled(form.to, value),
                Span::styled("   [t] change", Style::default().fg(Color::DarkGray)),
            ]),
            Line::from(vec![
                Span::styled("Amount:   ", label),
                Span::styled(amount, value),
                Span::styled("   [a] edit", Style::default().fg(Color::DarkGray)),
            ]),
            Line::from(vec![
                Span::styled("Slippage: ", label),
                Span::styled(format!("{}%", form.slippage_percent.normalize()), value),
                Span::styled("   [+/-] adjust", Style::default().fg(Color::DarkGray)),
            ]),
            Line::from(""),
        ];

        lines.push(match policy {
            MinOutPolicy::Unprotected => Line::from(Span::styled(
                "⚠ Minimum output is 0: the slippage setting is not enforced on-chain",
                Style::default().fg(Color::Yellow),
            )),
            MinOutPolicy::FromQuote => Line::from(Span::styled(
                "Minimum output is quoted from the router minus slippage",
                Style::default().fg(Color::DarkGray),
            )),
        });

        let hint = match form.wallet.status {
            SwapStatus::Connected => "Enter to swap",
            SwapStatus::Submitting => "Waiting for the wallet...",
            _ => "Connect a wallet to swap",
        };
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::Cyan),
        )));

        frame.render_widget(
            Paragraph::new(lines).block(bordered(" Order ".to_string())),
            area,
        );
    }

    fn render_outcome(frame: &mut Frame, area: Rect, store: &Store) {
        let line = match &store.swap.wallet.last_outcome {
            Some(SwapOutcome::Succeeded { tx }) => Line::from(vec![
                Span::styled("✓ Submitted ", Style::default().fg(Color::Green)),
                Span::raw(tx.to_string()),
            ]),
            Some(SwapOutcome::Failed { message }) => Line::from(vec![
                Span::styled("✗ ", Style::default().fg(Color::Red)),
                Span::raw(message.clone()),
            ]),
            None => Line::from(Span::styled(
                "No swaps yet",
                Style::default().fg(Color::DarkGray),
            )),
        };
        frame.render_widget(
            Paragraph::new(line)
                .wrap(Wrap { trim: true })
                .block(bordered(" Last Swap ".to_string())),
            area,
        );
    }
}
