//! News view: articles with a detail pane, plus the social feed.

use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, List, ListItem, Paragraph, Row, Table, TableState, Wrap},
};

use super::common::{
    bordered, header_row, poll_suffix, render_empty, render_poll_banner, selected_style,
    truncate_string,
};
use crate::state::Store;

/// News widget.
pub struct NewsFeed;

impl NewsFeed {
    pub fn render(frame: &mut Frame, area: Rect, store: &Store, now: DateTime<Utc>) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(area);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(7)])
            .split(columns[0]);

        Self::render_articles(frame, left[0], store, now);
        Self::render_detail(frame, left[1], store);
        Self::render_social(frame, columns[1], store, now);
    }

    fn render_articles(frame: &mut Frame, area: Rect, store: &Store, now: DateTime<Utc>) {
        let news = &store.news;
        let rows: Vec<Row> = news
            .articles
            .data
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, item)| {
                Row::new(vec![
                    Cell::from(truncate_string(&item.title, 70)),
                    Cell::from(truncate_string(&item.source, 16))
                        .style(Style::default().fg(Color::Cyan)),
                    Cell::from(item.age(now)).style(Style::default().fg(Color::DarkGray)),
                ])
                .style(selected_style(news.selected_index == Some(i)))
            })
            .collect();

        let empty = rows.is_empty();
        let table = Table::new(
            rows,
            [
                Constraint::Min(30),
                Constraint::Length(16),
                Constraint::Length(11),
            ],
        )
        .header(header_row(&["Headline", "Source", "Age"]))
        .block(bordered(format!(" News{} ", poll_suffix(&news.articles))))
        .row_highlight_style(selected_style(true));

        let mut state = TableState::default();
        state.select(news.selected_index);
        frame.render_stateful_widget(table, area, &mut state);

        if empty {
            let message = if news.articles.is_loading() {
                "Loading..."
            } else {
                "No news"
            };
            render_empty(frame, area, message);
        }
        render_poll_banner(frame, area, &news.articles);
    }

    fn render_detail(frame: &mut Frame, area: Rect, store: &Store) {
        let lines = match store.news.selected() {
            Some(item) => vec![
                Line::from(Span::styled(
                    item.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(item.description.clone()),
                Line::from(Span::styled(
                    item.url.clone(),
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::UNDERLINED),
                )),
            ],
            None => vec![Line::from(Span::styled(
                "Select a headline",
                Style::default().fg(Color::DarkGray),
            ))],
        };
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(bordered(" Article ".to_string())),
            area,
        );
    }

    fn render_social(frame: &mut Frame, area: Rect, store: &Store, now: DateTime<Utc>) {
        let social = &store.news.social;
        let items: Vec<ListItem> = social
            .data
            .iter()
            .flatten()
            .map(|post| {
                let age = post
                    .created_at
                    .map(|at| {
                        let minutes = (now - at).num_minutes().max(0);
                        if minutes < 60 {
                            format!("{minutes}m")
                        } else if minutes < 1440 {
                            format!("{}h", minutes / 60)
                        } else {
                            format!("{}d", minutes / 1440)
                        }
                    })
                    .unwrap_or_default();
                ListItem::new(vec![
                    Line::from(post.text.clone()),
                    Line::from(Span::styled(
                        format!(
                            "♥ {}  ⟲ {}  ↩ {}  {age}",
                            post.metrics.like_count,
                            post.metrics.retweet_count,
                            post.metrics.reply_count
                        ),
                        Style::default().fg(Color::DarkGray),
                    )),
                    Line::from(""),
                ])
            })
            .collect();

        let empty = items.is_empty();
        frame.render_widget(
            List::new(items).block(bordered(format!(" Social{} ", poll_suffix(social)))),
            area,
        );
        if empty {
            let message = if social.is_loading() {
                "Loading..."
            } else {
                "No posts"
            };
            render_empty(frame, area, message);
        }
        render_poll_banner(frame, area, social);
    }
}
