//! Alert feed state and client-side read markers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::de;
use crate::poller::PollResult;
use crate::transform::AlertFilter;

/// Alert priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// A notification item from the alerts endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(deserialize_with = "de::timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Ids of alerts the user has read. Lives only for the session.
pub type ReadSet = HashSet<String>;

/// Alerts view state.
#[derive(Debug, Default)]
pub struct AlertState {
    /// Latest poll outcome.
    pub feed: PollResult<Vec<Alert>>,
    /// Read markers.
    pub read: ReadSet,
    /// Active filter.
    pub filter: AlertFilter,
    /// Selected row in the filtered list.
    pub selected_index: Option<usize>,
}

impl AlertState {
    /// Alerts passing the active filter, in fetch order.
    pub fn visible(&self) -> Vec<Alert> {
        self.feed
            .data
            .as_deref()
            .map(|alerts| self.filter.apply(alerts, &self.read))
            .unwrap_or_default()
    }

    /// Mark an alert as read.
    pub fn mark_read(&mut self, id: impl Into<String>) {
        self.read.insert(id.into());
    }

    /// Number of fetched alerts not yet read.
    pub fn unread_count(&self) -> usize {
        self.feed
            .data
            .as_deref()
            .map(|alerts| alerts.iter().filter(|a| !self.read.contains(&a.id)).count())
            .unwrap_or(0)
    }

    /// The currently selected visible alert.
    pub fn selected(&self) -> Option<Alert> {
        self.selected_index
            .and_then(|i| self.visible().into_iter().nth(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_wire_shape() {
        let json = r#"{"id": 7, "priority": "high", "category": "crypto", "type": "price",
                      "title": "BTC breakout", "message": "BTC crossed 100k",
                      "timestamp": "2025-02-01T09:00:00"}"#;
        let alert: Alert = serde_json::from_str(json).unwrap();
        assert_eq!(alert.id, "7");
        assert_eq!(alert.priority, Priority::High);
        assert_eq!(alert.kind, "price");
    }

    #[test]
    fn test_unread_count_tracks_read_set() {
        let alerts: Vec<Alert> = serde_json::from_str(
            r#"[{"id":"a","priority":"low","title":"one","timestamp":"2025-02-01"},
                {"id":"b","priority":"low","title":"two","timestamp":"2025-02-02"}]"#,
        )
        .unwrap();
        let mut state = AlertState {
            feed: PollResult::with_data(alerts),
            ..Default::default()
        };
        assert_eq!(state.unread_count(), 2);
        state.mark_read("a");
        state.mark_read("a");
        assert_eq!(state.unread_count(), 1);
    }
}
