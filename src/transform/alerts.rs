//! Alert filtering.

use chrono::{DateTime, Duration, Utc};

use crate::state::{Alert, Priority, ReadSet};

/// Preset windows for the date-range predicate, ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateWindow {
    #[default]
    All,
    Today,
    LastWeek,
    LastMonth,
}

impl DateWindow {
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Today,
            Self::Today => Self::LastWeek,
            Self::LastWeek => Self::LastMonth,
            Self::LastMonth => Self::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "all time",
            Self::Today => "today",
            Self::LastWeek => "7d",
            Self::LastMonth => "30d",
        }
    }

    /// Inclusive range covered by the window at `now`.
    pub fn range(self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = match self {
            Self::All => return None,
            Self::Today => now.date_naive().and_hms_opt(0, 0, 0)?.and_utc(),
            Self::LastWeek => now - Duration::days(7),
            Self::LastMonth => now - Duration::days(30),
        };
        Some((start, now))
    }
}

/// Conjunction of optional alert predicates. `None` fields match everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertFilter {
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub kind: Option<String>,
    /// Inclusive `[start, end]` range on the alert timestamp.
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Preset that produced `date_range`.
    pub window: DateWindow,
    /// Hide alerts whose id is in the read set.
    pub only_unread: bool,
}

impl Default for AlertFilter {
    fn default() -> Self {
        Self {
            priority: None,
            category: None,
            kind: None,
            date_range: None,
            window: DateWindow::All,
            only_unread: true,
        }
    }
}

impl AlertFilter {
    /// Check whether a single alert passes every active predicate.
    pub fn matches(&self, alert: &Alert, read: &ReadSet) -> bool {
        self.priority.is_none_or(|p| alert.priority == p)
            && self.category.as_deref().is_none_or(|c| alert.category == c)
            && self.kind.as_deref().is_none_or(|k| alert.kind == k)
            && self
                .date_range
                .is_none_or(|(start, end)| start <= alert.timestamp && alert.timestamp <= end)
            && (!self.only_unread || !read.contains(&alert.id))
    }

    /// Alerts passing the filter, in their original order.
    pub fn apply(&self, alerts: &[Alert], read: &ReadSet) -> Vec<Alert> {
        alerts
            .iter()
            .filter(|alert| self.matches(alert, read))
            .cloned()
            .collect()
    }

    /// Step the priority predicate: all → high → medium → low → all.
    pub fn cycle_priority(&mut self) {
        self.priority = match self.priority {
            None => Some(Priority::High),
            Some(Priority::High) => Some(Priority::Medium),
            Some(Priority::Medium) => Some(Priority::Low),
            Some(Priority::Low) => None,
        };
    }

    /// Step the category predicate through the categories present in `alerts`.
    pub fn cycle_category(&mut self, alerts: &[Alert]) {
        let mut categories: Vec<&str> = alerts.iter().map(|a| a.category.as_str()).collect();
        categories.sort_unstable();
        categories.dedup();
        self.category = next_value(self.category.as_deref(), &categories);
    }

    /// Step the type predicate through the types present in `alerts`.
    pub fn cycle_kind(&mut self, alerts: &[Alert]) {
        let mut kinds: Vec<&str> = alerts.iter().map(|a| a.kind.as_str()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        self.kind = next_value(self.kind.as_deref(), &kinds);
    }

    /// Step the date range: all → today → 7 days → 30 days → all.
    pub fn cycle_date_range(&mut self, now: DateTime<Utc>) {
        self.window = self.window.next();
        self.date_range = self.window.range(now);
    }

    /// Reset every predicate to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Short description of the active predicates for the view title.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(priority) = self.priority {
            parts.push(format!("priority={priority}"));
        }
        if let Some(category) = &self.category {
            parts.push(format!("category={category}"));
        }
        if let Some(kind) = &self.kind {
            parts.push(format!("type={kind}"));
        }
        if let Some((start, end)) = self.date_range {
            match self.window {
                DateWindow::All => parts.push(format!(
                    "{}..{}",
                    start.format("%Y-%m-%d"),
                    end.format("%Y-%m-%d")
                )),
                window => parts.push(window.label().to_string()),
            }
        }
        if self.only_unread {
            parts.push("unread".to_string());
        }
        if parts.is_empty() {
            "all".to_string()
        } else {
            parts.join(" ")
        }
    }
}

fn next_value(current: Option<&str>, values: &[&str]) -> Option<String> {
    let next = match current {
        None => values.first(),
        Some(current) => values
            .iter()
            .position(|v| *v == current)
            .and_then(|i| values.get(i + 1)),
    };
    next.map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn alert(id: &str, priority: Priority, category: &str, kind: &str, day: u32) -> Alert {
        Alert {
            id: id.to_string(),
            priority,
            category: category.to_string(),
            kind: kind.to_string(),
            title: format!("alert {id}"),
            message: String::new(),
            timestamp: Utc.with_ymd_and_hms(2025, 2, day, 12, 0, 0).unwrap(),
        }
    }

    fn feed() -> Vec<Alert> {
        vec![
            alert("1", Priority::High, "crypto", "price", 1),
            alert("2", Priority::Low, "macro", "news", 2),
            alert("3", Priority::High, "crypto", "volume", 3),
            alert("4", Priority::Medium, "crypto", "price", 4),
            alert("5", Priority::High, "macro", "price", 5),
        ]
    }

    fn ids(alerts: &[Alert]) -> Vec<&str> {
        alerts.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_default_hides_read_alerts_only() {
        let mut read = ReadSet::new();
        read.insert("2".to_string());
        let visible = AlertFilter::default().apply(&feed(), &read);
        assert_eq!(ids(&visible), vec!["1", "3", "4", "5"]);
    }

    #[test]
    fn test_predicates_are_conjunctive_and_keep_order() {
        let filter = AlertFilter {
            priority: Some(Priority::High),
            category: Some("crypto".to_string()),
            only_unread: false,
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&feed(), &ReadSet::new())), vec!["1", "3"]);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let filter = AlertFilter {
            date_range: Some((
                Utc.with_ymd_and_hms(2025, 2, 2, 12, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 2, 4, 12, 0, 0).unwrap(),
            )),
            only_unread: false,
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&feed(), &ReadSet::new())), vec!["2", "3", "4"]);
    }

    #[test]
    fn test_output_is_subset_and_filter_is_idempotent() {
        let mut read = ReadSet::new();
        read.insert("3".to_string());
        let filters = [
            AlertFilter::default(),
            AlertFilter {
                kind: Some("price".to_string()),
                ..Default::default()
            },
            AlertFilter {
                priority: Some(Priority::Low),
                only_unread: false,
                ..Default::default()
            },
            AlertFilter {
                category: Some("none".to_string()),
                ..Default::default()
            },
        ];
        let input = feed();
        for filter in filters {
            let once = filter.apply(&input, &read);
            assert!(once.iter().all(|a| input.contains(a)));
            let twice = filter.apply(&once, &read);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_cycle_priority_wraps() {
        let mut filter = AlertFilter::default();
        filter.cycle_priority();
        assert_eq!(filter.priority, Some(Priority::High));
        filter.cycle_priority();
        filter.cycle_priority();
        filter.cycle_priority();
        assert_eq!(filter.priority, None);
    }

    #[test]
    fn test_cycle_category_walks_present_values() {
        let alerts = feed();
        let mut filter = AlertFilter::default();
        filter.cycle_category(&alerts);
        assert_eq!(filter.category.as_deref(), Some("crypto"));
        filter.cycle_category(&alerts);
        assert_eq!(filter.category.as_deref(), Some("macro"));
        filter.cycle_category(&alerts);
        assert_eq!(filter.category, None);
    }

    #[test]
    fn test_cycle_date_range_steps_through_windows() {
        let now = Utc.with_ymd_and_hms(2025, 2, 5, 18, 0, 0).unwrap();
        let read = ReadSet::new();
        let mut filter = AlertFilter {
            only_unread: false,
            ..Default::default()
        };

        filter.cycle_date_range(now);
        assert_eq!(filter.window, DateWindow::Today);
        assert_eq!(ids(&filter.apply(&feed(), &read)), vec!["5"]);

        filter.cycle_date_range(now);
        assert_eq!(filter.window, DateWindow::LastWeek);
        assert_eq!(filter.apply(&feed(), &read).len(), 5);
        assert_eq!(filter.describe(), "7d");

        filter.cycle_date_range(now);
        filter.cycle_date_range(now);
        assert_eq!(filter.window, DateWindow::All);
        assert_eq!(filter.date_range, None);
    }

    #[test]
    fn test_describe() {
        assert_eq!(AlertFilter::default().describe(), "unread");
        let filter = AlertFilter {
            priority: Some(Priority::Medium),
            only_unread: false,
            ..Default::default()
        };
        assert_eq!(filter.describe(), "priority=medium");
    }
}
