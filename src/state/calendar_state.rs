//! Economic calendar state.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::poller::PollResult;
use crate::transform::EventFilter;

/// Kind of calendar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Economic,
    Religious,
    Holiday,
    National,
    #[serde(other)]
    Other,
}

/// Expected market impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Critical,
    High,
    Medium,
    Low,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A calendar entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicEvent {
    pub date: NaiveDate,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(alias = "importance", default)]
    pub impact: Impact,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: Option<String>,
}

/// Calendar view state.
#[derive(Debug)]
pub struct CalendarState {
    /// Latest poll outcome.
    pub feed: PollResult<Vec<EconomicEvent>>,
    /// Events shipped with the binary, shown until the endpoint succeeds.
    pub bundled: Vec<EconomicEvent>,
    /// Active filter.
    pub filter: EventFilter,
    /// Selected row in the filtered list.
    pub selected_index: Option<usize>,
}

impl Default for CalendarState {
    fn default() -> Self {
        Self {
            feed: PollResult::default(),
            bundled: bundled_events(),
            filter: EventFilter::default(),
            selected_index: None,
        }
    }
}

impl CalendarState {
    /// Fetched events when available, else the bundled list.
    pub fn events(&self) -> &[EconomicEvent] {
        self.feed.data.as_deref().unwrap_or(&self.bundled)
    }

    /// Upcoming events passing the active filter, soonest first.
    pub fn visible(&self, now: DateTime<Utc>) -> Vec<EconomicEvent> {
        self.filter.apply(self.events(), now)
    }
}

fn event(
    date: (i32, u32, u32),
    name: &str,
    kind: EventType,
    impact: Impact,
    countries: &[&str],
    description: &str,
) -> Option<EconomicEvent> {
    Some(EconomicEvent {
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2)?,
        name: name.to_string(),
        kind,
        impact,
        countries: countries.iter().map(|c| c.to_string()).collect(),
        description: description.to_string(),
        duration: None,
    })
}

/// The built-in 2025 calendar.
pub fn bundled_events() -> Vec<EconomicEvent> {
    use EventType::*;
    use Impact::*;

    [
        event((2025, 1, 1), "New Year's Day", Holiday, High, &["Turkey"], "Public holiday"),
        event(
            (2025, 3, 6),
            "ECB Monetary Policy Meeting",
            Economic,
            Critical,
            &["European Union"],
            "European Central Bank interest rate decision",
        ),
        event(
            (2025, 3, 19),
            "Federal Reserve FOMC Meeting",
            Economic,
            Critical,
            &["United States"],
            "Federal Reserve interest rate decision and monetary policy statement",
        ),
        event(
            (2025, 3, 30),
            "Ramadan Feast",
            Religious,
            High,
            &["Turkey"],
            "Public holiday",
        ),
        event(
            (2025, 4, 15),
            "G20 Finance Ministers Meeting",
            Economic,
            High,
            &["All G20"],
            "Finance Ministers and Central Bank Governors Meeting",
        ),
        event(
            (2025, 4, 23),
            "National Sovereignty and Children's Day",
            National,
            High,
            &["Turkey"],
            "Public holiday",
        ),
        event(
            (2025, 6, 6),
            "Sacrifice Feast",
            Religious,
            High,
            &["Turkey"],
            "Public holiday",
        ),
        event(
            (2025, 7, 30),
            "Federal Reserve FOMC Meeting",
            Economic,
            Critical,
            &["United States"],
            "Federal Reserve interest rate decision",
        ),
        event(
            (2025, 10, 29),
            "Republic Day",
            National,
            High,
            &["Turkey"],
            "Public holiday",
        ),
        event(
            (2025, 11, 21),
            "G20 Leaders' Summit 2025",
            Economic,
            Critical,
            &["All G20"],
            "Annual G20 Summit",
        ),
        event(
            (2025, 12, 10),
            "Federal Reserve FOMC Meeting",
            Economic,
            Critical,
            &["United States"],
            "Federal Reserve interest rate decision",
        ),
        event((2025, 12, 25), "Christmas Day", Holiday, Medium, &["United States", "European Union"], "Public holiday"),
    ]
    .into_iter()
    .flatten()
    .collect()
}
