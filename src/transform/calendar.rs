//! Economic-calendar filtering and ordering.

use chrono::{DateTime, Datelike, Utc};

use crate::state::{EconomicEvent, EventType};

/// Country value that matches any country selection.
pub const WILDCARD_COUNTRY: &str = "All G20";

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days from `now` until the start (00:00 UTC) of the event date,
/// rounded up. Events later today yield `0`, events on earlier dates are
/// negative.
pub fn days_until(event: &EconomicEvent, now: DateTime<Utc>) -> i64 {
    let Some(start) = event.date.and_hms_opt(0, 0, 0) else {
        return i64::MIN;
    };
    let diff = (start.and_utc() - now).num_milliseconds();
    -(-diff).div_euclid(MILLIS_PER_DAY)
}

/// `"Today"`, `"Tomorrow"` or `"in N days"`.
pub fn days_until_text(days: i64) -> String {
    match days {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        n => format!("in {n} days"),
    }
}

/// Events within the next week are highlighted.
pub fn is_upcoming(days: i64) -> bool {
    (0..=7).contains(&days)
}

/// Country, type and month restrictions. Empty selections match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub countries: Vec<String>,
    pub types: Vec<EventType>,
    /// `(year, month)` with month in `1..=12`.
    pub month: Option<(i32, u32)>,
}

impl EventFilter {
    /// Check whether an event passes the country/type/month restrictions.
    pub fn matches(&self, event: &EconomicEvent) -> bool {
        let country_ok = self.countries.is_empty()
            || event
                .countries
                .iter()
                .any(|c| c == WILDCARD_COUNTRY || self.countries.contains(c));
        let type_ok = self.types.is_empty() || self.types.contains(&event.kind);
        let month_ok = self
            .month
            .is_none_or(|(year, month)| event.date.year() == year && event.date.month() == month);
        country_ok && type_ok && month_ok
    }

    /// Events not in the past that pass the filter, soonest first. Ties keep
    /// their input order.
    pub fn apply(&self, events: &[EconomicEvent], now: DateTime<Utc>) -> Vec<EconomicEvent> {
        let mut rows: Vec<(i64, &EconomicEvent)> = events
            .iter()
            .map(|event| (days_until(event, now), event))
            .filter(|(days, event)| *days >= 0 && self.matches(event))
            .collect();
        rows.sort_by_key(|(days, _)| *days);
        rows.into_iter().map(|(_, event)| event.clone()).collect()
    }

    /// Step the type restriction: all → economic → religious → holiday → national → all.
    pub fn cycle_type(&mut self) {
        const ORDER: [EventType; 4] = [
            EventType::Economic,
            EventType::Religious,
            EventType::Holiday,
            EventType::National,
        ];
        let next = match self.types.as_slice() {
            [] => Some(ORDER[0]),
            [current] => ORDER
                .iter()
                .position(|t| t == current)
                .and_then(|i| ORDER.get(i + 1).copied()),
            _ => None,
        };
        self.types = next.into_iter().collect();
    }

    /// Step the country restriction through the countries present in `events`.
    pub fn cycle_country(&mut self, events: &[EconomicEvent]) {
        let mut countries: Vec<&str> = events
            .iter()
            .flat_map(|e| e.countries.iter().map(String::as_str))
            .filter(|c| *c != WILDCARD_COUNTRY)
            .collect();
        countries.sort_unstable();
        countries.dedup();

        let next = match self.countries.as_slice() {
            [] => countries.first().copied(),
            [current] => countries
                .iter()
                .position(|c| c == current)
                .and_then(|i| countries.get(i + 1).copied()),
            _ => None,
        };
        self.countries = next.map(str::to_string).into_iter().collect();
    }

    /// Step the month restriction forward from the month of `now`, twelve months
    /// ahead, then back to no restriction.
    pub fn cycle_month(&mut self, now: DateTime<Utc>) {
        let base = now.year() * 12 + now.month0() as i32;
        self.month = match self.month {
            None => Some((now.year(), now.month())),
            Some((year, month)) => {
                // zero-based index of the following month
                let index = year * 12 + month as i32;
                (index - base < 12).then(|| (index.div_euclid(12), index.rem_euclid(12) as u32 + 1))
            }
        };
    }

    /// Short description of the active restrictions for the view title.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.countries.is_empty() {
            parts.push(self.countries.join(","));
        }
        if !self.types.is_empty() {
            let types: Vec<String> = self.types.iter().map(|t| format!("{t:?}").to_lowercase()).collect();
            parts.push(types.join(","));
        }
        if let Some((year, month)) = self.month {
            parts.push(format!("{year}-{month:02}"));
        }
        if parts.is_empty() {
            "all".to_string()
        } else {
            parts.join(" ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Impact;
    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;

    fn event(date: (i32, u32, u32), name: &str, kind: EventType, countries: &[&str]) -> EconomicEvent {
        EconomicEvent {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            name: name.to_string(),
            kind,
            impact: Impact::High,
            countries: countries.iter().map(|c| c.to_string()).collect(),
            description: String::new(),
            duration: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 15, 30, 0).unwrap()
    }

    fn calendar() -> Vec<EconomicEvent> {
        vec![
            event((2025, 4, 23), "Sovereignty Day", EventType::National, &["Turkey"]),
            event((2025, 3, 6), "ECB", EventType::Economic, &["European Union"]),
            event((2025, 3, 19), "FOMC", EventType::Economic, &["United States"]),
            event((2025, 3, 10), "Today event", EventType::Holiday, &["Turkey"]),
            event((2025, 4, 15), "G20 FinMin", EventType::Economic, &[WILDCARD_COUNTRY]),
            event((2025, 3, 19), "Same day", EventType::Religious, &["Turkey"]),
            event((2025, 3, 11), "Tomorrow event", EventType::Economic, &["Japan"]),
        ]
    }

    fn names(events: &[EconomicEvent]) -> Vec<&str> {
        events.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_days_until_rounds_up() {
        let events = calendar();
        assert_eq!(days_until(&events[3], now()), 0);
        assert_eq!(days_until(&events[6], now()), 1);
        assert_eq!(days_until(&events[2], now()), 9);
        assert_eq!(days_until(&events[1], now()), -4);

        let midnight = Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap();
        assert_eq!(days_until(&events[6], midnight), 0);
    }

    #[test]
    fn test_past_events_are_dropped_and_rest_sorted() {
        let visible = EventFilter::default().apply(&calendar(), now());
        assert_eq!(
            names(&visible),
            vec![
                "Today event",
                "Tomorrow event",
                "FOMC",
                "Same day",
                "G20 FinMin",
                "Sovereignty Day"
            ]
        );

        let today = now().date_naive();
        assert!(visible.iter().all(|e| e.date >= today));
        assert!(
            visible
                .windows(2)
                .all(|w| days_until(&w[0], now()) <= days_until(&w[1], now()))
        );
    }

    #[test]
    fn test_country_filter_honours_wildcard() {
        let filter = EventFilter {
            countries: vec!["United States".to_string()],
            ..Default::default()
        };
        assert_eq!(names(&filter.apply(&calendar(), now())), vec!["FOMC", "G20 FinMin"]);
    }

    #[test]
    fn test_type_and_month_filters() {
        let filter = EventFilter {
            types: vec![EventType::Economic],
            month: Some((2025, 3)),
            ..Default::default()
        };
        assert_eq!(names(&filter.apply(&calendar(), now())), vec!["Tomorrow event", "FOMC"]);
    }

    #[test]
    fn test_days_until_text() {
        assert_eq!(days_until_text(0), "Today");
        assert_eq!(days_until_text(1), "Tomorrow");
        assert_eq!(days_until_text(12), "in 12 days");
        assert!(is_upcoming(7));
        assert!(!is_upcoming(8));
    }

    #[test]
    fn test_cycle_month_wraps_after_a_year() {
        let mut filter = EventFilter::default();
        filter.cycle_month(now());
        assert_eq!(filter.month, Some((2025, 3)));
        for _ in 0..10 {
            filter.cycle_month(now());
        }
        assert_eq!(filter.month, Some((2026, 1)));
        filter.cycle_month(now());
        assert_eq!(filter.month, Some((2026, 2)));
        filter.cycle_month(now());
        assert_eq!(filter.month, None);
    }

    #[test]
    fn test_cycle_type_and_country() {
        let mut filter = EventFilter::default();
        filter.cycle_type();
        assert_eq!(filter.types, vec![EventType::Economic]);
        for _ in 0..4 {
            filter.cycle_type();
        }
        assert!(filter.types.is_empty());

        let events = calendar();
        filter.cycle_country(&events);
        assert_eq!(filter.countries, vec!["European Union".to_string()]);
    }
}
