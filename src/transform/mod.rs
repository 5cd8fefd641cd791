//! Pure helpers applied to the latest fetched collections.
//!
//! Nothing here keeps state between calls: every view recomputes its
//! filtered/sorted rows from the raw poll data on each render.

mod alerts;
mod calendar;
mod percent;
mod signals;

pub use alerts::{AlertFilter, DateWindow};
pub use calendar::{EventFilter, WILDCARD_COUNTRY, days_until, days_until_text, is_upcoming};
pub use percent::{format_change, percent_change};
pub use signals::SignalStats;
