//! Exchange calendar helpers.
//!
//! Market data is dated in the exchange's own calendar, so "today" for a
//! sync means the local date at the exchange, not the host's date.
//!
//! - [`parse_tz`]: Parse an IANA zone name (e.g., "Asia/Kolkata").
//! - [`date_in`]: Calendar date of a UTC instant in a zone.
//! - [`today_in`]: Current calendar date in a zone.
//!
//! Example
//! - 2024-03-10T20:00:00Z is already 2024-03-11 in Asia/Kolkata (UTC+05:30).

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Parse an IANA time zone name.
///
/// Errors:
/// - Unknown zone name
pub fn parse_tz(name: &str) -> anyhow::Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("bad tz: {name}"))
}

/// Calendar date of `instant` as seen in `tz`.
pub fn date_in(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// The current calendar date in `tz`.
pub fn today_in(tz: Tz) -> NaiveDate {
    date_in(Utc::now(), tz)
}
