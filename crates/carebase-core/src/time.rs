//! Date and time helpers.

use time::OffsetDateTime;

/// Current UTC timestamp.
pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

// Calendar dates travel as `YYYY-MM-DD` strings on the wire.
time::serde::format_description!(pub date_format, Date, "[year]-[month]-[day]");

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<time::Date, time::error::Parse> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    time::Date::parse(value, &format)
}
