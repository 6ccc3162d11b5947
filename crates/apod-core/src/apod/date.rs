//! Resolving which APOD date to fetch.

use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("incorrect date format {0:?}; should be YYYY-MM-DD")]
    InvalidFormat(String),
    #[error("no APOD for {date}: dates run from {first} to {today}")]
    OutOfRange {
        date: NaiveDate,
        first: NaiveDate,
        today: NaiveDate,
    },
}

/// The first Astronomy Picture of the Day.
pub fn first_apod_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1995, 6, 16).unwrap_or_default()
}

/// Parse a `YYYY-MM-DD` argument, defaulting to `today` when absent.
/// Dates before the first APOD or after `today` are rejected.
pub fn resolve_date(arg: Option<&str>, today: NaiveDate) -> Result<NaiveDate, DateError> {
    let date = match arg.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map_err(|_| DateError::InvalidFormat(s.to_string()))?,
        None => today,
    };
    let first = first_apod_date();
    if date < first || date > today {
        return Err(DateError::OutOfRange { date, first, today });
    }
    Ok(date)
}
