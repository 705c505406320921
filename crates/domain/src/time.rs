//! Time, date and timestamp helpers.

use chrono::{DateTime, NaiveDate, Utc};

/// UTC timestamp used for history notes.
pub type Timestamp = DateTime<Utc>;

/// Calendar date used for entry, delivery and fiscal boundaries.
pub type Date = NaiveDate;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Return the current UTC calendar date.
#[must_use]
pub fn today() -> Date {
    Utc::now().date_naive()
}

/// Whether `date` falls inside `[start, end]`, both bounds included.
#[must_use]
pub fn within(date: Date, start: Date, end: Date) -> bool {
    start <= date && date <= end
}
