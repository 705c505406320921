//! Column decoding helpers shared by the row wrappers.
//!
//! Ids, dates and amounts are stored as TEXT and parsed back through their
//! `FromStr` implementations.

use std::str::FromStr;

use chrono::SecondsFormat;

use techserv_domain::time::{Date, Timestamp};

fn decode_error<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}

pub(crate) fn parse<T>(value: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(value).map_err(decode_error)
}

pub(crate) fn parse_opt<T>(value: Option<String>) -> Result<Option<T>, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.as_deref().map(parse).transpose()
}

pub(crate) fn parse_timestamp(value: Option<String>) -> Result<Option<Timestamp>, sqlx::Error> {
    value
        .map(|s| {
            chrono::DateTime::parse_from_rfc3339(&s)
                .map(|ts| ts.to_utc())
                .map_err(decode_error)
        })
        .transpose()
}

/// Fixed-width RFC 3339 so that stored timestamps sort as text.
pub(crate) fn timestamp_text(ts: Option<Timestamp>) -> Option<String> {
    ts.map(|ts| ts.to_rfc3339_opts(SecondsFormat::Nanos, true))
}

pub(crate) fn date_text(date: Option<Date>) -> Option<String> {
    date.map(|d| d.to_string())
}

pub(crate) fn id_text<T: ToString>(id: Option<T>) -> Option<String> {
    id.map(|id| id.to_string())
}
