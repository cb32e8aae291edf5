//! Conversions between Postgres temporal columns and the JSON strings the
//! API speaks.
//!
//! Timestamps go out as `YYYY-MM-DD HH:MM:SS` and dates as `YYYY-MM-DD`.
//! Incoming values are accepted in a few common spellings; anything that
//! carries an offset is normalised to UTC before it is stored.

use serde::{Deserialize, Deserializer, Serializer};
use time::{
    format_description::{well_known::Rfc3339, FormatItem},
    macros::{format_description, time},
    Date, OffsetDateTime, PrimitiveDateTime, UtcOffset,
};

use crate::error::AppError;

const TIMESTAMP_OUT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const DATE_FMT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

const TIMESTAMP_IN: &[&[FormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
];

pub fn format_timestamp(ts: &PrimitiveDateTime) -> Result<String, time::error::Format> {
    ts.format(TIMESTAMP_OUT)
}

pub fn format_date(d: &Date) -> Result<String, time::error::Format> {
    d.format(DATE_FMT)
}

pub fn parse_date(raw: &str, field: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), DATE_FMT)
        .map_err(|_| AppError::validation(format!("{field} must be YYYY-MM-DD")))
}

/// Accepts a bare date (midnight), a naive date-time with `T` or space, or
/// RFC 3339 with an offset.
pub fn parse_timestamp(raw: &str, field: &str) -> Result<PrimitiveDateTime, AppError> {
    let raw = raw.trim();
    for fmt in TIMESTAMP_IN {
        if let Ok(ts) = PrimitiveDateTime::parse(raw, fmt) {
            return Ok(ts);
        }
    }
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        let utc = ts.to_offset(UtcOffset::UTC);
        return Ok(PrimitiveDateTime::new(utc.date(), utc.time()));
    }
    if let Ok(d) = Date::parse(raw, DATE_FMT) {
        return Ok(d.midnight());
    }
    Err(AppError::validation(format!(
        "{field} must be a date or date-time (YYYY-MM-DD HH:MM:SS)"
    )))
}

pub fn parse_timestamp_opt(
    raw: Option<&str>,
    field: &str,
) -> Result<Option<PrimitiveDateTime>, AppError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| parse_timestamp(s, field))
        .transpose()
}

pub fn parse_date_opt(raw: Option<&str>, field: &str) -> Result<Option<Date>, AppError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| parse_date(s, field))
        .transpose()
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Half-open `[start, end)` range covering one calendar day.
pub fn day_bounds(day: Date) -> (PrimitiveDateTime, PrimitiveDateTime) {
    let start = day.midnight();
    let end = match day.next_day() {
        Some(next) => next.midnight(),
        None => PrimitiveDateTime::new(day, time!(23:59:59.999_999_999)),
    };
    (start, end)
}

/// Accepts `true`/`false` as well as `0`/`1`. Use with `#[serde(default)]`.
pub fn lenient_bool<'de, D: Deserializer<'de>>(de: D) -> Result<Option<bool>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }
    Ok(match Option::<Flag>::deserialize(de)? {
        None => None,
        Some(Flag::Bool(b)) => Some(b),
        Some(Flag::Int(i)) => Some(i != 0),
    })
}

pub mod timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(v: &PrimitiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        let out = format_timestamp(v).map_err(serde::ser::Error::custom)?;
        s.serialize_str(&out)
    }
}

pub mod timestamp_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        v: &Option<PrimitiveDateTime>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match v {
            Some(ts) => timestamp::serialize(ts, s),
            None => s.serialize_none(),
        }
    }
}

pub mod date {
    use super::*;

    pub fn serialize<S: Serializer>(v: &Date, s: S) -> Result<S::Ok, S::Error> {
        let out = format_date(v).map_err(serde::ser::Error::custom)?;
        s.serialize_str(&out)
    }
}

pub mod date_opt {
    use super::*;

    pub fn serialize<S: Serializer>(v: &Option<Date>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(d) => date::serialize(d, s),
            None => s.serialize_none(),
        }
    }
}
