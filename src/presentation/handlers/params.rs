use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::presentation::error::ApiError;

/// Parses an optional query/body value, reporting failures against `field`.
pub fn parse_optional<T>(field: &str, raw: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = String>,
{
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<T>().map_err(|e| ApiError::validation(field, e)))
        .transpose()
}

pub fn parse_required<T>(field: &str, raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = String>,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ApiError::validation(field, e))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Start,
    End,
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates. A bare date used as
/// an upper bound covers the whole day.
pub fn parse_date(
    field: &str,
    raw: Option<&str>,
    bound: DateBound,
) -> Result<Option<DateTime<Utc>>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ApiError::validation(field, format!("{} must be a date (YYYY-MM-DD)", field))
    })?;

    let time = match bound {
        DateBound::Start => NaiveTime::MIN,
        DateBound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN),
    };

    Ok(Some(date.and_time(time).and_utc()))
}
