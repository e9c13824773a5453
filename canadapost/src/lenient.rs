//! Lenient conversions from response text.
//!
//! A garbled or missing field in a product, box or outlet must never abort the whole
//! response, so every numeric and date field goes through these helpers and falls back to
//! a default instead of failing.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;

/// Parse `text` as `T`, falling back to `T::default()` when it is empty or invalid.
pub fn parse_or_default<T>(field: &str, text: &str) -> T
where
    T: FromStr + Default,
    T::Err: Display,
{
    let text = text.trim();
    if text.is_empty() {
        return T::default();
    }

    match text.parse::<T>() {
        Ok(v) => v,
        Err(e) => {
            log::debug!("defaulting `{}`: could not parse {:?}: {}", field, text, e);
            T::default()
        }
    }
}

/// Parse a money amount, keeping its fractional units. Invalid text yields zero.
pub fn parse_money(field: &str, text: &str) -> Decimal {
    let text = text.trim().trim_start_matches('$');
    parse_or_default(field, text)
}

/// Parse a vendor timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and plain `YYYY-MM-DD` (taken as midnight UTC).
/// Anything else, including empty text, yields `None`.
pub fn parse_timestamp(field: &str, text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(ndt.and_utc());
    }
    if let Some(ndt) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Some(ndt.and_utc());
    }

    log::debug!("dropping `{}`: {:?} is not a date", field, text);
    None
}
