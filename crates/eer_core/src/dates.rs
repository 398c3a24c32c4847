//! crates/eer_core/src/dates.rs
//! Calendar-date normalization and the blank-aware wire form.
//!
//! Canonical text is zero-padded ISO `YYYY-MM-DD`, so lexical order on the
//! wire equals chronological order. An unset date travels as `""`.

use chrono::{DateTime, NaiveDateTime};

pub use chrono::NaiveDate;

use crate::errors::CoreError;

pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// Normalize raw date input.
///
/// - empty / whitespace → `Ok(None)` (never "today")
/// - `YYYY-MM-DD` → that date
/// - RFC 3339 timestamp → its UTC calendar date
/// - naive `YYYY-MM-DDTHH:MM[:SS]` → its date part
pub fn normalize_date_input(raw: &str) -> Result<Option<NaiveDate>, CoreError> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, CANONICAL_FORMAT) {
        return Ok(Some(d));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(dt.naive_utc().date()));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Some(dt.date()));
        }
    }
    Err(CoreError::InvalidDate(s.to_string()))
}

/// Canonical text for an optional date (`""` when unset).
pub fn format_date(d: Option<NaiveDate>) -> String {
    match d {
        Some(d) => d.format(CANONICAL_FORMAT).to_string(),
        None => String::new(),
    }
}

/// Serde adapter: `Option<NaiveDate>` <-> `"YYYY-MM-DD"` | `""`.
pub mod blank_date {
    use chrono::NaiveDate;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_date(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        super::normalize_date_input(&raw).map_err(D::Error::custom)
    }
}
