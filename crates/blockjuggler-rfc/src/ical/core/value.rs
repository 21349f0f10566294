//! Parsed property values (RFC 5545 §3.3).

use super::{Date, DateTime, Duration};

/// Value types (RFC 5545 §3.3).
///
/// The raw string is preserved separately on the property. Value types the
/// converter never inspects (BINARY, PERIOD, UTC-OFFSET, ...) are kept as
/// [`Value::Unknown`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// CAL-ADDRESS value (typically a `mailto:` URI).
    CalAddress(String),
    Date(Date),
    /// Comma-separated DATE values (EXDATE, RDATE).
    DateList(Vec<Date>),
    DateTime(DateTime),
    /// Comma-separated DATE-TIME values (EXDATE, RDATE).
    DateTimeList(Vec<DateTime>),
    Duration(Duration),
    Integer(i32),
    /// RECUR value, kept as rule text for the recurrence engine.
    Recur(String),
    /// TEXT value (unescaped).
    Text(String),
    Uri(String),
    /// Unknown or unparsed value. Preserved for round-trip.
    Unknown(String),
}

impl Value {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<&DateTime> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<&Date> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_duration(&self) -> Option<&Duration> {
        match self {
            Self::Duration(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_recur(&self) -> Option<&str> {
        match self {
            Self::Recur(rule) => Some(rule),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_cal_address(&self) -> Option<&str> {
        match self {
            Self::CalAddress(address) => Some(address),
            _ => None,
        }
    }
}
