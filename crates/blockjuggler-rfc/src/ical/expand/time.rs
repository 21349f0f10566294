//! Conversion of DATE / DATE-TIME property values into `chrono` instants.

use std::fmt;

use chrono::{NaiveDate, TimeDelta, TimeZone};
use chrono_tz::Tz;

use super::timezone::{ConversionError, TimeZoneResolver, localize};
use crate::ical::core::{Date, DateTime as IcalDateTime, DateTimeForm, Property, Value};

/// Start or end of an event: an all-day date or a timezone-aware instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    Date(NaiveDate),
    DateTime(chrono::DateTime<Tz>),
}

impl EventTime {
    /// Returns the instant this value denotes. Dates map to midnight UTC.
    #[must_use]
    pub fn to_instant(self) -> chrono::DateTime<Tz> {
        match self {
            Self::Date(date) => Tz::UTC.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN)),
            Self::DateTime(dt) => dt,
        }
    }

    #[must_use]
    pub const fn is_date(self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// Shifts the value by `delta`, keeping the all-day form for whole days.
    ///
    /// Returns `None` when the result is out of range.
    #[must_use]
    pub fn shifted(self, delta: TimeDelta) -> Option<Self> {
        match self {
            Self::Date(date) if delta.num_seconds() % 86_400 == 0 => {
                date.checked_add_signed(delta).map(Self::Date)
            }
            Self::Date(_) => self
                .to_instant()
                .checked_add_signed(delta)
                .map(Self::DateTime),
            Self::DateTime(dt) => dt.checked_add_signed(delta).map(Self::DateTime),
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{date}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

/// ## Summary
/// Reads a single DATE or DATE-TIME property value.
///
/// Returns `Ok(None)` when the property holds some other value type.
///
/// ## Errors
///
/// Returns an error if the date does not exist or its TZID is unknown.
pub fn property_time(
    prop: &Property,
    resolver: &mut TimeZoneResolver,
) -> Result<Option<EventTime>, ConversionError> {
    match &prop.value {
        Value::Date(date) => Ok(Some(EventTime::Date(naive_date(*date)?))),
        Value::DateTime(dt) => Ok(Some(EventTime::DateTime(zoned_datetime(dt, resolver)?))),
        _ => Ok(None),
    }
}

/// ## Summary
/// Reads every DATE or DATE-TIME of a list-valued property (EXDATE, RDATE).
///
/// ## Errors
///
/// Returns an error if any date does not exist or its TZID is unknown.
pub fn property_times(
    prop: &Property,
    resolver: &mut TimeZoneResolver,
) -> Result<Vec<EventTime>, ConversionError> {
    match &prop.value {
        Value::DateList(dates) => dates
            .iter()
            .map(|d| naive_date(*d).map(EventTime::Date))
            .collect(),
        Value::DateTimeList(dts) => dts
            .iter()
            .map(|dt| zoned_datetime(dt, resolver).map(EventTime::DateTime))
            .collect(),
        _ => Ok(property_time(prop, resolver)?.into_iter().collect()),
    }
}

fn naive_date(date: Date) -> Result<NaiveDate, ConversionError> {
    date.to_naive()
        .ok_or_else(|| ConversionError::InvalidDateTime(date.to_string()))
}

/// Converts an iCalendar DATE-TIME into a zoned `chrono` value.
///
/// Floating times are interpreted as UTC.
fn zoned_datetime(
    dt: &IcalDateTime,
    resolver: &mut TimeZoneResolver,
) -> Result<chrono::DateTime<Tz>, ConversionError> {
    let naive = dt
        .to_naive()
        .ok_or_else(|| ConversionError::InvalidDateTime(dt.to_string()))?;

    match &dt.form {
        DateTimeForm::Utc | DateTimeForm::Floating => Ok(Tz::UTC.from_utc_datetime(&naive)),
        DateTimeForm::Zoned { tzid } => localize(naive, resolver.resolve(tzid)?),
    }
}
