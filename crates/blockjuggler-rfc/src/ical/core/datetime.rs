//! iCalendar DATE and DATE-TIME value types (RFC 5545 §3.3.4, §3.3.5).

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// DATE value (RFC 5545 §3.3.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl Date {
    #[must_use]
    pub const fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Returns the calendar date, or `None` for days that do not exist
    /// (e.g. February 30th).
    #[must_use]
    pub fn to_naive(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

/// Form of DATE-TIME value (RFC 5545 §3.3.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateTimeForm {
    /// Floating time - same wall-clock time in any timezone.
    ///
    /// Example: `19980118T230000`
    Floating,

    /// UTC time - absolute instant, indicated by 'Z' suffix.
    ///
    /// Example: `19980119T070000Z`
    Utc,

    /// Zoned time - local time with TZID reference.
    ///
    /// Example: `TZID=America/New_York:19980119T020000`
    Zoned {
        /// The TZID parameter as written, before normalization.
        tzid: String,
    },
}

/// DATE-TIME value (RFC 5545 §3.3.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    /// Second (0-60, allowing for leap seconds).
    pub second: u8,
    pub form: DateTimeForm,
}

impl DateTime {
    /// Creates a floating DATE-TIME.
    #[must_use]
    pub fn floating(date: Date, hour: u8, minute: u8, second: u8) -> Self {
        Self::with_form(date, hour, minute, second, DateTimeForm::Floating)
    }

    /// Creates a UTC DATE-TIME.
    #[must_use]
    pub fn utc(date: Date, hour: u8, minute: u8, second: u8) -> Self {
        Self::with_form(date, hour, minute, second, DateTimeForm::Utc)
    }

    /// Creates a zoned DATE-TIME.
    #[must_use]
    pub fn zoned(date: Date, hour: u8, minute: u8, second: u8, tzid: impl Into<String>) -> Self {
        Self::with_form(
            date,
            hour,
            minute,
            second,
            DateTimeForm::Zoned { tzid: tzid.into() },
        )
    }

    const fn with_form(date: Date, hour: u8, minute: u8, second: u8, form: DateTimeForm) -> Self {
        Self {
            year: date.year,
            month: date.month,
            day: date.day,
            hour,
            minute,
            second,
            form,
        }
    }

    #[must_use]
    pub const fn date(&self) -> Date {
        Date::new(self.year, self.month, self.day)
    }

    #[must_use]
    pub fn is_utc(&self) -> bool {
        matches!(self.form, DateTimeForm::Utc)
    }

    /// Returns the timezone ID if this is a zoned time.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match &self.form {
            DateTimeForm::Zoned { tzid } => Some(tzid),
            _ => None,
        }
    }

    /// Returns the wall-clock value without any zone information.
    ///
    /// A leap second (`60`) is clamped to `59`; `None` is returned for dates
    /// that do not exist.
    #[must_use]
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        let time = NaiveTime::from_hms_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second.min(59)),
        )?;
        Some(self.date().to_naive()?.and_time(time))
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}T{:02}{:02}{:02}",
            self.date(),
            self.hour,
            self.minute,
            self.second
        )?;
        if self.is_utc() {
            write!(f, "Z")?;
        }
        Ok(())
    }
}
