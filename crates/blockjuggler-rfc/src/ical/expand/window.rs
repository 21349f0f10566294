//! Time window used to bound recurrence expansion.

use chrono::{DateTime, NaiveTime, TimeDelta, TimeZone, Utc};

/// Half-open span of time `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// ## Summary
    /// Builds the window reaching `days` days either side of `now`, with both
    /// bounds truncated to midnight UTC.
    ///
    /// Returns `None` if a bound cannot be represented.
    #[must_use]
    pub fn around(now: DateTime<Utc>, days: u32) -> Option<Self> {
        let span = TimeDelta::try_days(i64::from(days))?;
        let midnight = |t: DateTime<Utc>| Utc.from_utc_datetime(&t.date_naive().and_time(NaiveTime::MIN));

        Some(Self {
            start: midnight(now.checked_sub_signed(span)?),
            end: midnight(now.checked_add_signed(span)?),
        })
    }

    /// Returns whether an occurrence spanning `[start, end)` belongs to the
    /// window.
    ///
    /// Occurrences overlapping the window count. Zero-length occurrences count
    /// when they start inside it.
    #[must_use]
    pub fn overlaps<Tz: TimeZone>(&self, start: &DateTime<Tz>, end: &DateTime<Tz>) -> bool {
        let start = start.with_timezone(&Utc);
        let end = end.with_timezone(&Utc);
        start < self.end && (end > self.start || start >= self.start)
    }
}
