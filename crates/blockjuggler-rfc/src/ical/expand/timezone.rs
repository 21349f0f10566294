//! Timezone resolution for iCalendar date-times.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;

/// Error during timezone conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Unknown or invalid timezone identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Non-existent time during DST gap, even after shifting forward.
    #[error("Non-existent time (DST gap): {0}")]
    NonExistentTime(String),

    /// The value does not name a real calendar date or time.
    #[error("Invalid datetime: {0}")]
    InvalidDateTime(String),
}

/// Resolver for timezone identifiers.
///
/// Maintains a cache of resolved timezones keyed by the TZID as written.
#[derive(Debug, Default)]
pub struct TimeZoneResolver {
    cache: HashMap<String, Tz>,
}

impl TimeZoneResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Resolves a timezone identifier to a `chrono_tz::Tz`.
    ///
    /// Vendor prefixes, Windows zone names and IANA aliases are normalized
    /// before the lookup.
    ///
    /// ## Errors
    ///
    /// Returns `ConversionError::UnknownTimezone` if the TZID cannot be resolved.
    ///
    /// ## Side Effects
    ///
    /// Caches successful resolutions to avoid repeated parsing.
    pub fn resolve(&mut self, tzid: &str) -> Result<Tz, ConversionError> {
        if let Some(tz) = self.cache.get(tzid) {
            return Ok(*tz);
        }

        let normalized = normalize_tzid(tzid);
        let tz = Tz::from_str(&normalized)
            .map_err(|_e| ConversionError::UnknownTimezone(tzid.to_string()))?;

        tracing::trace!(tzid, resolved = %tz, "Resolved timezone");
        self.cache.insert(tzid.to_string(), tz);

        Ok(tz)
    }
}

/// Normalizes common iCalendar timezone identifiers to IANA names.
///
/// Uses ICU4X for Windows timezone ID mapping (Outlook exports) and IANA
/// canonicalization.
fn normalize_tzid(tzid: &str) -> String {
    let stripped = tzid
        .strip_prefix("/mozilla.org/")
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(tzid)
        .trim();

    let iana_parser = IanaParserExtended::new();

    if let Some(tz) = WindowsParser::new().parse(stripped, None)
        && let Some(entry) = iana_parser.iter().find(|entry| entry.time_zone == tz)
    {
        return entry.canonical.to_string();
    }

    let parsed = iana_parser.parse(stripped);
    if parsed.time_zone != icu::time::TimeZone::UNKNOWN {
        return parsed.canonical.to_string();
    }

    stripped.to_string()
}

/// ## Summary
/// Attaches a timezone to a wall-clock time.
///
/// Ambiguous times (DST fold) take the earlier instant. Non-existent times
/// (DST gap) are shifted forward by one hour.
///
/// ## Errors
///
/// Returns `ConversionError::NonExistentTime` if the shifted time still does
/// not exist.
pub fn localize(local_time: NaiveDateTime, tz: Tz) -> Result<DateTime<Tz>, ConversionError> {
    match tz.from_local_datetime(&local_time) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt),
        LocalResult::None => {
            tracing::debug!(%local_time, %tz, "Shifting non-existent local time forward");
            local_time
                .checked_add_signed(TimeDelta::hours(1))
                .and_then(|shifted| tz.from_local_datetime(&shifted).earliest())
                .ok_or_else(|| ConversionError::NonExistentTime(format!("{local_time} in {tz}")))
        }
    }
}
