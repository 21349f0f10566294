//! Value type parsers for iCalendar (RFC 5545 §3.3).
//!
//! Numeric error sources are discarded: the position and kind carried by
//! [`ParseError`] are what callers report.
#![expect(
    clippy::map_err_ignore,
    reason = "Integer parse errors carry no detail beyond the ParseError kind and position"
)]

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::ical::core::{Date, DateTime, DateTimeForm, Duration};

/// Parses a DATE value (RFC 5545 §3.3.4).
///
/// Format: YYYYMMDD (e.g., "19970714")
///
/// ## Errors
/// Returns an error if the string is not a valid 8-digit date.
pub fn parse_date(s: &str, line: usize, col: usize) -> ParseResult<Date> {
    let invalid = || ParseError::new(ParseErrorKind::InvalidDate, line, col);

    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid().with_context(format!("expected YYYYMMDD, got `{s}`")));
    }

    let year = s[0..4].parse::<u16>().map_err(|_| invalid())?;
    let month = s[4..6].parse::<u8>().map_err(|_| invalid())?;
    let day = s[6..8].parse::<u8>().map_err(|_| invalid())?;

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(invalid().with_context(format!("`{s}` is out of range")));
    }

    Ok(Date { year, month, day })
}

/// Parses a DATE-TIME value (RFC 5545 §3.3.5).
///
/// Format: YYYYMMDD"T"HHMMSS[Z] (e.g., "19970714T133000Z")
///
/// The TZID comes from the property parameter and is ignored for UTC values.
///
/// ## Errors
/// Returns an error if the string is not a valid datetime format.
pub fn parse_datetime(
    s: &str,
    tzid: Option<&str>,
    line: usize,
    col: usize,
) -> ParseResult<DateTime> {
    let (date_str, time_str) = s.split_once('T').ok_or_else(|| {
        ParseError::new(ParseErrorKind::InvalidDateTime, line, col)
            .with_context(format!("expected YYYYMMDDTHHMMSS, got `{s}`"))
    })?;

    let date = parse_date(date_str, line, col)?;

    let (time_str, is_utc) = match time_str.strip_suffix(['Z', 'z']) {
        Some(stripped) => (stripped, true),
        None => (time_str, false),
    };
    let time_col = col + date_str.len() + 1;
    let invalid_time = || ParseError::new(ParseErrorKind::InvalidTime, line, time_col);

    if time_str.len() != 6 || !time_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid_time().with_context(format!("expected HHMMSS, got `{time_str}`")));
    }
    let hour = time_str[0..2].parse::<u8>().map_err(|_| invalid_time())?;
    let minute = time_str[2..4].parse::<u8>().map_err(|_| invalid_time())?;
    let second = time_str[4..6].parse::<u8>().map_err(|_| invalid_time())?;

    // Allow 60 for leap seconds
    if hour > 23 || minute > 59 || second > 60 {
        return Err(invalid_time());
    }

    let form = match (is_utc, tzid) {
        (true, _) => DateTimeForm::Utc,
        (false, Some(tz)) => DateTimeForm::Zoned {
            tzid: tz.to_string(),
        },
        (false, None) => DateTimeForm::Floating,
    };

    Ok(DateTime {
        year: date.year,
        month: date.month,
        day: date.day,
        hour,
        minute,
        second,
        form,
    })
}

/// Parses a DURATION value (RFC 5545 §3.3.6).
///
/// Format: [+|-]P[nW] or [+|-]P[nD][T[nH][nM][nS]]
///
/// ## Errors
/// Returns an error if the string is not a valid duration format.
pub fn parse_duration(s: &str, line: usize, col: usize) -> ParseResult<Duration> {
    let invalid = || {
        ParseError::new(ParseErrorKind::InvalidDuration, line, col)
            .with_context(format!("`{s}` is not a duration"))
    };

    let mut dur = Duration::zero();
    let rest = if let Some(rest) = s.strip_prefix('-') {
        dur.negative = true;
        rest
    } else {
        s.strip_prefix('+').unwrap_or(s)
    };
    let rest = rest.strip_prefix('P').ok_or_else(invalid)?;
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut in_time = false;
    let mut digits = String::new();
    let mut seen_designator = false;

    for c in rest.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if c == 'T' {
            if in_time || !digits.is_empty() {
                return Err(invalid());
            }
            in_time = true;
            continue;
        }

        let num = digits.parse::<u32>().map_err(|_| invalid())?;
        digits.clear();
        seen_designator = true;
        match (c, in_time) {
            ('W', false) => dur.weeks = num,
            ('D', false) => dur.days = num,
            ('H', true) => dur.hours = num,
            ('M', true) => dur.minutes = num,
            ('S', true) => dur.seconds = num,
            _ => return Err(invalid()),
        }
    }

    if !digits.is_empty() || !seen_designator {
        return Err(invalid());
    }

    Ok(dur)
}

/// Parses an INTEGER value (RFC 5545 §3.3.8).
///
/// ## Errors
/// Returns an error if the string is not a valid integer.
pub fn parse_integer(s: &str, line: usize, col: usize) -> ParseResult<i32> {
    s.parse()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidInteger, line, col))
}

/// Unescapes a TEXT value (RFC 5545 §3.3.11).
///
/// Handles `\\`, `\;`, `\,`, `\n` and `\N`. Unknown escapes are kept as-is.
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => result.push('\n'),
            Some(',') => result.push(','),
            Some(';') => result.push(';'),
            Some('\\') | None => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_valid() {
        let date = parse_date("20240110", 1, 1).unwrap();
        assert_eq!(date, Date::new(2024, 1, 10));
    }

    #[test]
    fn parse_date_invalid() {
        assert!(parse_date("2024011", 1, 1).is_err());
        assert!(parse_date("20241310", 1, 1).is_err());
        assert!(parse_date("2024-1-1", 1, 1).is_err());
    }

    #[test]
    fn parse_datetime_forms() {
        let utc = parse_datetime("20240110T090000Z", Some("Europe/Prague"), 1, 1).unwrap();
        assert_eq!(utc.form, DateTimeForm::Utc);

        let zoned = parse_datetime("20240110T090000", Some("Europe/Prague"), 1, 1).unwrap();
        assert_eq!(zoned.tzid(), Some("Europe/Prague"));
        assert_eq!((zoned.hour, zoned.minute, zoned.second), (9, 0, 0));

        let floating = parse_datetime("20240110T090000", None, 1, 1).unwrap();
        assert_eq!(floating.form, DateTimeForm::Floating);
    }

    #[test]
    fn parse_datetime_rejects_date_only() {
        let err = parse_datetime("20240110", None, 5, 9).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidDateTime);
        assert_eq!(err.line, 5);
    }

    #[test]
    fn parse_datetime_rejects_bad_time() {
        let err = parse_datetime("20240110T250000", None, 1, 1).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidTime);
    }

    #[test]
    fn parse_duration_forms() {
        let dur = parse_duration("PT1H30M", 1, 1).unwrap();
        assert_eq!(dur.as_seconds(), 5400);

        let dur = parse_duration("P1DT12H", 1, 1).unwrap();
        assert_eq!(dur.as_seconds(), 129_600);

        let dur = parse_duration("P2W", 1, 1).unwrap();
        assert_eq!(dur.weeks, 2);

        let dur = parse_duration("-PT15M", 1, 1).unwrap();
        assert_eq!(dur.as_seconds(), -900);

        let dur = parse_duration("+P1D", 1, 1).unwrap();
        assert_eq!(dur.days, 1);
    }

    #[test]
    fn parse_duration_invalid() {
        for input in ["", "P", "PT", "1H", "PT1", "P1H", "PT1D", "PTT1H"] {
            assert!(parse_duration(input, 1, 1).is_err(), "{input} should fail");
        }
    }

    #[test]
    fn unescape_text_sequences() {
        assert_eq!(unescape_text(r"Lunch\, then nap"), "Lunch, then nap");
        assert_eq!(unescape_text(r"a\;b\nc\\d"), "a;b\nc\\d");
        assert_eq!(unescape_text(r"odd\x"), r"odd\x");
    }
}
