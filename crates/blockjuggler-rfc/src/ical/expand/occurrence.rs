//! Expansion of VEVENTs into concrete occurrences inside a window.
//!
//! Series are expanded from DTSTART with every RRULE and RDATE, minus EXDATE
//! instants and instants replaced by a RECURRENCE-ID override of the same UID.
//! Overrides are then emitted as occurrences of their own.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use rrule::{RRule, Unvalidated};

use super::time::{EventTime, property_time, property_times};
use super::timezone::{ConversionError, TimeZoneResolver, localize};
use super::window::Window;
use crate::ical::core::{Component, Duration, ICalendar, Value};
use crate::ical::parse::{parse_date, parse_datetime};

/// Upper bound on instances generated per RRULE.
pub const MAX_INSTANCES: u16 = 10_000;

/// Reason a single component could not be expanded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpansionError {
    #[error("event has no DTSTART")]
    MissingStart,

    #[error(transparent)]
    Timezone(#[from] ConversionError),

    #[error("invalid recurrence rule `{rule}`: {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("event end is out of the representable date range")]
    OutOfRange,
}

/// A component that failed to expand, kept so callers can report it.
#[derive(Debug, Clone)]
pub struct ComponentFailure<'a> {
    pub component: &'a Component,
    pub error: ExpansionError,
}

/// One concrete instance of an event.
#[derive(Debug, Clone)]
pub struct Occurrence<'a> {
    /// The VEVENT this instance was produced from (the master for generated
    /// instances, the override itself for overrides).
    pub component: &'a Component,
    pub start: EventTime,
    /// Explicit end, already shifted for generated instances.
    pub end: Option<EventTime>,
    /// DURATION of the source component, when it has one.
    pub duration: Option<TimeDelta>,
    /// Instance start for generated instances, RECURRENCE-ID for overrides,
    /// `None` for single events.
    pub recurrence_id: Option<DateTime<Tz>>,
}

impl Occurrence<'_> {
    /// Returns the instant this occurrence ends at for window checks.
    ///
    /// Falls back to DURATION, then to a zero-length span. Returns `None`
    /// when start plus DURATION does not fit in a `DateTime`.
    #[must_use]
    pub fn span_end(&self) -> Option<DateTime<Tz>> {
        match (self.end, self.duration) {
            (Some(end), _) => Some(end.to_instant()),
            (None, Some(duration)) => self.start.to_instant().checked_add_signed(duration),
            (None, None) => Some(self.start.to_instant()),
        }
    }
}

/// Result of expanding one instance or one failing component.
pub type Expanded<'a> = Result<Occurrence<'a>, ComponentFailure<'a>>;

/// Expands the VEVENTs of a calendar into occurrences.
#[derive(Debug)]
pub struct OccurrenceExpander<'a> {
    calendar: &'a ICalendar,
}

/// DTSTART, DTEND and DURATION of a component.
struct Bounds {
    start: EventTime,
    end: Option<EventTime>,
    duration: Option<TimeDelta>,
}

impl Bounds {
    /// Offset from start to end applied to every generated instance.
    fn span(&self) -> TimeDelta {
        match (self.end, self.duration) {
            (Some(end), _) => end
                .to_instant()
                .signed_duration_since(self.start.to_instant()),
            (None, Some(duration)) => duration,
            (None, None) => TimeDelta::zero(),
        }
    }
}

impl<'a> OccurrenceExpander<'a> {
    #[must_use]
    pub const fn new(calendar: &'a ICalendar) -> Self {
        Self { calendar }
    }

    /// ## Summary
    /// Returns every occurrence overlapping `window`, in calendar order.
    ///
    /// A component that cannot be expanded yields one `Err` entry and does not
    /// affect the others.
    #[tracing::instrument(skip(self), fields(start = %window.start, end = %window.end))]
    pub fn between(&self, window: &Window) -> Vec<Expanded<'a>> {
        let mut resolver = TimeZoneResolver::new();
        let events = self.calendar.events();
        let mut results = Vec::new();

        let mut overridden: HashMap<&str, HashSet<DateTime<Utc>>> = HashMap::new();
        let mut recurrence_ids: HashMap<usize, DateTime<Tz>> = HashMap::new();

        for (index, event) in events.iter().copied().enumerate() {
            if !event.is_override() {
                continue;
            }
            match recurrence_id(event, &mut resolver) {
                Ok(Some(instant)) => {
                    if let Some(uid) = event.uid() {
                        overridden
                            .entry(uid)
                            .or_default()
                            .insert(instant.with_timezone(&Utc));
                    }
                    recurrence_ids.insert(index, instant);
                }
                Ok(None) => {}
                Err(error) => results.push(Err(ComponentFailure {
                    component: event,
                    error,
                })),
            }
        }

        for (index, event) in events.into_iter().enumerate() {
            if event.is_override() {
                let Some(rid) = recurrence_ids.get(&index).copied() else {
                    continue;
                };
                match single(event, window, &mut resolver) {
                    Ok(Some(mut occurrence)) => {
                        occurrence.recurrence_id = Some(rid);
                        results.push(Ok(occurrence));
                    }
                    Ok(None) => {}
                    Err(error) => results.push(Err(ComponentFailure {
                        component: event,
                        error,
                    })),
                }
                continue;
            }

            let is_series =
                event.get_property("RRULE").is_some() || event.get_property("RDATE").is_some();
            if !is_series {
                match single(event, window, &mut resolver) {
                    Ok(occurrence) => results.extend(occurrence.map(Ok)),
                    Err(error) => results.push(Err(ComponentFailure {
                        component: event,
                        error,
                    })),
                }
                continue;
            }

            let skip = event
                .uid()
                .and_then(|uid| overridden.get(uid))
                .cloned()
                .unwrap_or_default();
            match series(event, window, &skip, &mut resolver) {
                Ok(occurrences) => results.extend(occurrences.into_iter().map(Ok)),
                Err(error) => {
                    tracing::debug!(uid = event.uid(), %error, "Failed to expand event");
                    results.push(Err(ComponentFailure {
                        component: event,
                        error,
                    }));
                }
            }
        }

        tracing::debug!(count = results.len(), "Expanded calendar");
        results
    }
}

fn series<'a>(
    event: &'a Component,
    window: &Window,
    skip: &HashSet<DateTime<Utc>>,
    resolver: &mut TimeZoneResolver,
) -> Result<Vec<Occurrence<'a>>, ExpansionError> {
    let bounds = bounds(event, resolver)?;
    let span = bounds.span();
    let dtstart = bounds.start.to_instant();
    let tz = dtstart.timezone();

    let mut instants = vec![dtstart];

    for prop in event.get_properties("RRULE") {
        let text = match &prop.value {
            Value::Recur(rule) => rule.as_str(),
            _ => prop.raw_value.as_str(),
        };
        instants.extend(rule_instants(text, dtstart, span, window)?);
    }

    for prop in event.get_properties("RDATE") {
        instants.extend(
            property_times(prop, resolver)?
                .into_iter()
                .map(|t| t.to_instant().with_timezone(&tz)),
        );
    }

    let mut excluded = skip.clone();
    for prop in event.get_properties("EXDATE") {
        excluded.extend(
            property_times(prop, resolver)?
                .into_iter()
                .map(|t| t.to_instant().with_timezone(&Utc)),
        );
    }

    instants.sort();
    instants.dedup();

    let mut occurrences = Vec::new();
    for instant in instants {
        if excluded.contains(&instant.with_timezone(&Utc)) {
            continue;
        }
        let instant_end = instant
            .checked_add_signed(span)
            .ok_or(ExpansionError::OutOfRange)?;
        if !window.overlaps(&instant, &instant_end) {
            continue;
        }

        let start = if bounds.start.is_date() {
            EventTime::Date(instant.date_naive())
        } else {
            EventTime::DateTime(instant)
        };
        let end = match bounds.end {
            Some(_) => Some(start.shifted(span).ok_or(ExpansionError::OutOfRange)?),
            None => None,
        };
        occurrences.push(Occurrence {
            component: event,
            start,
            end,
            duration: bounds.duration,
            recurrence_id: Some(instant),
        });
    }

    Ok(occurrences)
}

/// Generates the instants of one RRULE that could overlap `window`.
fn rule_instants(
    text: &str,
    dtstart: DateTime<Tz>,
    span: TimeDelta,
    window: &Window,
) -> Result<Vec<DateTime<Tz>>, ExpansionError> {
    let tz = dtstart.timezone();
    let invalid = |reason: String| ExpansionError::InvalidRule {
        rule: text.to_string(),
        reason,
    };

    let normalized = with_utc_until(text, tz)?;
    let rule = normalized
        .parse::<RRule<Unvalidated>>()
        .map_err(|e| invalid(e.to_string()))?;
    let set = rule
        .build(dtstart.with_timezone(&rrule::Tz::Tz(tz)))
        .map_err(|e| invalid(e.to_string()))?;

    let earliest = window
        .start
        .checked_sub_signed(span.max(TimeDelta::zero()))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let result = set
        .after(earliest.with_timezone(&rrule::Tz::UTC))
        .before(window.end.with_timezone(&rrule::Tz::UTC))
        .all(MAX_INSTANCES);

    if result.limited {
        tracing::warn!(
            rule = text,
            limit = MAX_INSTANCES,
            "Recurrence expansion hit the instance limit"
        );
    }

    Ok(result
        .dates
        .into_iter()
        .map(|d| d.with_timezone(&tz))
        .collect())
}

/// Builds the occurrence of a non-recurring component if it overlaps `window`.
fn single<'a>(
    event: &'a Component,
    window: &Window,
    resolver: &mut TimeZoneResolver,
) -> Result<Option<Occurrence<'a>>, ExpansionError> {
    let bounds = bounds(event, resolver)?;
    let occurrence = Occurrence {
        component: event,
        start: bounds.start,
        end: bounds.end,
        duration: bounds.duration,
        recurrence_id: None,
    };

    let start = occurrence.start.to_instant();
    let end = occurrence.span_end().ok_or(ExpansionError::OutOfRange)?;
    Ok(window.overlaps(&start, &end).then_some(occurrence))
}

fn bounds(event: &Component, resolver: &mut TimeZoneResolver) -> Result<Bounds, ExpansionError> {
    let start = match event.get_property("DTSTART") {
        Some(prop) => property_time(prop, resolver)?,
        None => None,
    }
    .ok_or(ExpansionError::MissingStart)?;

    let end = match event.get_property("DTEND") {
        Some(prop) => property_time(prop, resolver)?,
        None => None,
    };
    let duration = event
        .get_property("DURATION")
        .and_then(|p| p.as_duration())
        .map(Duration::as_time_delta);

    Ok(Bounds {
        start,
        end,
        duration,
    })
}

fn recurrence_id(
    event: &Component,
    resolver: &mut TimeZoneResolver,
) -> Result<Option<DateTime<Tz>>, ExpansionError> {
    let Some(prop) = event.get_property("RECURRENCE-ID") else {
        return Ok(None);
    };
    Ok(property_time(prop, resolver)?.map(EventTime::to_instant))
}

/// Rewrites an UNTIL part into UTC form.
///
/// DATE values mean the end of that day in the series timezone. Floating
/// DATE-TIME values are read in the series timezone.
fn with_utc_until(rule: &str, tz: Tz) -> Result<String, ExpansionError> {
    let invalid = |reason: String| ExpansionError::InvalidRule {
        rule: rule.to_string(),
        reason,
    };

    let parts = rule
        .split(';')
        .filter(|part| !part.is_empty())
        .map(|part| -> Result<String, ExpansionError> {
            let Some((key, value)) = part.split_once('=') else {
                return Ok(part.to_string());
            };
            if !key.trim().eq_ignore_ascii_case("UNTIL") || value.ends_with(['Z', 'z']) {
                return Ok(part.to_string());
            }

            let local = if value.contains(['T', 't']) {
                parse_datetime(&value.to_ascii_uppercase(), None, 0, 0)
                    .ok()
                    .and_then(|dt| dt.to_naive())
            } else {
                parse_date(value, 0, 0)
                    .ok()
                    .and_then(|d| d.to_naive())
                    .and_then(|d| d.and_hms_opt(23, 59, 59))
            }
            .ok_or_else(|| invalid(format!("`{value}` is not a valid UNTIL")))?;

            let until = if tz == Tz::UTC {
                Utc.from_utc_datetime(&local)
            } else {
                localize(local, tz)?.with_timezone(&Utc)
            };
            Ok(format!("UNTIL={}", until.format("%Y%m%dT%H%M%SZ")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(parts.join(";"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ical::parse;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn calendar(events: &str) -> ICalendar {
        parse(&format!("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n{events}END:VCALENDAR\r\n")).unwrap()
    }

    fn starts(results: &[Expanded<'_>]) -> Vec<DateTime<Utc>> {
        results
            .iter()
            .map(|r| r.as_ref().unwrap().start.to_instant().with_timezone(&Utc))
            .collect()
    }

    fn january() -> Window {
        Window::new(utc(2024, 1, 1, 0, 0), utc(2024, 2, 1, 0, 0))
    }

    #[test_log::test]
    fn single_event_inside_and_outside() {
        let ical = calendar(
            "BEGIN:VEVENT\r\nUID:in\r\nDTSTART:20240110T090000Z\r\nDTEND:20240110T100000Z\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:out\r\nDTSTART:20240310T090000Z\r\nDTEND:20240310T100000Z\r\nEND:VEVENT\r\n",
        );

        let results = OccurrenceExpander::new(&ical).between(&january());
        assert_eq!(starts(&results), vec![utc(2024, 1, 10, 9, 0)]);
    }

    #[test_log::test]
    fn event_straddling_window_start_is_kept() {
        let ical = calendar(
            "BEGIN:VEVENT\r\nUID:a\r\nDTSTART:20231231T220000Z\r\nDTEND:20240101T020000Z\r\nEND:VEVENT\r\n",
        );

        let results = OccurrenceExpander::new(&ical).between(&january());
        assert_eq!(results.len(), 1);
    }

    #[test_log::test]
    fn daily_rule_with_count() {
        let ical = calendar(
            "BEGIN:VEVENT\r\nUID:d\r\nDTSTART:20240110T090000Z\r\nDTEND:20240110T100000Z\r\n\
RRULE:FREQ=DAILY;COUNT=3\r\nEND:VEVENT\r\n",
        );

        let results = OccurrenceExpander::new(&ical).between(&january());
        assert_eq!(
            starts(&results),
            vec![
                utc(2024, 1, 10, 9, 0),
                utc(2024, 1, 11, 9, 0),
                utc(2024, 1, 12, 9, 0)
            ]
        );
        let Ok(second) = &results[1] else {
            panic!("expected an occurrence");
        };
        assert_eq!(
            second.end.unwrap().to_instant().with_timezone(&Utc),
            utc(2024, 1, 11, 10, 0)
        );
    }

    #[test_log::test]
    fn exdate_and_override_remove_instances() {
        let ical = calendar(
            "BEGIN:VEVENT\r\nUID:s\r\nDTSTART:20240110T090000Z\r\nDTEND:20240110T100000Z\r\n\
RRULE:FREQ=DAILY;COUNT=4\r\nEXDATE:20240111T090000Z\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:s\r\nRECURRENCE-ID:20240112T090000Z\r\nDTSTART:20240112T150000Z\r\n\
DTEND:20240112T160000Z\r\nEND:VEVENT\r\n",
        );

        let results = OccurrenceExpander::new(&ical).between(&january());
        let mut got = starts(&results);
        got.sort();
        assert_eq!(
            got,
            vec![
                utc(2024, 1, 10, 9, 0),
                utc(2024, 1, 12, 15, 0),
                utc(2024, 1, 13, 9, 0)
            ]
        );

        let overrides: Vec<_> = results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .filter(|o| o.component.is_override())
            .collect();
        assert_eq!(overrides.len(), 1);
        assert_eq!(
            overrides[0].recurrence_id.unwrap().with_timezone(&Utc),
            utc(2024, 1, 12, 9, 0)
        );
    }

    #[test_log::test]
    fn rdate_adds_instances() {
        let ical = calendar(
            "BEGIN:VEVENT\r\nUID:r\r\nDTSTART:20240110T090000Z\r\nDTEND:20240110T100000Z\r\n\
RDATE:20240120T090000Z,20240125T090000Z\r\nEND:VEVENT\r\n",
        );

        let results = OccurrenceExpander::new(&ical).between(&january());
        assert_eq!(
            starts(&results),
            vec![
                utc(2024, 1, 10, 9, 0),
                utc(2024, 1, 20, 9, 0),
                utc(2024, 1, 25, 9, 0)
            ]
        );
    }

    #[test_log::test]
    fn zoned_weekly_rule_keeps_wall_clock_across_dst() {
        let ical = calendar(
            "BEGIN:VEVENT\r\nUID:w\r\nDTSTART;TZID=Europe/Prague:20240321T090000\r\n\
DTEND;TZID=Europe/Prague:20240321T100000\r\nRRULE:FREQ=WEEKLY;UNTIL=20240404\r\nEND:VEVENT\r\n",
        );
        let window = Window::new(utc(2024, 3, 1, 0, 0), utc(2024, 5, 1, 0, 0));

        let results = OccurrenceExpander::new(&ical).between(&window);
        assert_eq!(
            starts(&results),
            vec![
                utc(2024, 3, 21, 8, 0),
                utc(2024, 3, 28, 8, 0),
                utc(2024, 4, 4, 7, 0)
            ]
        );
    }

    #[test_log::test]
    fn all_day_series_stays_all_day() {
        let ical = calendar(
            "BEGIN:VEVENT\r\nUID:ad\r\nDTSTART;VALUE=DATE:20240108\r\nDTEND;VALUE=DATE:20240109\r\n\
RRULE:FREQ=WEEKLY;UNTIL=20240122\r\nEND:VEVENT\r\n",
        );

        let results = OccurrenceExpander::new(&ical).between(&january());
        assert_eq!(results.len(), 3);
        for result in &results {
            let occurrence = result.as_ref().unwrap();
            assert!(occurrence.start.is_date());
            assert!(occurrence.end.unwrap().is_date());
        }
    }

    #[test_log::test]
    fn missing_dtstart_is_a_component_failure() {
        let ical = calendar(
            "BEGIN:VEVENT\r\nUID:bad\r\nSUMMARY:No start\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:good\r\nDTSTART:20240110T090000Z\r\nEND:VEVENT\r\n",
        );

        let results = OccurrenceExpander::new(&ical).between(&january());
        assert_eq!(results.len(), 2);
        let failure = results[0].as_ref().unwrap_err();
        assert_eq!(failure.error, ExpansionError::MissingStart);
        assert_eq!(failure.component.uid(), Some("bad"));
        assert!(results[1].is_ok());
    }

    #[test_log::test]
    fn invalid_rule_is_a_component_failure() {
        let ical = calendar(
            "BEGIN:VEVENT\r\nUID:x\r\nDTSTART:20240110T090000Z\r\nRRULE:FREQ=SOMETIMES\r\nEND:VEVENT\r\n",
        );

        let results = OccurrenceExpander::new(&ical).between(&january());
        assert!(matches!(
            results[0],
            Err(ComponentFailure {
                error: ExpansionError::InvalidRule { .. },
                ..
            })
        ));
    }

    #[test_log::test]
    fn huge_duration_is_a_component_failure() {
        let ical = calendar(
            "BEGIN:VEVENT\r\nUID:huge\r\nDTSTART:20240110T090000Z\r\nDURATION:P4000000000W\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:huge-series\r\nDTSTART:20240110T090000Z\r\nDURATION:P4000000000W\r\n\
RRULE:FREQ=DAILY;COUNT=2\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:fine\r\nDTSTART:20240110T090000Z\r\nDURATION:PT1H\r\nEND:VEVENT\r\n",
        );

        let results = OccurrenceExpander::new(&ical).between(&january());
        assert_eq!(results.len(), 3);
        for failed in &results[..2] {
            assert_eq!(
                failed.as_ref().unwrap_err().error,
                ExpansionError::OutOfRange
            );
        }
        assert_eq!(results[2].as_ref().unwrap().component.uid(), Some("fine"));
    }

    #[test]
    fn until_is_rewritten_to_utc() {
        assert_eq!(
            with_utc_until("FREQ=DAILY;UNTIL=20240110", Tz::UTC).unwrap(),
            "FREQ=DAILY;UNTIL=20240110T235959Z"
        );
        assert_eq!(
            with_utc_until("FREQ=DAILY;UNTIL=20240110T090000", Tz::Europe__Prague).unwrap(),
            "FREQ=DAILY;UNTIL=20240110T080000Z"
        );
        assert_eq!(
            with_utc_until("FREQ=DAILY;UNTIL=20240110T090000Z", Tz::Europe__Prague).unwrap(),
            "FREQ=DAILY;UNTIL=20240110T090000Z"
        );
    }
}
