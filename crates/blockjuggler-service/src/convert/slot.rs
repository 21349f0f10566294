//! Reduction of calendar occurrences to labelled time slots.

use std::collections::HashSet;

use blockjuggler_rfc::ical::expand::Occurrence;
use chrono::DateTime;
use chrono_tz::Tz;

use crate::error::ExtractError;

/// Label used when an occurrence has neither SUMMARY nor LOCATION.
pub const NO_TITLE: &str = "(No title)";

/// A booked `[start, end)` span with a human label.
///
/// Ordering is by start, then end, then label. End may precede start when the
/// calendar says so.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NormalizedSlot {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub label: String,
}

/// ## Summary
/// Returns whether one of `self_ids` declined the occurrence.
///
/// An attendee matches when its `PARTSTAT` is exactly `DECLINED` and its `CN`
/// is in `self_ids` (case-sensitive).
#[must_use]
pub fn is_declined(occurrence: &Occurrence<'_>, self_ids: &HashSet<String>) -> bool {
    occurrence.component.attendees().iter().any(|attendee| {
        attendee.has_declined()
            && attendee
                .common_name
                .is_some_and(|name| self_ids.contains(name))
    })
}

/// ## Summary
/// Builds the label shown above a slot.
///
/// SUMMARY wins over LOCATION. With both present and `include_location`, the
/// label is `"{summary} - {location}"`.
#[must_use]
pub fn slot_label(occurrence: &Occurrence<'_>, include_location: bool) -> String {
    let summary = label_text(occurrence, "SUMMARY");
    let location = label_text(occurrence, "LOCATION");

    match (summary, location) {
        (Some(summary), Some(location)) if include_location => format!("{summary} - {location}"),
        (Some(summary), _) => summary,
        (None, Some(location)) => location,
        (None, None) => NO_TITLE.to_string(),
    }
}

/// Reads a text property in its escaped form, with only `\,` unescaped.
///
/// Other escapes stay as written so the value always fits on one line.
fn label_text(occurrence: &Occurrence<'_>, name: &str) -> Option<String> {
    let prop = occurrence.component.get_property(name)?;
    let text = prop.raw_value.replace("\\,", ",");
    (!text.is_empty()).then_some(text)
}

/// ## Summary
/// Reduces an occurrence to a slot.
///
/// The end is the explicit end, else start plus DURATION. All-day values
/// become midnight UTC.
///
/// ## Errors
///
/// Returns `ExtractError::MissingEnd` if no end can be derived, or
/// `ExtractError::EndOutOfRange` if start plus DURATION overflows.
pub fn extract_slot(
    occurrence: &Occurrence<'_>,
    include_location: bool,
) -> Result<NormalizedSlot, ExtractError> {
    let start = occurrence.start.to_instant();
    let end = match (occurrence.end, occurrence.duration) {
        (Some(end), _) => end.to_instant(),
        (None, Some(duration)) => start
            .checked_add_signed(duration)
            .ok_or(ExtractError::EndOutOfRange)?,
        (None, None) => return Err(ExtractError::MissingEnd),
    };

    Ok(NormalizedSlot {
        start,
        end,
        label: slot_label(occurrence, include_location),
    })
}
