//! iCalendar document parser (RFC 5545).
//!
//! Parses complete iCalendar documents into typed structures.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{parse_content_line, split_lines};
use super::values::{parse_date, parse_datetime, parse_duration, parse_integer, unescape_text};
use crate::ical::core::{Component, ComponentKind, ContentLine, ICalendar, Property, Value};

/// Parses an iCalendar document from a string.
///
/// ## Errors
///
/// Returns an error if the input is not valid iCalendar.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParseResult<ICalendar> {
    tracing::debug!("Parsing iCalendar document");

    let lines = split_lines(input);
    if lines.is_empty() {
        tracing::warn!("Empty iCalendar input");
        return Err(ParseError::new(ParseErrorKind::EmptyInput, 1, 1));
    }

    tracing::trace!(count = lines.len(), "Split lines");

    let mut content_lines = lines
        .into_iter()
        .map(|(line_num, line)| parse_content_line(&line, line_num).map(|cl| (line_num, cl)))
        .collect::<ParseResult<Vec<_>>>()?
        .into_iter();

    let (line_num, begin) = content_lines
        .next()
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingBegin, 1, 1))?;
    if begin.name != "BEGIN" || !begin.raw_value.eq_ignore_ascii_case("VCALENDAR") {
        return Err(ParseError::new(ParseErrorKind::MissingBegin, line_num, 1)
            .with_context("expected BEGIN:VCALENDAR"));
    }

    let root = parse_component(&mut content_lines, line_num, &begin.raw_value)?;

    if let Some((line_num, trailing)) = content_lines.next() {
        tracing::warn!(line = line_num, name = %trailing.name, "Ignoring content after END:VCALENDAR");
    }

    tracing::debug!(
        events = root.children_of_kind(ComponentKind::Event).len(),
        "iCalendar document parsed successfully"
    );

    Ok(ICalendar { root })
}

/// Parses the body of a component whose BEGIN line was already consumed.
fn parse_component(
    iter: &mut impl Iterator<Item = (usize, ContentLine)>,
    begin_line_num: usize,
    component_name: &str,
) -> ParseResult<Component> {
    let mut component = Component::named(component_name);
    let mut last_line_num = begin_line_num;

    loop {
        let Some((line_num, content_line)) = iter.next() else {
            return Err(
                ParseError::new(ParseErrorKind::MissingEnd, last_line_num, 1)
                    .with_context(format!("missing END:{}", component.name)),
            );
        };
        last_line_num = line_num;

        match content_line.name.as_str() {
            "BEGIN" => {
                let nested = parse_component(iter, line_num, &content_line.raw_value)?;
                component.add_child(nested);
            }
            "END" => {
                if !content_line.raw_value.eq_ignore_ascii_case(&component.name) {
                    return Err(
                        ParseError::new(ParseErrorKind::MismatchedComponent, line_num, 1)
                            .with_context(format!(
                                "expected END:{}, got END:{}",
                                component.name, content_line.raw_value
                            )),
                    );
                }
                return Ok(component);
            }
            _ => component.add_property(parse_property(content_line, line_num)?),
        }
    }
}

/// Properties whose typed value drives occurrence expansion. A malformed value
/// of any other property is kept as `Value::Unknown`.
const STRICT_PROPERTIES: &[&str] = &[
    "DTSTART",
    "DTEND",
    "DURATION",
    "RRULE",
    "RDATE",
    "EXDATE",
    "RECURRENCE-ID",
];

/// Parses a property from a content line, resolving the value type.
fn parse_property(cl: ContentLine, line_num: usize) -> ParseResult<Property> {
    let value_type = determine_value_type(&cl);
    // Values start right after the colon; report positions relative to the line.
    let col = cl.name.len() + 2;
    let value = match parse_value(&cl.raw_value, value_type, cl.tzid(), line_num, col) {
        Ok(value) => value,
        Err(error) if !STRICT_PROPERTIES.contains(&cl.name.as_str()) => {
            tracing::warn!(
                line = line_num,
                name = %cl.name,
                %error,
                "Keeping malformed property value as unknown"
            );
            Value::Unknown(cl.raw_value.clone())
        }
        Err(error) => return Err(error),
    };

    Ok(Property {
        name: cl.name,
        params: cl.params,
        value,
        raw_value: cl.raw_value,
    })
}

/// Determines the value type for a property.
fn determine_value_type(cl: &ContentLine) -> ValueType {
    if let Some(value_type) = cl.value_type() {
        return ValueType::from_param(value_type);
    }

    match cl.name.as_str() {
        "DTSTART" | "DTEND" | "DUE" | "RECURRENCE-ID" | "EXDATE" | "RDATE" => {
            if cl.raw_value.contains('/') {
                // PERIOD values are not interpreted.
                ValueType::Unknown
            } else if cl.raw_value.split(',').all(looks_like_date) {
                // Lenient: bare dates without VALUE=DATE.
                ValueType::Date
            } else {
                ValueType::DateTime
            }
        }

        "DTSTAMP" | "CREATED" | "LAST-MODIFIED" | "COMPLETED" => ValueType::DateTime,

        "DURATION" => ValueType::Duration,
        "TRIGGER" => {
            if cl.raw_value.starts_with(['P', '-', '+']) {
                ValueType::Duration
            } else {
                ValueType::DateTime
            }
        }

        "PERCENT-COMPLETE" | "PRIORITY" | "REPEAT" | "SEQUENCE" => ValueType::Integer,

        "RRULE" | "EXRULE" => ValueType::Recur,

        "URL" | "TZURL" | "SOURCE" => ValueType::Uri,

        "ATTENDEE" | "ORGANIZER" => ValueType::CalAddress,

        "FREEBUSY" | "TZOFFSETFROM" | "TZOFFSETTO" | "RSVP" => ValueType::Unknown,

        _ => ValueType::Text,
    }
}

fn looks_like_date(s: &str) -> bool {
    let s = s.trim();
    s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueType {
    CalAddress,
    Date,
    DateTime,
    Duration,
    Integer,
    Recur,
    Text,
    Uri,
    Unknown,
}

impl ValueType {
    fn from_param(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "CAL-ADDRESS" => Self::CalAddress,
            "DATE" => Self::Date,
            "DATE-TIME" => Self::DateTime,
            "DURATION" => Self::Duration,
            "INTEGER" => Self::Integer,
            "RECUR" => Self::Recur,
            "TEXT" => Self::Text,
            "URI" => Self::Uri,
            _ => Self::Unknown,
        }
    }
}

/// Parses a raw value string into a typed Value.
fn parse_value(
    raw: &str,
    value_type: ValueType,
    tzid: Option<&str>,
    line_num: usize,
    col: usize,
) -> ParseResult<Value> {
    match value_type {
        ValueType::Text => Ok(Value::Text(unescape_text(raw))),
        ValueType::DateTime => {
            let mut dts = raw
                .split(',')
                .map(|s| parse_datetime(s.trim(), tzid, line_num, col))
                .collect::<ParseResult<Vec<_>>>()?;
            if dts.len() == 1 {
                Ok(Value::DateTime(dts.remove(0)))
            } else {
                Ok(Value::DateTimeList(dts))
            }
        }
        ValueType::Date => {
            let mut dates = raw
                .split(',')
                .map(|s| parse_date(s.trim(), line_num, col))
                .collect::<ParseResult<Vec<_>>>()?;
            if dates.len() == 1 {
                Ok(Value::Date(dates.remove(0)))
            } else {
                Ok(Value::DateList(dates))
            }
        }
        ValueType::Duration => Ok(Value::Duration(parse_duration(raw, line_num, col)?)),
        ValueType::Integer => Ok(Value::Integer(parse_integer(raw, line_num, col)?)),
        ValueType::Recur => Ok(Value::Recur(raw.to_string())),
        ValueType::CalAddress => Ok(Value::CalAddress(raw.to_string())),
        ValueType::Uri => Ok(Value::Uri(raw.to_string())),
        ValueType::Unknown => Ok(Value::Unknown(raw.to_string())),
    }
}
