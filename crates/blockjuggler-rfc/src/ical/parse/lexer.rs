//! Content line lexer for iCalendar (RFC 5545 §3.1).
//!
//! Handles line unfolding and tokenization of content lines.

use std::iter::Peekable;
use std::str::CharIndices;

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::ical::core::{ContentLine, Parameter};

/// Splits input into content lines, merging folded continuations.
///
/// Handles both CRLF and bare LF line endings. Lines starting with SP/HTAB are
/// continuations of the previous line; unfolding removes the line break and
/// that single whitespace character. Each line carries the 1-based number of
/// the physical line it started on.
#[must_use]
pub fn split_lines(input: &str) -> Vec<(usize, String)> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut lines: Vec<(usize, String)> = Vec::new();

    for (i, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let continuation = if line.starts_with([' ', '\t']) {
            Some(&line[1..])
        } else if line.contains(':') {
            None
        } else {
            // Lenient: lines without a colon are treated as folded text.
            Some(line)
        };

        match (continuation, lines.last_mut()) {
            (Some(rest), Some((_, prev))) => prev.push_str(rest),
            (Some(rest), None) => lines.push((i + 1, rest.to_string())),
            (None, _) => lines.push((i + 1, line.to_string())),
        }
    }

    lines
}

/// Parses a single content line.
///
/// Format: `name *(";" param) ":" value`
///
/// ## Errors
/// Returns an error if the line is malformed or contains invalid characters.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let mut chars = line.char_indices().peekable();
    let mut name_end = None;

    while let Some(&(i, c)) = chars.peek() {
        if c == ';' || c == ':' {
            name_end = Some(i);
            break;
        }
        if !c.is_ascii_alphanumeric() && c != '-' {
            return Err(ParseError::new(
                ParseErrorKind::InvalidPropertyName,
                line_num,
                i + 1,
            ));
        }
        chars.next();
    }

    let name_end = match name_end {
        Some(0) => {
            return Err(ParseError::new(
                ParseErrorKind::MissingPropertyName,
                line_num,
                1,
            ));
        }
        Some(end) => end,
        None => {
            return Err(ParseError::new(
                ParseErrorKind::MissingColon,
                line_num,
                line.len(),
            ));
        }
    };

    let name = line[..name_end].to_ascii_uppercase();

    let mut params = Vec::new();
    let mut at_colon = chars.next().is_some_and(|(_, c)| c == ':');
    while !at_colon {
        let (param, next_is_colon) = parse_parameter(&mut chars, line, line_num)?;
        params.push(param);
        at_colon = next_is_colon;
    }

    // Value is everything after the colon.
    let value_start = chars.peek().map_or(line.len(), |&(i, _)| i);

    Ok(ContentLine {
        name,
        params,
        raw_value: line[value_start..].to_string(),
    })
}

/// Parses a single parameter from the character stream.
///
/// Returns the parameter and whether the separator consumed after it was ':'.
fn parse_parameter(
    chars: &mut Peekable<CharIndices<'_>>,
    line: &str,
    line_num: usize,
) -> ParseResult<(Parameter, bool)> {
    let start = chars.peek().map_or(line.len(), |&(i, _)| i);

    let mut name_end = start;
    while let Some(&(i, c)) = chars.peek() {
        if c == '=' {
            name_end = i;
            chars.next();
            break;
        }
        if !c.is_ascii_alphanumeric() && c != '-' {
            return Err(ParseError::new(
                ParseErrorKind::InvalidParameter,
                line_num,
                i + 1,
            ));
        }
        chars.next();
    }

    if name_end == start {
        return Err(ParseError::new(
            ParseErrorKind::InvalidParameter,
            line_num,
            start + 1,
        ));
    }

    let param_name = &line[start..name_end];

    let mut values = Vec::new();
    loop {
        values.push(parse_param_value(chars, line, line_num)?);

        match chars.next() {
            Some((_, ',')) => {}
            Some((_, ';')) => return Ok((Parameter::with_values(param_name, values), false)),
            Some((_, ':')) => return Ok((Parameter::with_values(param_name, values), true)),
            Some((i, c)) => {
                return Err(
                    ParseError::new(ParseErrorKind::InvalidParameter, line_num, i + 1)
                        .with_context(format!("unexpected character '{c}'")),
                );
            }
            None => {
                return Err(ParseError::new(
                    ParseErrorKind::MissingColon,
                    line_num,
                    line.len(),
                ));
            }
        }
    }
}

/// Parses a parameter value, handling quoting and RFC 6868 caret escapes.
fn parse_param_value(
    chars: &mut Peekable<CharIndices<'_>>,
    line: &str,
    line_num: usize,
) -> ParseResult<String> {
    let Some(&(start, first)) = chars.peek() else {
        return Err(ParseError::new(
            ParseErrorKind::InvalidParameter,
            line_num,
            line.len(),
        ));
    };

    if first != '"' {
        let mut end = start;
        while let Some(&(i, c)) = chars.peek() {
            if c == ',' || c == ';' || c == ':' {
                break;
            }
            end = i + c.len_utf8();
            chars.next();
        }
        return Ok(line[start..end].to_string());
    }

    chars.next();
    let mut value = String::new();
    while let Some((_, c)) = chars.next() {
        match c {
            '"' => return Ok(value),
            '^' => match chars.peek().map(|&(_, next)| next) {
                Some('^') => {
                    value.push('^');
                    chars.next();
                }
                Some('n') => {
                    value.push('\n');
                    chars.next();
                }
                Some('\'') => {
                    value.push('"');
                    chars.next();
                }
                _ => value.push('^'),
            },
            _ => value.push(c),
        }
    }

    Err(ParseError::new(
        ParseErrorKind::UnclosedQuote,
        line_num,
        start + 1,
    ))
}
