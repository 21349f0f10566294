//! iCalendar parsing error types.

use std::fmt;

/// Result type for iCalendar parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Error type for iCalendar parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Line number where the error occurred (1-based).
    pub line: usize,
    /// Column number where the error occurred (1-based).
    pub column: usize,
    /// Additional context about the error.
    pub context: Option<String>,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            line,
            column,
            context: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}, column {}", self.kind, self.line, self.column)?;
        if let Some(ref ctx) = self.context {
            write!(f, ": {ctx}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Kinds of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The document contains no content lines.
    EmptyInput,
    MissingPropertyName,
    InvalidPropertyName,
    /// Missing colon separator.
    MissingColon,
    InvalidParameter,
    /// Unclosed quoted string.
    UnclosedQuote,
    InvalidDate,
    InvalidTime,
    InvalidDateTime,
    InvalidDuration,
    InvalidInteger,
    /// Missing BEGIN line.
    MissingBegin,
    /// Missing END line.
    MissingEnd,
    /// Mismatched BEGIN/END.
    MismatchedComponent,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::EmptyInput => "empty calendar document",
            Self::MissingPropertyName => "missing property name",
            Self::InvalidPropertyName => "invalid property name",
            Self::MissingColon => "missing colon separator",
            Self::InvalidParameter => "invalid parameter format",
            Self::UnclosedQuote => "unclosed quoted string",
            Self::InvalidDate => "invalid date format",
            Self::InvalidTime => "invalid time format",
            Self::InvalidDateTime => "invalid date-time format",
            Self::InvalidDuration => "invalid duration format",
            Self::InvalidInteger => "invalid integer value",
            Self::MissingBegin => "missing BEGIN line",
            Self::MissingEnd => "missing END line",
            Self::MismatchedComponent => "mismatched BEGIN/END",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position() {
        let err = ParseError::new(ParseErrorKind::InvalidDate, 7, 9);
        assert_eq!(err.to_string(), "invalid date format at line 7, column 9");
    }

    #[test]
    fn display_includes_context() {
        let err = ParseError::new(ParseErrorKind::MissingEnd, 12, 1)
            .with_context("missing END:VEVENT");
        assert_eq!(
            err.to_string(),
            "missing END line at line 12, column 1: missing END:VEVENT"
        );
    }
}
