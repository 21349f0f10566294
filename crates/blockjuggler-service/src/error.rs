use blockjuggler_rfc::ical::ParseError;
use thiserror::Error;

/// Reason an occurrence cannot be reduced to a slot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("occurrence has neither DTEND nor DURATION")]
    MissingEnd,

    #[error("occurrence end is out of the representable date range")]
    EndOutOfRange,
}

/// An occurrence that could not be converted, with the text it came from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to process occurrence: {reason}")]
pub struct OccurrenceFailure {
    /// The source VEVENT serialized back to iCalendar text.
    pub raw: String,
    pub reason: String,
}

/// Conversion errors. Each variant aborts the whole conversion.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Parsing error: input is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Parsing error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Occurrence(Box<OccurrenceFailure>),

    #[error("Window of {days} days around now is out of range")]
    WindowOutOfRange { days: u32 },
}

impl From<OccurrenceFailure> for ConvertError {
    fn from(failure: OccurrenceFailure) -> Self {
        Self::Occurrence(Box::new(failure))
    }
}

pub type ConvertResult<T> = std::result::Result<T, ConvertError>;
