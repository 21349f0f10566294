//! Conversion of iCalendar occurrences into TaskJuggler leave blocks.
//!
//! - `convert`: Slot extraction, gap-filling merge and the conversion driver
//! - `tj`: TaskJuggler timestamp formatting
//! - `error`: Error types for extraction and conversion

pub mod convert;
pub mod error;
pub mod tj;

pub use convert::{Conversion, ConversionOptions, Converter};
pub use error::{ConvertError, ConvertResult, ExtractError, OccurrenceFailure};
