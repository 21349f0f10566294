//! iCalendar RFC 5545 support.
//!
//! - `core`: Type definitions for iCalendar structures
//! - `parse`: Lenient parser for iCalendar documents
//! - `build`: Serializer used to echo components back as text
//! - `expand`: Timezone resolution and recurrence expansion into occurrences
//!
//! ## Example
//!
//! ```rust
//! use blockjuggler_rfc::ical::{parse, expand::{OccurrenceExpander, Window}};
//! use chrono::{TimeZone, Utc};
//!
//! let input = "BEGIN:VCALENDAR\r\n\
//! BEGIN:VEVENT\r\n\
//! UID:1\r\n\
//! DTSTART:20240110T090000Z\r\n\
//! DTEND:20240110T100000Z\r\n\
//! SUMMARY:Standup\r\n\
//! END:VEVENT\r\n\
//! END:VCALENDAR\r\n";
//!
//! let ical = parse(input).unwrap();
//! let window = Window::new(
//!     Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
//! );
//! let occurrences = OccurrenceExpander::new(&ical).between(&window);
//! assert_eq!(occurrences.len(), 1);
//! ```

pub mod build;
pub mod core;
pub mod expand;
pub mod parse;

pub use build::serialize_component;
pub use core::{Attendee, Component, ComponentKind, ICalendar, Parameter, Property};
pub use parse::{ParseError, ParseResult, parse};
