//! Expansion of calendar data into concrete, timezone-aware occurrences.
//!
//! - `timezone`: TZID resolution and local time disambiguation
//! - `time`: DATE / DATE-TIME values as `chrono` instants
//! - `window`: The span occurrences are collected for
//! - `occurrence`: Recurrence expansion of VEVENTs

mod occurrence;
mod time;
mod timezone;
mod window;

pub use occurrence::{
    ComponentFailure, Expanded, ExpansionError, MAX_INSTANCES, Occurrence, OccurrenceExpander,
};
pub use time::{EventTime, property_time, property_times};
pub use timezone::{ConversionError, TimeZoneResolver, localize};
pub use window::Window;
