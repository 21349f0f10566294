//! iCalendar core models (RFC 5545).
//!
//! Values keep their raw text next to the parsed form so that a component can
//! be echoed back as it was read.

mod attendee;
mod component;
mod datetime;
mod duration;
mod parameter;
mod property;
mod value;

pub use attendee::Attendee;
pub use component::{Component, ComponentKind, ICalendar};
pub use datetime::{Date, DateTime, DateTimeForm};
pub use duration::Duration;
pub use parameter::Parameter;
pub use property::{ContentLine, Property};
pub use value::Value;
