//! iCalendar (RFC 5545) reading and occurrence expansion for blockjuggler.

pub mod ical;
