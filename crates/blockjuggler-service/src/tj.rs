//! TaskJuggler timestamp formatting.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Placeholder TaskJuggler substitutes with the project start.
pub const PROJECT_START: &str = "${projectstart}";

/// Placeholder TaskJuggler substitutes with the project end.
pub const PROJECT_END: &str = "${projectend}";

/// ## Summary
/// Formats an instant as a TaskJuggler date, `YYYY-MM-DD-HH:MM-+ZZZZ`, in the
/// instant's own offset.
#[must_use]
pub fn tj_datetime<Tz>(dt: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dt.format("%Y-%m-%d-%H:%M-%z").to_string()
}

/// Formats an instant for the human-readable comment lines,
/// `YYYY-MM-DD HH:MM:SS+HH:MM`.
#[must_use]
pub fn comment_datetime<Tz>(dt: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dt.format("%Y-%m-%d %H:%M:%S%:z").to_string()
}
