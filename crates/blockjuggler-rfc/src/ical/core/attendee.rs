//! ATTENDEE property view (RFC 5545 §3.8.4.1).

use super::Property;

/// Borrowed view of an ATTENDEE property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attendee<'a> {
    /// Calendar user address, usually a `mailto:` URI.
    pub address: &'a str,
    /// Common name (`CN` parameter).
    pub common_name: Option<&'a str>,
    /// Participation status (`PARTSTAT` parameter), as written.
    pub partstat: Option<&'a str>,
}

impl<'a> Attendee<'a> {
    /// Builds the view from an ATTENDEE property.
    #[must_use]
    pub fn from_property(prop: &'a Property) -> Self {
        Self {
            address: prop.value.as_cal_address().unwrap_or(&prop.raw_value),
            common_name: prop.get_param_value("CN"),
            partstat: prop.get_param_value("PARTSTAT"),
        }
    }

    /// Returns whether this attendee declined the invitation.
    ///
    /// RFC 5545 parameter values are case-insensitive, but the comparison is
    /// exact to match what calendar servers emit.
    #[must_use]
    pub fn has_declined(&self) -> bool {
        self.partstat == Some("DECLINED")
    }
}
