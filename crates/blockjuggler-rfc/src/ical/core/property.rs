//! iCalendar property and content line types (RFC 5545 §3.1, §3.8).

use super::{Parameter, Value};

/// A raw content line as parsed from iCalendar text.
///
/// This is the low-level representation before value type resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<Parameter>,
    /// Raw value string (after unfolding, before unescaping).
    pub raw_value: String,
}

impl ContentLine {
    /// Returns the value of a parameter.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        find_param(&self.params, name)?.value()
    }

    /// Returns the VALUE parameter if present.
    #[must_use]
    pub fn value_type(&self) -> Option<&str> {
        self.get_param_value("VALUE")
    }

    /// Returns the TZID parameter if present.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.get_param_value("TZID")
    }
}

/// A fully parsed iCalendar property.
///
/// Contains the parsed value along with the original raw value, which is
/// still escaped exactly as it appeared on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<Parameter>,
    pub value: Value,
    /// Original raw value string.
    pub raw_value: String,
}

impl Property {
    /// Creates a property with a text value whose raw form needs no escaping.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: Value::Text(value.clone()),
            raw_value: value,
        }
    }

    /// Returns the parameter with the given name.
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&Parameter> {
        find_param(&self.params, name)
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        self.get_param(name)?.value()
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_text()
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<&super::DateTime> {
        self.value.as_datetime()
    }

    #[must_use]
    pub fn as_date(&self) -> Option<&super::Date> {
        self.value.as_date()
    }

    #[must_use]
    pub fn as_duration(&self) -> Option<&super::Duration> {
        self.value.as_duration()
    }
}

fn find_param<'a>(params: &'a [Parameter], name: &str) -> Option<&'a Parameter> {
    params.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_line_get_param() {
        let cl = ContentLine {
            name: "DTSTART".to_string(),
            params: vec![
                Parameter::new("TZID", "America/New_York"),
                Parameter::new("VALUE", "DATE-TIME"),
            ],
            raw_value: "20260123T120000".to_string(),
        };
        assert_eq!(cl.tzid(), Some("America/New_York"));
        assert_eq!(cl.value_type(), Some("DATE-TIME"));
        assert_eq!(cl.get_param_value("tzid"), Some("America/New_York"));
    }

    #[test]
    fn property_text() {
        let prop = Property::text("summary", "Meeting");
        assert_eq!(prop.name, "SUMMARY");
        assert_eq!(prop.as_text(), Some("Meeting"));
        assert_eq!(prop.raw_value, "Meeting");
    }
}
