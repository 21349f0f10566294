//! iCalendar serializer (RFC 5545).
//!
//! Writes components back out in source order using the raw property values,
//! so the text matches what was read up to folding and parameter quoting.

use super::escape::escape_param_value;
use super::fold::fold_line;
use crate::ical::core::{Component, Parameter, Property};

/// Serializes a component and its children to folded iCalendar text.
#[must_use]
pub fn serialize_component(component: &Component) -> String {
    let mut result = fold_line(&format!("BEGIN:{}", component.name));

    for prop in &component.properties {
        result.push_str(&serialize_property(prop));
    }
    for child in &component.children {
        result.push_str(&serialize_component(child));
    }

    result.push_str(&fold_line(&format!("END:{}", component.name)));
    result
}

/// Serializes a property to a folded content line.
#[must_use]
pub fn serialize_property(prop: &Property) -> String {
    let mut line = prop.name.clone();

    for param in &prop.params {
        line.push(';');
        line.push_str(&serialize_parameter(param));
    }

    line.push(':');
    line.push_str(&prop.raw_value);

    fold_line(&line)
}

fn serialize_parameter(param: &Parameter) -> String {
    let values: Vec<String> = param.values.iter().map(|v| escape_param_value(v)).collect();
    format!("{}={}", param.name, values.join(","))
}
