use std::collections::HashSet;

use blockjuggler_rfc::ical::expand::{ComponentFailure, OccurrenceExpander, Window};
use blockjuggler_rfc::ical::{parse, serialize_component};
use chrono::Utc;

use super::leave::merge_slots;
use super::slot::{extract_slot, is_declined};
use crate::error::{ConvertError, ConvertResult, OccurrenceFailure};

/// Options for one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    /// TaskJuggler resource the leaves are attached to.
    pub resource_id: String,
    /// Half-width of the window around now, in days.
    pub days: u32,
    /// Attendee names (`CN`) that identify the calendar owner.
    pub self_ids: HashSet<String>,
    pub continue_on_error: bool,
    pub include_location: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            resource_id: "r1".to_string(),
            days: 90,
            self_ids: HashSet::new(),
            continue_on_error: false,
            include_location: false,
        }
    }
}

/// Output of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// The complete `supplement resource` block.
    pub text: String,
    /// Occurrences skipped because of `continue_on_error`.
    pub failures: Vec<OccurrenceFailure>,
}

/// Converts iCalendar documents into TaskJuggler leave blocks.
#[derive(Debug, Clone)]
pub struct Converter {
    options: ConversionOptions,
}

impl Converter {
    #[must_use]
    pub const fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// ## Summary
    /// Converts `input` using the window around the current time.
    ///
    /// ## Errors
    ///
    /// See [`Converter::convert_in`]. Also returns
    /// `ConvertError::WindowOutOfRange` if the window cannot be represented.
    pub fn convert(&self, input: &[u8]) -> ConvertResult<Conversion> {
        let days = self.options.days;
        let window = Window::around(Utc::now(), days).ok_or(ConvertError::WindowOutOfRange { days })?;
        self.convert_in(input, &window)
    }

    /// ## Summary
    /// Converts `input`, considering occurrences that overlap `window`.
    ///
    /// Every occurrence is processed before deciding the outcome, so nothing
    /// is rendered for a run that fails.
    ///
    /// ## Errors
    ///
    /// Returns `ConvertError::Encoding` or `ConvertError::Parse` if the input
    /// is not a calendar document. Without `continue_on_error`, returns the
    /// first `ConvertError::Occurrence`.
    #[tracing::instrument(
        skip(self, input),
        fields(resource_id = %self.options.resource_id, bytes = input.len())
    )]
    pub fn convert_in(&self, input: &[u8], window: &Window) -> ConvertResult<Conversion> {
        let text = std::str::from_utf8(input)?;
        let calendar = parse(text)?;

        let mut slots = Vec::new();
        let mut failures = Vec::new();

        for item in OccurrenceExpander::new(&calendar).between(window) {
            let occurrence = match item {
                Ok(occurrence) => occurrence,
                Err(ComponentFailure { component, error }) => {
                    failures.push(OccurrenceFailure {
                        raw: serialize_component(component),
                        reason: error.to_string(),
                    });
                    continue;
                }
            };

            if is_declined(&occurrence, &self.options.self_ids) {
                tracing::debug!(uid = occurrence.component.uid(), "Skipping declined occurrence");
                continue;
            }

            match extract_slot(&occurrence, self.options.include_location) {
                Ok(slot) => slots.push(slot),
                Err(error) => failures.push(OccurrenceFailure {
                    raw: serialize_component(occurrence.component),
                    reason: error.to_string(),
                }),
            }
        }

        if !self.options.continue_on_error && !failures.is_empty() {
            return Err(failures.swap_remove(0).into());
        }

        for failure in &failures {
            tracing::warn!(reason = %failure.reason, "Skipped occurrence");
        }

        tracing::debug!(slots = slots.len(), skipped = failures.len(), "Collected slots");

        let block = merge_slots(slots);
        let text = format!("supplement resource {} {{\n{block}}}\n", self.options.resource_id);

        Ok(Conversion { text, failures })
    }
}
