use std::path::PathBuf;

use blockjuggler_core::config::Settings;
use blockjuggler_service::ConversionOptions;
use clap::Parser;

/// Convert iCalendar events into TaskJuggler leaves.
///
/// Files can be given as paths, or `-` for stdin and stdout:
///
///     blockjuggler in.ics out.tji
///
///     cat in.ics | blockjuggler - - > out.tji
#[derive(Debug, Parser)]
#[command(name = "blockjuggler", version, verbatim_doc_comment)]
pub struct Cli {
    /// iCalendar input, `-` for stdin.
    pub ics_file: PathBuf,

    /// Output file, `-` for stdout.
    pub output_file: PathBuf,

    /// Attendee name used to detect declined events. Repeat for several.
    #[arg(short, long = "email", value_name = "EMAIL")]
    pub emails: Vec<String>,

    /// Window length in days, left and right from now. Negative values count as 0.
    #[arg(short, long, allow_negative_numbers = true)]
    pub days: Option<i64>,

    /// TaskJuggler resource id.
    #[arg(short, long)]
    pub resource_id: Option<String>,

    /// Skip events that cannot be converted instead of aborting.
    #[arg(long)]
    pub continue_on_error: bool,

    /// Append the location to event labels.
    #[arg(long)]
    pub include_location: bool,

    /// Configuration file [default: blockjuggler.toml, if present].
    #[arg(short, long, env = "BLOCKJUGGLER_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Merges the command line over the loaded settings.
    #[must_use]
    pub fn conversion_options(&self, settings: &Settings) -> ConversionOptions {
        let conversion = &settings.conversion;
        let days = self.days.unwrap_or(conversion.days).max(0);
        let emails = if self.emails.is_empty() {
            &conversion.emails
        } else {
            &self.emails
        };

        ConversionOptions {
            resource_id: self
                .resource_id
                .clone()
                .unwrap_or_else(|| conversion.resource_id.clone()),
            days: u32::try_from(days).unwrap_or(u32::MAX),
            self_ids: emails.iter().cloned().collect(),
            continue_on_error: self.continue_on_error || conversion.continue_on_error,
            include_location: self.include_location || conversion.include_location,
        }
    }
}
