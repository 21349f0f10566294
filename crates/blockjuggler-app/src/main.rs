use std::process::ExitCode;

use blockjuggler_core::config::load_config;
use blockjuggler_service::{ConvertError, Converter, OccurrenceFailure};
use clap::Parser;

mod cli;
mod error;
mod files;
mod logging;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            eprintln!("Aborted!");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let settings = load_config(cli.config.as_deref())?;
    logging::init(&settings.logging.level);
    tracing::debug!(?settings, "Configuration loaded");

    let options = cli.conversion_options(&settings);
    tracing::debug!(?options, "Starting conversion");

    let input = files::read_input(&cli.ics_file)?;

    let conversion = match Converter::new(options).convert(&input) {
        Ok(conversion) => conversion,
        Err(ConvertError::Occurrence(failure)) => {
            report_failure(&failure);
            return Err(ConvertError::Occurrence(failure).into());
        }
        Err(err) => return Err(err.into()),
    };

    for failure in &conversion.failures {
        report_failure(failure);
    }

    files::write_output(&cli.output_file, &conversion.text)?;
    Ok(())
}

fn report_failure(failure: &OccurrenceFailure) {
    eprintln!("Exception when processing:\n");
    eprintln!("{}", failure.raw);
    eprintln!("{}", failure.reason);
}
