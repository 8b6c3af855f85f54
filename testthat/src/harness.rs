//! Entry point for binaries that host registered tests
use std::io::Write;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use testthat_common::prelude::*;

use crate::cli::Options;
use crate::config::{Config, Settings};
use crate::error::Error;
use crate::registry::Registry;
use crate::report;
use crate::runner::{RunSummary, Runner};

/// Parse the command line, run the registry and report to stdout
///
/// Returns a failure exit code if any test case failed or the run
/// could not be set up.
pub fn main(registry: Registry) -> ExitCode {
    let options = Options::parse();
    match run_main(registry, &options, &mut std::io::stdout().lock()) {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run the registry with the given options, writing the report to `out`
///
/// When listing, nothing is run and an empty summary is returned.
pub fn run_main(
    mut registry: Registry,
    options: &Options,
    out: &mut impl Write,
) -> Result<RunSummary, Error> {
    let start_time = Instant::now();

    let config = match &options.config {
        Some(path) => Config::from_path(path)
            .attach_printable(format!("config path: {}", path.display()))?,
        None => Config::default(),
    };
    let settings = Settings::resolve(options, config);
    options.apply_print_options(settings.color);

    if settings.list {
        report::write_list(out, &registry).change_context(Error::Report)?;
        return Ok(RunSummary::default());
    }

    let selection = settings.selection().map_err(|e| {
        errorln!("Error", "{}", e.current_context());
        e
    })?;
    let summary = Runner::new(selection).run(&mut registry);
    report::write_report(out, &summary, settings.format)?;

    let elapsed = start_time.elapsed();
    if summary.skipped > 0 {
        hintln!("Skipped", "{} test case(s)", summary.skipped);
    }
    if summary.is_success() {
        infoln!(
            "Finished",
            "{} test case(s) in {:.2}s",
            summary.total,
            elapsed.as_secs_f32()
        );
    } else {
        errorln!(
            "Failed",
            "{} of {} test case(s) in {:.2}s",
            summary.failed,
            summary.total,
            elapsed.as_secs_f32()
        );
    }

    Ok(summary)
}
