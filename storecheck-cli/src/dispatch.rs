// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Top-level application and command routing.

use crate::{
    ExpectedError, Result,
    output::{OutputContext, OutputOpts, OutputWriter},
};
use camino::Utf8PathBuf;
use chrono::Local;
use clap::{Parser, Subcommand};
use itertools::Itertools;
use std::io::{BufRead, BufReader, Write};
use storecheck_metadata::{DEFAULT_REPORT_FILE, DEFAULT_RESULTS_DIR};
use storecheck_runner::{
    helpers::plural,
    history::HistoryBuilder,
    reporter::{EventStream, SiteAccumulator, materialize_results},
};
use tracing::{debug, info};

/// Collect per-site browser test results and build a historical HTML report.
///
/// storecheck reads result events emitted by a browser test engine, writes one
/// JSON result document per tested site, and appends a dated section for each
/// run to a persistent HTML report.
#[derive(Debug, Parser)]
#[command(
    version,
    styles = crate::output::clap_styles::style(),
    max_term_width = 100,
)]
pub struct StorecheckApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(subcommand)]
    command: Command,
}

impl StorecheckApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    pub fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        match self.command {
            Command::Collect { events, output_dir } => {
                let accumulator = SiteAccumulator::new();

                let event_count = match &events {
                    Some(file) if file.as_str() != "-" => {
                        let reader = std::fs::File::open(file).map_err(|err| {
                            ExpectedError::EventsFileReadError {
                                file: file.clone(),
                                err,
                            }
                        })?;
                        feed_events(EventStream::new(BufReader::new(reader)), &accumulator)?
                    }
                    _ => {
                        let stdin = std::io::stdin();
                        feed_events(EventStream::new(stdin.lock()), &accumulator)?
                    }
                };
                debug!(
                    "processed {event_count} {}",
                    plural::events_str(event_count)
                );

                let summary = materialize_results(
                    accumulator.into_results(),
                    &output_dir,
                    Local::now().fixed_offset(),
                )?;

                if summary.site_project_count() == 0 {
                    return Err(ExpectedError::NoProjectsRecognized);
                }

                if output.verbose && !summary.written.is_empty() {
                    info!(
                        "materialized {}",
                        summary
                            .written
                            .iter()
                            .map(|written| written.file.as_str())
                            .join(", "),
                    );
                }
                info!(
                    "recognized {} site {}, wrote {} result {} to `{}`",
                    summary.site_project_count(),
                    plural::projects_str(summary.site_project_count()),
                    summary.written.len(),
                    plural::documents_str(summary.written.len()),
                    output_dir,
                );

                Ok(0)
            }
            Command::Report {
                results_dir,
                report_file,
            } => {
                let summary = HistoryBuilder::new(results_dir, report_file).build()?;

                if summary.created {
                    info!("created `{}`", summary.report_file);
                }
                if output.verbose {
                    info!(
                        "run totals: {} {} ({} passed, {} failed, {} skipped, {} other)",
                        summary.totals.total,
                        plural::attempts_str(summary.totals.total),
                        summary.totals.passed,
                        summary.totals.failed,
                        summary.totals.skipped,
                        summary.totals.other,
                    );
                }

                let mut writer = output_writer.stdout_writer();
                writeln!(
                    writer,
                    "report extended: {} ({} site {})",
                    summary.report_file,
                    summary.document_count,
                    plural::documents_str(summary.document_count),
                )
                .map_err(|err| ExpectedError::WriteSummaryError { err })?;
                writer
                    .flush()
                    .map_err(|err| ExpectedError::WriteSummaryError { err })?;

                Ok(0)
            }
        }
    }
}

fn feed_events<R: BufRead>(stream: EventStream<R>, accumulator: &SiteAccumulator) -> Result<usize> {
    let mut count = 0;
    for event in stream {
        accumulator.record_event(event?);
        count += 1;
    }
    Ok(count)
}

/// All commands supported by storecheck.
#[derive(Debug, Subcommand)]
enum Command {
    /// Collect engine events into per-site result documents.
    ///
    /// Reads a stream of engine events (one JSON event per line), accumulates
    /// test attempts per project, and writes one pretty-printed result
    /// document per site project once the stream ends. Projects whose names do
    /// not start with `url-` are skipped.
    ///
    /// Events are read from stdin unless --events names a file (`-` also
    /// selects stdin).
    Collect {
        /// Read events from this file instead of stdin
        #[arg(long, value_name = "PATH")]
        events: Option<Utf8PathBuf>,

        /// Directory to write result documents to
        #[arg(long, value_name = "DIR", default_value = DEFAULT_RESULTS_DIR)]
        output_dir: Utf8PathBuf,
    },
    /// Append the latest results to the historical HTML report.
    ///
    /// Reads every site result document from the results directory and
    /// appends one dated run section to the report file, creating the file
    /// with an empty shell first if it does not exist. Sections appended by
    /// earlier runs are never modified.
    Report {
        /// Directory to read result documents from
        #[arg(long, value_name = "DIR", default_value = DEFAULT_RESULTS_DIR)]
        results_dir: Utf8PathBuf,

        /// Report file to append to
        #[arg(long, value_name = "PATH", default_value = DEFAULT_REPORT_FILE)]
        report_file: Utf8PathBuf,
    },
}
