// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::StderrStyles;
use camino::Utf8PathBuf;
use owo_colors::OwoColorize;
use std::error::Error;
use storecheck_metadata::{ExitCode, SITE_PROJECT_PREFIX};
use storecheck_runner::errors::{EventStreamError, HistoryBuildError, MaterializeError};
use thiserror::Error;
use tracing::{error, info};

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An error expected during normal operation, mapped to a process exit code.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("failed to read events file")]
    EventsFileReadError {
        file: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("invalid event stream")]
    EventStreamError {
        #[from]
        err: EventStreamError,
    },
    #[error("failed to materialize result documents")]
    MaterializeError {
        #[from]
        err: MaterializeError,
    },
    #[error("no site projects recognized")]
    NoProjectsRecognized,
    #[error("failed to build report")]
    HistoryBuildError {
        #[from]
        err: HistoryBuildError,
    },
    #[error("failed to write to output")]
    WriteSummaryError {
        #[source]
        err: std::io::Error,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::EventsFileReadError { .. } => ExitCode::SETUP_ERROR,
            Self::EventStreamError { .. } => ExitCode::INVALID_EVENT_STREAM,
            Self::MaterializeError { .. } => ExitCode::SETUP_ERROR,
            Self::NoProjectsRecognized => ExitCode::NO_PROJECTS_RECOGNIZED,
            Self::HistoryBuildError { err } => match err {
                HistoryBuildError::NoSiteDocuments { .. } => ExitCode::NO_RESULT_DOCUMENTS,
                HistoryBuildError::MissingClosingMarkers { .. } => ExitCode::REPORT_FILE_CORRUPT,
                HistoryBuildError::ReadReport { .. } | HistoryBuildError::WriteReport { .. } => {
                    ExitCode::WRITE_OUTPUT_ERROR
                }
                _ => ExitCode::SETUP_ERROR,
            },
            Self::WriteSummaryError { .. } => ExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::EventsFileReadError { file, err } => {
                error!("failed to read events file `{}`", file.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::EventStreamError { err } => {
                error!("{err}");
                err.source()
            }
            Self::MaterializeError { err } => {
                error!("{err}");
                err.source()
            }
            Self::NoProjectsRecognized => {
                error!("no site projects were recognized in the event stream");
                info!(
                    target: "storecheck::no_heading",
                    "(site project names start with `{}`)",
                    SITE_PROJECT_PREFIX.style(styles.bold),
                );
                None
            }
            Self::HistoryBuildError { err } => {
                error!("{err}");
                err.source()
            }
            Self::WriteSummaryError { err } => {
                error!("failed to write to output");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(target: "storecheck::no_heading", "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
