// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by storecheck-runner.

use camino::Utf8PathBuf;
use thiserror::Error;

/// An error that occurred while reading an engine event stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EventStreamError {
    /// Reading from the underlying stream failed.
    #[error("failed to read event stream at line {line_number}")]
    Read {
        /// The 1-based line at which the failure occurred.
        line_number: usize,
        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// A line in the stream was not a valid engine event.
    #[error("failed to parse event at line {line_number}")]
    Parse {
        /// The 1-based line that failed to parse.
        line_number: usize,
        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },
}

/// A fatal error that occurred while materializing result documents.
///
/// Failures scoped to a single project's document are
/// [`WriteDocumentError`]s and do not abort materialization.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MaterializeError {
    /// The results directory could not be created.
    #[error("failed to create results directory `{results_dir}`")]
    CreateResultsDir {
        /// The directory that could not be created.
        results_dir: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: std::io::Error,
    },
}

/// An error writing one project's result document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteDocumentError {
    /// The document could not be serialized.
    #[error("failed to serialize result document for project `{project_name}`")]
    Serialize {
        /// The project whose document failed to serialize.
        project_name: String,
        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },

    /// The document could not be written to disk.
    #[error("failed to write result document to `{file}`")]
    Write {
        /// The file that could not be written.
        file: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: std::io::Error,
    },
}

/// An error that occurred while building the historical report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryBuildError {
    /// The results directory could not be scanned for documents.
    #[error("failed to read results directory `{results_dir}`")]
    ScanResultsDir {
        /// The directory that could not be read.
        results_dir: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// No site result documents were found in the results directory.
    #[error("no site result documents (results-url-*.json) found in `{results_dir}`")]
    NoSiteDocuments {
        /// The directory that was scanned.
        results_dir: Utf8PathBuf,
    },

    /// A result document could not be read.
    #[error("failed to read result document `{file}`")]
    ReadDocument {
        /// The document file.
        file: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// A result document was not valid JSON of the expected shape.
    #[error("failed to parse result document `{file}`")]
    ParseDocument {
        /// The document file.
        file: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },

    /// The existing report file could not be read.
    #[error("failed to read existing report `{file}`")]
    ReadReport {
        /// The report file.
        file: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The existing report file does not end with the expected closing
    /// markers, so appending to it would produce invalid markup.
    #[error("existing report `{file}` is missing its closing </body></html> markers")]
    MissingClosingMarkers {
        /// The report file.
        file: Utf8PathBuf,
    },

    /// The report file could not be written.
    #[error("failed to write report `{file}`")]
    WriteReport {
        /// The report file.
        file: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: std::io::Error,
    },
}
