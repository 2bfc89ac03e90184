// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpers that drive the runner pipeline without going through the CLI.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, FixedOffset};
use storecheck_metadata::{ProjectResultDocument, result_document_file_name};
use storecheck_runner::reporter::{
    EventStream, MaterializeSummary, ProjectResults, SiteAccumulator, materialize_results,
};

/// A timestamp for materializations that must not depend on the wall clock.
pub fn fixed_now() -> DateTime<FixedOffset> {
    "2026-03-01T09:00:30+01:00".parse().expect("valid timestamp")
}

/// Feeds a newline-delimited event script through the accumulator.
///
/// Panics on unparseable events; tests that need parse failures drive
/// `EventStream` directly.
pub fn collect_in_memory(script: &str) -> Vec<ProjectResults> {
    let accumulator = SiteAccumulator::new();
    for event in EventStream::new(script.as_bytes()) {
        accumulator.record_event(event.expect("event parses"));
    }
    accumulator.into_results()
}

/// Collects a script and materializes the result documents into `results_dir`.
pub fn materialize_script(script: &str, results_dir: &Utf8Path) -> MaterializeSummary {
    materialize_results(collect_in_memory(script), results_dir, fixed_now())
        .expect("materialization succeeds")
}

/// The path a project's result document materializes to.
pub fn document_path(results_dir: &Utf8Path, project_name: &str) -> Utf8PathBuf {
    results_dir.join(result_document_file_name(project_name))
}

/// Reads a materialized result document back.
pub fn read_document(file: &Utf8Path) -> ProjectResultDocument {
    let json = std::fs::read_to_string(file)
        .unwrap_or_else(|error| panic!("failed to read {file}: {error}"));
    serde_json::from_str(&json)
        .unwrap_or_else(|error| panic!("failed to parse {file}: {error}"))
}
