// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folding accumulated results into durable per-project documents.
//!
//! Only buckets following the site-under-test naming convention are
//! written; auxiliary engine projects (browser matrices, setup projects)
//! are skipped. One project's write failure never blocks the others.

use crate::{
    errors::{MaterializeError, WriteDocumentError},
    reporter::aggregator::ProjectResults,
};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, FixedOffset};
use storecheck_metadata::{
    ProjectResultDocument, ResultStats, is_site_project, result_document_file_name,
};
use tracing::{debug, warn};

/// What happened during one materialization pass.
#[derive(Debug)]
pub struct MaterializeSummary {
    /// Documents successfully written, in bucket order.
    pub written: Vec<WrittenDocument>,
    /// Projects skipped by the site naming convention.
    pub skipped: Vec<String>,
    /// Per-project failures; materialization continued past each.
    pub failures: Vec<FailedDocument>,
}

impl MaterializeSummary {
    /// The number of site projects seen, whether or not their document was
    /// written successfully.
    pub fn site_project_count(&self) -> usize {
        self.written.len() + self.failures.len()
    }
}

/// One successfully written result document.
#[derive(Clone, Debug)]
pub struct WrittenDocument {
    /// The project the document belongs to.
    pub project_name: String,
    /// Where it was written.
    pub file: Utf8PathBuf,
}

/// One project whose document could not be written.
#[derive(Debug)]
pub struct FailedDocument {
    /// The project whose document failed.
    pub project_name: String,
    /// What went wrong.
    pub error: WriteDocumentError,
}

/// Materializes one run's accumulated results into the results directory,
/// creating it if absent.
///
/// Returns the per-project outcome; only a results directory that cannot be
/// created aborts the whole pass.
pub fn materialize_results(
    results: Vec<ProjectResults>,
    results_dir: &Utf8Path,
    generated_at: DateTime<FixedOffset>,
) -> Result<MaterializeSummary, MaterializeError> {
    std::fs::create_dir_all(results_dir).map_err(|error| MaterializeError::CreateResultsDir {
        results_dir: results_dir.to_owned(),
        error,
    })?;

    let mut summary = MaterializeSummary {
        written: Vec::new(),
        skipped: Vec::new(),
        failures: Vec::new(),
    };

    for project in results {
        if !is_site_project(&project.project_name) {
            debug!(
                "skipping auxiliary project `{}` during materialization",
                project.project_name
            );
            summary.skipped.push(project.project_name);
            continue;
        }

        let project_name = project.project_name.clone();
        let file = results_dir.join(result_document_file_name(&project_name));
        match write_document(project, &file, generated_at) {
            Ok(()) => {
                debug!("wrote result document `{file}`");
                summary.written.push(WrittenDocument { project_name, file });
            }
            Err(error) => {
                warn!("failed to materialize project `{project_name}`: {error}");
                summary.failures.push(FailedDocument {
                    project_name,
                    error,
                });
            }
        }
    }

    Ok(summary)
}

/// Folds one project's results into its durable document.
///
/// Stats are computed by scanning every test's full attempt sequence; the
/// document duration is the project's observed wall-clock span.
pub fn build_document(
    project: ProjectResults,
    generated_at: DateTime<FixedOffset>,
) -> ProjectResultDocument {
    let mut stats = ResultStats::default();
    for test in &project.tests {
        for attempt in &test.results {
            stats.record(attempt.status);
        }
    }
    // Clamp: engine clocks have been seen to step backwards.
    stats.duration_ms = (project.last_seen_at - project.started_at)
        .num_milliseconds()
        .max(0) as u64;

    ProjectResultDocument {
        generated_at,
        project_name: project.project_name,
        tested_url: project.tested_url,
        stats,
        tests: project.tests,
    }
}

fn write_document(
    project: ProjectResults,
    file: &Utf8Path,
    generated_at: DateTime<FixedOffset>,
) -> Result<(), WriteDocumentError> {
    let project_name = project.project_name.clone();
    let document = build_document(project, generated_at);
    let mut json = serde_json::to_string_pretty(&document).map_err(|error| {
        WriteDocumentError::Serialize {
            project_name,
            error,
        }
    })?;
    json.push('\n');
    std::fs::write(file, json).map_err(|error| WriteDocumentError::Write {
        file: file.to_owned(),
        error,
    })
}
