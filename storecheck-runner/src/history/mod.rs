// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The historical report: an append-only HTML document that grows by one
//! run section per build.
//!
//! [`HistoryBuilder`] scans the results directory for site documents,
//! renders one dated section, and splices it in front of the report's
//! closing markers. Everything before the markers is preserved byte for
//! byte, so sections appended by earlier builds never change.

mod render;

use crate::errors::HistoryBuildError;
use atomicwrites::{AtomicFile, OverwriteBehavior};
use camino::Utf8PathBuf;
use chrono::{DateTime, FixedOffset, Local};
use std::io::Write;
use storecheck_metadata::{ProjectResultDocument, ResultStats, is_site_document_file_name};
use tracing::debug;

/// Builds the cumulative HTML report from materialized site documents.
#[derive(Clone, Debug)]
pub struct HistoryBuilder {
    results_dir: Utf8PathBuf,
    report_file: Utf8PathBuf,
}

impl HistoryBuilder {
    /// Creates a builder that reads documents from `results_dir` and appends
    /// to `report_file`.
    pub fn new(results_dir: impl Into<Utf8PathBuf>, report_file: impl Into<Utf8PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            report_file: report_file.into(),
        }
    }

    /// Appends one run section stamped with the current local time.
    pub fn build(&self) -> Result<AppendSummary, HistoryBuildError> {
        self.build_at(Local::now().fixed_offset())
    }

    /// Appends one run section stamped with `now`.
    ///
    /// Fails before touching the report file when no site documents exist or
    /// when an existing report has lost its closing markers.
    pub fn build_at(&self, now: DateTime<FixedOffset>) -> Result<AppendSummary, HistoryBuildError> {
        let documents = self.load_documents()?;

        let mut totals = ResultStats::default();
        for document in &documents {
            totals.merge_counts(&document.stats);
        }

        let section = render::render_run_section(now, &totals, &documents);

        let (existing, created) = match std::fs::read_to_string(&self.report_file) {
            Ok(html) => (html, false),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                (render::page_shell().to_owned(), true)
            }
            Err(error) => {
                return Err(HistoryBuildError::ReadReport {
                    file: self.report_file.clone(),
                    error,
                });
            }
        };

        let prefix = render::strip_closing_markers(&existing).ok_or_else(|| {
            HistoryBuildError::MissingClosingMarkers {
                file: self.report_file.clone(),
            }
        })?;

        let html = format!("{prefix}\n{section}\n</body>\n</html>\n");

        AtomicFile::new(&self.report_file, OverwriteBehavior::AllowOverwrite)
            .write(|file| file.write_all(html.as_bytes()))
            .map_err(|error| match error {
                atomicwrites::Error::Internal(error) | atomicwrites::Error::User(error) => {
                    HistoryBuildError::WriteReport {
                        file: self.report_file.clone(),
                        error,
                    }
                }
            })?;

        Ok(AppendSummary {
            report_file: self.report_file.clone(),
            document_count: documents.len(),
            totals,
            created,
        })
    }

    /// Reads and parses every site document, sorted by tested URL with the
    /// project name as fallback.
    fn load_documents(&self) -> Result<Vec<ProjectResultDocument>, HistoryBuildError> {
        let mut files = Vec::new();
        match self.results_dir.read_dir_utf8() {
            Ok(entries) => {
                for entry in entries {
                    let entry = entry.map_err(|error| HistoryBuildError::ScanResultsDir {
                        results_dir: self.results_dir.clone(),
                        error,
                    })?;
                    if is_site_document_file_name(entry.file_name()) {
                        files.push(entry.into_path());
                    }
                }
            }
            // A results directory that was never created holds no documents.
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => {
                return Err(HistoryBuildError::ScanResultsDir {
                    results_dir: self.results_dir.clone(),
                    error,
                });
            }
        }
        if files.is_empty() {
            return Err(HistoryBuildError::NoSiteDocuments {
                results_dir: self.results_dir.clone(),
            });
        }

        // Directory order is not guaranteed; make tie order deterministic.
        files.sort();

        let mut documents = Vec::with_capacity(files.len());
        for file in files {
            let raw = std::fs::read_to_string(&file).map_err(|error| {
                HistoryBuildError::ReadDocument {
                    file: file.clone(),
                    error,
                }
            })?;
            let document: ProjectResultDocument =
                serde_json::from_str(&raw).map_err(|error| HistoryBuildError::ParseDocument {
                    file: file.clone(),
                    error,
                })?;
            debug!("loaded result document `{file}`");
            documents.push(document);
        }

        documents.sort_by(|a, b| sort_key(a).cmp(sort_key(b)));
        Ok(documents)
    }
}

fn sort_key(document: &ProjectResultDocument) -> &str {
    document
        .tested_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .unwrap_or(&document.project_name)
}

/// What a report build appended.
#[derive(Clone, Debug)]
pub struct AppendSummary {
    /// The report that was extended.
    pub report_file: Utf8PathBuf,
    /// How many site documents fed the new section.
    pub document_count: usize,
    /// Aggregate counters across those documents.
    pub totals: ResultStats,
    /// True when this build created the report file.
    pub created: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;
    use camino_tempfile::tempdir;
    use pretty_assertions::assert_eq;
    use storecheck_metadata::{
        AttemptRecord, AttemptStatus, SourceLocation, TestCaseRecord, result_document_file_name,
    };

    fn ts(s: &str) -> DateTime<FixedOffset> {
        s.parse().unwrap()
    }

    fn write_document(
        results_dir: &Utf8Path,
        project_name: &str,
        tested_url: Option<&str>,
        statuses: &[AttemptStatus],
    ) {
        let mut test = TestCaseRecord::new(
            "adds item to cart",
            SourceLocation {
                file: "tests/cart.spec.ts".into(),
                line: 12,
                column: 5,
            },
        );
        test.title_path = vec!["cart".to_owned(), "adds item to cart".to_owned()];
        let mut stats = ResultStats::default();
        for (retry, status) in statuses.iter().enumerate() {
            let mut attempt = AttemptRecord::new(*status);
            attempt.retry = retry as u32;
            test.results.push(attempt);
            stats.record(*status);
        }
        let document = ProjectResultDocument {
            generated_at: ts("2025-11-04T08:02:00+01:00"),
            project_name: project_name.to_owned(),
            tested_url: tested_url.map(str::to_owned),
            stats,
            tests: vec![test],
        };
        std::fs::write(
            results_dir.join(result_document_file_name(project_name)),
            serde_json::to_string_pretty(&document).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn first_build_creates_shell_plus_one_section() {
        let dir = tempdir().unwrap();
        write_document(dir.path(), "url-g05", Some("https://example.org/g05"), &[
            AttemptStatus::Passed,
        ]);
        let report_file = dir.path().join("test-report.html");

        let builder = HistoryBuilder::new(dir.path(), &report_file);
        let summary = builder.build_at(ts("2025-11-04T09:00:00+01:00")).unwrap();
        assert!(summary.created);
        assert_eq!(summary.document_count, 1);
        assert_eq!(summary.totals.total, 1);
        assert_eq!(summary.totals.passed, 1);

        let html = std::fs::read_to_string(&report_file).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Storecheck test report history</h1>"));
        assert_eq!(html.matches("Test run from").count(), 1);
        assert!(html.contains("https://example.org/g05"));
        assert!(html.ends_with("</body>\n</html>\n"));
    }

    #[test]
    fn append_preserves_prior_sections_byte_for_byte() {
        let dir = tempdir().unwrap();
        write_document(dir.path(), "url-g05", Some("https://example.org/g05"), &[
            AttemptStatus::Failed,
            AttemptStatus::Passed,
        ]);
        let report_file = dir.path().join("test-report.html");
        let builder = HistoryBuilder::new(dir.path(), &report_file);

        builder.build_at(ts("2025-11-04T09:00:00+01:00")).unwrap();
        let first = std::fs::read_to_string(&report_file).unwrap();

        let summary = builder.build_at(ts("2025-11-05T09:00:00+01:00")).unwrap();
        assert!(!summary.created);
        let second = std::fs::read_to_string(&report_file).unwrap();

        let first_without_markers = first.strip_suffix("</body>\n</html>\n").unwrap();
        assert!(second.starts_with(first_without_markers));
        assert!(second.ends_with("</body>\n</html>\n"));
    }

    #[test]
    fn double_build_yields_two_sections_with_distinct_timestamps() {
        let dir = tempdir().unwrap();
        write_document(dir.path(), "url-g05", Some("https://example.org/g05"), &[
            AttemptStatus::Passed,
        ]);
        let report_file = dir.path().join("test-report.html");
        let builder = HistoryBuilder::new(dir.path(), &report_file);

        builder.build_at(ts("2025-11-04T09:00:00+01:00")).unwrap();
        builder.build_at(ts("2025-11-04T09:05:00+01:00")).unwrap();

        let html = std::fs::read_to_string(&report_file).unwrap();
        assert_eq!(html.matches("<div class=\"run\">").count(), 2);
        assert_eq!(html.matches("<details class=\"site\">").count(), 2);
        assert!(html.contains("2025-11-04T09:00:00+01:00"));
        assert!(html.contains("2025-11-04T09:05:00+01:00"));
    }

    #[test]
    fn sections_order_sites_by_url_with_name_fallback() {
        let dir = tempdir().unwrap();
        write_document(dir.path(), "url-g09", None, &[AttemptStatus::Passed]);
        write_document(dir.path(), "url-g05", Some("https://b.example"), &[
            AttemptStatus::Passed,
        ]);
        write_document(dir.path(), "url-g01", Some("https://a.example"), &[
            AttemptStatus::Passed,
        ]);
        let report_file = dir.path().join("test-report.html");

        HistoryBuilder::new(dir.path(), &report_file)
            .build_at(ts("2025-11-04T09:00:00+01:00"))
            .unwrap();

        let html = std::fs::read_to_string(&report_file).unwrap();
        let a = html.find("https://a.example").unwrap();
        let b = html.find("https://b.example").unwrap();
        let c = html.find("<span class=\"url\">url-g09</span>").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn missing_markers_fail_without_touching_the_report() {
        let dir = tempdir().unwrap();
        write_document(dir.path(), "url-g05", None, &[AttemptStatus::Passed]);
        let report_file = dir.path().join("test-report.html");
        let corrupt = "<!DOCTYPE html>\n<body>\n<p>half a report";
        std::fs::write(&report_file, corrupt).unwrap();

        let error = HistoryBuilder::new(dir.path(), &report_file)
            .build_at(ts("2025-11-04T09:00:00+01:00"))
            .unwrap_err();
        assert!(matches!(
            error,
            HistoryBuildError::MissingClosingMarkers { .. }
        ));
        assert_eq!(std::fs::read_to_string(&report_file).unwrap(), corrupt);
    }

    #[test]
    fn no_documents_is_fatal_and_writes_nothing() {
        let dir = tempdir().unwrap();
        // Files that don't follow the site document convention don't count.
        std::fs::write(dir.path().join("results-chromium.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let report_file = dir.path().join("test-report.html");

        let error = HistoryBuilder::new(dir.path(), &report_file)
            .build_at(ts("2025-11-04T09:00:00+01:00"))
            .unwrap_err();
        assert!(matches!(error, HistoryBuildError::NoSiteDocuments { .. }));
        assert!(!report_file.exists());
    }

    #[test]
    fn missing_results_dir_reports_no_documents() {
        let dir = tempdir().unwrap();
        let error = HistoryBuilder::new(
            dir.path().join("never-created"),
            dir.path().join("test-report.html"),
        )
        .build_at(ts("2025-11-04T09:00:00+01:00"))
        .unwrap_err();
        assert!(matches!(error, HistoryBuildError::NoSiteDocuments { .. }));
    }

    #[test]
    fn malformed_document_is_fatal() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("results-url-g05.json"), "not json").unwrap();
        let report_file = dir.path().join("test-report.html");

        let error = HistoryBuilder::new(dir.path(), &report_file)
            .build_at(ts("2025-11-04T09:00:00+01:00"))
            .unwrap_err();
        assert!(matches!(error, HistoryBuildError::ParseDocument { .. }));
        assert!(!report_file.exists());
    }
}
