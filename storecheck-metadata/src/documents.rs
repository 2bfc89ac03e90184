// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-site result document model.
//!
//! One [`ProjectResultDocument`] is written per site project per run. The
//! shape is stable and kebab-case on the wire; readers should tolerate
//! missing optional fields, since documents may have been produced by older
//! versions of the collector.

use camino::Utf8PathBuf;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The status of one test attempt, as decided by the execution engine.
///
/// Statuses other than `Passed`, `Failed` and `Skipped` are counted in the
/// `other` bucket of [`ResultStats`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttemptStatus {
    /// The attempt passed.
    Passed,
    /// The attempt failed.
    Failed,
    /// The attempt exceeded its time budget.
    TimedOut,
    /// The test was skipped.
    Skipped,
    /// The attempt was interrupted before producing a result.
    Interrupted,
}

impl AttemptStatus {
    /// Parses a status string as emitted by the execution engine.
    ///
    /// Both the kebab-case form used on the wire and the camelCase form some
    /// engines emit (`timedOut`) are accepted. Returns `None` for anything
    /// else; callers decide the fallback.
    pub fn from_engine_str(s: &str) -> Option<Self> {
        match s {
            "passed" => Some(Self::Passed),
            "failed" => Some(Self::Failed),
            "timed-out" | "timedOut" => Some(Self::TimedOut),
            "skipped" => Some(Self::Skipped),
            "interrupted" => Some(Self::Interrupted),
            _ => None,
        }
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::TimedOut => "timed-out",
            Self::Skipped => "skipped",
            Self::Interrupted => "interrupted",
        };
        f.write_str(s)
    }
}

/// A source position within a test file.
///
/// Together with the title path this forms the identity of a test case.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceLocation {
    /// The file the test was declared in.
    pub file: Utf8PathBuf,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// One error observed during a test attempt.
///
/// All fields are optional; a meaningful error carries at least a message or
/// a stack trace.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ErrorRecord {
    /// Human-readable error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Stack trace text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Stringified raw value for non-exception errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Where the error was raised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    /// A code snippet around the error location, if the engine produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// One captured fragment of test output.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputChunk {
    /// The captured text.
    pub text: String,
}

impl OutputChunk {
    /// Creates a new chunk from any string-like value.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A file produced by a test attempt (screenshot, trace, download).
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AttachmentRecord {
    /// The attachment's name.
    #[serde(default)]
    pub name: String,
    /// MIME type.
    #[serde(default)]
    pub content_type: String,
    /// Where the attachment was stored, if it was written to disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Utf8PathBuf>,
}

/// An annotation declared on a test (skip reasons, issue links and so on).
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnnotationRecord {
    /// The annotation type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One execution attempt of one test case.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AttemptRecord {
    /// The outcome of this attempt.
    pub status: AttemptStatus,
    /// Wall-clock duration in milliseconds. Engine-reported negative values
    /// are clamped to zero at the ingestion boundary.
    pub duration_ms: u64,
    /// When the attempt started, if the engine reported it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<FixedOffset>>,
    /// Retry index: 0 for the first attempt.
    #[serde(default)]
    pub retry: u32,
    /// Index of the executing worker, if reported. Engines have been observed
    /// to emit -1 here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_index: Option<i64>,
    /// Index within the parallel shard, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_index: Option<i64>,
    /// The primary error for a failed attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorRecord>,
    /// Further errors beyond the primary one, in arrival order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorRecord>,
    /// Captured standard output, in arrival order.
    #[serde(default)]
    pub stdout: Vec<OutputChunk>,
    /// Captured standard error, in arrival order.
    #[serde(default)]
    pub stderr: Vec<OutputChunk>,
    /// Files produced by the attempt, in arrival order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentRecord>,
}

impl AttemptRecord {
    /// Creates a new attempt with the given status and no detail.
    pub fn new(status: AttemptStatus) -> Self {
        Self {
            status,
            duration_ms: 0,
            start_time: None,
            retry: 0,
            worker_index: None,
            parallel_index: None,
            error: None,
            errors: Vec::new(),
            stdout: Vec::new(),
            stderr: Vec::new(),
            attachments: Vec::new(),
        }
    }
}

/// One logical test with its full attempt history.
///
/// The identity of a test case is the (file, line, column, title path)
/// tuple, not its position in the document.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestCaseRecord {
    /// The test's own title.
    pub title: String,
    /// Ancestor titles followed by the test's own title.
    #[serde(default)]
    pub title_path: Vec<String>,
    /// Declared source location.
    pub location: SourceLocation,
    /// The status the engine expected this test to produce.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_status: Option<AttemptStatus>,
    /// Per-test timeout budget in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Declared annotations, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationRecord>,
    /// Every attempt observed for this test, in arrival order. The last
    /// entry is the most recent outcome.
    #[serde(default)]
    pub results: Vec<AttemptRecord>,
}

impl TestCaseRecord {
    /// Creates a new test case with no annotations or attempts.
    pub fn new(title: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            title: title.into(),
            title_path: Vec::new(),
            location,
            expected_status: None,
            timeout_ms: None,
            annotations: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Returns the most recent attempt, if any were recorded.
    pub fn last_attempt(&self) -> Option<&AttemptRecord> {
        self.results.last()
    }
}

/// Aggregate counters over every attempt in a document.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResultStats {
    /// Total number of attempts.
    pub total: usize,
    /// Attempts with status `passed`.
    pub passed: usize,
    /// Attempts with status `failed`.
    pub failed: usize,
    /// Attempts with status `skipped`.
    pub skipped: usize,
    /// Attempts with any other status (timed out, interrupted).
    pub other: usize,
    /// Wall-clock span of the project's run in milliseconds, from the first
    /// observation to the last.
    pub duration_ms: u64,
}

impl ResultStats {
    /// Counts one attempt towards the totals.
    pub fn record(&mut self, status: AttemptStatus) {
        self.total += 1;
        match status {
            AttemptStatus::Passed => self.passed += 1,
            AttemptStatus::Failed => self.failed += 1,
            AttemptStatus::Skipped => self.skipped += 1,
            AttemptStatus::TimedOut | AttemptStatus::Interrupted => self.other += 1,
        }
    }

    /// Sums another project's status counters into this one.
    ///
    /// Durations are wall-clock bounds per project and are deliberately not
    /// combined.
    pub fn merge_counts(&mut self, other: &ResultStats) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.other += other.other;
    }
}

/// The durable result document for one site project in one run.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectResultDocument {
    /// When the document was generated.
    pub generated_at: DateTime<FixedOffset>,
    /// Resolved project name.
    pub project_name: String,
    /// The URL the project tested, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tested_url: Option<String>,
    /// Aggregate counters over all attempts in `tests`.
    pub stats: ResultStats,
    /// Every test observed for this project, in first-seen order.
    #[serde(default)]
    pub tests: Vec<TestCaseRecord>,
}
