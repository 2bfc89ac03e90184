// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine-facing event types.
//!
//! The execution engine (or a thin adapter inside it) emits one JSON object
//! per line. The shapes here are deliberately loose: every field is optional
//! and unknown event kinds deserialize to [`EngineEvent::Unknown`], because
//! the engine's output is a third-party contract that has varied across
//! versions. [`crate::reporter::normalize`] turns these into the strict
//! document model.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One event emitted by the execution engine.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EngineEvent {
    /// The run began and the engine declared its projects.
    #[serde(rename_all = "kebab-case")]
    RunStarted {
        /// When the run began.
        #[serde(default)]
        timestamp: Option<DateTime<FixedOffset>>,
        /// The declared projects, possibly incomplete.
        #[serde(default)]
        projects: Vec<ProjectDeclaration>,
    },

    /// One attempt of one test finished.
    #[serde(rename_all = "kebab-case")]
    AttemptFinished {
        /// When the attempt finished.
        #[serde(default)]
        timestamp: Option<DateTime<FixedOffset>>,
        /// Stable internal id of the owning project.
        #[serde(default)]
        project_id: Option<String>,
        /// Display name of the owning project.
        #[serde(default)]
        project_name: Option<String>,
        /// The test this attempt belongs to.
        #[serde(default)]
        test: EngineTest,
        /// The attempt itself.
        #[serde(default)]
        attempt: EngineAttempt,
    },

    /// The run finished; no further attempts will arrive.
    #[serde(rename_all = "kebab-case")]
    RunFinished {
        /// When the run finished.
        #[serde(default)]
        timestamp: Option<DateTime<FixedOffset>>,
    },

    /// An event kind this version does not know about. Skipped with a
    /// warning rather than failing the stream.
    #[serde(other)]
    Unknown,
}

impl EngineEvent {
    /// Returns the event's own timestamp, if it carried one.
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::RunStarted { timestamp, .. }
            | Self::AttemptFinished { timestamp, .. }
            | Self::RunFinished { timestamp } => *timestamp,
            Self::Unknown => None,
        }
    }
}

/// A project as declared at run start.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectDeclaration {
    /// Stable internal id.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// The URL this project tests, from the project's metadata.
    #[serde(default)]
    pub tested_url: Option<String>,
}

/// Test identity and metadata as reported by the engine.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineTest {
    /// The test's own title.
    #[serde(default)]
    pub title: Option<String>,
    /// Ancestor titles followed by the test's own title.
    #[serde(default)]
    pub title_path: Vec<String>,
    /// Declared source location.
    #[serde(default)]
    pub location: Option<EngineLocation>,
    /// The status the engine expects this test to produce.
    #[serde(default)]
    pub expected_status: Option<String>,
    /// Per-test timeout budget in milliseconds.
    #[serde(default)]
    pub timeout: Option<f64>,
    /// Declared annotations.
    #[serde(default)]
    pub annotations: Vec<EngineAnnotation>,
    /// Some engine versions attach the project id to the test rather than
    /// the event.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Likewise for the display name.
    #[serde(default)]
    pub project_name: Option<String>,
}

/// A source position; any part may be missing.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineLocation {
    /// Source file.
    #[serde(default)]
    pub file: Option<String>,
    /// 1-based line.
    #[serde(default)]
    pub line: Option<u32>,
    /// 1-based column.
    #[serde(default)]
    pub column: Option<u32>,
}

/// An annotation as reported by the engine.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineAnnotation {
    /// The annotation type.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// One attempt outcome as reported by the engine.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineAttempt {
    /// Status string; recognized values are passed, failed, timed-out
    /// (or timedOut), skipped and interrupted.
    #[serde(default)]
    pub status: Option<String>,
    /// Duration in milliseconds. Engines report fractional and, around
    /// clock adjustments, negative values.
    #[serde(default)]
    pub duration: Option<f64>,
    /// When the attempt started.
    #[serde(default)]
    pub start_time: Option<DateTime<FixedOffset>>,
    /// Retry index, 0 for the first attempt.
    #[serde(default)]
    pub retry: Option<i64>,
    /// Index of the executing worker.
    #[serde(default)]
    pub worker_index: Option<i64>,
    /// Index within the parallel shard.
    #[serde(default)]
    pub parallel_index: Option<i64>,
    /// The primary error.
    #[serde(default)]
    pub error: Option<EngineError>,
    /// Further errors.
    #[serde(default)]
    pub errors: Vec<EngineError>,
    /// Captured standard output.
    #[serde(default)]
    pub stdout: Vec<EngineOutputChunk>,
    /// Captured standard error.
    #[serde(default)]
    pub stderr: Vec<EngineOutputChunk>,
    /// Files produced by the attempt.
    #[serde(default)]
    pub attachments: Vec<EngineAttachment>,
}

/// An error as reported by the engine.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineError {
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Stack trace text.
    #[serde(default)]
    pub stack: Option<String>,
    /// The thrown value for non-exception errors. Engines emit strings here,
    /// but any JSON value is accepted and stringified.
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    /// Where the error was raised.
    #[serde(default)]
    pub location: Option<EngineLocation>,
    /// Code snippet around the error location.
    #[serde(default)]
    pub snippet: Option<String>,
}

/// One captured output fragment.
///
/// Engines emit either bare strings or `{ "text": ... }` objects depending
/// on version; both are accepted.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EngineOutputChunk {
    /// An object-wrapped fragment.
    Object {
        /// The captured text.
        text: String,
    },
    /// A bare string fragment.
    Plain(String),
}

/// An attachment as reported by the engine.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineAttachment {
    /// The attachment's name.
    #[serde(default)]
    pub name: Option<String>,
    /// MIME type.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Where the attachment was stored.
    #[serde(default)]
    pub path: Option<String>,
}
