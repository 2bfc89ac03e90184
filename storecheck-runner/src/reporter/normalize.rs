// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion from loose engine records to the document model.
//!
//! Every function here is total: whatever the engine omitted or mangled,
//! the output is a well-formed record. The defaults are part of the
//! ingestion contract and documented per function.

use crate::reporter::events::{
    EngineAnnotation, EngineAttachment, EngineAttempt, EngineError, EngineLocation,
    EngineOutputChunk, EngineTest,
};
use storecheck_metadata::{
    AnnotationRecord, AttachmentRecord, AttemptRecord, AttemptStatus, ErrorRecord, OutputChunk,
    SourceLocation, TestCaseRecord,
};
use tracing::warn;

/// Normalizes one attempt outcome.
///
/// Defaults: a missing or unrecognized status records as `interrupted`
/// (with a warning); durations clamp to non-negative whole milliseconds;
/// a missing retry index is 0; absent collections become empty.
pub fn normalize_attempt(attempt: EngineAttempt) -> AttemptRecord {
    AttemptRecord {
        status: normalize_status(attempt.status.as_deref()),
        duration_ms: clamp_millis(attempt.duration),
        start_time: attempt.start_time,
        retry: attempt
            .retry
            .map(|r| u32::try_from(r.max(0)).unwrap_or(u32::MAX))
            .unwrap_or(0),
        worker_index: attempt.worker_index,
        parallel_index: attempt.parallel_index,
        error: attempt.error.map(normalize_error),
        errors: attempt.errors.into_iter().map(normalize_error).collect(),
        stdout: normalize_chunks(attempt.stdout),
        stderr: normalize_chunks(attempt.stderr),
        attachments: attempt
            .attachments
            .into_iter()
            .map(normalize_attachment)
            .collect(),
    }
}

/// Normalizes test identity and metadata, with an empty attempt list.
///
/// Defaults: a missing title is empty; a missing title path falls back to
/// the bare title so rows and identity keys stay meaningful; an
/// unrecognized expected status is dropped rather than guessed.
pub fn normalize_test(test: EngineTest) -> TestCaseRecord {
    let title = test.title.unwrap_or_default();
    let title_path = if test.title_path.is_empty() && !title.is_empty() {
        vec![title.clone()]
    } else {
        test.title_path
    };
    TestCaseRecord {
        title,
        title_path,
        location: test.location.map(normalize_location).unwrap_or_default(),
        expected_status: test
            .expected_status
            .as_deref()
            .and_then(AttemptStatus::from_engine_str),
        timeout_ms: test.timeout.map(|t| t.max(0.0).round() as u64),
        annotations: test
            .annotations
            .into_iter()
            .map(normalize_annotation)
            .collect(),
        results: Vec::new(),
    }
}

/// Normalizes one error record. A non-string thrown value is stringified as
/// JSON.
pub fn normalize_error(error: EngineError) -> ErrorRecord {
    ErrorRecord {
        message: error.message,
        stack: error.stack,
        value: error.value.map(|v| match v {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        }),
        location: error.location.map(normalize_location),
        snippet: error.snippet,
    }
}

/// Normalizes a source position; missing parts become empty/zero.
pub fn normalize_location(location: EngineLocation) -> SourceLocation {
    SourceLocation {
        file: location.file.unwrap_or_default().into(),
        line: location.line.unwrap_or(0),
        column: location.column.unwrap_or(0),
    }
}

/// Normalizes an attachment; missing names and MIME types become empty.
pub fn normalize_attachment(attachment: EngineAttachment) -> AttachmentRecord {
    AttachmentRecord {
        name: attachment.name.unwrap_or_default(),
        content_type: attachment.content_type.unwrap_or_default(),
        path: attachment.path.map(Into::into),
    }
}

/// Normalizes captured output fragments, unwrapping both accepted shapes.
pub fn normalize_chunks(chunks: Vec<EngineOutputChunk>) -> Vec<OutputChunk> {
    chunks
        .into_iter()
        .map(|chunk| match chunk {
            EngineOutputChunk::Object { text } => OutputChunk { text },
            EngineOutputChunk::Plain(text) => OutputChunk { text },
        })
        .collect()
}

fn normalize_annotation(annotation: EngineAnnotation) -> AnnotationRecord {
    AnnotationRecord {
        kind: annotation.kind.unwrap_or_default(),
        description: annotation.description,
    }
}

fn normalize_status(status: Option<&str>) -> AttemptStatus {
    match status {
        Some(s) => AttemptStatus::from_engine_str(s).unwrap_or_else(|| {
            warn!("unrecognized attempt status `{s}`, recording as interrupted");
            AttemptStatus::Interrupted
        }),
        None => {
            warn!("attempt arrived without a status, recording as interrupted");
            AttemptStatus::Interrupted
        }
    }
}

/// Clamps an engine-reported duration to non-negative whole milliseconds.
fn clamp_millis(millis: Option<f64>) -> u64 {
    // Saturating float-to-int cast; NaN maps to 0.
    millis.unwrap_or(0.0).max(0.0).round() as u64
}
