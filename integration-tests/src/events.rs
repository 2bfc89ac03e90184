// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for engine event scripts.
//!
//! Events are built as raw JSON lines rather than through the runner's typed
//! events, so tests exercise the same wire format a real engine would emit.

use serde_json::{Value, json};

/// Accumulates engine event lines for feeding to `storecheck collect`.
#[derive(Clone, Debug, Default)]
pub struct EventScript {
    lines: Vec<String>,
}

impl EventScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a run start with `(id, name, tested-url)` project triples.
    pub fn run_started(mut self, projects: &[(&str, &str, Option<&str>)]) -> Self {
        let projects: Vec<Value> = projects
            .iter()
            .map(|(id, name, url)| {
                let mut project = json!({ "id": id, "name": name });
                if let Some(url) = url {
                    project["tested-url"] = json!(url);
                }
                project
            })
            .collect();
        self.push(json!({
            "kind": "run-started",
            "timestamp": "2026-03-01T09:00:00+01:00",
            "projects": projects,
        }));
        self
    }

    /// Records one finished attempt for a test in the given project.
    ///
    /// Build `test` with [`test_spec`] and `attempt` with [`attempt_spec`],
    /// or pass hand-rolled values for edge cases.
    pub fn attempt(mut self, project_id: &str, test: Value, attempt: Value) -> Self {
        self.push(json!({
            "kind": "attempt-finished",
            "project-id": project_id,
            "test": test,
            "attempt": attempt,
        }));
        self
    }

    pub fn run_finished(mut self) -> Self {
        self.push(json!({
            "kind": "run-finished",
            "timestamp": "2026-03-01T09:00:30+01:00",
        }));
        self
    }

    /// Appends a line verbatim, valid JSON or not.
    pub fn raw_line(mut self, line: &str) -> Self {
        self.lines.push(line.to_owned());
        self
    }

    /// Renders the script as newline-delimited JSON.
    pub fn script(&self) -> String {
        let mut script = self.lines.join("\n");
        script.push('\n');
        script
    }

    fn push(&mut self, event: Value) {
        self.lines.push(event.to_string());
    }
}

/// A `test` block for [`EventScript::attempt`].
pub fn test_spec(title: &str, file: &str, line: u32) -> Value {
    json!({
        "title": title,
        "title-path": [file, title],
        "location": { "file": file, "line": line, "column": 3 },
    })
}

/// An `attempt` block for [`EventScript::attempt`].
pub fn attempt_spec(status: &str, duration_ms: f64, retry: i64) -> Value {
    json!({ "status": status, "duration": duration_ms, "retry": retry })
}

/// Adds an error record to an attempt built by [`attempt_spec`].
pub fn with_error(mut attempt: Value, message: &str) -> Value {
    attempt["error"] = json!({ "message": message });
    attempt
}
