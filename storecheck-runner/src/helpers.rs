// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! General support code for storecheck-runner.

/// Utilities for pluralizing various words based on count.
pub mod plural {
    /// Returns "document" if `count` is 1, otherwise "documents".
    pub fn documents_str(count: usize) -> &'static str {
        if count == 1 { "document" } else { "documents" }
    }

    /// Returns "project" if `count` is 1, otherwise "projects".
    pub fn projects_str(count: usize) -> &'static str {
        if count == 1 { "project" } else { "projects" }
    }

    /// Returns "event" if `count` is 1, otherwise "events".
    pub fn events_str(count: usize) -> &'static str {
        if count == 1 { "event" } else { "events" }
    }

    /// Returns "attempt" if `count` is 1, otherwise "attempts".
    pub fn attempts_str(count: usize) -> &'static str {
        if count == 1 { "attempt" } else { "attempts" }
    }
}
