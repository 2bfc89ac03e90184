// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `storecheck` failures.
///
/// `storecheck` invocations may fail for a variety of reasons. This structure
/// documents the exit codes that may occur in case of expected failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum ExitCode {}

impl ExitCode {
    /// No errors occurred and storecheck exited normally.
    pub const OK: i32 = 0;

    /// Building a report found no matching result documents in the results
    /// directory.
    pub const NO_RESULT_DOCUMENTS: i32 = 1;

    /// An event stream was consumed to completion, but no site projects were
    /// recognized in it.
    pub const NO_PROJECTS_RECOGNIZED: i32 = 4;

    /// A user issue happened while setting up a storecheck invocation, such
    /// as the results directory not being creatable.
    pub const SETUP_ERROR: i32 = 96;

    /// The existing report file's closing markers could not be located, so
    /// appending to it would produce invalid markup.
    pub const REPORT_FILE_CORRUPT: i32 = 102;

    /// The event stream could not be read, or a line in it failed to parse.
    pub const INVALID_EVENT_STREAM: i32 = 104;

    /// Writing an output file produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
