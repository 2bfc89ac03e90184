// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Naming conventions shared by the collector and the report builder.
//!
//! Site projects are distinguished from auxiliary engine projects by the
//! [`SITE_PROJECT_PREFIX`] on their name; only site projects are
//! materialized, and only their documents are read back when building the
//! report history.

/// Name prefix identifying a site-under-test project.
pub static SITE_PROJECT_PREFIX: &str = "url-";

/// File name prefix for materialized result documents.
pub static RESULT_DOCUMENT_PREFIX: &str = "results-";

/// File name suffix for materialized result documents.
pub static RESULT_DOCUMENT_SUFFIX: &str = ".json";

/// Default results directory, relative to the working directory.
pub static DEFAULT_RESULTS_DIR: &str = "tests-results";

/// Default report file, relative to the working directory.
pub static DEFAULT_REPORT_FILE: &str = "test-report.html";

/// Returns true if a project name follows the site-under-test convention.
pub fn is_site_project(project_name: &str) -> bool {
    project_name.starts_with(SITE_PROJECT_PREFIX)
}

/// Reduces a project name to a filesystem-safe token.
///
/// Every run of characters outside `[A-Za-z0-9_.-]` becomes a single `_`,
/// so `url-shop (v2)` becomes `url-shop_v2_` rather than accumulating one
/// underscore per replaced character.
pub fn sanitize_project_name(project_name: &str) -> String {
    let mut out = String::with_capacity(project_name.len());
    let mut in_run = false;
    for c in project_name.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// Returns the document file name for a project.
pub fn result_document_file_name(project_name: &str) -> String {
    format!(
        "{RESULT_DOCUMENT_PREFIX}{}{RESULT_DOCUMENT_SUFFIX}",
        sanitize_project_name(project_name)
    )
}

/// Returns true if a file name is a materialized site-project document.
///
/// Documents for auxiliary projects (should any exist) are not picked up by
/// the report builder.
pub fn is_site_document_file_name(file_name: &str) -> bool {
    file_name
        .strip_prefix(RESULT_DOCUMENT_PREFIX)
        .is_some_and(|rest| rest.starts_with(SITE_PROJECT_PREFIX))
        && file_name.ends_with(RESULT_DOCUMENT_SUFFIX)
}
