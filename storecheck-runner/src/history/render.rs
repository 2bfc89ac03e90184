// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTML rendering for the historical report.
//!
//! Every piece of free text flows through [`escape_html`] before it is
//! embedded, so engine-supplied strings can never alter the markup around
//! them. Layout classes match the inline stylesheet in [`page_shell`].

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use storecheck_metadata::{AttemptRecord, ProjectResultDocument, ResultStats, TestCaseRecord};
use swrite::{SWrite, swrite};

/// The fixed page shell written when no report file exists yet.
///
/// Ends with the closing markers that every append strips and re-emits.
pub(super) fn page_shell() -> &'static str {
    SHELL
}

const SHELL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>Storecheck test report history</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 20px; }
    h1 { margin-bottom: 6px; }
    .meta { color: #555; margin-bottom: 16px; }
    .run { margin: 24px 0 40px; }
    details.site { border: 1px solid #bbb; border-radius: 8px; padding: 10px 12px; margin: 12px 0; }
    details.test { border: 1px solid #ddd; border-radius: 8px; padding: 8px 10px; margin: 8px 0; background: #fafafa; }
    summary { cursor: pointer; font-weight: bold; }
    table { width: 100%; border-collapse: collapse; margin-top: 10px; }
    th, td { border: 1px solid #ccc; padding: 8px; text-align: left; vertical-align: top; }
    th { background: #f2f2f2; }
    .passed { font-weight: bold; color: green; }
    .failed { font-weight: bold; color: red; }
    .skipped { font-weight: bold; color: #777; }
    .pill { display: inline-block; padding: 2px 8px; border-radius: 999px; border: 1px solid #ccc; margin-left: 8px; font-size: 12px; color: #333; }
    .url { word-break: break-all; }
    pre { white-space: pre-wrap; margin: 6px 0 0; }
    .small { color: #666; font-size: 12px; }
  </style>
</head>
<body>
  <h1>Storecheck test report history</h1>
  <div class="meta">Extended on every run. Source: <code>tests-results/results-url-*.json</code></div>
</body>
</html>"#;

/// Strips the trailing `</body></html>` markers, tolerating whitespace
/// between and after them, case-insensitively.
///
/// Returns `None` when the markers are not the last markup in the file, in
/// which case appending would land inside already-closed markup.
pub(super) fn strip_closing_markers(html: &str) -> Option<&str> {
    let before_html = strip_suffix_ignore_ascii_case(html.trim_end(), "</html>")?;
    strip_suffix_ignore_ascii_case(before_html.trim_end(), "</body>")
}

fn strip_suffix_ignore_ascii_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    if !s.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = s.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

/// Renders one complete run section: heading, run-level pills, and one
/// collapsible block per site document, in the order given.
pub(super) fn render_run_section(
    now: DateTime<FixedOffset>,
    totals: &ResultStats,
    documents: &[ProjectResultDocument],
) -> String {
    let run_label = escape_html(&local_label(now));
    let run_iso = escape_html(&now.to_rfc3339());

    let mut out = String::new();
    swrite!(
        out,
        r#"
<hr/>
<div class="run">
  <h2 style="margin:0;">Test run from {run_label}</h2>
  <div class="small">generatedAt: <code>{run_iso}</code></div>
  <div style="margin-top:8px;">
    <span class="pill">Total: {total}</span>
    <span class="pill passed">Passed: {passed}</span>
    <span class="pill failed">Failed: {failed}</span>
    <span class="pill skipped">Skipped: {skipped}</span>
    <span class="pill">Other: {other}</span>
  </div>
"#,
        total = totals.total,
        passed = totals.passed,
        failed = totals.failed,
        skipped = totals.skipped,
        other = totals.other,
    );

    for document in documents {
        render_site(&mut out, document);
    }

    swrite!(out, "\n</div>\n");
    out
}

fn render_site(out: &mut String, document: &ProjectResultDocument) {
    let url = document.tested_url.as_deref().unwrap_or("");
    let name = &document.project_name;
    let stats = &document.stats;
    // An empty URL falls back to the project name in the summary line.
    let heading = if url.is_empty() { name } else { url };

    swrite!(
        out,
        r#"
  <details class="site">
    <summary>
      <span class="url">{heading}</span>
      <span class="pill">{name}</span>
      <span class="pill passed">P: {passed}</span>
      <span class="pill failed">F: {failed}</span>
      <span class="pill skipped">S: {skipped}</span>
      <span class="pill">T: {total}</span>
    </summary>
"#,
        heading = escape_html(heading),
        name = escape_html(name),
        passed = stats.passed,
        failed = stats.failed,
        skipped = stats.skipped,
        total = stats.total,
    );

    if !url.is_empty() {
        swrite!(
            out,
            "    <div class=\"small\">Link: <a class=\"url\" href=\"{url}\" target=\"_blank\" rel=\"noreferrer\">{url}</a></div>\n",
            url = escape_html(url),
        );
    }

    swrite!(
        out,
        r#"
    <table>
      <thead>
        <tr>
          <th>Status</th>
          <th>Test</th>
          <th>File</th>
          <th>Last duration (ms)</th>
          <th>Last start</th>
          <th>Details</th>
        </tr>
      </thead>
      <tbody>
"#
    );

    for test in &document.tests {
        render_test_row(out, test);
    }

    swrite!(
        out,
        r#"      </tbody>
    </table>
  </details>
"#
    );
}

fn render_test_row(out: &mut String, test: &TestCaseRecord) {
    // The summary row reflects the most recent attempt; a test that never
    // reported an attempt renders as unknown with blank timing cells.
    let last = test.last_attempt();
    let status = match last {
        Some(attempt) => attempt.status.to_string(),
        None => "unknown".to_owned(),
    };
    let last_duration = last
        .map(|attempt| attempt.duration_ms.to_string())
        .unwrap_or_default();
    let last_start = last
        .and_then(|attempt| attempt.start_time)
        .map(local_label)
        .unwrap_or_default();
    let title = if test.title_path.is_empty() {
        test.title.clone()
    } else {
        test.title_path.join(" › ")
    };

    swrite!(
        out,
        r#"        <tr>
          <td class="{status}">{status}</td>
          <td>{title}</td>
          <td>{location}</td>
          <td>{last_duration}</td>
          <td>{last_start}</td>
          <td>
"#,
        status = escape_html(&status),
        title = escape_html(&title),
        location = escape_html(&test.location.to_string()),
    );

    render_test_details(out, test);

    swrite!(out, "          </td>\n        </tr>\n");
}

fn render_test_details(out: &mut String, test: &TestCaseRecord) {
    let expected = test
        .expected_status
        .map(|status| status.to_string())
        .unwrap_or_default();
    let timeout = test
        .timeout_ms
        .map(|timeout| timeout.to_string())
        .unwrap_or_default();

    swrite!(
        out,
        r#"            <details class="test">
              <summary>show</summary>
              <div class="small"><b>Expected:</b> {expected} &nbsp; <b>Timeout:</b> {timeout}</div>
"#,
        expected = escape_html(&expected),
    );

    if !test.annotations.is_empty() {
        swrite!(
            out,
            "              <div class=\"small\"><b>Annotations:</b> {}</div>\n",
            escape_html(&compact_json(&test.annotations)),
        );
    }

    swrite!(
        out,
        "              <h4 style=\"margin:10px 0 6px;\">Results (including retries)</h4>\n"
    );

    for attempt in &test.results {
        render_attempt(out, attempt);
    }

    swrite!(out, "            </details>\n");
}

fn render_attempt(out: &mut String, attempt: &AttemptRecord) {
    let start = attempt.start_time.map(local_label).unwrap_or_default();

    swrite!(
        out,
        r#"              <div style="border:1px solid #e0e0e0; border-radius:8px; padding:8px; margin:8px 0; background:#fff;">
                <div>
                  <span class="{status}">{status}</span>
                  <span class="pill">retry: {retry}</span>
                  <span class="pill">duration: {duration}ms</span>
                  <span class="pill">start: {start}</span>
                </div>
"#,
        status = escape_html(&attempt.status.to_string()),
        retry = attempt.retry,
        duration = attempt.duration_ms,
    );

    if let Some(error) = &attempt.error {
        if let Some(message) = &error.message {
            labeled_pre(out, "Error message", message);
        }
        if let Some(stack) = &error.stack {
            labeled_pre(out, "Stack", stack);
        }
        if let Some(location) = &error.location {
            swrite!(
                out,
                "                <div class=\"small\"><b>Error location:</b> {}</div>\n",
                escape_html(&location.to_string()),
            );
        }
        if let Some(snippet) = &error.snippet {
            labeled_pre(out, "Snippet", snippet);
        }
    }

    if !attempt.errors.is_empty() {
        labeled_pre(out, "Additional errors", &pretty_json(&attempt.errors));
    }

    let stdout = concat_chunks(&attempt.stdout);
    if !stdout.is_empty() {
        labeled_pre(out, "stdout", &stdout);
    }
    let stderr = concat_chunks(&attempt.stderr);
    if !stderr.is_empty() {
        labeled_pre(out, "stderr", &stderr);
    }

    if !attempt.attachments.is_empty() {
        labeled_pre(out, "attachments", &pretty_json(&attempt.attachments));
    }

    swrite!(out, "              </div>\n");
}

fn labeled_pre(out: &mut String, label: &str, text: &str) {
    swrite!(
        out,
        "                <div style=\"margin-top:6px;\"><b>{label}:</b><pre>{}</pre></div>\n",
        escape_html(text),
    );
}

fn concat_chunks(chunks: &[storecheck_metadata::OutputChunk]) -> String {
    chunks.iter().map(|chunk| chunk.text.as_str()).collect()
}

fn local_label(ts: DateTime<FixedOffset>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn compact_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).expect("document data serializes to JSON")
}

fn pretty_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).expect("document data serializes to JSON")
}

/// Escapes `&`, `<`, `>`, `"` and `'` for embedding in markup.
pub(super) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
