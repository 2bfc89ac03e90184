// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the collect and report pipeline.
//!
//! These drive the CLI in-process: parse arguments, execute, then inspect the
//! files left on disk. Pipeline pieces with no CLI surface of their own are
//! covered through `integration_tests::pipeline`.

use camino::{Utf8Path, Utf8PathBuf};
use camino_tempfile::tempdir;
use clap::Parser;
use integration_tests::{
    events::{EventScript, attempt_spec, test_spec, with_error},
    pipeline::{collect_in_memory, document_path, materialize_script, read_document},
};
use pretty_assertions::assert_eq;
use storecheck_cli::{ExpectedError, OutputWriter, StorecheckApp};
use storecheck_metadata::ExitCode;

fn run(args: &[&str]) -> Result<i32, ExpectedError> {
    let app = StorecheckApp::try_parse_from(args).expect("CLI args parse");
    let output = app.init_output();
    app.exec(output, &mut OutputWriter::default())
}

fn write_events(dir: &Utf8Path, script: &EventScript) -> Utf8PathBuf {
    let file = dir.join("events.jsonl");
    std::fs::write(&file, script.script()).expect("events written");
    file
}

fn shop_run() -> EventScript {
    EventScript::new()
        .run_started(&[
            ("p1", "url-g05", Some("https://g05.example")),
            ("p2", "url-alpha", Some("https://alpha.example")),
            ("p3", "chromium", None),
        ])
        .attempt(
            "p1",
            test_spec("adds item to cart", "cart.spec.js", 12),
            attempt_spec("failed", 450.0, 0),
        )
        .attempt(
            "p1",
            test_spec("adds item to cart", "cart.spec.js", 12),
            attempt_spec("passed", 300.0, 1),
        )
        .attempt(
            "p2",
            test_spec("search finds a product", "search.spec.js", 8),
            attempt_spec("passed", 120.0, 0),
        )
        .attempt(
            "p3",
            test_spec("smoke", "smoke.spec.js", 1),
            attempt_spec("passed", 80.0, 0),
        )
        .run_finished()
}

#[test]
fn collect_then_report_round_trip() {
    let dir = tempdir().expect("created temp dir");
    let events_file = write_events(dir.path(), &shop_run());
    let results_dir = dir.path().join("tests-results");
    let report_file = dir.path().join("test-report.html");

    let code = run(&[
        "storecheck",
        "collect",
        "--events",
        events_file.as_str(),
        "--output-dir",
        results_dir.as_str(),
    ])
    .expect("collect succeeds");
    assert_eq!(code, ExitCode::OK);

    let g05 = read_document(&document_path(&results_dir, "url-g05"));
    assert_eq!(g05.project_name, "url-g05");
    assert_eq!(g05.tested_url.as_deref(), Some("https://g05.example"));
    assert_eq!(g05.stats.total, 2);
    assert_eq!(g05.stats.passed, 1);
    assert_eq!(g05.stats.failed, 1);

    let alpha = read_document(&document_path(&results_dir, "url-alpha"));
    assert_eq!(alpha.stats.total, 1);
    assert_eq!(alpha.stats.passed, 1);

    assert!(
        !document_path(&results_dir, "chromium").exists(),
        "non-site projects are not materialized"
    );

    let report_args = [
        "storecheck",
        "report",
        "--results-dir",
        results_dir.as_str(),
        "--report-file",
        report_file.as_str(),
    ];
    let code = run(&report_args).expect("report succeeds");
    assert_eq!(code, ExitCode::OK);

    let first = std::fs::read_to_string(&report_file).expect("report written");
    assert_eq!(first.matches(r#"<div class="run">"#).count(), 1);
    assert!(!first.contains("chromium"));

    let alpha_at = first
        .find("https://alpha.example")
        .expect("alpha section present");
    let g05_at = first.find("https://g05.example").expect("g05 section present");
    assert!(alpha_at < g05_at, "sites are ordered by URL");

    // A second build appends and keeps every prior byte.
    let code = run(&report_args).expect("second report succeeds");
    assert_eq!(code, ExitCode::OK);

    let second = std::fs::read_to_string(&report_file).expect("report still present");
    let prior = first
        .strip_suffix("</body>\n</html>\n")
        .expect("closing markers");
    assert!(second.starts_with(prior));
    assert_eq!(second.matches(r#"<div class="run">"#).count(), 2);
}

#[test]
fn retried_tests_keep_attempt_order_through_to_the_report() {
    let dir = tempdir().expect("created temp dir");
    let script = EventScript::new()
        .run_started(&[("p1", "url-g05", Some("https://g05.example"))])
        .attempt(
            "p1",
            test_spec("checkout", "checkout.spec.js", 5),
            attempt_spec("failed", 450.0, 0),
        )
        .attempt(
            "p1",
            test_spec("checkout", "checkout.spec.js", 5),
            attempt_spec("failed", 900.0, 1),
        )
        .attempt(
            "p1",
            test_spec("checkout", "checkout.spec.js", 5),
            attempt_spec("passed", 120.0, 2),
        )
        .run_finished();
    let events_file = write_events(dir.path(), &script);
    let results_dir = dir.path().join("tests-results");
    let report_file = dir.path().join("test-report.html");

    run(&[
        "storecheck",
        "collect",
        "--events",
        events_file.as_str(),
        "--output-dir",
        results_dir.as_str(),
    ])
    .expect("collect succeeds");

    let document = read_document(&document_path(&results_dir, "url-g05"));
    assert_eq!(document.tests.len(), 1);
    let retries: Vec<_> = document.tests[0].results.iter().map(|r| r.retry).collect();
    assert_eq!(retries, vec![0, 1, 2]);

    run(&[
        "storecheck",
        "report",
        "--results-dir",
        results_dir.as_str(),
        "--report-file",
        report_file.as_str(),
    ])
    .expect("report succeeds");

    let html = std::fs::read_to_string(&report_file).expect("report written");

    // The summary row reflects the last attempt.
    assert!(html.contains(r#"<td class="passed">passed</td>"#));
    assert!(html.contains("<td>120</td>"));

    // The detail block lists all three attempts in order.
    let retry_0 = html.find("retry: 0").expect("attempt 0 listed");
    let retry_1 = html.find("retry: 1").expect("attempt 1 listed");
    let retry_2 = html.find("retry: 2").expect("attempt 2 listed");
    assert!(retry_0 < retry_1 && retry_1 < retry_2);
}

#[test]
fn error_text_is_escaped_end_to_end() {
    let dir = tempdir().expect("created temp dir");
    let script = EventScript::new()
        .run_started(&[("p1", "url-g05", None)])
        .attempt(
            "p1",
            test_spec("shows a banner", "banner.spec.js", 3),
            with_error(
                attempt_spec("failed", 200.0, 0),
                r#"<script>alert("x") & more"#,
            ),
        )
        .run_finished();
    let events_file = write_events(dir.path(), &script);
    let results_dir = dir.path().join("tests-results");
    let report_file = dir.path().join("test-report.html");

    run(&[
        "storecheck",
        "collect",
        "--events",
        events_file.as_str(),
        "--output-dir",
        results_dir.as_str(),
    ])
    .expect("collect succeeds");
    run(&[
        "storecheck",
        "report",
        "--results-dir",
        results_dir.as_str(),
        "--report-file",
        report_file.as_str(),
    ])
    .expect("report succeeds");

    let html = std::fs::read_to_string(&report_file).expect("report written");
    assert!(html.contains("&lt;script&gt;alert(&quot;x&quot;) &amp; more"));
    assert!(!html.contains(r#"<script>alert("#));
}

#[test]
fn report_failures_map_to_distinct_exit_codes() {
    let dir = tempdir().expect("created temp dir");
    let results_dir = dir.path().join("tests-results");
    std::fs::create_dir(&results_dir).expect("results dir created");
    let report_file = dir.path().join("test-report.html");
    let report_args = [
        "storecheck",
        "report",
        "--results-dir",
        results_dir.as_str(),
        "--report-file",
        report_file.as_str(),
    ];

    // Empty results directory: missing input, nothing written.
    let err = run(&report_args).expect_err("no documents");
    assert_eq!(err.process_exit_code(), ExitCode::NO_RESULT_DOCUMENTS);
    assert!(!report_file.exists());

    // A document that does not parse.
    std::fs::write(results_dir.join("results-url-g05.json"), "{ broken")
        .expect("mangled document written");
    let err = run(&report_args).expect_err("document is mangled");
    assert_eq!(err.process_exit_code(), ExitCode::SETUP_ERROR);
    assert!(!report_file.exists());

    // Valid documents but a report that lost its closing markers: the
    // existing file is left exactly as it was.
    materialize_script(&shop_run().script(), &results_dir);
    std::fs::write(&report_file, "<html><body>truncated").expect("stub report written");
    let err = run(&report_args).expect_err("report is corrupt");
    assert_eq!(err.process_exit_code(), ExitCode::REPORT_FILE_CORRUPT);
    let untouched = std::fs::read_to_string(&report_file).expect("report readable");
    assert_eq!(untouched, "<html><body>truncated");
}

#[test]
fn stats_sum_to_total_for_every_project() {
    let dir = tempdir().expect("created temp dir");
    let results_dir = dir.path().join("tests-results");
    let script = EventScript::new()
        .run_started(&[("p1", "url-g05", None), ("p2", "url-alpha", None)])
        .attempt(
            "p1",
            test_spec("cart", "cart.spec.js", 12),
            attempt_spec("passed", 100.0, 0),
        )
        .attempt(
            "p1",
            test_spec("search", "search.spec.js", 8),
            attempt_spec("timedOut", 30_000.0, 0),
        )
        .attempt(
            "p2",
            test_spec("cart", "cart.spec.js", 12),
            attempt_spec("failed", 210.0, 0),
        )
        .attempt(
            "p2",
            test_spec("banner", "banner.spec.js", 3),
            attempt_spec("skipped", 0.0, 0),
        )
        .attempt(
            "p2",
            test_spec("checkout", "checkout.spec.js", 5),
            attempt_spec("interrupted", 50.0, 0),
        )
        .run_finished();

    let summary = materialize_script(&script.script(), &results_dir);
    assert_eq!(summary.written.len(), 2);
    assert!(summary.failures.is_empty());

    for written in &summary.written {
        let document = read_document(&written.file);
        let stats = &document.stats;
        assert_eq!(
            stats.passed + stats.failed + stats.skipped + stats.other,
            stats.total,
            "status counters sum to the total for {}",
            written.project_name,
        );
        let attempt_count: usize = document.tests.iter().map(|t| t.results.len()).sum();
        assert_eq!(stats.total, attempt_count);
    }
}

#[test]
fn unknown_event_kinds_are_skipped() {
    let script = EventScript::new()
        .run_started(&[("p1", "url-g05", None)])
        .raw_line(r#"{"kind":"engine-heartbeat","sequence":7}"#)
        .attempt(
            "p1",
            test_spec("loads", "home.spec.js", 2),
            attempt_spec("passed", 90.0, 0),
        )
        .run_finished();

    let results = collect_in_memory(&script.script());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].project_name, "url-g05");
    assert_eq!(results[0].tests.len(), 1);
}
