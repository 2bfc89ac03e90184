// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-site result accumulation.
//!
//! A [`SiteAccumulator`] lives for exactly one run: created at run start,
//! fed every engine event, and consumed into per-project results at run
//! end. There is no process-wide state, so accumulators for separate runs
//! never interfere.

use crate::reporter::{
    events::{EngineAttempt, EngineEvent, EngineTest, ProjectDeclaration},
    normalize::{normalize_attempt, normalize_test},
    resolve::{ProjectHints, ProjectRegistry, resolve_project_name},
};
use chrono::{DateTime, FixedOffset, Local};
use indexmap::IndexMap;
use std::sync::{Mutex, PoisonError};
use storecheck_metadata::{SourceLocation, TestCaseRecord};
use tracing::warn;

/// Collects every attempt outcome observed during one run, bucketed by
/// logical project.
///
/// [`record_event`](Self::record_event) may be called concurrently from
/// multiple worker threads; the bucket table is guarded by a mutex so that
/// two attempts for the same test arriving together cannot race the
/// find-or-create step.
#[derive(Debug)]
pub struct SiteAccumulator {
    state: Mutex<AccumulatorState>,
}

impl SiteAccumulator {
    /// Creates an empty accumulator for a new run.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AccumulatorState::default()),
        }
    }

    /// Records one engine event.
    ///
    /// Events carry their own timestamps where the engine provides them;
    /// otherwise the local wall clock is used.
    pub fn record_event(&self, event: EngineEvent) {
        let timestamp = event
            .timestamp()
            .unwrap_or_else(|| Local::now().fixed_offset());
        // Recover poisoned locks: a worker that panicked mid-record must not
        // discard the rest of the run's results.
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match event {
            EngineEvent::RunStarted { projects, .. } => {
                state.run_started(timestamp, &projects);
            }
            EngineEvent::AttemptFinished {
                project_id,
                project_name,
                test,
                attempt,
                ..
            } => {
                state.record_attempt(timestamp, project_id, project_name, test, attempt);
            }
            EngineEvent::RunFinished { .. } => {
                // Nothing to fold here; materialization happens separately.
            }
            EngineEvent::Unknown => {
                warn!("skipping unrecognized engine event");
            }
        }
    }

    /// Consumes the accumulator into per-project results, in first-seen
    /// project order.
    pub fn into_results(self) -> Vec<ProjectResults> {
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let registry = state.registry;
        state
            .buckets
            .into_iter()
            .map(|(project_name, bucket)| {
                let tested_url = registry.tested_url(&project_name).map(str::to_owned);
                ProjectResults {
                    project_name,
                    tested_url,
                    tests: bucket.tests.into_values().collect(),
                    started_at: bucket.started_at,
                    last_seen_at: bucket.last_seen_at,
                }
            })
            .collect()
    }
}

impl Default for SiteAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// One project's accumulated results, ready to materialize.
#[derive(Clone, Debug)]
pub struct ProjectResults {
    /// Resolved project name.
    pub project_name: String,
    /// The URL this project tests, if declared at run start.
    pub tested_url: Option<String>,
    /// Every test observed for this project, in first-seen order.
    pub tests: Vec<TestCaseRecord>,
    /// When the project was first observed.
    pub started_at: DateTime<FixedOffset>,
    /// When the project's last attempt was observed.
    pub last_seen_at: DateTime<FixedOffset>,
}

#[derive(Debug, Default)]
struct AccumulatorState {
    registry: ProjectRegistry,
    buckets: IndexMap<String, ProjectBucket>,
}

impl AccumulatorState {
    fn run_started(&mut self, timestamp: DateTime<FixedOffset>, projects: &[ProjectDeclaration]) {
        for declaration in projects {
            self.registry.register(declaration);
            if let Some(name) = &declaration.name {
                self.buckets
                    .entry(name.clone())
                    .or_insert_with(|| ProjectBucket::new(timestamp));
            }
        }
    }

    fn record_attempt(
        &mut self,
        timestamp: DateTime<FixedOffset>,
        project_id: Option<String>,
        project_name: Option<String>,
        test: EngineTest,
        attempt: EngineAttempt,
    ) {
        let hints = ProjectHints {
            test_project_id: test.project_id.as_deref(),
            event_project_id: project_id.as_deref(),
            test_project_name: test.project_name.as_deref(),
            event_project_name: project_name.as_deref(),
        };
        let resolved = resolve_project_name(&self.registry, &hints);

        // Buckets for projects that were not declared up front are created
        // on first sight, with that sight as their start bound.
        let bucket = self
            .buckets
            .entry(resolved)
            .or_insert_with(|| ProjectBucket::new(timestamp));
        bucket.last_seen_at = timestamp;

        let test_record = normalize_test(test);
        let key = TestCaseKey {
            location: test_record.location.clone(),
            title_path: test_record.title_path.clone(),
        };
        let case = bucket.tests.entry(key).or_insert(test_record);
        case.results.push(normalize_attempt(attempt));
    }
}

#[derive(Debug)]
struct ProjectBucket {
    tests: IndexMap<TestCaseKey, TestCaseRecord>,
    started_at: DateTime<FixedOffset>,
    last_seen_at: DateTime<FixedOffset>,
}

impl ProjectBucket {
    fn new(timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            tests: IndexMap::new(),
            started_at: timestamp,
            last_seen_at: timestamp,
        }
    }
}

/// What makes a test the same logical test across retries: its declared
/// position and full title path, not object identity.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct TestCaseKey {
    location: SourceLocation,
    title_path: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::events::EngineLocation;
    use pretty_assertions::assert_eq;
    use storecheck_metadata::AttemptStatus;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        s.parse().unwrap()
    }

    fn run_started(projects: &[(&str, &str, Option<&str>)]) -> EngineEvent {
        EngineEvent::RunStarted {
            timestamp: Some(ts("2025-11-04T08:00:00+01:00")),
            projects: projects
                .iter()
                .map(|(id, name, url)| ProjectDeclaration {
                    id: Some((*id).to_owned()),
                    name: Some((*name).to_owned()),
                    tested_url: url.map(str::to_owned),
                })
                .collect(),
        }
    }

    fn attempt_for(
        project_id: &str,
        title: &str,
        line: u32,
        retry: i64,
        status: &str,
        timestamp: &str,
    ) -> EngineEvent {
        EngineEvent::AttemptFinished {
            timestamp: Some(ts(timestamp)),
            project_id: Some(project_id.to_owned()),
            project_name: None,
            test: EngineTest {
                title: Some(title.to_owned()),
                title_path: vec!["suite".to_owned(), title.to_owned()],
                location: Some(EngineLocation {
                    file: Some("tests/cart.spec.ts".to_owned()),
                    line: Some(line),
                    column: Some(5),
                }),
                ..EngineTest::default()
            },
            attempt: EngineAttempt {
                status: Some(status.to_owned()),
                retry: Some(retry),
                ..EngineAttempt::default()
            },
        }
    }

    #[test]
    fn declared_projects_get_empty_buckets() {
        let accumulator = SiteAccumulator::new();
        accumulator.record_event(run_started(&[
            ("p-g05", "url-g05", Some("https://example.org/g05")),
            ("p-aux", "chromium", None),
        ]));

        let results = accumulator.into_results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].project_name, "url-g05");
        assert_eq!(
            results[0].tested_url.as_deref(),
            Some("https://example.org/g05")
        );
        assert!(results[0].tests.is_empty());
        assert_eq!(results[0].started_at, results[0].last_seen_at);
        assert_eq!(results[1].project_name, "chromium");
        assert_eq!(results[1].tested_url, None);
    }

    #[test]
    fn attempts_accumulate_per_test_in_arrival_order() {
        let accumulator = SiteAccumulator::new();
        accumulator.record_event(run_started(&[(
            "p-g05",
            "url-g05",
            Some("https://example.org/g05"),
        )]));
        accumulator.record_event(attempt_for(
            "p-g05",
            "adds item to cart",
            12,
            0,
            "failed",
            "2025-11-04T08:01:00+01:00",
        ));
        accumulator.record_event(attempt_for(
            "p-g05",
            "adds item to cart",
            12,
            1,
            "passed",
            "2025-11-04T08:02:00+01:00",
        ));

        let results = accumulator.into_results();
        assert_eq!(results.len(), 1);
        let project = &results[0];
        assert_eq!(project.tests.len(), 1);
        let case = &project.tests[0];
        assert_eq!(case.results.len(), 2);
        assert_eq!(case.results[0].status, AttemptStatus::Failed);
        assert_eq!(case.results[0].retry, 0);
        assert_eq!(case.results[1].status, AttemptStatus::Passed);
        assert_eq!(case.results[1].retry, 1);
        // End bound tracks the latest attempt.
        assert_eq!(project.last_seen_at, ts("2025-11-04T08:02:00+01:00"));
    }

    #[test]
    fn different_title_paths_are_different_tests() {
        let accumulator = SiteAccumulator::new();
        accumulator.record_event(attempt_for(
            "url-g05",
            "logs in",
            3,
            0,
            "passed",
            "2025-11-04T08:01:00+01:00",
        ));
        accumulator.record_event(attempt_for(
            "url-g05",
            "logs out",
            3,
            0,
            "passed",
            "2025-11-04T08:01:10+01:00",
        ));

        let results = accumulator.into_results();
        assert_eq!(results[0].tests.len(), 2);
        assert_eq!(results[0].tests[0].title, "logs in");
        assert_eq!(results[0].tests[1].title, "logs out");
    }

    #[test]
    fn undeclared_project_gets_lazy_bucket() {
        let accumulator = SiteAccumulator::new();
        accumulator.record_event(attempt_for(
            "url-g31",
            "searches catalog",
            7,
            0,
            "passed",
            "2025-11-04T09:00:00+01:00",
        ));

        let results = accumulator.into_results();
        assert_eq!(results.len(), 1);
        // The id itself serves as the name: it was never declared.
        assert_eq!(results[0].project_name, "url-g31");
        assert_eq!(results[0].started_at, ts("2025-11-04T09:00:00+01:00"));
    }

    #[test]
    fn unknown_events_change_nothing() {
        let accumulator = SiteAccumulator::new();
        accumulator.record_event(EngineEvent::Unknown);
        accumulator.record_event(EngineEvent::RunFinished {
            timestamp: Some(ts("2025-11-04T10:00:00+01:00")),
        });
        assert!(accumulator.into_results().is_empty());
    }

    #[test]
    fn concurrent_attempts_are_not_lost() {
        let accumulator = SiteAccumulator::new();
        accumulator.record_event(run_started(&[
            ("p-g05", "url-g05", None),
            ("p-g09", "url-g09", None),
        ]));

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let accumulator = &accumulator;
                scope.spawn(move || {
                    for i in 0..25 {
                        let project = if i % 2 == 0 { "p-g05" } else { "p-g09" };
                        accumulator.record_event(attempt_for(
                            project,
                            "adds item to cart",
                            12,
                            worker,
                            "passed",
                            "2025-11-04T08:01:00+01:00",
                        ));
                    }
                });
            }
        });

        let results = accumulator.into_results();
        let total: usize = results.iter().flat_map(|p| &p.tests).map(|t| t.results.len()).sum();
        assert_eq!(total, 100);
        // One logical test per project, never duplicated by racing inserts.
        for project in &results {
            assert_eq!(project.tests.len(), 1, "project {}", project.project_name);
        }
    }
}
