// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Run statistics gathered from the event stream
//!
//! [`RunTracker`] sits between a classifier and any other handler, passes
//! every event through unchanged and keeps the numbers a progress display
//! and a "re-run failed tests" action need.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::OutputEvent;
use crate::handler::OutputHandler;
use crate::output::SuiteState;
use crate::route_to_handle;

/// Identity of a single test
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TestId {
    /// Group (test case) name
    pub group: String,
    /// Test name
    pub name: String,
}

impl TestId {
    /// Create a test id
    #[must_use]
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group, self.name)
    }
}

/// Test counts as the run progresses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Tests that finished with a failure
    pub failed: usize,
    /// Tests that finished, passed or failed
    pub finished: usize,
    /// Tests announced at suite start
    pub total: usize,
}

impl Progress {
    /// Tests that finished successfully
    #[must_use]
    pub fn passed(&self) -> usize {
        self.finished.saturating_sub(self.failed)
    }

    /// Finished fraction in `0.0..=1.0`; an empty suite counts as done
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.finished.min(self.total) as f64) / (self.total as f64)
        }
    }
}

/// Snapshot of everything a [`RunTracker`] learned about a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Suite state when the snapshot was taken
    pub state: SuiteState,
    /// Counts observed from individual test results
    pub progress: Progress,
    /// Groups announced at suite start
    pub groups: usize,
    /// Failed tests, in the order they failed
    pub failed: Vec<TestId>,
    /// Passed count printed in the runner's summary
    pub reported_passed: Option<usize>,
    /// Failed count printed in the runner's summary
    pub reported_failed: Option<usize>,
    /// Failed tests re-listed in the runner's summary
    pub summary_failed: Vec<TestId>,
    /// Total elapsed time printed at suite end
    pub elapsed_ms: Option<u64>,
    /// When the suite start line was seen
    pub started_at: Option<DateTime<Utc>>,
    /// When the suite end line was seen
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    /// Whether the suite finished without failures
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.state == SuiteState::Finished
            && self.failed.is_empty()
            && self.reported_failed.unwrap_or(0) == 0
    }

    /// `--gtest_filter` argument selecting the failed tests
    #[must_use]
    pub fn rerun_filter(&self) -> Option<String> {
        rerun_filter(&self.failed)
    }
}

/// Build the `--gtest_filter=A.B:C.D` argument selecting `ids`
///
/// Returns `None` for an empty list, since an empty filter would select
/// nothing rather than everything.
#[must_use]
pub fn rerun_filter(ids: &[TestId]) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    let joined = ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(":");
    Some(format!("--gtest_filter={joined}"))
}

/// Pass-through handler that records run statistics
#[derive(Debug)]
pub struct RunTracker<H> {
    inner: H,
    state: SuiteState,
    progress: Progress,
    groups: usize,
    failed: Vec<TestId>,
    reported_passed: Option<usize>,
    reported_failed: Option<usize>,
    summary_failed: Vec<TestId>,
    elapsed_ms: Option<u64>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl<H: OutputHandler> RunTracker<H> {
    /// Track a run, forwarding every event to `inner`
    #[must_use]
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            state: SuiteState::NotStarted,
            progress: Progress::default(),
            groups: 0,
            failed: Vec::new(),
            reported_passed: None,
            reported_failed: None,
            summary_failed: Vec::new(),
            elapsed_ms: None,
            started_at: None,
            finished_at: None,
        }
    }

    fn observe(&mut self, event: &OutputEvent) {
        match event {
            OutputEvent::SuiteStart(e) => {
                self.state = SuiteState::Running;
                self.progress.total = e.test_count;
                self.groups = e.group_count;
                self.started_at = Some(Utc::now());
            }
            OutputEvent::SuiteEnd(e) => {
                self.state = SuiteState::Finished;
                self.elapsed_ms = e.elapsed_ms;
                self.finished_at = Some(Utc::now());
                debug!(
                    finished = self.progress.finished,
                    failed = self.progress.failed,
                    total = self.progress.total,
                    "Run finished"
                );
            }
            OutputEvent::TestPassed(_) => {
                self.progress.finished += 1;
            }
            OutputEvent::TestFailed(e) => {
                self.progress.finished += 1;
                self.progress.failed += 1;
                self.failed.push(TestId::new(&e.group, &e.test));
            }
            OutputEvent::PassedTestsSummary(e) => {
                self.reported_passed = Some(e.passed_count);
            }
            OutputEvent::FailedTestsSummary(e) => {
                self.reported_failed = Some(e.failed_count);
            }
            OutputEvent::FailedTestSummary(e) => {
                self.summary_failed.push(TestId::new(&e.group, &e.test));
            }
            _ => {}
        }
    }

    /// Current suite state as seen by the tracker
    #[must_use]
    pub fn state(&self) -> SuiteState {
        self.state
    }

    /// Current counts
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Failed tests so far, in the order they failed
    #[must_use]
    pub fn failed_tests(&self) -> &[TestId] {
        &self.failed
    }

    /// Snapshot of the run
    #[must_use]
    pub fn report(&self) -> RunReport {
        RunReport {
            state: self.state,
            progress: self.progress,
            groups: self.groups,
            failed: self.failed.clone(),
            reported_passed: self.reported_passed,
            reported_failed: self.reported_failed,
            summary_failed: self.summary_failed.clone(),
            elapsed_ms: self.elapsed_ms,
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }

    /// Borrow the wrapped handler
    #[must_use]
    pub fn inner(&self) -> &H {
        &self.inner
    }

    /// Mutably borrow the wrapped handler
    pub fn inner_mut(&mut self) -> &mut H {
        &mut self.inner
    }

    /// Unwrap the tracker
    #[must_use]
    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: OutputHandler> OutputHandler for RunTracker<H> {
    fn test_output(&mut self, line: &str, group: Option<&str>, test: Option<&str>) {
        self.inner.test_output(line, group, test);
    }

    route_to_handle!();

    fn handle(&mut self, event: &OutputEvent) {
        self.observe(event);
        self.inner.handle(event);
    }
}
