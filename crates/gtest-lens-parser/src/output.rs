// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Stateful classifier for GoogleTest execution output
//!
//! [`OutputClassifier`] consumes the lines of one test binary run, in the
//! order they were printed, and hands one or more [`OutputEvent`]s per line
//! to its [`OutputHandler`].
//!
//! # Rules
//!
//! Every line is first tried against a table keyed by its leading
//! structural tag (`[==========]`, `[----------]`, `[ RUN      ]`,
//! `[       OK ]`, `[  PASSED  ]`, `[  FAILED  ]`). Some rules only apply
//! in a given [`SuiteState`]: a `[  FAILED  ] Group.Test` line is a test
//! failure while the suite is running and a summary entry once it has
//! finished. Lines no rule accepts are classified by state alone:
//!
//! | state | event |
//! |---|---|
//! | `NotStarted` | `OutputBeforeSuiteStarted` |
//! | `Running` | `TestOutput` with the open group and test |
//! | `Finished` | `SummaryOutput` |
//!
//! # Balanced groups
//!
//! GoogleTest does not print a group's closing line when elapsed-time
//! reporting is off. The classifier then emits a [`GroupEnd`] with no line
//! before the next group opens, before the global tear-down line, before
//! the suite ends, and from [`OutputClassifier::finish`], so a `GroupStart`
//! is always followed by its `GroupEnd`.
//!
//! # Contract violations
//!
//! Suite and group transitions check the suite state first. Out-of-order
//! input (e.g. a suite end before a suite start) yields
//! [`ParserError::ContractViolation`]; the classifier is then poisoned and
//! rejects every further line.
//!
//! [`GroupEnd`]: crate::event::GroupEnd

use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::ParserError;
use crate::event::OutputEvent;
use crate::handler::OutputHandler;
use crate::pattern::{FirstOf, LineMatch, LineParser, Matches, first_of, from_fn, if_matches};

/// Lifecycle of the suite being classified; transitions only move forward
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SuiteState {
    /// No suite start line seen yet
    #[default]
    NotStarted,
    /// Between suite start and suite end
    Running,
    /// Suite end seen; only the summary block follows
    Finished,
}

impl SuiteState {
    /// Human-readable name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::Running => "running",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for SuiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Rule table
// ============================================================================

const TAG_SUITE: &str = "[==========]";
const TAG_SECTION: &str = "[----------]";
const TAG_RUN: &str = "[ RUN      ]";
const TAG_OK: &str = "[       OK ]";
const TAG_PASSED: &str = "[  PASSED  ]";
const TAG_FAILED: &str = "[  FAILED  ]";

const SUITE_START: &str = r" Running ([0-9]+) tests? from ([0-9]+) test (?:cases?|suites?)\.";
const SUITE_END: &str = r" ([0-9]+) tests? from ([0-9]+) test (?:cases?|suites?) ran\.(?: \(([0-9]+) ms total\))?";
const ENV_SET_UP: &str = r" Global test environment set-up\.";
const ENV_TEAR_DOWN: &str = r" Global test environment tear-down";
const GROUP_BOUNDARY: &str = r" ([0-9]+) tests? from ((?-u:\w)+)(?: \(([0-9]+) ms total\))?";
const TEST_START: &str = r" ((?-u:\w)+)\.((?-u:\w)+)";
const TEST_PASSED: &str = r" ((?-u:\w)+)\.((?-u:\w)+)(?: \(([0-9]+) ms\))?";
const TEST_FAILED: &str = r" ((?-u:\w)+)\.((?-u:\w)+)(?: \(([0-9]+) ms\))?";
const PASSED_COUNT: &str = r" ([0-9]+) tests?\.";
const FAILED_COUNT: &str = r" ([0-9]+) tests?, listed below:";
const FAILED_ENTRY: &str = r" ((?-u:\w)+)\.((?-u:\w)+)(?: \(([0-9]+) ms\))?";

/// Parser for `tag` followed by `suffix`, anchored at both ends
fn tagged(tag: &str, suffix: &str) -> Matches {
    let pattern = format!("^{}{}$", regex::escape(tag), suffix);
    if_matches(regex::Regex::new(&pattern).expect("built-in pattern compiles"))
}

/// Capture that takes part in every match of its rule
fn required(m: &LineMatch, index: usize) -> &str {
    let value = m.get(index);
    debug_assert!(value.is_some(), "capture {index} missing in {:?}", m.line());
    value.unwrap_or_default()
}

/// Digit capture that takes part in every match of its rule
fn required_count(m: &LineMatch, index: usize) -> usize {
    let value = m.count(index);
    debug_assert!(value.is_some(), "count {index} missing in {:?}", m.line());
    value.unwrap_or_default()
}

fn running(machine: &Machine) -> bool {
    machine.state == SuiteState::Running
}

fn finished(machine: &Machine) -> bool {
    machine.state == SuiteState::Finished
}

static RULES: LazyLock<FirstOf<Machine>> = LazyLock::new(|| {
    first_of()
        .or(tagged(TAG_SUITE, SUITE_START).then(Machine::suite_start))
        .or(tagged(TAG_SUITE, SUITE_END).then(Machine::suite_end))
        .or(tagged(TAG_SECTION, ENV_SET_UP)
            .when(running)
            .then(Machine::environment_set_up))
        .or(tagged(TAG_SECTION, ENV_TEAR_DOWN)
            .when(running)
            .then(Machine::environment_tear_down))
        .or(tagged(TAG_SECTION, GROUP_BOUNDARY).then(Machine::group_boundary))
        .or(tagged(TAG_RUN, TEST_START).then(Machine::test_start))
        .or(tagged(TAG_OK, TEST_PASSED)
            .when(running)
            .then(Machine::test_passed))
        .or(tagged(TAG_PASSED, PASSED_COUNT)
            .when(finished)
            .then(Machine::passed_count))
        .or(tagged(TAG_FAILED, TEST_FAILED)
            .when(running)
            .then(Machine::test_failed))
        .or(tagged(TAG_FAILED, FAILED_COUNT)
            .when(finished)
            .then(Machine::failed_count))
        .or(tagged(TAG_FAILED, FAILED_ENTRY)
            .when(finished)
            .then(Machine::failed_entry))
        .or(from_fn(|line: &str| Some(LineMatch::new(line, Vec::new())))
            .then(Machine::unrecognized))
});

// ============================================================================
// State machine
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenGroup {
    name: String,
    tests: usize,
}

/// Classification state threaded through the rule table
///
/// Rules append to `pending`; the classifier drains it into the handler
/// after each line.
#[derive(Debug, Default)]
struct Machine {
    state: SuiteState,
    group: Option<OpenGroup>,
    test: Option<String>,
    pending: Vec<OutputEvent>,
    violation: Option<ParserError>,
}

impl Machine {
    fn emit(&mut self, event: OutputEvent) {
        trace!(kind = %event.kind(), "Classified line");
        self.pending.push(event);
    }

    /// Record a contract violation unless the state is `expected`
    fn require(&mut self, operation: &'static str, expected: SuiteState, line: &str) -> bool {
        if self.state == expected {
            return true;
        }
        warn!(
            operation,
            expected = %expected,
            actual = %self.state,
            line,
            "Suite state precondition violated"
        );
        self.violation = Some(ParserError::ContractViolation {
            operation,
            expected,
            actual: self.state,
            line: line.to_string(),
        });
        false
    }

    /// Emit a line-less `GroupEnd` for the open group, if any
    fn close_open_group(&mut self) {
        if let Some(open) = self.group.take() {
            debug!(group = %open.name, "Synthesizing missing group close");
            self.test = None;
            self.emit(OutputEvent::group_end(None, open.name, open.tests, None));
        }
    }

    fn suite_start(&mut self, m: &LineMatch) {
        if !self.require("suite_start", SuiteState::NotStarted, m.line()) {
            return;
        }
        let tests = required_count(m, 1);
        let groups = required_count(m, 2);
        debug!(tests, groups, "Suite started");
        self.state = SuiteState::Running;
        self.emit(OutputEvent::suite_start(m.line(), tests, groups));
    }

    fn suite_end(&mut self, m: &LineMatch) {
        if !self.require("suite_end", SuiteState::Running, m.line()) {
            return;
        }
        self.close_open_group();
        if let Some(test) = self.test.take() {
            warn!(test = %test, "Suite ended while a test was still running");
        }
        let tests = required_count(m, 1);
        let groups = required_count(m, 2);
        let elapsed_ms = m.millis(3);
        debug!(tests, groups, ?elapsed_ms, "Suite finished");
        self.state = SuiteState::Finished;
        self.emit(OutputEvent::suite_end(m.line(), tests, groups, elapsed_ms));
    }

    fn environment_set_up(&mut self, m: &LineMatch) {
        self.emit(OutputEvent::test_output(m.line(), None, None));
    }

    fn environment_tear_down(&mut self, m: &LineMatch) {
        self.close_open_group();
        self.emit(OutputEvent::test_output(m.line(), None, None));
    }

    fn group_boundary(&mut self, m: &LineMatch) {
        if !self.require("group_boundary", SuiteState::Running, m.line()) {
            return;
        }
        let name = required(m, 2);
        let tests = required_count(m, 1);

        if self.group.as_ref().is_some_and(|open| open.name == name) {
            debug!(group = name, tests, "Group closed");
            self.group = None;
            self.test = None;
            self.emit(OutputEvent::group_end(Some(m.line()), name, tests, m.millis(3)));
            return;
        }

        self.close_open_group();
        debug!(group = name, tests, "Group opened");
        self.group = Some(OpenGroup {
            name: name.to_string(),
            tests,
        });
        self.emit(OutputEvent::group_start(m.line(), name, tests));
    }

    fn test_start(&mut self, m: &LineMatch) {
        if !self.require("test_start", SuiteState::Running, m.line()) {
            return;
        }
        let group = required(m, 1);
        let test = required(m, 2);
        if let Some(previous) = self.test.replace(test.to_string()) {
            debug!(previous = %previous, test, "Test started before the previous one finished");
        }
        self.emit(OutputEvent::test_start(m.line(), group, test));
    }

    fn test_passed(&mut self, m: &LineMatch) {
        self.test = None;
        self.emit(OutputEvent::test_passed(
            m.line(),
            required(m, 1),
            required(m, 2),
            m.millis(3),
        ));
    }

    fn test_failed(&mut self, m: &LineMatch) {
        self.test = None;
        self.emit(OutputEvent::test_failed(
            m.line(),
            required(m, 1),
            required(m, 2),
            m.millis(3),
        ));
    }

    fn passed_count(&mut self, m: &LineMatch) {
        self.emit(OutputEvent::passed_tests_summary(
            m.line(),
            required_count(m, 1),
        ));
    }

    fn failed_count(&mut self, m: &LineMatch) {
        self.emit(OutputEvent::failed_tests_summary(
            m.line(),
            required_count(m, 1),
        ));
    }

    fn failed_entry(&mut self, m: &LineMatch) {
        self.emit(OutputEvent::failed_test_summary(
            m.line(),
            required(m, 1),
            required(m, 2),
        ));
    }

    fn unrecognized(&mut self, m: &LineMatch) {
        let event = match self.state {
            SuiteState::NotStarted => OutputEvent::output_before_suite_started(m.line()),
            SuiteState::Running => OutputEvent::test_output(
                m.line(),
                self.group.as_ref().map(|open| open.name.as_str()),
                self.test.as_deref(),
            ),
            SuiteState::Finished => OutputEvent::summary_output(m.line()),
        };
        self.emit(event);
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// Classifier for the execution output of one test run
///
/// Feed lines in the exact order the test binary printed them, from a
/// single thread. A classifier is never reset; create a new one per run.
#[derive(Debug)]
pub struct OutputClassifier<H> {
    machine: Machine,
    handler: H,
}

impl<H: OutputHandler> OutputClassifier<H> {
    /// Create a classifier delivering events to `handler`
    #[must_use]
    pub fn new(handler: H) -> Self {
        Self {
            machine: Machine::default(),
            handler,
        }
    }

    /// Classify one line and deliver the resulting events
    ///
    /// A panic raised by the handler propagates to the caller.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::ContractViolation` if the line implies a
    /// transition the current suite state does not allow. Once that has
    /// happened every later call returns the same error without consuming
    /// the line.
    pub fn feed(&mut self, line: &str) -> Result<(), ParserError> {
        if let Some(violation) = &self.machine.violation {
            return Err(violation.clone());
        }

        RULES.parse(&mut self.machine, line);

        for event in self.machine.pending.drain(..) {
            self.handler.handle(&event);
        }

        match &self.machine.violation {
            Some(violation) => Err(violation.clone()),
            None => Ok(()),
        }
    }

    /// Feed every line of `lines` in order, stopping at the first error
    ///
    /// # Errors
    ///
    /// Returns the first error reported by [`feed`](Self::feed).
    pub fn feed_all<I, S>(&mut self, lines: I) -> Result<(), ParserError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.feed(line.as_ref())?;
        }
        Ok(())
    }

    /// End of stream: close a group left open and return the handler
    ///
    /// A run that crashed mid-group still gets a synthesized `GroupEnd`.
    /// Nothing is emitted for a poisoned classifier.
    pub fn finish(mut self) -> H {
        if self.machine.violation.is_none() {
            if let Some(test) = self.machine.test.take() {
                warn!(test = %test, state = %self.machine.state, "Output ended while a test was running");
            }
            if let Some(open) = &self.machine.group {
                warn!(group = %open.name, "Output ended inside a group");
            }
            self.machine.close_open_group();
            for event in self.machine.pending.drain(..) {
                self.handler.handle(&event);
            }
            if self.machine.state != SuiteState::Finished {
                debug!(state = %self.machine.state, "Output ended before the suite finished");
            }
        }
        self.handler
    }

    /// Return the handler without closing an open group
    #[must_use]
    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Current suite state
    #[must_use]
    pub fn state(&self) -> SuiteState {
        self.machine.state
    }

    /// Name of the currently open group
    #[must_use]
    pub fn current_group(&self) -> Option<&str> {
        self.machine.group.as_ref().map(|open| open.name.as_str())
    }

    /// Name of the currently running test
    #[must_use]
    pub fn current_test(&self) -> Option<&str> {
        self.machine.test.as_deref()
    }

    /// Whether a contract violation has poisoned this classifier
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.machine.violation.is_some()
    }

    /// Borrow the handler
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Mutably borrow the handler
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }
}

/// Classify a complete transcript and collect its events
///
/// # Errors
///
/// Returns `ParserError::ContractViolation` on out-of-order input.
pub fn classify_output<I, S>(lines: I) -> Result<Vec<OutputEvent>, ParserError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut classifier = OutputClassifier::new(Vec::new());
    classifier.feed_all(lines)?;
    Ok(classifier.finish())
}
