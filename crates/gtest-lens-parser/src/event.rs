// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Typed events produced by the classifiers
//!
//! Each classification outcome has its own immutable payload struct, and
//! [`OutputEvent`] / [`ListEvent`] are the tagged unions over them. Every
//! payload keeps the raw line it came from; the only exception is
//! [`GroupEnd::line`], which is `None` when the close was inferred rather
//! than printed.
//!
//! Equality and hashing are structural, so event sequences can be compared
//! directly in tests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dispatch::{Tagged, Variant};

// ============================================================================
// Execution output payloads
// ============================================================================

/// A line printed before the suite started (e.g. a filter notice)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputBeforeSuiteStarted {
    /// Raw output line
    pub line: String,
}

/// `[==========] Running N tests from M test cases.`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuiteStart {
    /// Raw output line
    pub line: String,
    /// Number of tests the runner is about to execute
    pub test_count: usize,
    /// Number of groups those tests belong to
    pub group_count: usize,
}

/// `[==========] N tests from M test cases ran.`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuiteEnd {
    /// Raw output line
    pub line: String,
    /// Number of tests that ran
    pub test_count: usize,
    /// Number of groups that ran
    pub group_count: usize,
    /// Total elapsed time, when the runner prints it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

/// Opening boundary of a test group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupStart {
    /// Raw output line
    pub line: String,
    /// Group (test case) name
    pub group: String,
    /// Number of tests in the group
    pub tests_in_group: usize,
}

/// Closing boundary of a test group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupEnd {
    /// Raw output line, `None` for a synthesized close
    pub line: Option<String>,
    /// Group (test case) name
    pub group: String,
    /// Number of tests in the group
    pub tests_in_group: usize,
    /// Elapsed time for the group, when printed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

impl GroupEnd {
    /// Whether this close was inferred instead of read from the output
    #[must_use]
    pub fn is_synthesized(&self) -> bool {
        self.line.is_none()
    }
}

/// `[ RUN      ] Group.Test`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestStart {
    /// Raw output line
    pub line: String,
    /// Group the test belongs to
    pub group: String,
    /// Test name
    pub test: String,
}

/// Free-form output while the suite is running
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestOutput {
    /// Raw output line
    pub line: String,
    /// Currently open group, if any
    pub group: Option<String>,
    /// Currently running test, if any
    pub test: Option<String>,
}

/// `[       OK ] Group.Test (N ms)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestPassed {
    /// Raw output line
    pub line: String,
    /// Group the test belongs to
    pub group: String,
    /// Test name
    pub test: String,
    /// Elapsed time, when printed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

/// `[  FAILED  ] Group.Test (N ms)` while the suite is running
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestFailed {
    /// Raw output line
    pub line: String,
    /// Group the test belongs to
    pub group: String,
    /// Test name
    pub test: String,
    /// Elapsed time, when printed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

/// `[  PASSED  ] N tests.`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PassedTestsSummary {
    /// Raw output line
    pub line: String,
    /// Number of passed tests reported by the runner
    pub passed_count: usize,
}

/// `[  FAILED  ] N tests, listed below:`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FailedTestsSummary {
    /// Raw output line
    pub line: String,
    /// Number of failed tests reported by the runner
    pub failed_count: usize,
}

/// One `[  FAILED  ] Group.Test` entry of the closing failure list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FailedTestSummary {
    /// Raw output line
    pub line: String,
    /// Group the failed test belongs to
    pub group: String,
    /// Failed test name
    pub test: String,
}

/// Any other line after the suite finished
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SummaryOutput {
    /// Raw output line
    pub line: String,
}

// ============================================================================
// Execution output event
// ============================================================================

/// One classified line of test execution output
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputEvent {
    /// Output before the suite started
    OutputBeforeSuiteStarted(OutputBeforeSuiteStarted),
    /// Suite started
    SuiteStart(SuiteStart),
    /// Suite finished
    SuiteEnd(SuiteEnd),
    /// Group opened
    GroupStart(GroupStart),
    /// Group closed (possibly synthesized)
    GroupEnd(GroupEnd),
    /// Test started
    TestStart(TestStart),
    /// Output while the suite runs
    TestOutput(TestOutput),
    /// Test passed
    TestPassed(TestPassed),
    /// Test failed
    TestFailed(TestFailed),
    /// Count of passed tests in the summary
    PassedTestsSummary(PassedTestsSummary),
    /// Count of failed tests in the summary
    FailedTestsSummary(FailedTestsSummary),
    /// One failed test listed in the summary
    FailedTestSummary(FailedTestSummary),
    /// Any other summary line
    SummaryOutput(SummaryOutput),
}

/// Discriminant of [`OutputEvent`], used as the registry key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputEventKind {
    /// See [`OutputBeforeSuiteStarted`]
    OutputBeforeSuiteStarted,
    /// See [`SuiteStart`]
    SuiteStart,
    /// See [`SuiteEnd`]
    SuiteEnd,
    /// See [`GroupStart`]
    GroupStart,
    /// See [`GroupEnd`]
    GroupEnd,
    /// See [`TestStart`]
    TestStart,
    /// See [`TestOutput`]
    TestOutput,
    /// See [`TestPassed`]
    TestPassed,
    /// See [`TestFailed`]
    TestFailed,
    /// See [`PassedTestsSummary`]
    PassedTestsSummary,
    /// See [`FailedTestsSummary`]
    FailedTestsSummary,
    /// See [`FailedTestSummary`]
    FailedTestSummary,
    /// See [`SummaryOutput`]
    SummaryOutput,
}

impl OutputEventKind {
    /// Every kind, in declaration order
    pub const ALL: [OutputEventKind; 13] = [
        Self::OutputBeforeSuiteStarted,
        Self::SuiteStart,
        Self::SuiteEnd,
        Self::GroupStart,
        Self::GroupEnd,
        Self::TestStart,
        Self::TestOutput,
        Self::TestPassed,
        Self::TestFailed,
        Self::PassedTestsSummary,
        Self::FailedTestsSummary,
        Self::FailedTestSummary,
        Self::SummaryOutput,
    ];

    /// Stable snake_case name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutputBeforeSuiteStarted => "output_before_suite_started",
            Self::SuiteStart => "suite_start",
            Self::SuiteEnd => "suite_end",
            Self::GroupStart => "group_start",
            Self::GroupEnd => "group_end",
            Self::TestStart => "test_start",
            Self::TestOutput => "test_output",
            Self::TestPassed => "test_passed",
            Self::TestFailed => "test_failed",
            Self::PassedTestsSummary => "passed_tests_summary",
            Self::FailedTestsSummary => "failed_tests_summary",
            Self::FailedTestSummary => "failed_test_summary",
            Self::SummaryOutput => "summary_output",
        }
    }

    /// Whether this kind belongs to the closing summary
    #[must_use]
    pub fn is_summary(&self) -> bool {
        matches!(
            self,
            Self::PassedTestsSummary
                | Self::FailedTestsSummary
                | Self::FailedTestSummary
                | Self::SummaryOutput
        )
    }
}

impl fmt::Display for OutputEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl OutputEvent {
    /// `OutputBeforeSuiteStarted` event
    #[must_use]
    pub fn output_before_suite_started(line: impl Into<String>) -> Self {
        Self::OutputBeforeSuiteStarted(OutputBeforeSuiteStarted { line: line.into() })
    }

    /// `SuiteStart` event
    #[must_use]
    pub fn suite_start(line: impl Into<String>, test_count: usize, group_count: usize) -> Self {
        Self::SuiteStart(SuiteStart {
            line: line.into(),
            test_count,
            group_count,
        })
    }

    /// `SuiteEnd` event
    #[must_use]
    pub fn suite_end(
        line: impl Into<String>,
        test_count: usize,
        group_count: usize,
        elapsed_ms: Option<u64>,
    ) -> Self {
        Self::SuiteEnd(SuiteEnd {
            line: line.into(),
            test_count,
            group_count,
            elapsed_ms,
        })
    }

    /// `GroupStart` event
    #[must_use]
    pub fn group_start(
        line: impl Into<String>,
        group: impl Into<String>,
        tests_in_group: usize,
    ) -> Self {
        Self::GroupStart(GroupStart {
            line: line.into(),
            group: group.into(),
            tests_in_group,
        })
    }

    /// `GroupEnd` event; pass `None` as the line for a synthesized close
    #[must_use]
    pub fn group_end(
        line: Option<&str>,
        group: impl Into<String>,
        tests_in_group: usize,
        elapsed_ms: Option<u64>,
    ) -> Self {
        Self::GroupEnd(GroupEnd {
            line: line.map(str::to_string),
            group: group.into(),
            tests_in_group,
            elapsed_ms,
        })
    }

    /// `TestStart` event
    #[must_use]
    pub fn test_start(
        line: impl Into<String>,
        group: impl Into<String>,
        test: impl Into<String>,
    ) -> Self {
        Self::TestStart(TestStart {
            line: line.into(),
            group: group.into(),
            test: test.into(),
        })
    }

    /// `TestOutput` event
    #[must_use]
    pub fn test_output(line: impl Into<String>, group: Option<&str>, test: Option<&str>) -> Self {
        Self::TestOutput(TestOutput {
            line: line.into(),
            group: group.map(str::to_string),
            test: test.map(str::to_string),
        })
    }

    /// `TestPassed` event
    #[must_use]
    pub fn test_passed(
        line: impl Into<String>,
        group: impl Into<String>,
        test: impl Into<String>,
        elapsed_ms: Option<u64>,
    ) -> Self {
        Self::TestPassed(TestPassed {
            line: line.into(),
            group: group.into(),
            test: test.into(),
            elapsed_ms,
        })
    }

    /// `TestFailed` event
    #[must_use]
    pub fn test_failed(
        line: impl Into<String>,
        group: impl Into<String>,
        test: impl Into<String>,
        elapsed_ms: Option<u64>,
    ) -> Self {
        Self::TestFailed(TestFailed {
            line: line.into(),
            group: group.into(),
            test: test.into(),
            elapsed_ms,
        })
    }

    /// `PassedTestsSummary` event
    #[must_use]
    pub fn passed_tests_summary(line: impl Into<String>, passed_count: usize) -> Self {
        Self::PassedTestsSummary(PassedTestsSummary {
            line: line.into(),
            passed_count,
        })
    }

    /// `FailedTestsSummary` event
    #[must_use]
    pub fn failed_tests_summary(line: impl Into<String>, failed_count: usize) -> Self {
        Self::FailedTestsSummary(FailedTestsSummary {
            line: line.into(),
            failed_count,
        })
    }

    /// `FailedTestSummary` event
    #[must_use]
    pub fn failed_test_summary(
        line: impl Into<String>,
        group: impl Into<String>,
        test: impl Into<String>,
    ) -> Self {
        Self::FailedTestSummary(FailedTestSummary {
            line: line.into(),
            group: group.into(),
            test: test.into(),
        })
    }

    /// `SummaryOutput` event
    #[must_use]
    pub fn summary_output(line: impl Into<String>) -> Self {
        Self::SummaryOutput(SummaryOutput { line: line.into() })
    }

    /// Raw line this event was classified from, `None` if synthesized
    #[must_use]
    pub fn line(&self) -> Option<&str> {
        match self {
            Self::OutputBeforeSuiteStarted(e) => Some(&e.line),
            Self::SuiteStart(e) => Some(&e.line),
            Self::SuiteEnd(e) => Some(&e.line),
            Self::GroupStart(e) => Some(&e.line),
            Self::GroupEnd(e) => e.line.as_deref(),
            Self::TestStart(e) => Some(&e.line),
            Self::TestOutput(e) => Some(&e.line),
            Self::TestPassed(e) => Some(&e.line),
            Self::TestFailed(e) => Some(&e.line),
            Self::PassedTestsSummary(e) => Some(&e.line),
            Self::FailedTestsSummary(e) => Some(&e.line),
            Self::FailedTestSummary(e) => Some(&e.line),
            Self::SummaryOutput(e) => Some(&e.line),
        }
    }

    /// Group this event refers to, if any
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        match self {
            Self::GroupStart(e) => Some(&e.group),
            Self::GroupEnd(e) => Some(&e.group),
            Self::TestStart(e) => Some(&e.group),
            Self::TestOutput(e) => e.group.as_deref(),
            Self::TestPassed(e) => Some(&e.group),
            Self::TestFailed(e) => Some(&e.group),
            Self::FailedTestSummary(e) => Some(&e.group),
            _ => None,
        }
    }

    /// Test this event refers to, if any
    #[must_use]
    pub fn test(&self) -> Option<&str> {
        match self {
            Self::TestStart(e) => Some(&e.test),
            Self::TestOutput(e) => e.test.as_deref(),
            Self::TestPassed(e) => Some(&e.test),
            Self::TestFailed(e) => Some(&e.test),
            Self::FailedTestSummary(e) => Some(&e.test),
            _ => None,
        }
    }
}

// ============================================================================
// Test enumeration events
// ============================================================================

/// `Group.` line of `--gtest_list_tests` output
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupAnnounce {
    /// Raw output line
    pub line: String,
    /// Announced group name
    pub group: String,
}

/// `  Test` line of `--gtest_list_tests` output
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestAnnounce {
    /// Raw output line
    pub line: String,
    /// Most recently announced group
    pub group: String,
    /// Announced test name
    pub test: String,
}

/// One classified line of test enumeration output
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListEvent {
    /// A group was announced
    GroupAnnounce(GroupAnnounce),
    /// A test was announced
    TestAnnounce(TestAnnounce),
}

/// Discriminant of [`ListEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListEventKind {
    /// See [`GroupAnnounce`]
    GroupAnnounce,
    /// See [`TestAnnounce`]
    TestAnnounce,
}

impl ListEvent {
    /// `GroupAnnounce` event
    #[must_use]
    pub fn group_announce(line: impl Into<String>, group: impl Into<String>) -> Self {
        Self::GroupAnnounce(GroupAnnounce {
            line: line.into(),
            group: group.into(),
        })
    }

    /// `TestAnnounce` event
    #[must_use]
    pub fn test_announce(
        line: impl Into<String>,
        group: impl Into<String>,
        test: impl Into<String>,
    ) -> Self {
        Self::TestAnnounce(TestAnnounce {
            line: line.into(),
            group: group.into(),
            test: test.into(),
        })
    }
}

// ============================================================================
// Registry wiring
// ============================================================================

/// Implements `kind()`, [`Tagged`], `From<Payload>` and [`Variant`] for an
/// event enum whose variants are named after their payload types.
macro_rules! tagged_event {
    ($event:ident => $kind:ident { $($variant:ident),+ $(,)? }) => {
        impl $event {
            /// Discriminant of this event
            #[must_use]
            pub fn kind(&self) -> $kind {
                match self {
                    $( Self::$variant(_) => $kind::$variant, )+
                }
            }
        }

        impl Tagged for $event {
            type Kind = $kind;

            fn kind(&self) -> $kind {
                $event::kind(self)
            }
        }

        $(
            impl From<$variant> for $event {
                fn from(payload: $variant) -> Self {
                    Self::$variant(payload)
                }
            }

            impl Variant<$event> for $variant {
                const KIND: $kind = $kind::$variant;

                fn from_event(event: &$event) -> Option<&Self> {
                    match event {
                        $event::$variant(payload) => Some(payload),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }
        )+
    };
}

tagged_event!(OutputEvent => OutputEventKind {
    OutputBeforeSuiteStarted,
    SuiteStart,
    SuiteEnd,
    GroupStart,
    GroupEnd,
    TestStart,
    TestOutput,
    TestPassed,
    TestFailed,
    PassedTestsSummary,
    FailedTestsSummary,
    FailedTestSummary,
    SummaryOutput,
});

tagged_event!(ListEvent => ListEventKind { GroupAnnounce, TestAnnounce });
