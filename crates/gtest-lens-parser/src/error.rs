// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for gtest-lens-parser

use thiserror::Error;

use crate::output::SuiteState;

/// Errors that can occur while classifying GoogleTest output
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParserError {
    /// A classifier operation was triggered while its suite-state
    /// precondition was unmet.
    ///
    /// This means lines were delivered out of order upstream. It is not
    /// recoverable: the classifier that reported it stays poisoned and
    /// a new run needs a new instance.
    #[error("Contract violation: {operation} requires suite state {expected}, found {actual} (line: {line:?})")]
    ContractViolation {
        /// Name of the transition that was attempted
        operation: &'static str,
        /// State the transition requires
        expected: SuiteState,
        /// State the classifier was actually in
        actual: SuiteState,
        /// The line that triggered the transition
        line: String,
    },

    /// A test enumeration line matched neither the group nor the test rule
    #[error("Unrecognized test list line: {line:?}")]
    UnrecognizedListLine {
        /// The offending line
        line: String,
    },

    /// A test was enumerated before any group was announced
    #[error("Test {test:?} listed before any test group")]
    TestWithoutGroup {
        /// Name of the orphaned test
        test: String,
    },

    /// A line pattern failed to compile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
