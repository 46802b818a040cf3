// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Classifier for `--gtest_list_tests` output
//!
//! The enumeration format is two-level:
//!
//! ```text
//! SomeGroup.
//!   TestIsTrue
//!   TestIsFalse
//! OtherGroup.
//!   ExpectTest
//! ```
//!
//! A line ending in a dot with no indentation announces a group; a line
//! indented by two spaces announces a test of the most recently announced
//! group. There is no free-text fallback: any other line is an error.

use std::sync::LazyLock;

use tracing::{debug, trace};

use crate::error::ParserError;
use crate::event::ListEvent;
use crate::handler::ListHandler;
use crate::pattern::{FirstOf, LineMatch, LineParser, first_of, if_matches};

static RULES: LazyLock<FirstOf<Enumeration>> = LazyLock::new(|| {
    first_of()
        .or(if_matches(
            regex::Regex::new(r"^(\S.*)\.$").expect("built-in pattern compiles"),
        )
        .then(Enumeration::group))
        .or(if_matches(regex::Regex::new(r"^  (.*)$").expect("built-in pattern compiles"))
            .then(Enumeration::test))
});

#[derive(Debug, Default)]
struct Enumeration {
    group: Option<String>,
    announced: Option<ListEvent>,
    error: Option<ParserError>,
}

impl Enumeration {
    fn group(&mut self, m: &LineMatch) {
        let group = m.get(1).unwrap_or_default();
        debug!(group, "Group announced");
        self.group = Some(group.to_string());
        self.announced = Some(ListEvent::group_announce(m.line(), group));
    }

    fn test(&mut self, m: &LineMatch) {
        let test = m.get(1).unwrap_or_default();
        match &self.group {
            Some(group) => {
                trace!(group = %group, test, "Test announced");
                self.announced = Some(ListEvent::test_announce(m.line(), group.as_str(), test));
            }
            None => {
                self.error = Some(ParserError::TestWithoutGroup {
                    test: test.to_string(),
                });
            }
        }
    }
}

/// Classifier for one test enumeration
///
/// Unlike [`OutputClassifier`](crate::output::OutputClassifier) a rejected
/// line does not poison the classifier; the caller decides whether to
/// carry on.
#[derive(Debug)]
pub struct ListClassifier<H> {
    enumeration: Enumeration,
    handler: H,
}

impl<H: ListHandler> ListClassifier<H> {
    /// Create a classifier delivering events to `handler`
    #[must_use]
    pub fn new(handler: H) -> Self {
        Self {
            enumeration: Enumeration::default(),
            handler,
        }
    }

    /// Classify one line and deliver the resulting event
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnrecognizedListLine` if the line is neither a
    /// group nor a test line, and `ParserError::TestWithoutGroup` for a test
    /// line before any group line. Nothing is delivered in either case.
    pub fn feed(&mut self, line: &str) -> Result<(), ParserError> {
        if RULES.parse(&mut self.enumeration, line).is_none() {
            return Err(ParserError::UnrecognizedListLine {
                line: line.to_string(),
            });
        }
        if let Some(err) = self.enumeration.error.take() {
            return Err(err);
        }
        if let Some(event) = self.enumeration.announced.take() {
            self.handler.handle(&event);
        }
        Ok(())
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

    /// Most recently announced group
    #[must_use]
    pub fn current_group(&self) -> Option<&str> {
        self.enumeration.group.as_deref()
    }

    /// Borrow the handler
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Consume the classifier and return its handler
    #[must_use]
    pub fn into_handler(self) -> H {
        self.handler
    }
}

/// Classify a complete enumeration and collect its events
///
/// # Errors
///
/// Returns the first line error, see [`ListClassifier::feed`].
pub fn classify_list<I, S>(lines: I) -> Result<Vec<ListEvent>, ParserError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut classifier = ListClassifier::new(Vec::new());
    classifier.feed_all(lines)?;
    Ok(classifier.into_handler())
}
