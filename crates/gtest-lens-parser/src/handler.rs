// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Listener capabilities fed by the classifiers
//!
//! [`OutputHandler`] has one method per execution event kind. Only
//! [`OutputHandler::test_output`] is required; every other method has a
//! default that degrades to a smaller root set:
//!
//! | method | default |
//! |---|---|
//! | `output_before_suite_started`, `suite_start`, `suite_end` | `test_output(line, None, None)` |
//! | `group_start` | `test_output(line, Some(group), None)` |
//! | `group_end` | same as `group_start`, skipped for a synthesized close |
//! | `test_start`, `test_passed`, `test_failed` | `test_output(line, Some(group), Some(test))` |
//! | `passed_tests_summary`, `failed_tests_summary`, `failed_test_summary` | `summary_output(line)` |
//! | `summary_output` | `test_output(line, None, None)` |
//!
//! The classifiers only ever call [`OutputHandler::handle`], whose default
//! routes an event to the matching method. Overriding `handle` itself is
//! how a consumer receives whole events instead (see the `Vec` recorders
//! and [`EventDispatcher`](crate::dispatch::EventDispatcher)).

use crate::event::{
    FailedTestSummary, FailedTestsSummary, GroupAnnounce, GroupEnd, GroupStart, ListEvent,
    OutputBeforeSuiteStarted, OutputEvent, PassedTestsSummary, SuiteEnd, SuiteStart,
    TestAnnounce, TestFailed, TestPassed, TestStart,
};

/// Receiver of classified execution output
pub trait OutputHandler {
    /// Root reaction every other kind defaults to
    ///
    /// `group` and `test` are the names currently in scope; either may be
    /// absent (e.g. between groups, or for suite-level lines).
    fn test_output(&mut self, line: &str, group: Option<&str>, test: Option<&str>);

    /// A line printed before the suite started
    fn output_before_suite_started(&mut self, event: &OutputBeforeSuiteStarted) {
        self.test_output(&event.line, None, None);
    }

    /// Root reaction for the summary block printed after the suite ended
    fn summary_output(&mut self, line: &str) {
        self.test_output(line, None, None);
    }

    /// Suite started
    fn suite_start(&mut self, event: &SuiteStart) {
        self.test_output(&event.line, None, None);
    }

    /// Suite finished
    fn suite_end(&mut self, event: &SuiteEnd) {
        self.test_output(&event.line, None, None);
    }

    /// Group opened
    fn group_start(&mut self, event: &GroupStart) {
        self.test_output(&event.line, Some(&event.group), None);
    }

    /// Group closed
    ///
    /// Also called for a close the classifier inferred; the default has no
    /// line to forward in that case and does nothing.
    fn group_end(&mut self, event: &GroupEnd) {
        if let Some(line) = &event.line {
            self.test_output(line, Some(&event.group), None);
        }
    }

    /// Test started
    fn test_start(&mut self, event: &TestStart) {
        self.test_output(&event.line, Some(&event.group), Some(&event.test));
    }

    /// Test passed
    fn test_passed(&mut self, event: &TestPassed) {
        self.test_output(&event.line, Some(&event.group), Some(&event.test));
    }

    /// Test failed
    fn test_failed(&mut self, event: &TestFailed) {
        self.test_output(&event.line, Some(&event.group), Some(&event.test));
    }

    /// Passed count in the summary; reported even when zero
    fn passed_tests_summary(&mut self, event: &PassedTestsSummary) {
        self.summary_output(&event.line);
    }

    /// Failed count in the summary; only printed when something failed
    fn failed_tests_summary(&mut self, event: &FailedTestsSummary) {
        self.summary_output(&event.line);
    }

    /// One failed test re-listed in the summary
    fn failed_test_summary(&mut self, event: &FailedTestSummary) {
        self.summary_output(&event.line);
    }

    /// Route a whole event to the method for its kind
    fn handle(&mut self, event: &OutputEvent) {
        match event {
            OutputEvent::OutputBeforeSuiteStarted(e) => self.output_before_suite_started(e),
            OutputEvent::SuiteStart(e) => self.suite_start(e),
            OutputEvent::SuiteEnd(e) => self.suite_end(e),
            OutputEvent::GroupStart(e) => self.group_start(e),
            OutputEvent::GroupEnd(e) => self.group_end(e),
            OutputEvent::TestStart(e) => self.test_start(e),
            OutputEvent::TestOutput(e) => {
                self.test_output(&e.line, e.group.as_deref(), e.test.as_deref());
            }
            OutputEvent::TestPassed(e) => self.test_passed(e),
            OutputEvent::TestFailed(e) => self.test_failed(e),
            OutputEvent::PassedTestsSummary(e) => self.passed_tests_summary(e),
            OutputEvent::FailedTestsSummary(e) => self.failed_tests_summary(e),
            OutputEvent::FailedTestSummary(e) => self.failed_test_summary(e),
            OutputEvent::SummaryOutput(e) => self.summary_output(&e.line),
        }
    }
}

/// Receiver of classified test enumeration output
pub trait ListHandler {
    /// A group was announced
    fn group_announce(&mut self, event: &GroupAnnounce);

    /// A test of the most recently announced group was announced
    fn test_announce(&mut self, event: &TestAnnounce);

    /// Route a whole event to the method for its kind
    fn handle(&mut self, event: &ListEvent) {
        match event {
            ListEvent::GroupAnnounce(e) => self.group_announce(e),
            ListEvent::TestAnnounce(e) => self.test_announce(e),
        }
    }
}

// ============================================================================
// Whole-event consumers
// ============================================================================

/// Implements every typed [`OutputHandler`] callback except `test_output`
/// by rebuilding the event and passing it to `handle`.
///
/// For consumers that override `handle` and want direct calls to the typed
/// callbacks to reach it unchanged. Expand it inside an `impl OutputHandler`
/// block next to `test_output` and `handle`.
#[macro_export]
macro_rules! route_to_handle {
    () => {
        fn summary_output(&mut self, line: &str) {
            self.handle(&$crate::event::OutputEvent::summary_output(line));
        }

        fn output_before_suite_started(
            &mut self,
            event: &$crate::event::OutputBeforeSuiteStarted,
        ) {
            self.handle(&event.clone().into());
        }

        fn suite_start(&mut self, event: &$crate::event::SuiteStart) {
            self.handle(&event.clone().into());
        }

        fn suite_end(&mut self, event: &$crate::event::SuiteEnd) {
            self.handle(&event.clone().into());
        }

        fn group_start(&mut self, event: &$crate::event::GroupStart) {
            self.handle(&event.clone().into());
        }

        fn group_end(&mut self, event: &$crate::event::GroupEnd) {
            self.handle(&event.clone().into());
        }

        fn test_start(&mut self, event: &$crate::event::TestStart) {
            self.handle(&event.clone().into());
        }

        fn test_passed(&mut self, event: &$crate::event::TestPassed) {
            self.handle(&event.clone().into());
        }

        fn test_failed(&mut self, event: &$crate::event::TestFailed) {
            self.handle(&event.clone().into());
        }

        fn passed_tests_summary(&mut self, event: &$crate::event::PassedTestsSummary) {
            self.handle(&event.clone().into());
        }

        fn failed_tests_summary(&mut self, event: &$crate::event::FailedTestsSummary) {
            self.handle(&event.clone().into());
        }

        fn failed_test_summary(&mut self, event: &$crate::event::FailedTestSummary) {
            self.handle(&event.clone().into());
        }
    };
}

impl OutputHandler for Vec<OutputEvent> {
    fn test_output(&mut self, line: &str, group: Option<&str>, test: Option<&str>) {
        self.push(OutputEvent::test_output(line, group, test));
    }

    route_to_handle!();

    fn handle(&mut self, event: &OutputEvent) {
        self.push(event.clone());
    }
}

impl ListHandler for Vec<ListEvent> {
    fn group_announce(&mut self, event: &GroupAnnounce) {
        self.push(ListEvent::GroupAnnounce(event.clone()));
    }

    fn test_announce(&mut self, event: &TestAnnounce) {
        self.push(ListEvent::TestAnnounce(event.clone()));
    }
}

/// Discards everything
impl OutputHandler for () {
    fn test_output(&mut self, _line: &str, _group: Option<&str>, _test: Option<&str>) {}

    fn handle(&mut self, _event: &OutputEvent) {}
}

/// Discards everything
impl ListHandler for () {
    fn group_announce(&mut self, _event: &GroupAnnounce) {}

    fn test_announce(&mut self, _event: &TestAnnounce) {}
}

// ============================================================================
// Borrowed handlers
// ============================================================================

impl<H: OutputHandler + ?Sized> OutputHandler for &mut H {
    fn test_output(&mut self, line: &str, group: Option<&str>, test: Option<&str>) {
        (**self).test_output(line, group, test);
    }

    fn summary_output(&mut self, line: &str) {
        (**self).summary_output(line);
    }

    fn output_before_suite_started(&mut self, event: &OutputBeforeSuiteStarted) {
        (**self).output_before_suite_started(event);
    }

    fn suite_start(&mut self, event: &SuiteStart) {
        (**self).suite_start(event);
    }

    fn suite_end(&mut self, event: &SuiteEnd) {
        (**self).suite_end(event);
    }

    fn group_start(&mut self, event: &GroupStart) {
        (**self).group_start(event);
    }

    fn group_end(&mut self, event: &GroupEnd) {
        (**self).group_end(event);
    }

    fn test_start(&mut self, event: &TestStart) {
        (**self).test_start(event);
    }

    fn test_passed(&mut self, event: &TestPassed) {
        (**self).test_passed(event);
    }

    fn test_failed(&mut self, event: &TestFailed) {
        (**self).test_failed(event);
    }

    fn passed_tests_summary(&mut self, event: &PassedTestsSummary) {
        (**self).passed_tests_summary(event);
    }

    fn failed_tests_summary(&mut self, event: &FailedTestsSummary) {
        (**self).failed_tests_summary(event);
    }

    fn failed_test_summary(&mut self, event: &FailedTestSummary) {
        (**self).failed_test_summary(event);
    }

    fn handle(&mut self, event: &OutputEvent) {
        (**self).handle(event);
    }
}

impl<H: ListHandler + ?Sized> ListHandler for &mut H {
    fn group_announce(&mut self, event: &GroupAnnounce) {
        (**self).group_announce(event);
    }

    fn test_announce(&mut self, event: &TestAnnounce) {
        (**self).test_announce(event);
    }

    fn handle(&mut self, event: &ListEvent) {
        (**self).handle(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    /// Implements only the required root method
    #[derive(Default)]
    struct RootOnly {
        seen: Vec<(String, Option<String>, Option<String>)>,
    }

    impl OutputHandler for RootOnly {
        fn test_output(&mut self, line: &str, group: Option<&str>, test: Option<&str>) {
            self.seen.push((
                line.to_string(),
                group.map(str::to_string),
                test.map(str::to_string),
            ));
        }
    }

    /// Splits the summary block from the rest
    #[derive(Default)]
    struct SummarySplit {
        output: Vec<String>,
        summary: Vec<String>,
    }

    impl OutputHandler for SummarySplit {
        fn test_output(&mut self, line: &str, _group: Option<&str>, _test: Option<&str>) {
            self.output.push(line.to_string());
        }

        fn summary_output(&mut self, line: &str) {
            self.summary.push(line.to_string());
        }
    }

    fn seen(line: &str, group: Option<&str>, test: Option<&str>) -> (String, Option<String>, Option<String>) {
        (
            line.to_string(),
            group.map(str::to_string),
            test.map(str::to_string),
        )
    }

    #[test]
    fn test_defaults_cascade_to_test_output() {
        let mut handler = RootOnly::default();
        handler.handle(&OutputEvent::output_before_suite_started("Note: filter"));
        handler.handle(&OutputEvent::suite_start("start", 1, 1));
        handler.handle(&OutputEvent::group_start("gs", "G", 1));
        handler.handle(&OutputEvent::test_start("ts", "G", "T"));
        handler.handle(&OutputEvent::test_output("out", Some("G"), Some("T")));
        handler.handle(&OutputEvent::test_passed("ok", "G", "T", Some(1)));
        handler.handle(&OutputEvent::test_failed("fail", "G", "T", None));
        handler.handle(&OutputEvent::group_end(Some("ge"), "G", 1, Some(2)));
        handler.handle(&OutputEvent::suite_end("end", 1, 1, None));

        assert_eq!(
            handler.seen,
            vec![
                seen("Note: filter", None, None),
                seen("start", None, None),
                seen("gs", Some("G"), None),
                seen("ts", Some("G"), Some("T")),
                seen("out", Some("G"), Some("T")),
                seen("ok", Some("G"), Some("T")),
                seen("fail", Some("G"), Some("T")),
                seen("ge", Some("G"), None),
                seen("end", None, None),
            ]
        );
    }

    #[test]
    fn test_synthesized_group_end_is_not_forwarded() {
        let mut handler = RootOnly::default();
        handler.handle(&OutputEvent::group_end(None, "G", 1, None));
        assert!(handler.seen.is_empty());
    }

    #[test]
    fn test_summary_kinds_cascade_through_summary_output() {
        let mut handler = SummarySplit::default();
        handler.handle(&OutputEvent::suite_end("end", 2, 1, Some(5)));
        handler.handle(&OutputEvent::passed_tests_summary("passed", 1));
        handler.handle(&OutputEvent::failed_tests_summary("failed", 1));
        handler.handle(&OutputEvent::failed_test_summary("entry", "G", "T"));
        handler.handle(&OutputEvent::summary_output(" 1 FAILED TEST"));

        assert_eq!(handler.output, vec!["end".to_string()]);
        assert_eq!(
            handler.summary,
            vec!["passed", "failed", "entry", " 1 FAILED TEST"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_summary_output_defaults_to_root() {
        let mut handler = RootOnly::default();
        handler.handle(&OutputEvent::failed_test_summary("entry", "G", "T"));
        assert_eq!(handler.seen, vec![seen("entry", None, None)]);
    }

    #[test]
    fn test_vec_records_events_verbatim() {
        let events = vec![
            OutputEvent::suite_start("start", 0, 0),
            OutputEvent::group_end(None, "G", 3, None),
            OutputEvent::summary_output(""),
        ];

        let mut recorded: Vec<OutputEvent> = Vec::new();
        for event in &events {
            recorded.handle(event);
        }
        assert_eq!(recorded, events);
    }

    #[test]
    fn test_borrowed_handler_forwards() {
        fn announce<H: ListHandler>(mut handler: H) {
            handler.handle(&ListEvent::group_announce("G.", "G"));
            handler.handle(&ListEvent::test_announce("  T", "G", "T"));
        }

        let mut recorded: Vec<ListEvent> = Vec::new();
        announce(&mut recorded);
        assert_eq!(
            recorded,
            vec![
                ListEvent::group_announce("G.", "G"),
                ListEvent::test_announce("  T", "G", "T"),
            ]
        );
    }
}
