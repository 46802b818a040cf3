// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Integration tests for gtest-lens-parser
//!
//! These tests drive complete GoogleTest transcripts from `tests/fixtures`
//! through the classifiers and the event consumers.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use gtest_lens_parser::event::{GroupEnd, TestFailed};
use gtest_lens_parser::prelude::*;
use gtest_lens_parser::{TestCatalog, classify_list, classify_output, rerun_filter};
use similar_asserts::assert_eq;

/// Get the fixtures directory for test data
fn fixtures_dir() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    Path::new(&manifest_dir).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {e}", path.display()))
}

fn classify_fixture(name: &str) -> Vec<OutputEvent> {
    classify_output(fixture(name).lines()).expect("fixture is well-formed")
}

fn none() -> Option<&'static str> {
    None
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_empty_suite() {
    assert_eq!(
        classify_fixture("empty_suite.txt"),
        vec![
            OutputEvent::suite_start("[==========] Running 0 tests from 0 test cases.", 0, 0),
            OutputEvent::suite_end(
                "[==========] 0 tests from 0 test cases ran. (1 ms total)",
                0,
                0,
                Some(1)
            ),
            OutputEvent::passed_tests_summary("[  PASSED  ] 0 tests.", 0),
        ]
    );
}

#[test]
fn test_single_passing_test() {
    assert_eq!(
        classify_fixture("single_pass.txt"),
        vec![
            OutputEvent::suite_start("[==========] Running 1 test from 1 test case.", 1, 1),
            OutputEvent::test_output("[----------] Global test environment set-up.", none(), none()),
            OutputEvent::group_start("[----------] 1 test from SomeGroup", "SomeGroup", 1),
            OutputEvent::test_start("[ RUN      ] SomeGroup.TestIsTrue", "SomeGroup", "TestIsTrue"),
            OutputEvent::test_passed(
                "[       OK ] SomeGroup.TestIsTrue (0 ms)",
                "SomeGroup",
                "TestIsTrue",
                Some(0)
            ),
            OutputEvent::group_end(
                Some("[----------] 1 test from SomeGroup (0 ms total)"),
                "SomeGroup",
                1,
                Some(0)
            ),
            OutputEvent::test_output("", none(), none()),
            OutputEvent::test_output("[----------] Global test environment tear-down", none(), none()),
            OutputEvent::suite_end(
                "[==========] 1 test from 1 test case ran. (2 ms total)",
                1,
                1,
                Some(2)
            ),
            OutputEvent::passed_tests_summary("[  PASSED  ] 1 test.", 1),
        ]
    );
}

#[test]
fn test_single_failing_test() {
    let events = classify_fixture("single_fail.txt");

    assert_eq!(
        events[4..8].to_vec(),
        vec![
            OutputEvent::test_output(
                "../../test_samples/main.cpp(12): error: Value of: 0 == 0",
                Some("SomeGroup"),
                Some("FailingTest")
            ),
            OutputEvent::test_output("  Actual: true", Some("SomeGroup"), Some("FailingTest")),
            OutputEvent::test_output("Expected: false", Some("SomeGroup"), Some("FailingTest")),
            OutputEvent::test_failed(
                "[  FAILED  ] SomeGroup.FailingTest (1 ms)",
                "SomeGroup",
                "FailingTest",
                Some(1)
            ),
        ]
    );
    assert_eq!(
        events[12..].to_vec(),
        vec![
            OutputEvent::passed_tests_summary("[  PASSED  ] 0 tests.", 0),
            OutputEvent::failed_tests_summary("[  FAILED  ] 1 test, listed below:", 1),
            OutputEvent::failed_test_summary(
                "[  FAILED  ] SomeGroup.FailingTest",
                "SomeGroup",
                "FailingTest"
            ),
            OutputEvent::summary_output(""),
            OutputEvent::summary_output(" 1 FAILED TEST"),
        ]
    );
}

#[test]
fn test_two_groups_with_one_failure() {
    let events = classify_fixture("two_groups.txt");

    let failed_counts: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            OutputEvent::FailedTestsSummary(s) => Some(s.failed_count),
            _ => None,
        })
        .collect();
    assert_eq!(failed_counts, vec![1]);

    let failed_entries: Vec<(&str, &str)> = events
        .iter()
        .filter_map(|e| match e {
            OutputEvent::FailedTestSummary(s) => Some((s.group.as_str(), s.test.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(failed_entries, vec![("OtherGroup", "ExpectTest")]);

    let total = events
        .iter()
        .find_map(|e| match e {
            OutputEvent::SuiteStart(s) => Some(s.test_count),
            _ => None,
        })
        .expect("suite start");
    let passed = events
        .iter()
        .find_map(|e| match e {
            OutputEvent::PassedTestsSummary(s) => Some(s.passed_count),
            _ => None,
        })
        .expect("passed summary");
    assert_eq!(passed, total - 1);
}

#[test]
fn test_elapsed_time_turned_off() {
    assert_eq!(
        classify_fixture("elapsed_time_off.txt"),
        vec![
            OutputEvent::suite_start("[==========] Running 2 tests from 2 test cases.", 2, 2),
            OutputEvent::test_output("[----------] Global test environment set-up.", none(), none()),
            OutputEvent::group_start("[----------] 1 test from SomeGroup", "SomeGroup", 1),
            OutputEvent::test_start("[ RUN      ] SomeGroup.TestIsTrue", "SomeGroup", "TestIsTrue"),
            OutputEvent::test_passed("[       OK ] SomeGroup.TestIsTrue", "SomeGroup", "TestIsTrue", None),
            OutputEvent::group_end(None, "SomeGroup", 1, None),
            OutputEvent::group_start("[----------] 1 test from OtherGroup", "OtherGroup", 1),
            OutputEvent::test_start("[ RUN      ] OtherGroup.ExpectTest", "OtherGroup", "ExpectTest"),
            OutputEvent::test_output(
                "../../test_samples/main.cpp(19): error: Value of: 2",
                Some("OtherGroup"),
                Some("ExpectTest")
            ),
            OutputEvent::test_output("Expected: 1", Some("OtherGroup"), Some("ExpectTest")),
            OutputEvent::test_output(
                "../../test_samples/main.cpp(20): error: Value of: 3",
                Some("OtherGroup"),
                Some("ExpectTest")
            ),
            OutputEvent::test_output("Expected: 2", Some("OtherGroup"), Some("ExpectTest")),
            OutputEvent::test_failed("[  FAILED  ] OtherGroup.ExpectTest", "OtherGroup", "ExpectTest", None),
            OutputEvent::group_end(None, "OtherGroup", 1, None),
            OutputEvent::test_output("[----------] Global test environment tear-down", none(), none()),
            OutputEvent::suite_end("[==========] 2 tests from 2 test cases ran.", 2, 2, None),
            OutputEvent::passed_tests_summary("[  PASSED  ] 1 test.", 1),
            OutputEvent::failed_tests_summary("[  FAILED  ] 1 test, listed below:", 1),
            OutputEvent::failed_test_summary("[  FAILED  ] OtherGroup.ExpectTest", "OtherGroup", "ExpectTest"),
            OutputEvent::summary_output(""),
            OutputEvent::summary_output(" 1 FAILED TEST"),
        ]
    );
}

#[test]
fn test_output_before_suite_started() {
    let events = classify_fixture("filtered_run.txt");
    assert_eq!(
        events[..2].to_vec(),
        vec![
            OutputEvent::output_before_suite_started(
                "Note: Google Test filter = OtherGroup.ExpectTest"
            ),
            OutputEvent::suite_start("[==========] Running 1 test from 1 test suite.", 1, 1),
        ]
    );
}

#[test]
fn test_crashed_run_is_balanced_at_finish() {
    let mut classifier = OutputClassifier::new(RunTracker::new(Vec::<OutputEvent>::new()));
    classifier
        .feed_all(fixture("crashed_run.txt").lines())
        .expect("fixture is well-formed");
    assert_eq!(classifier.current_test(), Some("Segfaults"));

    let tracker = classifier.finish();
    let report = tracker.report();
    assert_eq!(report.state, SuiteState::Running);
    assert_eq!(report.progress.finished, 1);
    assert_eq!(report.progress.total, 3);

    let events = tracker.into_inner();
    assert_eq!(
        events[events.len() - 2..].to_vec(),
        vec![
            OutputEvent::test_output(
                "about to dereference a null pointer",
                Some("SomeGroup"),
                Some("Segfaults")
            ),
            OutputEvent::group_end(None, "SomeGroup", 3, None),
        ]
    );
}

// ============================================================================
// Invariants over every fixture
// ============================================================================

const RUN_FIXTURES: &[&str] = &[
    "empty_suite.txt",
    "single_pass.txt",
    "single_fail.txt",
    "two_groups.txt",
    "elapsed_time_off.txt",
    "filtered_run.txt",
    "crashed_run.txt",
];

#[test]
fn test_groups_are_balanced_in_every_fixture() {
    for name in RUN_FIXTURES {
        let mut open: Option<String> = None;
        for event in classify_fixture(name) {
            match event {
                OutputEvent::GroupStart(start) => {
                    assert!(open.is_none(), "{name}: nested group {}", start.group);
                    open = Some(start.group);
                }
                OutputEvent::GroupEnd(GroupEnd { group, .. }) => {
                    assert_eq!(open.take(), Some(group), "{name}: unbalanced close");
                }
                OutputEvent::SuiteEnd(_) => {
                    assert!(open.is_none(), "{name}: suite ended inside a group");
                }
                _ => {}
            }
        }
        assert!(open.is_none(), "{name}: group left open");
    }
}

#[test]
fn test_every_line_is_delivered_once() {
    for name in RUN_FIXTURES {
        let content = fixture(name);
        let delivered: Vec<String> = classify_fixture(name)
            .iter()
            .filter_map(|e| e.line().map(str::to_string))
            .collect();
        let input: Vec<String> = content.lines().map(str::to_string).collect();
        assert_eq!(delivered, input, "{name}");
    }
}

#[test]
fn test_exactly_one_suite_start_and_end() {
    for name in RUN_FIXTURES.iter().filter(|n| **n != "crashed_run.txt") {
        let kinds: Vec<OutputEventKind> = classify_fixture(name).iter().map(OutputEvent::kind).collect();
        let starts = kinds.iter().filter(|k| **k == OutputEventKind::SuiteStart).count();
        let ends = kinds.iter().filter(|k| **k == OutputEventKind::SuiteEnd).count();
        assert_eq!((starts, ends), (1, 1), "{name}");

        let first_start = kinds
            .iter()
            .position(|k| *k == OutputEventKind::SuiteStart)
            .expect("suite start");
        assert!(
            kinds[..first_start]
                .iter()
                .all(|k| *k == OutputEventKind::OutputBeforeSuiteStarted),
            "{name}"
        );

        let end = kinds
            .iter()
            .position(|k| *k == OutputEventKind::SuiteEnd)
            .expect("suite end");
        assert!(kinds[end + 1..].iter().all(OutputEventKind::is_summary), "{name}");
    }
}

// ============================================================================
// Consumers
// ============================================================================

#[test]
fn test_dispatcher_collects_failed_tests() {
    let failed: Rc<RefCell<Vec<TestId>>> = Rc::new(RefCell::new(Vec::new()));
    let unhandled = Rc::new(RefCell::new(0usize));

    let mut dispatcher = {
        let unhandled = Rc::clone(&unhandled);
        EventDispatcher::<OutputEvent>::new(move |_| *unhandled.borrow_mut() += 1)
    };
    {
        let failed = Rc::clone(&failed);
        dispatcher.on(move |e: &TestFailed| {
            failed.borrow_mut().push(TestId::new(&e.group, &e.test));
        });
    }

    let mut classifier = OutputClassifier::new(&mut dispatcher);
    classifier
        .feed_all(fixture("two_groups.txt").lines())
        .expect("fixture is well-formed");
    classifier.finish();

    assert_eq!(
        rerun_filter(&failed.borrow()),
        Some("--gtest_filter=OtherGroup.ExpectTest".to_string())
    );
    assert_eq!(*unhandled.borrow(), classify_fixture("two_groups.txt").len() - 1);
}

#[test]
fn test_root_only_handler_sees_every_printed_line() {
    struct Lines(Vec<String>);

    impl OutputHandler for Lines {
        fn test_output(&mut self, line: &str, _group: Option<&str>, _test: Option<&str>) {
            self.0.push(line.to_string());
        }
    }

    let content = fixture("elapsed_time_off.txt");
    let mut classifier = OutputClassifier::new(Lines(Vec::new()));
    classifier.feed_all(content.lines()).expect("fixture is well-formed");
    let Lines(seen) = classifier.finish();

    // Synthesized group ends carry no line and are not forwarded
    let expected: Vec<String> = content.lines().map(str::to_string).collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_enumeration() {
    let events = classify_list(fixture("list_tests.txt").lines()).expect("fixture is well-formed");
    assert_eq!(
        events,
        vec![
            ListEvent::group_announce("SomeGroup.", "SomeGroup"),
            ListEvent::test_announce("  TestIsTrue", "SomeGroup", "TestIsTrue"),
            ListEvent::test_announce("  FailingTest", "SomeGroup", "FailingTest"),
            ListEvent::group_announce("OtherGroup.", "OtherGroup"),
            ListEvent::test_announce("  ExpectTest", "OtherGroup", "ExpectTest"),
            ListEvent::test_announce("  LongTest", "OtherGroup", "LongTest"),
        ]
    );
}

#[test]
fn test_catalog_from_enumeration() {
    let mut classifier = ListClassifier::new(TestCatalog::new());
    classifier
        .feed_all(fixture("list_tests.txt").lines())
        .expect("fixture is well-formed");
    let catalog = classifier.into_handler();

    assert_eq!(catalog.test_count(), 4);
    assert_eq!(
        rerun_filter(&catalog.test_ids()[..2]),
        Some("--gtest_filter=SomeGroup.TestIsTrue:SomeGroup.FailingTest".to_string())
    );
}

#[test]
fn test_events_serialize_as_json_lines() {
    for event in classify_fixture("two_groups.txt") {
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(!json.contains('\n'));
        let back: OutputEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, event);
    }
}
