// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Streaming classification of a test binary's output
//!
//! A reader task owns the input and the classifier and forwards every
//! event over a channel. The calling task receives the events in order
//! and hands them to its own handler, so a slow consumer never stalls
//! reading and the handler itself need not be `Send`.

use std::io::Write;
use std::path::Path;

use gtest_lens_parser::event::{SuiteEnd, SuiteStart, TestFailed};
use gtest_lens_parser::forward;
use gtest_lens_parser::prelude::*;
use gtest_lens_parser::{RunReport, TestCatalog};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, info, warn};

use crate::config::{Command, Format};
use crate::render::{EventRenderer, render_catalog, render_report};

/// Boxed input stream: a file or stdin
pub type Input = Box<dyn AsyncRead + Unpin + Send>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading input or writing output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The output violated the suite lifecycle
    #[error("Classification failed: {0}")]
    Parser(#[from] ParserError),

    /// The reader task panicked or was cancelled
    #[error("Reader task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Open `path`, or stdin if `None`
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub async fn open_input(path: Option<&Path>) -> Result<Input, PipelineError> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "Reading input file");
            Ok(Box::new(tokio::fs::File::open(path).await?))
        }
        None => {
            debug!("Reading stdin");
            Ok(Box::new(tokio::io::stdin()))
        }
    }
}

/// Read one line from `reader`, without its `\n` or `\r\n` terminator
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD, so a test that
/// prints binary data does not end the stream.
async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

/// Classify execution output from `reader`, delivering events to `consumer`
///
/// The stream is finished when the reader reaches end of input, so a
/// group left open by a crashed run is still closed.
///
/// # Errors
///
/// Returns an error if reading fails or the output violates the suite
/// lifecycle. Events classified before the failure have been delivered.
pub async fn classify_output_stream<R, H>(reader: R, mut consumer: H) -> Result<H, PipelineError>
where
    R: AsyncRead + Unpin + Send + 'static,
    H: OutputHandler,
{
    let (forwarder, mut receiver) = forward::channel::<OutputEvent>();

    let producer = tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        let mut classifier = OutputClassifier::new(forwarder);
        let mut count = 0usize;
        while let Some(line) = read_line(&mut reader, &mut buf).await? {
            classifier.feed(&line)?;
            count += 1;
        }
        classifier.finish();
        Ok::<usize, PipelineError>(count)
    });

    while let Some(event) = receiver.recv().await {
        consumer.handle(&event);
    }

    let lines = producer.await??;
    debug!(lines, "Output stream classified");
    Ok(consumer)
}

/// Classify `--gtest_list_tests` output from `reader`
///
/// Lines that are not part of an enumeration are logged and skipped.
/// Returns the consumer and the number of skipped lines.
///
/// # Errors
///
/// Returns an error if reading fails.
pub async fn classify_list_stream<R, H>(
    reader: R,
    mut consumer: H,
) -> Result<(H, usize), PipelineError>
where
    R: AsyncRead + Unpin + Send + 'static,
    H: ListHandler,
{
    let (forwarder, mut receiver) = forward::channel::<ListEvent>();

    let producer = tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        let mut classifier = ListClassifier::new(forwarder);
        let mut skipped = 0usize;
        while let Some(line) = read_line(&mut reader, &mut buf).await? {
            if let Err(error) = classifier.feed(&line) {
                warn!(error = %error, "Skipping enumeration line");
                skipped += 1;
            }
        }
        Ok::<usize, PipelineError>(skipped)
    });

    while let Some(event) = receiver.recv().await {
        consumer.handle(&event);
    }

    let skipped = producer.await??;
    Ok((consumer, skipped))
}

/// Dispatcher logging suite progress
///
/// Suite start and end are logged at info level, each failed test at warn.
#[must_use]
pub fn progress_logger() -> EventDispatcher<OutputEvent> {
    let mut dispatcher = EventDispatcher::ignoring_unhandled();
    dispatcher.on(|e: &SuiteStart| {
        info!(tests = e.test_count, groups = e.group_count, "Suite started");
    });
    dispatcher.on(|e: &TestFailed| {
        warn!(group = %e.group, test = %e.test, elapsed_ms = ?e.elapsed_ms, "Test failed");
    });
    dispatcher.on(|e: &SuiteEnd| {
        info!(tests = e.test_count, elapsed_ms = ?e.elapsed_ms, "Suite finished");
    });
    dispatcher
}

fn check_summary(report: &RunReport) {
    if let Some(reported) = report.reported_passed
        && reported != report.progress.passed()
    {
        warn!(
            reported,
            observed = report.progress.passed(),
            "Passed count in summary differs from observed results"
        );
    }
    if report.summary_failed != report.failed {
        warn!(
            reported = report.summary_failed.len(),
            observed = report.failed.len(),
            "Failed tests in summary differ from observed results"
        );
    }
}

/// Run `command` over `reader`, writing results to `out`
///
/// Returns whether the run succeeded: every test passed and the suite
/// finished. Enumerations always succeed.
///
/// # Errors
///
/// Returns an error if reading, classification or writing fails.
pub async fn run<R, W>(
    command: &Command,
    format: Format,
    reader: R,
    mut out: W,
) -> Result<bool, PipelineError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: Write,
{
    match command {
        Command::Events { .. } => {
            let tracker = RunTracker::new(EventRenderer::new(out, format));
            let tracker = classify_output_stream(reader, tracker).await?;
            let report = tracker.report();
            let renderer = tracker.into_inner();
            debug!(events = renderer.written(), "Events rendered");
            renderer.finish()?;
            check_summary(&report);
            Ok(report.is_success())
        }
        Command::Summary { .. } => {
            let tracker = classify_output_stream(reader, RunTracker::new(progress_logger())).await?;
            let report = tracker.report();
            check_summary(&report);
            render_report(&report, format, &mut out)?;
            out.flush()?;
            Ok(report.is_success())
        }
        Command::List { .. } => {
            let (catalog, skipped) = classify_list_stream(reader, TestCatalog::new()).await?;
            if skipped > 0 {
                warn!(skipped, "Some enumeration lines were not recognized");
            }
            info!(
                groups = catalog.groups().len(),
                tests = catalog.test_count(),
                "Tests enumerated"
            );
            render_catalog(&catalog, format, &mut out)?;
            out.flush()?;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    const PASSING: &str = "\
[==========] Running 1 test from 1 test case.
[----------] Global test environment set-up.
[----------] 1 test from SomeGroup
[ RUN      ] SomeGroup.TestIsTrue
[       OK ] SomeGroup.TestIsTrue (0 ms)
[----------] 1 test from SomeGroup (0 ms total)

[----------] Global test environment tear-down
[==========] 1 test from 1 test case ran. (2 ms total)
[  PASSED  ] 1 test.
";

    const FAILING: &str = "\
[==========] Running 2 tests from 1 test case.
[----------] 2 tests from G
[ RUN      ] G.A
[       OK ] G.A
[ RUN      ] G.B
Expected: 1\r
[  FAILED  ] G.B
[==========] 2 tests from 1 test case ran.
[  PASSED  ] 1 test.
[  FAILED  ] 1 test, listed below:
[  FAILED  ] G.B
";

    fn reader(text: &'static str) -> &'static [u8] {
        text.as_bytes()
    }

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let events = classify_output_stream(reader(PASSING), Vec::<OutputEvent>::new())
            .await
            .expect("well-formed output");
        let lines: Vec<&str> = events.iter().filter_map(OutputEvent::line).collect();
        assert_eq!(lines, PASSING.lines().collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_crlf_line_endings() {
        let events = classify_output_stream(reader(FAILING), Vec::<OutputEvent>::new())
            .await
            .expect("well-formed output");
        assert!(events.contains(&OutputEvent::test_output(
            "Expected: 1",
            Some("G"),
            Some("B")
        )));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_delivered_lossily() {
        let input: &'static [u8] = b"[==========] Running 1 test from 1 test case.\n\
            [----------] 1 test from G\n\
            [ RUN      ] G.T\n\
            bad byte \xff here\n\
            [       OK ] G.T (0 ms)\n\
            [==========] 1 test from 1 test case ran.\n\
            [  PASSED  ] 1 test.\n";
        let events = classify_output_stream(input, Vec::<OutputEvent>::new())
            .await
            .expect("well-formed output");

        assert!(events.contains(&OutputEvent::test_output(
            "bad byte \u{FFFD} here",
            Some("G"),
            Some("T")
        )));
        assert!(events.contains(&OutputEvent::test_passed(
            "[       OK ] G.T (0 ms)",
            "G",
            "T",
            Some(0)
        )));
        assert_eq!(
            events.last().map(OutputEvent::kind),
            Some(OutputEventKind::PassedTestsSummary)
        );
    }

    #[tokio::test]
    async fn test_read_line_terminators() {
        let mut reader: &'static [u8] = b"a\r\nb\n\nc";
        let mut buf = Vec::new();
        let mut lines = Vec::new();
        while let Some(line) = read_line(&mut reader, &mut buf)
            .await
            .expect("in-memory read")
        {
            lines.push(line);
        }
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        assert_eq!(lines, vec!["a", "b", "", "c"]);
    }

    #[tokio::test]
    async fn test_contract_violation_is_reported() {
        let result = classify_output_stream(
            reader("[==========] 1 test from 1 test case ran.\n"),
            Vec::<OutputEvent>::new(),
        )
        .await;
        assert!(matches!(
            result,
            Err(PipelineError::Parser(ParserError::ContractViolation { .. }))
        ));
    }

    #[tokio::test]
    async fn test_list_stream_skips_unrecognized_lines() {
        let (catalog, skipped) = classify_list_stream(
            reader("Running main() from gtest_main.cc\nG.\n  A\n  B\n"),
            TestCatalog::new(),
        )
        .await
        .expect("readable input");
        assert_eq!(skipped, 1);
        assert_eq!(catalog.test_count(), 2);
    }

    #[tokio::test]
    async fn test_run_summary() {
        let mut out = Vec::new();
        let success = run(
            &Command::Summary { input: None },
            Format::Text,
            reader(FAILING),
            &mut out,
        )
        .await
        .expect("well-formed output");

        assert!(!success);
        let text = String::from_utf8(out).expect("utf-8");
        assert!(text.contains("tests:    2 total, 1 passed, 1 failed\n"));
        assert!(text.contains("rerun:    --gtest_filter=G.B\n"));
    }

    #[tokio::test]
    async fn test_run_events_json() {
        let mut out = Vec::new();
        let success = run(
            &Command::Events { input: None },
            Format::Json,
            reader(PASSING),
            &mut out,
        )
        .await
        .expect("well-formed output");

        assert!(success);
        let kinds: Vec<String> = String::from_utf8(out)
            .expect("utf-8")
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).expect("valid json");
                value["kind"].as_str().unwrap_or_default().to_string()
            })
            .collect();
        assert_eq!(kinds.first().map(String::as_str), Some("suite_start"));
        assert_eq!(kinds.last().map(String::as_str), Some("passed_tests_summary"));
        assert_eq!(kinds.len(), PASSING.lines().count());
    }

    #[tokio::test]
    async fn test_run_list() {
        let mut out = Vec::new();
        let success = run(
            &Command::List { input: None },
            Format::Text,
            reader("A.\n  x\nB.\n  y\n"),
            &mut out,
        )
        .await
        .expect("readable input");

        assert!(success);
        assert_eq!(String::from_utf8(out).expect("utf-8"), "A.x\nB.y\n");
    }

    #[tokio::test]
    async fn test_open_missing_input() {
        let result = open_input(Some(Path::new("/nonexistent/path/12345.txt"))).await;
        assert!(matches!(result, Err(PipelineError::Io(_))));
    }

    #[test]
    fn test_progress_logger_ignores_other_events() {
        let dispatcher = progress_logger();
        assert!(dispatcher.is_handled(OutputEventKind::TestFailed));
        assert!(!dispatcher.is_handled(OutputEventKind::TestOutput));
    }
}
