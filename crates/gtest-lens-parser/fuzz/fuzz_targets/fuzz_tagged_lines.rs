// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Structured fuzz target: sequences of GoogleTest-shaped lines
//!
//! Random bytes rarely hit the structural tags, so this target builds lines
//! from the real tags with fuzzer-chosen names and counts, then checks that
//! group boundaries stay balanced.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use gtest_lens_parser::{OutputClassifier, OutputEvent};

#[derive(Debug, Arbitrary)]
enum Line {
    SuiteStart(u8, u8),
    SuiteEnd(u8, u8, Option<u16>),
    SetUp,
    TearDown,
    Group(u8, bool, Option<u16>),
    Run(bool, bool),
    Ok(bool, bool, Option<u16>),
    Failed(bool, bool, Option<u16>),
    Passed(u8),
    FailedCount(u8),
    Free(String),
}

fn name(second: bool) -> &'static str {
    if second { "OtherGroup" } else { "SomeGroup" }
}

fn elapsed(ms: Option<u16>, suffix: &str) -> String {
    ms.map(|ms| format!(" ({ms} ms{suffix})")).unwrap_or_default()
}

impl Line {
    fn render(&self) -> String {
        match self {
            Line::SuiteStart(t, g) => {
                format!("[==========] Running {t} tests from {g} test cases.")
            }
            Line::SuiteEnd(t, g, ms) => format!(
                "[==========] {t} tests from {g} test cases ran.{}",
                elapsed(*ms, " total")
            ),
            Line::SetUp => "[----------] Global test environment set-up.".to_string(),
            Line::TearDown => "[----------] Global test environment tear-down".to_string(),
            Line::Group(n, second, ms) => format!(
                "[----------] {n} tests from {}{}",
                name(*second),
                elapsed(*ms, " total")
            ),
            Line::Run(g, t) => format!("[ RUN      ] {}.{}", name(*g), name(*t)),
            Line::Ok(g, t, ms) => {
                format!("[       OK ] {}.{}{}", name(*g), name(*t), elapsed(*ms, ""))
            }
            Line::Failed(g, t, ms) => {
                format!("[  FAILED  ] {}.{}{}", name(*g), name(*t), elapsed(*ms, ""))
            }
            Line::Passed(n) => format!("[  PASSED  ] {n} tests."),
            Line::FailedCount(n) => format!("[  FAILED  ] {n} tests, listed below:"),
            Line::Free(text) => text.replace(['\n', '\r'], " "),
        }
    }
}

fuzz_target!(|lines: Vec<Line>| {
    let mut classifier = OutputClassifier::new(Vec::<OutputEvent>::new());
    for line in &lines {
        if classifier.feed(&line.render()).is_err() {
            return;
        }
    }

    let mut open: Option<String> = None;
    for event in classifier.finish() {
        match event {
            OutputEvent::GroupStart(start) => {
                assert!(open.is_none(), "group opened while another was open");
                open = Some(start.group);
            }
            OutputEvent::GroupEnd(end) => {
                assert_eq!(open.take().as_deref(), Some(end.group.as_str()));
            }
            OutputEvent::SuiteEnd(_) => assert!(open.is_none(), "suite ended inside a group"),
            _ => {}
        }
    }
    assert!(open.is_none(), "group left open at end of stream");
});
