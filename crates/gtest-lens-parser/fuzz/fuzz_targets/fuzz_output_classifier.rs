// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the execution output classifier
//!
//! Arbitrary text is split into lines and fed in order. Contract violations
//! are expected for nonsense input; panics are not.

#![no_main]

use libfuzzer_sys::fuzz_target;

use gtest_lens_parser::{OutputClassifier, OutputEvent, RunTracker};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut classifier = OutputClassifier::new(RunTracker::new(Vec::<OutputEvent>::new()));

        for line in input.lines() {
            if classifier.feed(line).is_err() {
                break;
            }
        }

        let tracker = classifier.finish();
        let _ = tracker.report();
    }
});
