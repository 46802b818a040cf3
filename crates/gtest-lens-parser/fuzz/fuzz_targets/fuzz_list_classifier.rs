// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the `--gtest_list_tests` classifier

#![no_main]

use libfuzzer_sys::fuzz_target;

use gtest_lens_parser::{ListClassifier, TestCatalog};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut classifier = ListClassifier::new(TestCatalog::new());

        // Rejected lines must not stop the classifier from accepting later ones
        for line in input.lines() {
            let _ = classifier.feed(line);
        }

        let catalog = classifier.into_handler();
        assert_eq!(catalog.test_ids().len(), catalog.test_count());
    }
});
