// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gtest-lens-parser: GoogleTest output classification
//!
//! This library turns the line-oriented text printed by a GoogleTest binary
//! into typed events describing the suite, group and test lifecycle, the
//! pass/fail outcome of every test and the closing summary.
//!
//! - [`output::OutputClassifier`] classifies execution output.
//! - [`list::ListClassifier`] classifies `--gtest_list_tests` output.
//! - [`handler::OutputHandler`] / [`handler::ListHandler`] receive events,
//!   with cascading defaults for kinds a consumer does not care about.
//! - [`dispatch::EventDispatcher`] routes events to closures registered per
//!   event kind.
//!
//! # Example
//!
//! ```
//! use gtest_lens_parser::prelude::*;
//!
//! let output = [
//!     "[==========] Running 1 test from 1 test case.",
//!     "[----------] 1 test from SomeGroup",
//!     "[ RUN      ] SomeGroup.TestIsTrue",
//!     "[       OK ] SomeGroup.TestIsTrue",
//!     "[==========] 1 test from 1 test case ran.",
//!     "[  PASSED  ] 1 test.",
//! ];
//!
//! let mut classifier = OutputClassifier::new(RunTracker::new(Vec::<OutputEvent>::new()));
//! classifier.feed_all(output).unwrap();
//! let tracker = classifier.finish();
//!
//! assert_eq!(tracker.progress().passed(), 1);
//! assert!(tracker.report().is_success());
//!
//! // The group never printed its closing line, so one was synthesized
//! let events = tracker.into_inner();
//! assert!(matches!(&events[4], OutputEvent::GroupEnd(end) if end.is_synthesized()));
//! ```

pub mod catalog;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod forward;
pub mod handler;
pub mod list;
pub mod output;
pub mod pattern;
pub mod tracker;

pub use catalog::{CatalogGroup, TestCatalog};
pub use dispatch::{EventDispatcher, SharedHandler, Tagged, Variant};
pub use error::ParserError;
pub use event::{ListEvent, ListEventKind, OutputEvent, OutputEventKind};
pub use forward::EventForwarder;
pub use handler::{ListHandler, OutputHandler};
pub use list::{ListClassifier, classify_list};
pub use output::{OutputClassifier, SuiteState, classify_output};
pub use tracker::{Progress, RunReport, RunTracker, TestId, rerun_filter};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::dispatch::EventDispatcher;
    pub use crate::error::ParserError;
    pub use crate::event::{ListEvent, OutputEvent, OutputEventKind};
    pub use crate::handler::{ListHandler, OutputHandler};
    pub use crate::list::ListClassifier;
    pub use crate::output::{OutputClassifier, SuiteState};
    pub use crate::tracker::{RunTracker, TestId};
}
