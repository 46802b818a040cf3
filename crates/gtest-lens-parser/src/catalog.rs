// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Collected test enumeration

use serde::{Deserialize, Serialize};

use crate::event::{GroupAnnounce, TestAnnounce};
use crate::handler::ListHandler;
use crate::tracker::TestId;

/// One enumerated group and its tests, in listing order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogGroup {
    /// Group name
    pub name: String,
    /// Test names
    pub tests: Vec<String>,
}

/// Every group and test a binary reported with `--gtest_list_tests`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCatalog {
    groups: Vec<CatalogGroup>,
}

impl TestCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups in listing order
    #[must_use]
    pub fn groups(&self) -> &[CatalogGroup] {
        &self.groups
    }

    /// Total number of tests across all groups
    #[must_use]
    pub fn test_count(&self) -> usize {
        self.groups.iter().map(|group| group.tests.len()).sum()
    }

    /// Every test as a [`TestId`], in listing order
    #[must_use]
    pub fn test_ids(&self) -> Vec<TestId> {
        self.groups
            .iter()
            .flat_map(|group| {
                group
                    .tests
                    .iter()
                    .map(|test| TestId::new(group.name.as_str(), test.as_str()))
            })
            .collect()
    }

    /// Whether nothing was enumerated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl ListHandler for TestCatalog {
    fn group_announce(&mut self, event: &GroupAnnounce) {
        self.groups.push(CatalogGroup {
            name: event.group.clone(),
            tests: Vec::new(),
        });
    }

    fn test_announce(&mut self, event: &TestAnnounce) {
        // Direct callers may announce a test for a group that was never announced
        match self.groups.last_mut() {
            Some(group) if group.name == event.group => group.tests.push(event.test.clone()),
            _ => self.groups.push(CatalogGroup {
                name: event.group.clone(),
                tests: vec![event.test.clone()],
            }),
        }
    }
}
