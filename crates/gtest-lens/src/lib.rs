// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gtest-lens library
//!
//! This module exports the command-line building blocks for use in
//! integration tests and as a library.

pub mod config;
pub mod pipeline;
pub mod render;
