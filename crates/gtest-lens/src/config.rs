// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for the gtest-lens command line
//!
//! This module provides the clap-derived [`Config`], the subcommands it
//! dispatches to and the output format selection.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// gtest-lens - classify GoogleTest output into typed events
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "gtest-lens")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Subcommand to run (defaults to `events` on stdin)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format
    #[arg(
        short,
        long,
        value_enum,
        global = true,
        default_value_t = Format::Text,
        env = "GTEST_LENS_FORMAT"
    )]
    pub format: Format,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so that stdout only carries the
    /// rendered output.
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print every event classified from a test binary's output
    ///
    /// Example:
    ///   ./unit_tests | gtest-lens events
    Events {
        /// Read output from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the run report: totals, failed tests and a re-run filter
    ///
    /// Example:
    ///   ./unit_tests --gtest_print_time=0 | gtest-lens summary
    Summary {
        /// Read output from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the tests enumerated by `--gtest_list_tests`
    ///
    /// Example:
    ///   ./unit_tests --gtest_list_tests | gtest-lens list
    List {
        /// Read the enumeration from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

impl Command {
    /// Input file, `None` for stdin
    #[must_use]
    pub fn input(&self) -> Option<&Path> {
        match self {
            Self::Events { input } | Self::Summary { input } | Self::List { input } => {
                input.as_deref()
            }
        }
    }
}

impl Default for Command {
    fn default() -> Self {
        Self::Events { input: None }
    }
}

/// How results are written to stdout
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Human-readable text
    #[default]
    Text,
    /// One JSON document per event, or a single report document
    Json,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl Config {
    /// The subcommand to run, `events` on stdin if none was given
    #[must_use]
    pub fn subcommand(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if an input file was given but does not exist or
    /// is not a regular file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let command = self.subcommand();
        if let Some(input) = command.input() {
            if !input.exists() {
                return Err(ConfigError::InputNotFound(input.to_path_buf()));
            }
            if !input.is_file() {
                return Err(ConfigError::InputNotAFile(input.to_path_buf()));
            }
        }
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Input file not found
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Input path is not a regular file
    #[error("Input path is not a file: {0}")]
    InputNotAFile(PathBuf),
}
