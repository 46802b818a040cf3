// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gtest-lens: classify GoogleTest output into typed events
//!
//! Reads the output of a GoogleTest binary from a file or stdin and prints
//! the classified events, a run report or the enumerated tests. The exit
//! status is non-zero when the run did not finish successfully.

use std::io::{self, BufWriter};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use gtest_lens::config::Config;
use gtest_lens::pipeline;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = Config::parse();

    // Logs go to stderr; stdout carries only rendered output
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(config.log_level().into()))
        .init();

    config.validate()?;

    let command = config.subcommand();
    debug!(?command, format = %config.format, "Starting gtest-lens");

    let input = pipeline::open_input(command.input())
        .await
        .context("Failed to open input")?;
    let out = BufWriter::new(io::stdout().lock());

    let success = pipeline::run(&command, config.format, input, out).await?;
    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
