// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Rendering of events, run reports and catalogs to stdout

use std::io::{self, Write};

use chrono::SecondsFormat;
use gtest_lens_parser::{OutputEvent, OutputHandler, RunReport, TestCatalog};
use tracing::warn;

use crate::config::Format;

/// One text line for `event`: kind, subject and the raw output line
#[must_use]
pub fn event_line(event: &OutputEvent) -> String {
    let subject = match (event.group(), event.test()) {
        (Some(group), Some(test)) => format!("{group}.{test}"),
        (Some(group), None) => group.to_string(),
        _ => String::new(),
    };
    let line = event.line().unwrap_or("(not printed)");
    format!("{:<22} {subject:<32} {line}", event.kind().as_str())
        .trim_end()
        .to_string()
}

/// Handler writing every event as it arrives
///
/// Write errors do not interrupt classification; the first one is kept
/// and returned from [`finish`](Self::finish).
#[derive(Debug)]
pub struct EventRenderer<W> {
    out: W,
    format: Format,
    written: usize,
    error: Option<io::Error>,
}

impl<W: Write> EventRenderer<W> {
    /// Render to `out` in `format`
    #[must_use]
    pub fn new(out: W, format: Format) -> Self {
        Self {
            out,
            format,
            written: 0,
            error: None,
        }
    }

    /// Number of events written so far
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    fn write_event(&mut self, event: &OutputEvent) -> io::Result<()> {
        match self.format {
            Format::Text => writeln!(self.out, "{}", event_line(event)),
            Format::Json => {
                serde_json::to_writer(&mut self.out, event)?;
                writeln!(self.out)
            }
        }
    }

    /// Flush and return the writer
    ///
    /// # Errors
    ///
    /// Returns the first write error seen while rendering, or a flush error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> OutputHandler for EventRenderer<W> {
    fn test_output(&mut self, line: &str, group: Option<&str>, test: Option<&str>) {
        self.handle(&OutputEvent::test_output(line, group, test));
    }

    gtest_lens_parser::route_to_handle!();

    fn handle(&mut self, event: &OutputEvent) {
        if self.error.is_some() {
            return;
        }
        match self.write_event(event) {
            Ok(()) => self.written += 1,
            Err(error) => {
                warn!(error = %error, "Failed to write event, discarding the rest");
                self.error = Some(error);
            }
        }
    }
}

/// Write a run report
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render_report<W: Write>(report: &RunReport, format: Format, out: &mut W) -> io::Result<()> {
    if format == Format::Json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        return writeln!(out);
    }

    let progress = report.progress;
    writeln!(out, "suite:    {}", report.state)?;
    writeln!(
        out,
        "tests:    {} total, {} passed, {} failed",
        progress.total,
        progress.passed(),
        progress.failed
    )?;
    if progress.finished < progress.total {
        writeln!(
            out,
            "missing:  {} tests never finished",
            progress.total - progress.finished
        )?;
    }
    if let Some(elapsed) = report.elapsed_ms {
        writeln!(out, "elapsed:  {elapsed} ms")?;
    }
    if let Some(started) = report.started_at {
        writeln!(
            out,
            "started:  {}",
            started.to_rfc3339_opts(SecondsFormat::Millis, true)
        )?;
    }
    for id in &report.failed {
        writeln!(out, "failed:   {id}")?;
    }
    if let Some(filter) = report.rerun_filter() {
        writeln!(out, "rerun:    {filter}")?;
    }
    Ok(())
}

/// Write an enumerated test catalog
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render_catalog<W: Write>(
    catalog: &TestCatalog,
    format: Format,
    out: &mut W,
) -> io::Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, catalog)?;
            writeln!(out)
        }
        Format::Text => {
            for id in catalog.test_ids() {
                writeln!(out, "{id}")?;
            }
            Ok(())
        }
    }
}
