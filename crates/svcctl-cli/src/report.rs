//! Result documents written to stdout.
//!
//! Orchestration callers read a single JSON line; operators can ask for a
//! short human-readable line instead.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;

/// Output format selection for the result document.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per invocation.
    #[default]
    Json,
    /// A short `status: message` line.
    Human,
}

/// Outcome of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub changed: bool,
    pub msg: String,
}

/// Outcome of a failed invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    failed: bool,
    pub msg: String,
}

impl Failure {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            failed: true,
            msg: msg.into(),
        }
    }
}

/// Errors raised while writing a result document.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to serialise result: {0}")]
    Serialise(#[from] serde_json::Error),
    #[error("failed to write result: {0}")]
    Write(#[from] std::io::Error),
}

impl Report {
    pub fn write_to<W: Write>(&self, format: OutputFormat, writer: &mut W) -> Result<(), RenderError> {
        match format {
            OutputFormat::Json => write_json_line(self, writer),
            OutputFormat::Human => {
                let status = if self.changed { "changed" } else { "ok" };
                write_human_line(status, &self.msg, writer)
            }
        }
    }
}

impl Failure {
    pub fn write_to<W: Write>(&self, format: OutputFormat, writer: &mut W) -> Result<(), RenderError> {
        match format {
            OutputFormat::Json => write_json_line(self, writer),
            OutputFormat::Human => write_human_line("failed", &self.msg, writer),
        }
    }
}

fn write_json_line<T: Serialize, W: Write>(value: &T, writer: &mut W) -> Result<(), RenderError> {
    serde_json::to_writer(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn write_human_line<W: Write>(status: &str, msg: &str, writer: &mut W) -> Result<(), RenderError> {
    if msg.is_empty() {
        writeln!(writer, "{status}")?;
    } else {
        writeln!(writer, "{status}: {msg}")?;
    }
    writer.flush()?;
    Ok(())
}
