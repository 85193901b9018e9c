//! Output formatting module for codevalidator
//!
//! Failures are printed as soon as a file has been validated; fix progress is printed
//! per file once its fix chain has finished.

use crate::aggregator::FailureRecord;
use crate::fix_pipeline::FixReport;
use std::io::{self, Write};

pub mod formatters;

pub use formatters::*;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format the failures of one file. `verbose` controls whether details are included.
    fn format_failures(&self, failures: &[FailureRecord], verbose: u8) -> String;

    /// Format the progress and result of one fix chain
    fn format_fix_report(&self, report: &FixReport) -> String;

    /// Whether this formatter should use colors
    fn use_colors(&self) -> bool {
        false
    }
}

/// Available output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `file: message` lines, indented details
    #[default]
    Text,
    /// One JSON object per line
    JsonLines,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json-lines" | "jsonlines" | "json" => Ok(OutputFormat::JsonLines),
            _ => Err(format!("Unknown output format: {s}")),
        }
    }
}

impl OutputFormat {
    /// Create a formatter instance for this format
    pub fn create_formatter(&self, use_colors: bool) -> Box<dyn OutputFormatter> {
        match self {
            OutputFormat::Text if use_colors => Box::new(TextFormatter::new()),
            OutputFormat::Text => Box::new(TextFormatter::without_colors()),
            OutputFormat::JsonLines => Box::new(JsonLinesFormatter::new()),
        }
    }
}

/// Write a block of lines to stdout; empty blocks print nothing
pub fn write_block(content: &str) -> io::Result<()> {
    if content.is_empty() {
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{content}")?;
    stdout.flush()
}
