//! Default text output formatter

use crate::aggregator::FailureRecord;
use crate::fix_pipeline::{FixOutcome, FixReport, StageResult, UnchangedReason};
use crate::output::OutputFormatter;
use crate::rule::Detail;
use colored::*;

/// Human-readable formatter: `file: message`, details indented below
pub struct TextFormatter {
    use_colors: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_colors() -> Self {
        Self { use_colors: false }
    }

    fn file(&self, path: &str) -> String {
        if self.use_colors {
            path.blue().to_string()
        } else {
            path.to_string()
        }
    }

    fn error(&self, text: &str) -> String {
        if self.use_colors {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    }
}

fn format_detail(detail: &Detail) -> String {
    match (detail.line, detail.column) {
        (Some(line), Some(col)) => format!("  line {line}, col {col}: {}", detail.message),
        (Some(line), None) => format!("  line {line}: {}", detail.message),
        _ => format!("  {}", detail.message),
    }
}

impl OutputFormatter for TextFormatter {
    fn format_failures(&self, failures: &[FailureRecord], verbose: u8) -> String {
        let mut lines = Vec::new();
        for failure in failures {
            let file = failure.file.display().to_string();
            lines.push(format!("{}: {}", self.file(&file), failure.message));
            if verbose > 0 {
                lines.extend(failure.details.iter().map(format_detail));
            }
        }
        lines.join("\n")
    }

    fn format_fix_report(&self, report: &FixReport) -> String {
        let file = self.file(&report.file.display().to_string());
        let mut lines = Vec::new();
        for stage in &report.stages {
            lines.push(format!("{file}: Trying to fix {}..", stage.rule));
            if let StageResult::Failed(e) = &stage.result {
                lines.push(format!("{file}: {} {}: {e}", self.error("ERROR fixing"), stage.rule));
            }
        }
        if let FixOutcome::Unchanged(reason) = &report.outcome {
            match reason {
                UnchangedReason::Backup(message) | UnchangedReason::Write(message) => {
                    lines.push(format!("{file}: {} {message}", self.error("ERROR")));
                }
                UnchangedReason::StageFailed | UnchangedReason::EmptyOutput | UnchangedReason::NoFixers => {}
            }
            lines.push(format!(
                "{file}: {}",
                self.error("ERROR fixing file. File remained unchanged")
            ));
        }
        lines.join("\n")
    }

    fn use_colors(&self) -> bool {
        self.use_colors
    }
}
