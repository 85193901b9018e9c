//! JSON Lines output formatter (one JSON object per line)

use crate::aggregator::FailureRecord;
use crate::fix_pipeline::{FixOutcome, FixReport, StageResult, UnchangedReason};
use crate::output::OutputFormatter;
use serde_json::{Value, json};

/// Machine-readable formatter; details are always included
#[derive(Default)]
pub struct JsonLinesFormatter;

impl JsonLinesFormatter {
    pub fn new() -> Self {
        Self
    }
}

fn unchanged_reason(reason: &UnchangedReason) -> Value {
    match reason {
        UnchangedReason::StageFailed => json!("stage_failed"),
        UnchangedReason::EmptyOutput => json!("empty_output"),
        UnchangedReason::NoFixers => json!("no_fixers"),
        UnchangedReason::Backup(message) => json!({ "backup": message }),
        UnchangedReason::Write(message) => json!({ "write": message }),
    }
}

impl OutputFormatter for JsonLinesFormatter {
    fn format_failures(&self, failures: &[FailureRecord], _verbose: u8) -> String {
        failures
            .iter()
            .filter_map(|failure| serde_json::to_string(failure).ok())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_fix_report(&self, report: &FixReport) -> String {
        let stages: Vec<Value> = report
            .stages
            .iter()
            .map(|stage| match &stage.result {
                StageResult::Applied => json!({ "rule": stage.rule, "applied": true }),
                StageResult::Failed(e) => json!({ "rule": stage.rule, "applied": false, "error": e.to_string() }),
            })
            .collect();
        let value = match &report.outcome {
            FixOutcome::Written => json!({ "file": report.file, "stages": stages, "written": true }),
            FixOutcome::Unchanged(reason) => json!({
                "file": report.file,
                "stages": stages,
                "written": false,
                "reason": unchanged_reason(reason),
            }),
        };
        value.to_string()
    }
}
