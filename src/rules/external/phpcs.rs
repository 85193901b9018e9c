/// Rule phpcs: PHP files must conform to a PHP_CodeSniffer standard
///
/// Needs a locally installed `phpcs`. Every row of its CSV report becomes one detail.
use super::{ToolCommand, split_csv_record};
use crate::rule::{Details, Rule, RuleError, RuleInput, RuleOptions, ValidationResult, Verdict};

#[derive(Debug, Clone, Default)]
pub struct Phpcs;

impl Rule for Phpcs {
    fn name(&self) -> &'static str {
        "phpcs"
    }

    fn message(&self) -> &'static str {
        "is not phpcs ({standard} standard) formatted"
    }

    fn requires_options(&self) -> bool {
        true
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        options: Option<&RuleOptions>,
        details: &mut Details,
    ) -> ValidationResult {
        let options = options.ok_or_else(|| RuleError::Configuration("phpcs options not set".to_string()))?;
        let standard = options.require(self.name(), "standard")?;
        let encoding = options.require(self.name(), "encoding")?;

        let output = ToolCommand::new("phpcs")
            .arg("-n")
            .arg("--report=csv")
            .arg(format!("--standard={standard}"))
            .arg(format!("--encoding={encoding}"))
            .arg("-")
            .stdin(input.content)
            .run()?;
        Ok(Verdict::from_bool(parse_report(&output.stdout, details)))
    }
}

/// Record one detail per report row; returns whether the report was empty.
fn parse_report(report: &str, details: &mut Details) -> bool {
    let mut lines = report.lines().filter(|l| !l.trim().is_empty());
    let Some(header) = lines.next() else {
        return true;
    };
    let header = split_csv_record(header);
    let column_of = |name: &str| header.iter().position(|h| h == name);
    let (message_idx, line_idx, column_idx) = (column_of("Message"), column_of("Line"), column_of("Column"));

    let mut valid = true;
    for row in lines {
        valid = false;
        let fields = split_csv_record(row);
        let field = |idx: Option<usize>| idx.and_then(|i| fields.get(i));
        let message = field(message_idx).cloned().unwrap_or_else(|| row.to_string());
        let line = field(line_idx).and_then(|v| v.parse().ok());
        let column = field(column_idx).and_then(|v| v.parse().ok());
        details.add(message, line, column);
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_report_rows_become_details() {
        let report = "File,Line,Column,Type,Message,Source,Severity\n\
                      \"STDIN\",3,5,error,\"Expected \\\"{\\\" on new line\",PSR2.Classes,5\n\
                      \"STDIN\",9,1,warning,\"Line exceeds 120 characters\",Generic.Files,5\n";
        let mut details = Details::new();
        assert!(!parse_report(report, &mut details));
        let records = details.into_vec();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "Expected \"{\" on new line");
        assert_eq!((records[0].line, records[0].column), (Some(3), Some(5)));
        assert_eq!(records[1].line, Some(9));
    }

    #[test]
    fn test_header_only_report_is_clean() {
        let mut details = Details::new();
        assert!(parse_report("File,Line,Column,Type,Message,Source,Severity\n", &mut details));
        assert!(parse_report("", &mut details));
        assert!(details.is_empty());
    }

    #[test]
    fn test_missing_standard_is_configuration_error() {
        let options = RuleOptions::new().with("encoding", "UTF-8");
        let err = Phpcs
            .validate(&RuleInput::new(Path::new("a.php"), b"<?php\n"), Some(&options), &mut Details::new())
            .unwrap_err();
        assert!(matches!(err, RuleError::Configuration(_)));
    }
}
