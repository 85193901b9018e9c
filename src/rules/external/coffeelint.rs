/// Rule coffeelint: CoffeeScript files must pass `coffeelint`
///
/// Options:
/// - `config`: path of a coffeelint JSON configuration passed with `-f`
use super::ToolCommand;
use crate::rule::{Details, Rule, RuleInput, RuleOptions, ValidationResult, Verdict};

#[derive(Debug, Clone, Default)]
pub struct Coffeelint;

impl Rule for Coffeelint {
    fn name(&self) -> &'static str {
        "coffeelint"
    }

    fn message(&self) -> &'static str {
        "fails coffeelint validation"
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        options: Option<&RuleOptions>,
        details: &mut Details,
    ) -> ValidationResult {
        let mut cmd = ToolCommand::new("coffeelint").args(["--csv", "-s"]);
        if let Some(config) = options.and_then(|o| o.get_str("config")) {
            cmd = cmd.arg("-f").arg(config);
        }
        let output = cmd.stdin(input.content).run()?;

        let mut valid = true;
        if !output.stderr.is_empty() {
            valid = false;
            details.push(output.stderr.trim_end());
        }
        if !parse_rows(&output.stdout, details) {
            valid = false;
        }
        Ok(Verdict::from_bool(valid))
    }
}

/// CSV rows look like `stdin,LINE,LEVEL,MESSAGE`; returns whether there were none.
fn parse_rows(output: &str, details: &mut Details) -> bool {
    let mut valid = true;
    for row in output.lines().filter(|r| !r.is_empty() && !r.starts_with("path,")) {
        valid = false;
        let cols: Vec<&str> = row.splitn(4, ',').collect();
        if cols.len() > 3 {
            details.add(cols[3], cols[1].parse().ok(), None);
        }
    }
    valid
}
