/// Rule pep8: Python sources must pass `pycodestyle`; `autopep8` fixes them
///
/// Options (all required by the fixer, `max_line_length` also by the check):
/// - `max_line_length`
/// - `select`, `ignore`: comma separated error codes
/// - `passes`: maximum number of autopep8 passes
use super::{ToolCommand, parse_located_line};
use crate::rule::{Details, FixCapability, Rule, RuleError, RuleInput, RuleOptions, ValidationResult, Verdict};

#[derive(Debug, Clone, Default)]
pub struct Pep8;

fn options_or_err(options: Option<&RuleOptions>) -> Result<&RuleOptions, RuleError> {
    options.ok_or_else(|| RuleError::Configuration("pep8 options not set".to_string()))
}

impl Rule for Pep8 {
    fn name(&self) -> &'static str {
        "pep8"
    }

    fn message(&self) -> &'static str {
        "is not pep8 formatted"
    }

    fn requires_options(&self) -> bool {
        true
    }

    fn fix_capability(&self) -> FixCapability {
        FixCapability::Fixable
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        options: Option<&RuleOptions>,
        details: &mut Details,
    ) -> ValidationResult {
        let max_line_length = options_or_err(options)?.require(self.name(), "max_line_length")?;
        let output = ToolCommand::new("pycodestyle")
            .arg(format!("--max-line-length={max_line_length}"))
            .arg("-")
            .stdin(input.content)
            .run()?;

        for located in output.stdout.lines().filter_map(parse_located_line) {
            details.add(located.message, located.line, located.column);
        }
        Ok(Verdict::from_bool(output.success()))
    }

    fn fix(&self, source: &[u8], destination: &mut Vec<u8>, options: Option<&RuleOptions>) -> Result<(), RuleError> {
        let options = options_or_err(options)?;
        let output = ToolCommand::new("autopep8")
            .arg(format!("--select={}", options.require(self.name(), "select")?))
            .arg(format!("--ignore={}", options.require(self.name(), "ignore")?))
            .arg(format!("--max-line-length={}", options.require(self.name(), "max_line_length")?))
            .arg(format!("--pep8-passes={}", options.require(self.name(), "passes")?))
            .arg("--aggressive")
            .arg("-")
            .stdin(source)
            .run()?;
        if !output.success() {
            return Err(RuleError::Execution(format!(
                "autopep8 exited with {}: {}",
                output.exit_code,
                output.stderr.trim_end()
            )));
        }
        destination.extend_from_slice(output.stdout.as_bytes());
        Ok(())
    }
}
