/// Rule pythontidy: Python sources must already be in PythonTidy's output form
///
/// PythonTidy filters stdin to stdout. Sources shorter than four bytes are never
/// checked or rewritten. The executable can be overridden with the `command` option.
use super::ToolCommand;
use crate::rule::{Details, FixCapability, Rule, RuleError, RuleInput, RuleOptions, ValidationResult, Verdict};

const DEFAULT_COMMAND: &str = "PythonTidy";
const MIN_TIDY_LEN: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct PythonTidy;

impl PythonTidy {
    fn tidy(source: &[u8], options: Option<&RuleOptions>) -> Result<Vec<u8>, RuleError> {
        let command = options
            .and_then(|o| o.get_str("command"))
            .unwrap_or(DEFAULT_COMMAND);
        let output = ToolCommand::new(command).stdin(source).run()?;
        if !output.success() {
            return Err(RuleError::Execution(format!(
                "{command} exited with {}: {}",
                output.exit_code,
                output.stderr.trim_end()
            )));
        }
        Ok(output.stdout.into_bytes())
    }
}

impl Rule for PythonTidy {
    fn name(&self) -> &'static str {
        "pythontidy"
    }

    fn message(&self) -> &'static str {
        "is not PythonTidy formatted"
    }

    fn fix_capability(&self) -> FixCapability {
        FixCapability::Fixable
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        options: Option<&RuleOptions>,
        _details: &mut Details,
    ) -> ValidationResult {
        if input.content.len() < MIN_TIDY_LEN {
            return Ok(Verdict::Pass);
        }
        let formatted = Self::tidy(input.content, options)?;
        Ok(Verdict::from_bool(formatted == input.content))
    }

    fn fix(&self, source: &[u8], destination: &mut Vec<u8>, options: Option<&RuleOptions>) -> Result<(), RuleError> {
        if source.len() < MIN_TIDY_LEN {
            destination.extend_from_slice(source);
            return Ok(());
        }
        destination.extend_from_slice(&Self::tidy(source, options)?);
        Ok(())
    }
}
