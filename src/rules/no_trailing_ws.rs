/// Rule notrailingws: no line may end with spaces or tabs
///
/// The fix strips all trailing whitespace (CR included) and terminates every line with `\n`.
use crate::rule::{Details, FixCapability, Rule, RuleError, RuleInput, RuleOptions, ValidationResult, Verdict};

#[derive(Debug, Clone, Default)]
pub struct NoTrailingWhitespace;

impl NoTrailingWhitespace {
    fn has_trailing_whitespace(line: &[u8]) -> bool {
        let mut end = line.len();
        while end > 0 && matches!(line[end - 1], b'\n' | b'\r') {
            end -= 1;
        }
        end > 0 && matches!(line[end - 1], b' ' | b'\t')
    }
}

impl Rule for NoTrailingWhitespace {
    fn name(&self) -> &'static str {
        "notrailingws"
    }

    fn message(&self) -> &'static str {
        "contains lines with trailing whitespace"
    }

    fn fix_capability(&self) -> FixCapability {
        FixCapability::Fixable
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        _options: Option<&RuleOptions>,
        details: &mut Details,
    ) -> ValidationResult {
        let mut valid = true;
        for (idx, line) in input.lines().enumerate() {
            if Self::has_trailing_whitespace(line) {
                valid = false;
                details.at_line("trailing whitespace", idx + 1);
            }
        }
        Ok(Verdict::from_bool(valid))
    }

    fn fix(&self, source: &[u8], destination: &mut Vec<u8>, _options: Option<&RuleOptions>) -> Result<(), RuleError> {
        for line in source.split_inclusive(|&b| b == b'\n') {
            destination.extend_from_slice(line.trim_ascii_end());
            destination.push(b'\n');
        }
        Ok(())
    }
}
