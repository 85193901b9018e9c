/// Rule notabs: no hard tabs anywhere in the file
///
/// The fix expands every tab to four spaces, regardless of column.
use crate::rule::{Details, FixCapability, Rule, RuleError, RuleInput, RuleOptions, ValidationResult, Verdict};

const TAB_REPLACEMENT: &[u8] = b"    ";

#[derive(Debug, Clone, Default)]
pub struct NoTabs;

impl Rule for NoTabs {
    fn name(&self) -> &'static str {
        "notabs"
    }

    fn message(&self) -> &'static str {
        "contains tabs"
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
            if let Some(col) = line.iter().position(|&b| b == b'\t') {
                valid = false;
                details.add("tab character", Some(idx + 1), Some(col + 1));
            }
        }
        Ok(Verdict::from_bool(valid))
    }

    fn fix(&self, source: &[u8], destination: &mut Vec<u8>, _options: Option<&RuleOptions>) -> Result<(), RuleError> {
        destination.reserve(source.len());
        for &b in source {
            if b == b'\t' {
                destination.extend_from_slice(TAB_REPLACEMENT);
            } else {
                destination.push(b);
            }
        }
        Ok(())
    }
}
