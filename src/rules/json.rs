/// Rule json: content must parse as JSON
use crate::rule::{Details, Rule, RuleInput, RuleOptions, ValidationResult, Verdict};
use serde::de::IgnoredAny;

#[derive(Debug, Clone, Default)]
pub struct JsonValid;

impl Rule for JsonValid {
    fn name(&self) -> &'static str {
        "json"
    }

    fn message(&self) -> &'static str {
        "is not valid JSON"
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        _options: Option<&RuleOptions>,
        details: &mut Details,
    ) -> ValidationResult {
        match serde_json::from_slice::<IgnoredAny>(input.content) {
            Ok(_) => Ok(Verdict::Pass),
            Err(e) => {
                details.add(format!("JSONDecodeError: {e}"), Some(e.line()), Some(e.column()));
                Ok(Verdict::Fail)
            }
        }
    }
}
