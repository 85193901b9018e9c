/// Rule invalidpath: the file name or extension is not allowed at all
///
/// Meant to be mapped onto patterns that should never be committed (e.g. `*.orig`).
use crate::rule::{Details, Rule, RuleInput, RuleOptions, ValidationResult, Verdict};

#[derive(Debug, Clone, Default)]
pub struct InvalidPath;

impl Rule for InvalidPath {
    fn name(&self) -> &'static str {
        "invalidpath"
    }

    fn message(&self) -> &'static str {
        "has invalid file path (file name or extension is not allowed)"
    }

    fn validate(
        &self,
        _input: &RuleInput<'_>,
        _options: Option<&RuleOptions>,
        _details: &mut Details,
    ) -> ValidationResult {
        Ok(Verdict::Fail)
    }
}
