/// Rule nobom: no UTF-8 byte order mark at the start of the file
use crate::rule::{Details, FixCapability, Rule, RuleError, RuleInput, RuleOptions, ValidationResult, Verdict};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

#[derive(Debug, Clone, Default)]
pub struct NoBom;

impl Rule for NoBom {
    fn name(&self) -> &'static str {
        "nobom"
    }

    fn message(&self) -> &'static str {
        "has UTF-8 byte order mark (BOM)"
    }

    fn fix_capability(&self) -> FixCapability {
        FixCapability::Fixable
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        _options: Option<&RuleOptions>,
        _details: &mut Details,
    ) -> ValidationResult {
        Ok(Verdict::from_bool(!input.content.starts_with(UTF8_BOM)))
    }

    fn fix(&self, source: &[u8], destination: &mut Vec<u8>, _options: Option<&RuleOptions>) -> Result<(), RuleError> {
        destination.extend_from_slice(source.strip_prefix(UTF8_BOM).unwrap_or(source));
        Ok(())
    }
}
