/// Rule nocr: no carriage return characters (Windows line endings)
use crate::rule::{Details, FixCapability, Rule, RuleError, RuleInput, RuleOptions, ValidationResult, Verdict};

#[derive(Debug, Clone, Default)]
pub struct NoCarriageReturn;

impl Rule for NoCarriageReturn {
    fn name(&self) -> &'static str {
        "nocr"
    }

    fn message(&self) -> &'static str {
        "contains carriage return (CR)"
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
        Ok(Verdict::from_bool(!input.content.contains(&b'\r')))
    }

    fn fix(&self, source: &[u8], destination: &mut Vec<u8>, _options: Option<&RuleOptions>) -> Result<(), RuleError> {
        destination.extend(source.iter().copied().filter(|&b| b != b'\r'));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_detects_crlf() {
        let input = RuleInput::new(Path::new("a.txt"), b"a\r\nb\r\n");
        let verdict = NoCarriageReturn.validate(&input, None, &mut Details::new()).unwrap();
        assert_eq!(verdict, Verdict::Fail);
    }

    #[test]
    fn test_fix_strips_cr() {
        let mut out = Vec::new();
        NoCarriageReturn.fix(b"a\r\nb\rc", &mut out, None).unwrap();
        assert_eq!(out, b"a\nbc");
    }
}
