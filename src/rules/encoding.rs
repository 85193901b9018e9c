//! Encoding rules: utf8 and ascii.

use crate::rule::{Details, Rule, RuleInput, RuleOptions, ValidationResult, Verdict};

/// Rule utf8: content must decode as UTF-8
#[derive(Debug, Clone, Default)]
pub struct Utf8Encoding;

impl Rule for Utf8Encoding {
    fn name(&self) -> &'static str {
        "utf8"
    }

    fn message(&self) -> &'static str {
        "is not UTF-8 encoded"
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        _options: Option<&RuleOptions>,
        details: &mut Details,
    ) -> ValidationResult {
        match std::str::from_utf8(input.content) {
            Ok(_) => Ok(Verdict::Pass),
            Err(e) => {
                let line = input.content[..e.valid_up_to()].iter().filter(|&&b| b == b'\n').count() + 1;
                details.at_line(format!("invalid UTF-8 sequence at byte {}", e.valid_up_to()), line);
                Ok(Verdict::Fail)
            }
        }
    }
}

/// Rule ascii: content must be plain 7-bit ASCII
#[derive(Debug, Clone, Default)]
pub struct AsciiEncoding;

impl Rule for AsciiEncoding {
    fn name(&self) -> &'static str {
        "ascii"
    }

    fn message(&self) -> &'static str {
        "is not ASCII encoded"
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        _options: Option<&RuleOptions>,
        details: &mut Details,
    ) -> ValidationResult {
        let mut valid = true;
        for (idx, line) in input.lines().enumerate() {
            if let Some(col) = line.iter().position(|b| !b.is_ascii()) {
                valid = false;
                details.add("non-ASCII character", Some(idx + 1), Some(col + 1));
            }
        }
        Ok(Verdict::from_bool(valid))
    }
}
