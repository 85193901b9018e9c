/// Rule indent4: indentation must be a multiple of four spaces
///
/// Lines of a block comment aligned on `*` (one extra space) are accepted.
use crate::rule::{Details, Rule, RuleInput, RuleOptions, ValidationResult, Verdict};

const INDENT_WIDTH: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct Indent4;

impl Indent4 {
    fn is_valid_line(line: &[u8]) -> bool {
        let Some(pos) = line.iter().position(|&b| b != b' ') else {
            return true;
        };
        pos % INDENT_WIDTH == 0 || (line[pos] == b'*' && (pos - 1) % INDENT_WIDTH == 0)
    }
}

impl Rule for Indent4 {
    fn name(&self) -> &'static str {
        "indent4"
    }

    fn message(&self) -> &'static str {
        "contains invalid indentation (not 4 spaces)"
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        _options: Option<&RuleOptions>,
        details: &mut Details,
    ) -> ValidationResult {
        match input.lines().position(|line| !Self::is_valid_line(line)) {
            Some(idx) => {
                details.at_line("indentation is not a multiple of 4 spaces", idx + 1);
                Ok(Verdict::Fail)
            }
            None => Ok(Verdict::Pass),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_validity() {
        assert!(Indent4::is_valid_line(b"code\n"));
        assert!(Indent4::is_valid_line(b"        nested\n"));
        assert!(!Indent4::is_valid_line(b"  two\n"));
        assert!(Indent4::is_valid_line(b"     * block comment\n"));
        assert!(Indent4::is_valid_line(b" */\n"));
        assert!(!Indent4::is_valid_line(b"   * misaligned\n"));
    }

    #[test]
    fn test_whitespace_only_lines() {
        // only spaces up to the newline: the newline is the first non-space byte
        assert!(!Indent4::is_valid_line(b"   \n"));
        assert!(Indent4::is_valid_line(b"    \n"));
        assert!(Indent4::is_valid_line(b"   "));
    }
}
