/// Rule pyflakes: Python sources must not produce any `pyflakes` warning
use super::{ToolCommand, parse_located_line};
use crate::rule::{Details, Rule, RuleInput, RuleOptions, ValidationResult, Verdict};

#[derive(Debug, Clone, Default)]
pub struct Pyflakes;

impl Rule for Pyflakes {
    fn name(&self) -> &'static str {
        "pyflakes"
    }

    fn message(&self) -> &'static str {
        "doesn't pass Pyflakes validation"
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        _options: Option<&RuleOptions>,
        details: &mut Details,
    ) -> ValidationResult {
        let output = ToolCommand::new("pyflakes").stdin(input.content).run()?;
        let reported = collect_messages(&output.stdout, &output.stderr, details);
        if reported == 0 && !output.success() {
            details.push(output.stderr.trim_end());
        }
        Ok(Verdict::from_bool(reported == 0 && output.success()))
    }
}

/// Syntax errors arrive on stderr, warnings on stdout. Details are ordered by line.
fn collect_messages(stdout: &str, stderr: &str, details: &mut Details) -> usize {
    let mut messages: Vec<_> = stdout.lines().chain(stderr.lines()).filter_map(parse_located_line).collect();
    messages.sort_by_key(|m| m.line);
    let count = messages.len();
    for m in messages {
        details.add(m.message, m.line, None);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_sorted_by_line() {
        let mut details = Details::new();
        let count = collect_messages(
            "<stdin>:9:1: undefined name 'foo'\n<stdin>:2:1: 'os' imported but unused\n",
            "",
            &mut details,
        );
        assert_eq!(count, 2);
        let records = details.into_vec();
        assert_eq!(records[0].line, Some(2));
        assert_eq!(records[0].message, "'os' imported but unused");
        assert_eq!(records[1].message, "undefined name 'foo'");
    }

    #[test]
    fn test_syntax_error_from_stderr() {
        let mut details = Details::new();
        let count = collect_messages("", "<stdin>:1:7: invalid syntax\nx = = 1\n      ^\n", &mut details);
        assert_eq!(count, 1);
        assert_eq!(details.into_vec()[0].line, Some(1));
    }
}
