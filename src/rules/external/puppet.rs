/// Rule puppet: manifests must pass `puppet parser validate`
///
/// The parser runs on a scratch copy with a throwaway confdir and vardir so that
/// nothing of the user's puppet setup leaks into the check.
use super::ToolCommand;
use crate::rule::{Details, Rule, RuleInput, RuleOptions, ValidationResult, Verdict};
use regex::Regex;
use std::io::Write;
use std::sync::LazyLock;

static UNPRINTABLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9 .:-]").unwrap());

#[derive(Debug, Clone, Default)]
pub struct PuppetParser;

impl Rule for PuppetParser {
    fn name(&self) -> &'static str {
        "puppet"
    }

    fn message(&self) -> &'static str {
        "fails puppet parser validation"
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        _options: Option<&RuleOptions>,
        details: &mut Details,
    ) -> ValidationResult {
        let mut manifest = tempfile::Builder::new().suffix(".pp").tempfile()?;
        manifest.write_all(input.content)?;
        manifest.flush()?;

        let output = ToolCommand::new("puppet")
            .args(["parser", "validate", "--color=false", "--confdir=/tmp", "--vardir=/tmp"])
            .arg(manifest.path())
            .env("HOME", "/tmp")
            .env("PATH", "/bin:/sbin:/usr/bin:/usr/sbin")
            .run()?;

        let combined = format!("{}{}", output.stdout, output.stderr);
        if combined.is_empty() && output.success() {
            return Ok(Verdict::Pass);
        }
        details.push(format!(
            "puppet parser exited with {}: {}",
            output.exit_code,
            sanitize(&combined)
        ));
        Ok(Verdict::Fail)
    }
}

fn sanitize(output: &str) -> String {
    UNPRINTABLE.replace_all(output, "").into_owned()
}
