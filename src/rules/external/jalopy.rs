/// Rule jalopy: Java sources must already be formatted the way Jalopy formats them
///
/// Options:
/// - `classpath`: classpath holding the Jalopy jars (required)
/// - `config`: Jalopy convention file
/// - `java_bin`: java executable (default `/usr/bin/java`)
use super::ToolCommand;
use crate::rule::{Details, FixCapability, Rule, RuleError, RuleInput, RuleOptions, ValidationResult, Verdict};
use std::io::Write;

const DEFAULT_JAVA_BIN: &str = "/usr/bin/java";

#[derive(Debug, Clone, Default)]
pub struct Jalopy;

impl Jalopy {
    /// Format `original` with Jalopy and return the result.
    fn format(&self, original: &[u8], options: Option<&RuleOptions>) -> Result<Vec<u8>, RuleError> {
        let classpath = options
            .and_then(|o| o.get_str("classpath"))
            .filter(|cp| !cp.is_empty())
            .ok_or_else(|| RuleError::Configuration("Jalopy classpath not set".to_string()))?;
        let java_bin = options.and_then(|o| o.get_str("java_bin")).unwrap_or(DEFAULT_JAVA_BIN);

        let mut source = tempfile::Builder::new().suffix(".java").tempfile()?;
        source.write_all(original)?;
        source.flush()?;

        let mut cmd = ToolCommand::new(java_bin).args(["-classpath", classpath, "Jalopy"]);
        if let Some(convention) = options.and_then(|o| o.get_str("config")) {
            cmd = cmd.arg("--convention").arg(convention);
        }
        let output = cmd
            .arg(source.path())
            .env("LANG", "en_US.utf8")
            .env("LC_ALL", "en_US.utf8")
            .run()?;
        if !output.stderr.is_empty() || output.stdout.contains("ERROR") {
            return Err(RuleError::Execution(format!(
                "Failed to execute Jalopy: {}{}",
                output.stderr, output.stdout
            )));
        }

        // Jalopy rewrites the file in place
        Ok(std::fs::read(source.path())?)
    }
}

impl Rule for Jalopy {
    fn name(&self) -> &'static str {
        "jalopy"
    }

    fn message(&self) -> &'static str {
        "is not Jalopy formatted"
    }

    fn fix_capability(&self) -> FixCapability {
        FixCapability::Fixable
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        options: Option<&RuleOptions>,
        _details: &mut Details,
    ) -> ValidationResult {
        let formatted = self.format(input.content, options)?;
        Ok(Verdict::from_bool(formatted == input.content))
    }

    fn fix(&self, source: &[u8], destination: &mut Vec<u8>, options: Option<&RuleOptions>) -> Result<(), RuleError> {
        destination.extend(self.format(source, options)?);
        Ok(())
    }
}
