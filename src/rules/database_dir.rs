/// Rule database_dir: SQL files below `database/` must pass the external SQL parser
///
/// Options:
/// - `pgsql-parser-bin`: parser executable (default `/opt/codevalidator/PgSqlParser`)
/// - `skip`: path fragments exempt from the check (default `["database/lounge"]`)
use crate::rule::{Details, Rule, RuleInput, RuleOptions, ValidationResult, Verdict};
use crate::rules::external::ToolCommand;

const DEFAULT_PARSER_BIN: &str = "/opt/codevalidator/PgSqlParser";
const DEFAULT_SKIP: &[&str] = &["database/lounge"];

#[derive(Debug, Clone, Default)]
pub struct DatabaseDir;

impl Rule for DatabaseDir {
    fn name(&self) -> &'static str {
        "database_dir"
    }

    fn message(&self) -> &'static str {
        "contains syntax errors"
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        options: Option<&RuleOptions>,
        details: &mut Details,
    ) -> ValidationResult {
        let path = input.path_str();
        let skip: Vec<String> = options
            .and_then(|o| o.get("skip"))
            .unwrap_or_else(|| DEFAULT_SKIP.iter().map(|s| s.to_string()).collect());
        if !path.ends_with(".sql") || skip.iter().any(|fragment| path.contains(fragment.as_str())) {
            return Ok(Verdict::Pass);
        }

        let parser = options
            .and_then(|o| o.get_str("pgsql-parser-bin"))
            .unwrap_or(DEFAULT_PARSER_BIN);
        match ToolCommand::new(parser).args(["-q", "-c", "-i"]).arg(input.path).run() {
            Ok(output) => Ok(Verdict::from_bool(output.success())),
            Err(e) => {
                // a parser that cannot run counts as a failed check, not as a rule error
                details.push(e.to_string());
                Ok(Verdict::Fail)
            }
        }
    }
}
