//! Rules for database migration scripts ("db diffs").
//!
//! Both rules are meant to be attached through `dir_rules`: every file below a
//! `db_diffs` directory is a patch that must follow the naming and content
//! conventions checked here. Failures carry their own message.

use crate::rule::{Details, Rule, RuleInput, RuleOptions, ValidationResult, Verdict};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static TICKET_DIR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]+-[0-9]+").unwrap());
static CD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^ *\\cd +").unwrap());
static INCLUDE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^ *\\i +(\S+)").unwrap());

const DEFAULT_ROLE: &str = "zalando";

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

fn parent_dir_name(path: &Path) -> Option<String> {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    absolute
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
}

/// Rule sql_diff_dir: patch files live in a ticket directory and are named after it
#[derive(Debug, Clone, Default)]
pub struct SqlDiffDir;

impl Rule for SqlDiffDir {
    fn name(&self) -> &'static str {
        "sql_diff_dir"
    }

    fn message(&self) -> &'static str {
        "has invalid db diff location"
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        _options: Option<&RuleOptions>,
        _details: &mut Details,
    ) -> ValidationResult {
        let filename = file_name(input.path);
        if !(filename.ends_with(".sql_diff") || filename.ends_with(".py")) {
            return Ok(Verdict::FailWith(
                "dbdiffs and migration scripts should use .sql_diff or .py extension".to_string(),
            ));
        }

        let basedir = parent_dir_name(input.path).unwrap_or_default();
        if !TICKET_DIR_REGEX.is_match(&basedir) {
            return Ok(Verdict::FailWith(
                "Patch should be located in directory with the name of the jira ticket".to_string(),
            ));
        }
        if !filename.starts_with(&basedir) {
            return Ok(Verdict::FailWith(
                "Filename should start with the parent directory name".to_string(),
            ));
        }

        Ok(Verdict::Pass)
    }
}

/// Rule sql_diff_sql: patch content sets the role, uses allowed includes and registers itself
///
/// The expected role defaults to `zalando` and can be changed with the `role` option.
#[derive(Debug, Clone, Default)]
pub struct SqlDiffSql;

impl SqlDiffSql {
    fn check(sql: &str, filename: &str, role: &str) -> Option<String> {
        let set_role = Regex::new(&format!(r"(?i:set +role +to) +{}(_admin)?\s*", regex::escape(role))).ok()?;
        if !set_role.is_match(sql) {
            return Some(format!("set role to {role}; must be present in db diff"));
        }

        if CD_REGEX.is_match(sql) {
            return Some(r"\cd : is not allowed in db diffs anymore".to_string());
        }

        for capture in INCLUDE_REGEX.captures_iter(sql) {
            if !capture[1].starts_with("database/") {
                return Some(r"include path (\i ) should starts with `database/` directory".to_string());
            }
        }

        if filename.contains("rollback") {
            let Some(patch_name) = filename.strip_suffix(".rollback.sql_diff") else {
                return Some("rollback script should have .rollback.sql_diff extension".to_string());
            };
            if !Self::calls_patch_function(sql, "unregister_patch", patch_name) {
                return Some("unregister patch not found or patch name does not match with filename".to_string());
            }
        } else {
            let patch_name = filename.strip_suffix(".sql_diff").unwrap_or(filename);
            if !Self::calls_patch_function(sql, "register_patch", patch_name) {
                return Some("register patch not found or patch name does not match with filename".to_string());
            }
        }

        None
    }

    fn calls_patch_function(sql: &str, function: &str, patch_name: &str) -> bool {
        let pattern = format!(r"(?i:select) +_v\.{function} *\( *'{}'", regex::escape(patch_name));
        Regex::new(&pattern).map(|re| re.is_match(sql)).unwrap_or(false)
    }
}

impl Rule for SqlDiffSql {
    fn name(&self) -> &'static str {
        "sql_diff_sql"
    }

    fn message(&self) -> &'static str {
        "has invalid db diff content"
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        options: Option<&RuleOptions>,
        _details: &mut Details,
    ) -> ValidationResult {
        let filename = file_name(input.path);
        if filename.ends_with(".py") {
            return Ok(Verdict::Pass);
        }
        let role = options.and_then(|o| o.get_str("role")).unwrap_or(DEFAULT_ROLE);
        match Self::check(&input.text(), filename, role) {
            Some(message) => Ok(Verdict::FailWith(message)),
            None => Ok(Verdict::Pass),
        }
    }
}
