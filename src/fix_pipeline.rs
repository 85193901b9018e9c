//! Transactional fix chain: every fixer of a file's failed rules runs over an in-memory
//! buffer and the file is rewritten only when the whole chain succeeded.

use crate::aggregator::ErrorAggregator;
use crate::config::Config;
use crate::registry::RuleRegistry;
use crate::rule::{FixCapability, RuleError};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixError {
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
}

#[derive(Debug)]
pub enum StageResult {
    Applied,
    Failed(RuleError),
}

/// One fixer run in the chain
#[derive(Debug)]
pub struct StageReport {
    pub rule: String,
    pub result: StageResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnchangedReason {
    /// A fixer raised; later stages were abandoned
    StageFailed,
    /// The chain produced no bytes
    EmptyOutput,
    /// None of the rules has a fixer
    NoFixers,
    Backup(String),
    Write(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    Written,
    Unchanged(UnchangedReason),
}

#[derive(Debug)]
pub struct FixReport {
    pub file: PathBuf,
    pub stages: Vec<StageReport>,
    pub outcome: FixOutcome,
}

impl FixReport {
    pub fn is_written(&self) -> bool {
        self.outcome == FixOutcome::Written
    }
}

pub struct FixPipeline<'a> {
    registry: &'a RuleRegistry,
    config: &'a Config,
}

impl<'a> FixPipeline<'a> {
    pub fn new(registry: &'a RuleRegistry, config: &'a Config) -> Self {
        Self { registry, config }
    }

    /// Fix every file that recorded a failure, in first-failure order.
    pub fn fix_all(&self, aggregator: &ErrorAggregator) -> Result<Vec<FixReport>, FixError> {
        aggregator
            .group_by_file()
            .iter()
            .map(|(file, rules)| self.fix_file(file, rules))
            .collect()
    }

    /// Run the fixers of `rules` in order over `path`.
    pub fn fix_file(&self, path: &Path, rules: &[String]) -> Result<FixReport, FixError> {
        let unchanged = |stages: Vec<StageReport>, reason: UnchangedReason| FixReport {
            file: path.to_path_buf(),
            stages,
            outcome: FixOutcome::Unchanged(reason),
        };

        if self.config.create_backup {
            match self.backup(path) {
                Ok(backup) => log::debug!("Backed up {} to {}", path.display(), backup.display()),
                Err(message) => {
                    log::warn!("Not fixing {}: {message}", path.display());
                    return Ok(unchanged(Vec::new(), UnchangedReason::Backup(message)));
                }
            }
        }

        let mut buffer = fs::read(path).map_err(|source| FixError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut stages = Vec::new();
        for name in rules {
            let Some(rule) = self.registry.get(name) else {
                continue;
            };
            if rule.fix_capability() != FixCapability::Fixable {
                continue;
            }
            log::debug!("Fixing {} with {}..", path.display(), name);

            let mut destination = Vec::with_capacity(buffer.len());
            match rule.fix(&buffer, &mut destination, self.config.options_for(name)) {
                Ok(()) => {
                    buffer = destination;
                    stages.push(StageReport {
                        rule: name.clone(),
                        result: StageResult::Applied,
                    });
                }
                Err(e) => {
                    stages.push(StageReport {
                        rule: name.clone(),
                        result: StageResult::Failed(e),
                    });
                    return Ok(unchanged(stages, UnchangedReason::StageFailed));
                }
            }
        }

        if stages.is_empty() {
            return Ok(unchanged(stages, UnchangedReason::NoFixers));
        }
        if buffer.is_empty() {
            return Ok(unchanged(stages, UnchangedReason::EmptyOutput));
        }
        if let Err(e) = write_atomically(path, &buffer) {
            return Ok(unchanged(stages, UnchangedReason::Write(e.to_string())));
        }
        Ok(FixReport {
            file: path.to_path_buf(),
            stages,
            outcome: FixOutcome::Written,
        })
    }

    fn backup(&self, path: &Path) -> Result<PathBuf, String> {
        let backup = self.config.backup_path(path).map_err(|e| e.to_string())?;
        copy_preserving_times(path, &backup).map_err(|e| format!("failed to create backup {}: {e}", backup.display()))?;
        Ok(backup)
    }
}

/// Copy contents and permissions, then carry the modification time over.
fn copy_preserving_times(source: &Path, destination: &Path) -> io::Result<()> {
    fs::copy(source, destination)?;
    let modified = fs::metadata(source)?.modified()?;
    File::options().write(true).open(destination)?.set_modified(modified)
}

/// Replace `path` with `content` through a sibling temporary file and a rename,
/// keeping the original permissions. Symlinks are resolved first so the rename
/// lands on the link's target and the link itself survives.
fn write_atomically(path: &Path, content: &[u8]) -> io::Result<()> {
    let target = fs::canonicalize(path)?;
    let permissions = fs::metadata(&target)?.permissions();
    let dir = target.parent().unwrap_or(Path::new("/"));
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    fs::set_permissions(temp.path(), permissions)?;
    temp.persist(&target).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Details, Rule, RuleInput, RuleOptions, ValidationResult, Verdict};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    struct Broken;

    impl Rule for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn message(&self) -> &'static str {
            "is broken"
        }
        fn fix_capability(&self) -> FixCapability {
            FixCapability::Fixable
        }
        fn validate(
            &self,
            _input: &RuleInput<'_>,
            _options: Option<&RuleOptions>,
            _details: &mut Details,
        ) -> ValidationResult {
            Ok(Verdict::Fail)
        }
        fn fix(
            &self,
            _source: &[u8],
            _destination: &mut Vec<u8>,
            _options: Option<&RuleOptions>,
        ) -> Result<(), RuleError> {
            Err(RuleError::Execution("fixer crashed".to_string()))
        }
    }

    struct Eraser;

    impl Rule for Eraser {
        fn name(&self) -> &'static str {
            "eraser"
        }
        fn message(&self) -> &'static str {
            "is not empty"
        }
        fn fix_capability(&self) -> FixCapability {
            FixCapability::Fixable
        }
        fn validate(
            &self,
            _input: &RuleInput<'_>,
            _options: Option<&RuleOptions>,
            _details: &mut Details,
        ) -> ValidationResult {
            Ok(Verdict::Fail)
        }
        fn fix(
            &self,
            _source: &[u8],
            _destination: &mut Vec<u8>,
            _options: Option<&RuleOptions>,
        ) -> Result<(), RuleError> {
            Ok(())
        }
    }

    fn registry() -> RuleRegistry {
        let mut registry = RuleRegistry::with_builtin_rules();
        registry.register(Box::new(Broken)).unwrap();
        registry.register(Box::new(Eraser)).unwrap();
        registry
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_chain_is_applied_in_order() {
        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "line1 \nline2\t\n").unwrap();
        let original_mtime = fs::metadata(&file).unwrap().modified().unwrap();
        let registry = registry();
        let config = Config::default();

        let report = FixPipeline::new(&registry, &config)
            .fix_file(&file, &names(&["notabs", "notrailingws"]))
            .unwrap();

        assert!(report.is_written());
        assert_eq!(fs::read_to_string(&file).unwrap(), "line1\nline2\n");
        let backup = temp_dir.path().join(".a.txt.pre-cvfix");
        assert_eq!(fs::read_to_string(&backup).unwrap(), "line1 \nline2\t\n");
        assert_eq!(fs::metadata(&backup).unwrap().modified().unwrap(), original_mtime);
    }

    #[test]
    fn test_failing_stage_leaves_file_untouched() {
        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "x\t\n").unwrap();
        let registry = registry();
        let config = Config {
            create_backup: false,
            ..Config::default()
        };

        let report = FixPipeline::new(&registry, &config)
            .fix_file(&file, &names(&["notabs", "broken", "notrailingws"]))
            .unwrap();

        assert_eq!(report.outcome, FixOutcome::Unchanged(UnchangedReason::StageFailed));
        // the stage after the failure never ran
        assert_eq!(report.stages.len(), 2);
        assert!(matches!(report.stages[1].result, StageResult::Failed(_)));
        assert_eq!(fs::read(&file).unwrap(), b"x\t\n");
        assert!(!temp_dir.path().join(".a.txt.pre-cvfix").exists());
    }

    #[test]
    fn test_empty_result_is_not_written() {
        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "keep me").unwrap();
        let registry = registry();
        let config = Config::default();

        let report = FixPipeline::new(&registry, &config).fix_file(&file, &names(&["eraser"])).unwrap();
        assert_eq!(report.outcome, FixOutcome::Unchanged(UnchangedReason::EmptyOutput));
        assert_eq!(fs::read(&file).unwrap(), b"keep me");
    }

    #[test]
    fn test_rules_without_fixers_are_skipped() {
        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "a\t\n").unwrap();
        let registry = registry();
        let config = Config {
            create_backup: false,
            ..Config::default()
        };
        let pipeline = FixPipeline::new(&registry, &config);

        let report = pipeline.fix_file(&file, &names(&["utf8", "missing", "notabs"])).unwrap();
        assert!(report.is_written());
        assert_eq!(report.stages.len(), 1);
        assert_eq!(report.stages[0].rule, "notabs");

        let report = pipeline.fix_file(&file, &names(&["utf8", "json"])).unwrap();
        assert_eq!(report.outcome, FixOutcome::Unchanged(UnchangedReason::NoFixers));
    }

    #[test]
    fn test_invalid_backup_template_aborts_before_any_stage() {
        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "a\t\n").unwrap();
        let registry = registry();
        let config = Config {
            backup_filename: "backup".to_string(),
            ..Config::default()
        };

        let report = FixPipeline::new(&registry, &config).fix_file(&file, &names(&["notabs"])).unwrap();
        assert!(matches!(report.outcome, FixOutcome::Unchanged(UnchangedReason::Backup(_))));
        assert!(report.stages.is_empty());
        assert_eq!(fs::read(&file).unwrap(), b"a\t\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions_survive_the_rewrite() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("run.sh");
        fs::write(&file, "echo\t1\n").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o755)).unwrap();
        let registry = registry();
        let config = Config::default();

        let report = FixPipeline::new(&registry, &config).fix_file(&file, &names(&["notabs"])).unwrap();
        assert!(report.is_written());
        let mode = fs::metadata(&file).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o755);
        let backup_mode = fs::metadata(temp_dir.path().join(".run.sh.pre-cvfix")).unwrap().permissions().mode() & 0o777;
        assert_eq!(backup_mode, 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_fixed_through_the_link() {
        let temp_dir = tempdir().unwrap();
        let real = temp_dir.path().join("real.txt");
        let link = temp_dir.path().join("link.txt");
        fs::write(&real, "a\t\n").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();
        let registry = registry();
        let config = Config {
            create_backup: false,
            ..Config::default()
        };

        let report = FixPipeline::new(&registry, &config).fix_file(&link, &names(&["notabs"])).unwrap();
        assert!(report.is_written());
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "a    \n");
        assert_eq!(fs::read_to_string(&link).unwrap(), "a    \n");
    }

    #[test]
    fn test_fix_all_groups_failures() {
        use crate::aggregator::FailureRecord;

        let temp_dir = tempdir().unwrap();
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        fs::write(&a, "a \n").unwrap();
        fs::write(&b, "b\t\n").unwrap();
        let mut aggregator = ErrorAggregator::new();
        for (file, rule) in [(&b, "notabs"), (&a, "notrailingws"), (&b, "notabs")] {
            aggregator.record(FailureRecord {
                file: file.clone(),
                rule: rule.to_string(),
                message: String::new(),
                details: Vec::new(),
            });
        }
        let registry = registry();
        let config = Config {
            create_backup: false,
            ..Config::default()
        };

        let reports = FixPipeline::new(&registry, &config).fix_all(&aggregator).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].file, b);
        assert_eq!(reports[0].stages.len(), 1);
        assert_eq!(fs::read_to_string(&a).unwrap(), "a\n");
        assert_eq!(fs::read_to_string(&b).unwrap(), "b    \n");
    }
}
