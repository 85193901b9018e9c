//! Runs the resolved rules against one file and records every failure.

use crate::aggregator::{ErrorAggregator, FailureRecord};
use crate::config::{Config, ConfigError};
use crate::registry::RuleRegistry;
use crate::resolver::RuleResolver;
use crate::rule::{Details, Rule, RuleError, RuleInput, Verdict};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that end the run; rule failures never end up here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },
}

/// Result of one rule invocation
#[derive(Debug)]
pub enum RuleOutcome {
    Pass,
    /// Failed; carries the user-facing message
    Fail(String),
    /// The rule raised instead of deciding
    Error(RuleError),
}

impl RuleOutcome {
    /// Message reported for a non-passing outcome
    pub fn failure_message(&self, rule: &str) -> Option<String> {
        match self {
            RuleOutcome::Pass => None,
            RuleOutcome::Fail(message) => Some(message.clone()),
            RuleOutcome::Error(e) => Some(format!("ERROR validating {rule}: {e}")),
        }
    }
}

pub struct ValidationEngine<'a> {
    registry: &'a RuleRegistry,
    config: &'a Config,
    resolver: RuleResolver,
}

impl<'a> ValidationEngine<'a> {
    pub fn new(registry: &'a RuleRegistry, config: &'a Config) -> Result<Self, ConfigError> {
        Ok(Self {
            registry,
            config,
            resolver: RuleResolver::new(config)?,
        })
    }

    /// Validate `path` with every rule that applies to it.
    /// Returns the number of failures recorded.
    pub fn validate_file(&self, path: &Path, aggregator: &mut ErrorAggregator) -> Result<usize, EngineError> {
        let rules = self.resolver.rule_names(path);
        if rules.is_empty() {
            return Ok(0);
        }
        let content = fs::read(path).map_err(|source| EngineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.validate_with_rules(path, &content, &rules, aggregator))
    }

    /// Run `rules` in order against already loaded content. One rule's failure or
    /// error never prevents the next rule from running.
    pub fn validate_with_rules(
        &self,
        path: &Path,
        content: &[u8],
        rules: &[String],
        aggregator: &mut ErrorAggregator,
    ) -> usize {
        let input = RuleInput::new(path, content);
        let mut failures = 0;
        for name in rules {
            log::debug!("Validating {} with {}..", path.display(), name);
            let Some(rule) = self.registry.get(name) else {
                log::warn!("{name} does not exist");
                continue;
            };
            let (outcome, details) = self.run_rule(rule, &input);
            if let Some(message) = outcome.failure_message(name) {
                failures += 1;
                aggregator.record(FailureRecord {
                    file: path.to_path_buf(),
                    rule: name.clone(),
                    message,
                    details: details.into_vec(),
                });
            }
        }
        failures
    }

    /// Invoke one rule with a fresh detail buffer.
    pub fn run_rule(&self, rule: &dyn Rule, input: &RuleInput<'_>) -> (RuleOutcome, Details) {
        let mut details = Details::new();
        let options = self.config.options_for(rule.name());
        if rule.requires_options() && options.is_none() {
            let error = RuleError::Configuration(format!("options for rule {} not set", rule.name()));
            return (RuleOutcome::Error(error), details);
        }

        let outcome = match rule.validate(input, options, &mut details) {
            Ok(Verdict::Pass) => RuleOutcome::Pass,
            Ok(Verdict::Fail) => {
                let template = rule.message();
                RuleOutcome::Fail(match options {
                    Some(options) => options.interpolate(template),
                    None => template.to_string(),
                })
            }
            Ok(Verdict::FailWith(message)) => RuleOutcome::Fail(message),
            Err(e) => RuleOutcome::Error(e),
        };
        (outcome, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{RuleOptions, ValidationResult};
    use indexmap::IndexMap;

    /// Reports how much content it saw; verdict is configurable
    struct Scripted {
        name: &'static str,
        verdict: fn() -> ValidationResult,
        needs_options: bool,
    }

    impl Scripted {
        fn new(name: &'static str, verdict: fn() -> ValidationResult) -> Self {
            Self {
                name,
                verdict,
                needs_options: false,
            }
        }
    }

    impl Rule for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        fn message(&self) -> &'static str {
            "fails the {flavor} check"
        }

        fn requires_options(&self) -> bool {
            self.needs_options
        }

        fn validate(
            &self,
            input: &RuleInput<'_>,
            _options: Option<&RuleOptions>,
            details: &mut Details,
        ) -> ValidationResult {
            details.push(format!("{} saw {} bytes", self.name, input.content.len()));
            (self.verdict)()
        }
    }

    fn setup(scripted: Vec<Scripted>, options: IndexMap<String, RuleOptions>) -> (RuleRegistry, Config) {
        let mut registry = RuleRegistry::new();
        for rule in scripted {
            registry.register(Box::new(rule)).unwrap();
        }
        let config = Config {
            options,
            ..Config::default()
        };
        (registry, config)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_every_rule_runs_and_outcomes_map_to_messages() {
        let mut options = IndexMap::new();
        options.insert("fail".to_string(), RuleOptions::new().with("flavor", "sour"));
        let (registry, config) = setup(
            vec![
                Scripted::new("error", || Err(RuleError::Execution("boom".to_string()))),
                Scripted::new("fail", || Ok(Verdict::Fail)),
                Scripted::new("custom", || Ok(Verdict::FailWith("custom words".to_string()))),
                Scripted::new("pass", || Ok(Verdict::Pass)),
            ],
            options,
        );
        let engine = ValidationEngine::new(&registry, &config).unwrap();
        let mut aggregator = ErrorAggregator::new();

        let failures = engine.validate_with_rules(
            Path::new("x.txt"),
            b"abc",
            &names(&["error", "missing", "fail", "custom", "pass"]),
            &mut aggregator,
        );

        assert_eq!(failures, 3);
        let messages: Vec<_> = aggregator.records().iter().map(|r| r.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "ERROR validating error: ExecutionError: boom",
                "fails the sour check",
                "custom words",
            ]
        );
        // details never leak from one rule into the next
        for record in aggregator.records() {
            assert_eq!(record.details.len(), 1);
            assert_eq!(record.details[0].message, format!("{} saw 3 bytes", record.rule));
        }
    }

    #[test]
    fn test_repeated_rule_sees_the_whole_content_each_time() {
        let (registry, config) = setup(
            vec![Scripted::new("a", || Ok(Verdict::Fail)), Scripted::new("b", || Ok(Verdict::Pass))],
            IndexMap::new(),
        );
        let engine = ValidationEngine::new(&registry, &config).unwrap();
        let mut aggregator = ErrorAggregator::new();
        engine.validate_with_rules(Path::new("x"), b"12345", &names(&["a", "b", "a"]), &mut aggregator);

        assert_eq!(aggregator.len(), 2);
        for record in aggregator.records() {
            assert_eq!(record.details[0].message, "a saw 5 bytes");
            // no option bag: the template is reported as is
            assert_eq!(record.message, "fails the {flavor} check");
        }
    }

    #[test]
    fn test_missing_required_options_fail_only_that_rule() {
        let mut needy = Scripted::new("needy", || Ok(Verdict::Pass));
        needy.needs_options = true;
        let (registry, config) = setup(vec![needy, Scripted::new("ok", || Ok(Verdict::Pass))], IndexMap::new());
        let engine = ValidationEngine::new(&registry, &config).unwrap();
        let mut aggregator = ErrorAggregator::new();

        let failures = engine.validate_with_rules(Path::new("x"), b"", &names(&["needy", "ok"]), &mut aggregator);
        assert_eq!(failures, 1);
        assert_eq!(
            aggregator.records()[0].message,
            "ERROR validating needy: ConfigurationError: options for rule needy not set"
        );
    }

    #[test]
    fn test_unreadable_file_is_an_engine_error() {
        let registry = RuleRegistry::with_builtin_rules();
        let config = Config::default();
        let engine = ValidationEngine::new(&registry, &config).unwrap();
        let mut aggregator = ErrorAggregator::new();
        let err = engine
            .validate_file(Path::new("/nonexistent/dir/file.txt"), &mut aggregator)
            .unwrap_err();
        assert!(matches!(err, EngineError::Read { .. }));
    }

    #[test]
    fn test_unmatched_file_is_skipped_without_reading() {
        let registry = RuleRegistry::with_builtin_rules();
        let config = Config::default();
        let engine = ValidationEngine::new(&registry, &config).unwrap();
        let mut aggregator = ErrorAggregator::new();
        assert_eq!(
            engine.validate_file(Path::new("/nonexistent/file.unknownext"), &mut aggregator).unwrap(),
            0
        );
    }
}
