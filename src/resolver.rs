//! Maps a file path to the ordered list of rule names that apply to it.

use crate::config::{Config, ConfigError};
use globset::{Glob, GlobBuilder, GlobMatcher};
use std::path::{Component, Path};

/// Where a resolved rule came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSource {
    /// A `dir_rules` entry naming one of the file's ancestor directories
    Directory,
    /// A `rules` glob matching the path
    Extension,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRule {
    pub name: String,
    pub source: RuleSource,
}

struct PatternRules {
    matcher: GlobMatcher,
    rules: Vec<String>,
}

/// Compiled view of the configuration's `exclude_dirs`, `dir_rules` and `rules`.
pub struct RuleResolver {
    exclude_dirs: Vec<String>,
    dir_rules: Vec<(String, Vec<String>)>,
    patterns: Vec<PatternRules>,
}

fn compile(pattern: &str) -> Result<GlobMatcher, ConfigError> {
    // fnmatch semantics: `*` also crosses `/`
    let glob: Result<Glob, _> = GlobBuilder::new(pattern).literal_separator(false).build();
    glob.map(|g| g.compile_matcher())
        .map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Names of the directories leading to `path`, the file name excluded
fn directory_names(path: &Path) -> Vec<String> {
    let parent = path.parent().unwrap_or(Path::new(""));
    parent
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

impl RuleResolver {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let patterns = config
            .rules
            .iter()
            .map(|(pattern, rules)| {
                Ok(PatternRules {
                    matcher: compile(pattern)?,
                    rules: rules.clone(),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self {
            exclude_dirs: config.exclude_dirs.clone(),
            dir_rules: config
                .dir_rules
                .iter()
                .map(|(dir, rules)| (dir.clone(), rules.clone()))
                .collect(),
            patterns,
        })
    }

    /// True when one of the path's directories is an excluded directory name
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude_dirs.is_empty() {
            return false;
        }
        directory_names(path)
            .iter()
            .any(|dir| self.exclude_dirs.iter().any(|ex| ex == dir))
    }

    /// Directory rules first, then every matching glob's rules, each group in
    /// configuration order. Duplicates are kept.
    pub fn resolve(&self, path: &Path) -> Vec<ResolvedRule> {
        if self.is_excluded(path) {
            log::debug!("Skipping {}: excluded directory", path.display());
            return Vec::new();
        }

        let mut resolved = Vec::new();
        if !self.dir_rules.is_empty() {
            let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
            let dirs = directory_names(&absolute);
            for (dir, rules) in &self.dir_rules {
                if dirs.iter().any(|d| d == dir) {
                    resolved.extend(rules.iter().map(|name| ResolvedRule {
                        name: name.clone(),
                        source: RuleSource::Directory,
                    }));
                }
            }
        }

        for pattern in &self.patterns {
            if pattern.matcher.is_match(path) {
                resolved.extend(pattern.rules.iter().map(|name| ResolvedRule {
                    name: name.clone(),
                    source: RuleSource::Extension,
                }));
            }
        }
        resolved
    }

    /// Just the names, in resolution order
    pub fn rule_names(&self, path: &Path) -> Vec<String> {
        self.resolve(path).into_iter().map(|r| r.name).collect()
    }
}
