//!
//! This module defines the run configuration, its built-in defaults and the loading logic.
//! A user configuration file (JSON, or TOML when the file name ends in `.toml`) is shallow
//! merged over the defaults: every top-level key it sets replaces the default wholesale.

use crate::rule::RuleOptions;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the per-user configuration file looked up in the home directory
pub const USER_CONFIG_FILE: &str = ".codevalidatorrc";

/// Placeholder the backup template must contain
pub const ORIGINAL_PLACEHOLDER: &str = "{original}";

pub const DEFAULT_BACKUP_FILENAME: &str = ".{original}.pre-cvfix";

/// Rules applied to every text file type
pub const DEFAULT_RULES: &[&str] = &["utf8", "nobom", "notabs", "nocr", "notrailingws"];

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file at {path}: {source}")]
    IoError { source: io::Error, path: String },

    /// Failed to parse the configuration content (TOML or JSON)
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// A `rules` key that is not a valid glob
    #[error("Invalid file pattern '{pattern}': {source}")]
    InvalidPattern { pattern: String, source: globset::Error },

    /// Backup template that cannot name a backup file
    #[error("Invalid backup filename template '{0}': must contain {{original}}")]
    InvalidBackupTemplate(String),
}

/// The complete run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory names whose files are never validated
    pub exclude_dirs: Vec<String>,

    /// File glob → rules, matched in order; every matching glob contributes
    pub rules: IndexMap<String, Vec<String>>,

    /// Directory name → rules for files anywhere below such a directory
    pub dir_rules: IndexMap<String, Vec<String>>,

    /// Rule name → option bag
    pub options: IndexMap<String, RuleOptions>,

    pub create_backup: bool,

    /// Backup file name; `{original}` is replaced by the file's base name
    pub backup_filename: String,

    pub verbose: u8,
}

fn with_default_rules(extra: &[&str]) -> Vec<String> {
    DEFAULT_RULES.iter().chain(extra).map(|r| r.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        let extension_rules: &[(&str, &[&str])] = &[
            ("*.coffee", &["coffeelint"]),
            ("*.conf", &[]),
            ("*.css", &[]),
            ("*.groovy", &[]),
            ("*.htm", &[]),
            ("*.html", &[]),
            ("*.java", &["jalopy"]),
            ("*.js", &[]),
            ("*.json", &["json"]),
            ("*.jsp", &[]),
            ("*.less", &[]),
            ("*.md", &[]),
            ("*.php", &["phpcs"]),
            ("*.phtml", &[]),
            ("*.pp", &["puppet"]),
            ("*.properties", &["ascii"]),
            ("*.py", &["pep8", "pyflakes"]),
            ("*.sh", &[]),
            ("*.sql", &[]),
            ("*.sql_diff", &[]),
            ("*.styl", &[]),
            ("*.txt", &[]),
            ("*.vm", &[]),
            ("*.wsdl", &[]),
            ("*.xml", &["xml", "xmlfmt"]),
        ];
        let mut rules: IndexMap<String, Vec<String>> = extension_rules
            .iter()
            .map(|(pattern, extra)| (pattern.to_string(), with_default_rules(extra)))
            .collect();
        rules.insert("*pom.xml".to_string(), vec!["pomdesc".to_string()]);

        let mut dir_rules = IndexMap::new();
        dir_rules.insert(
            "db_diffs".to_string(),
            vec!["sql_diff_dir".to_string(), "sql_diff_sql".to_string()],
        );
        dir_rules.insert("database".to_string(), vec!["database_dir".to_string()]);

        let mut options = IndexMap::new();
        options.insert(
            "phpcs".to_string(),
            RuleOptions::new().with("standard", "PSR").with("encoding", "UTF-8"),
        );
        options.insert(
            "pep8".to_string(),
            RuleOptions::new()
                .with("max_line_length", 120)
                .with("ignore", "N806")
                .with("passes", 5)
                .with("select", "e501"),
        );
        options.insert(
            "jalopy".to_string(),
            RuleOptions::new().with("classpath", "/opt/jalopy/lib/jalopy-1.9.4.jar:/opt/jalopy/lib/jh.jar"),
        );

        Self {
            exclude_dirs: vec![".svn".to_string(), ".git".to_string()],
            rules,
            dir_rules,
            options,
            create_backup: true,
            backup_filename: DEFAULT_BACKUP_FILENAME.to_string(),
            verbose: 0,
        }
    }
}

impl Config {
    /// Option bag configured for `rule`, if any
    pub fn options_for(&self, rule: &str) -> Option<&RuleOptions> {
        self.options.get(rule)
    }

    /// Shallow merge: each key present in `fragment` replaces the current value.
    pub fn merge(&mut self, fragment: ConfigFragment) {
        if let Some(exclude_dirs) = fragment.exclude_dirs {
            self.exclude_dirs = exclude_dirs;
        }
        if let Some(rules) = fragment.rules {
            self.rules = rules;
        }
        if let Some(dir_rules) = fragment.dir_rules {
            self.dir_rules = dir_rules;
        }
        if let Some(options) = fragment.options {
            self.options = options;
        }
        if let Some(create_backup) = fragment.create_backup {
            self.create_backup = create_backup;
        }
        if let Some(backup_filename) = fragment.backup_filename {
            self.backup_filename = backup_filename;
        }
        if let Some(verbose) = fragment.verbose {
            self.verbose = verbose;
        }
    }

    /// Where the backup of `file` goes: a sibling named after the backup template.
    pub fn backup_path(&self, file: &Path) -> Result<PathBuf, ConfigError> {
        if !self.backup_filename.contains(ORIGINAL_PLACEHOLDER) {
            return Err(ConfigError::InvalidBackupTemplate(self.backup_filename.clone()));
        }
        let basename = file
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        let backup_name = self.backup_filename.replace(ORIGINAL_PLACEHOLDER, &basename);
        Ok(match file.parent() {
            Some(dir) => dir.join(backup_name),
            None => PathBuf::from(backup_name),
        })
    }
}

/// A partially specified configuration as read from a file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigFragment {
    #[serde(alias = "excludeDirs", alias = "exclude-dirs")]
    pub exclude_dirs: Option<Vec<String>>,
    pub rules: Option<IndexMap<String, Vec<String>>>,
    #[serde(alias = "dirRules", alias = "dir-rules")]
    pub dir_rules: Option<IndexMap<String, Vec<String>>>,
    pub options: Option<IndexMap<String, RuleOptions>>,
    #[serde(alias = "createBackup", alias = "create-backup")]
    pub create_backup: Option<bool>,
    #[serde(
        alias = "backupFilename",
        alias = "backupFilenameTemplate",
        alias = "backup-filename"
    )]
    pub backup_filename: Option<String>,
    pub verbose: Option<u8>,
}

impl ConfigFragment {
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Read a configuration file; the format follows the file extension.
pub fn load_fragment(path: &Path) -> Result<ConfigFragment, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        source,
        path: path.display().to_string(),
    })?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        ConfigFragment::from_toml(&content)
    } else {
        ConfigFragment::from_json(&content)
    }
}

/// `~/.codevalidatorrc`, when the home directory can be determined
pub fn default_config_path() -> Option<PathBuf> {
    use etcetera::{BaseStrategy, choose_base_strategy};

    match choose_base_strategy() {
        Ok(strategy) => Some(strategy.home_dir().join(USER_CONFIG_FILE)),
        Err(e) => {
            log::debug!("Failed to determine home directory: {e}");
            None
        }
    }
}

/// Build the run configuration: defaults, overlaid with the explicit file if given,
/// otherwise with `~/.codevalidatorrc` when that exists.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = Config::default();
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|p| p.is_file()),
    };
    if let Some(path) = path {
        log::debug!("Loading configuration from {}", path.display());
        config.merge(load_fragment(&path)?);
    }
    Ok(config)
}
