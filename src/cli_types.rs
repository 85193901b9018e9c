use crate::output::OutputFormat;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "codevalidator",
    author,
    version,
    about = "Validate source code files and optionally reformat them."
)]
pub struct Cli {
    /// List of source files to validate
    #[arg(value_name = "FILES", required_unless_present = "list_rules")]
    pub files: Vec<PathBuf>,

    /// Process given directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Use custom configuration file (default: ~/.codevalidatorrc)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Try to fix validation errors (by reformatting files)
    #[arg(short, long)]
    pub fix: bool,

    /// Apply the given rule(s) instead of validating
    #[arg(short, long, value_name = "RULE", action = ArgAction::Append)]
    pub apply: Vec<String>,

    /// Print more detailed error information (-vv for debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// For --fix: do not create a backup file
    #[arg(long)]
    pub no_backup: bool,

    /// Output format: text (default) or json-lines
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub output_format: OutputFormat,

    /// List all available rules
    #[arg(short, long)]
    pub list_rules: bool,
}
