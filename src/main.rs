use anyhow::Context;
use clap::Parser;
use colored::*;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

use codevalidator_lib::aggregator::ErrorAggregator;
use codevalidator_lib::cli_types::Cli;
use codevalidator_lib::config::{self, Config};
use codevalidator_lib::discovery::walk_directory;
use codevalidator_lib::engine::ValidationEngine;
use codevalidator_lib::exit_codes::{self, exit};
use codevalidator_lib::fix_pipeline::FixPipeline;
use codevalidator_lib::output::{OutputFormatter, write_block};
use codevalidator_lib::registry::RuleRegistry;
use codevalidator_lib::rule::FixCapability;

fn init_logging(verbose: u8) {
    let default_level = if verbose > 1 { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "{} {}", record.level(), record.args()))
        .init();
}

fn list_rules(registry: &RuleRegistry) -> io::Result<()> {
    let lines: Vec<String> = registry
        .names()
        .filter_map(|name| registry.get(name))
        .map(|rule| {
            let fixable = if rule.fix_capability() == FixCapability::Fixable { " [fix]" } else { "" };
            format!("{:<14} {}{}", rule.name(), rule.message(), fixable)
        })
        .collect();
    write_block(&lines.join("\n"))
}

/// Validate one file and print its failures right away
fn validate_and_report(
    path: &Path,
    engine: &ValidationEngine<'_>,
    aggregator: &mut ErrorAggregator,
    formatter: &dyn OutputFormatter,
    verbose: u8,
) -> anyhow::Result<()> {
    let mark = aggregator.len();
    engine.validate_file(path, aggregator)?;
    write_block(&formatter.format_failures(aggregator.since(mark), verbose))?;
    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let mut config: Config = config::load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if cli.verbose > 0 {
        config.verbose = cli.verbose;
    }
    if cli.no_backup {
        config.create_backup = false;
    }
    // The configured verbosity counts like -v flags
    init_logging(config.verbose);

    let registry = RuleRegistry::with_builtin_rules();
    if cli.list_rules {
        list_rules(&registry)?;
        return Ok(exit_codes::SUCCESS);
    }

    let engine = ValidationEngine::new(&registry, &config)?;
    let pipeline = FixPipeline::new(&registry, &config);
    let formatter = cli.output_format.create_formatter(io::stdout().is_terminal());
    let mut aggregator = ErrorAggregator::new();

    for file in &cli.files {
        if cli.recursive && file.is_dir() {
            for path in walk_directory(file, &config.exclude_dirs)? {
                validate_and_report(&path, &engine, &mut aggregator, formatter.as_ref(), config.verbose)?;
            }
        } else if !cli.apply.is_empty() {
            let report = pipeline.fix_file(file, &cli.apply)?;
            write_block(&formatter.format_fix_report(&report))?;
        } else {
            validate_and_report(file, &engine, &mut aggregator, formatter.as_ref(), config.verbose)?;
        }
    }

    if aggregator.is_empty() {
        return Ok(exit_codes::SUCCESS);
    }
    if cli.fix {
        for report in pipeline.fix_all(&aggregator)? {
            write_block(&formatter.format_fix_report(&report))?;
        }
    }
    Ok(exit_codes::VIOLATIONS_FOUND)
}

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => exit::with_code(code),
        Err(e) => {
            eprintln!("{}: {e:#}", "error".red().bold());
            exit::tool_error();
        }
    }
}
