pub mod aggregator;
pub mod cli_types;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod exit_codes;
pub mod fix_pipeline;
pub mod markup;
pub mod output;
pub mod registry;
pub mod resolver;
pub mod rule;
pub mod rules;

pub use aggregator::{ErrorAggregator, FailureRecord};
pub use config::{Config, ConfigError};
pub use engine::{EngineError, ValidationEngine};
pub use fix_pipeline::{FixOutcome, FixPipeline, FixReport};
pub use registry::RuleRegistry;
pub use resolver::RuleResolver;
pub use rule::{Rule, RuleError, Verdict};
