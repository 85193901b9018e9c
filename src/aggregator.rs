//! Run-scoped record of every (file, rule) failure.

use crate::rule::Detail;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub file: PathBuf,
    pub rule: String,
    pub message: String,
    pub details: Vec<Detail>,
}

/// Append-only list of failures in the order they were found.
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    records: Vec<FailureRecord>,
}

impl ErrorAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: FailureRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[FailureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records appended after the first `start` ones
    pub fn since(&self, start: usize) -> &[FailureRecord] {
        self.records.get(start..).unwrap_or(&[])
    }

    /// Failing files in first-failure order, each with its failed rules deduplicated
    pub fn group_by_file(&self) -> IndexMap<PathBuf, Vec<String>> {
        let mut grouped: IndexMap<PathBuf, Vec<String>> = IndexMap::new();
        for record in &self.records {
            let rules = grouped.entry(record.file.clone()).or_default();
            if !rules.contains(&record.rule) {
                rules.push(record.rule.clone());
            }
        }
        grouped
    }
}
