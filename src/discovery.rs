//! Recursive directory traversal for `--recursive`.

use crate::engine::EngineError;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// All regular files below `root` in file-name order. Directories named in
/// `exclude_dirs` are pruned without being entered.
pub fn walk_directory(root: &Path, exclude_dirs: &[String]) -> Result<Vec<PathBuf>, EngineError> {
    let mut walk_builder = WalkBuilder::new(root);
    // Every file counts, ignore files and hidden entries included
    walk_builder.standard_filters(false);
    walk_builder.hidden(false);
    walk_builder.follow_links(false);
    walk_builder.sort_by_file_name(|a, b| a.cmp(b));

    let excluded = exclude_dirs.to_vec();
    walk_builder.filter_entry(move |entry| {
        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
        let keep = !(is_dir
            && entry.depth() > 0
            && excluded.iter().any(|ex| entry.file_name() == ex.as_str()));
        if !keep {
            log::debug!("Skipping excluded directory {}", entry.path().display());
        }
        keep
    });

    let mut files = Vec::new();
    for result in walk_builder.build() {
        let entry = result.map_err(|e| EngineError::Walk {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;
        if entry.file_type().is_some_and(|ft| ft.is_file()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
