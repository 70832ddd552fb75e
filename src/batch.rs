//! Multi-file migration
//!
//! Expands input paths into stylesheet files and rewrites them in parallel.
//! Every file is an independent engine call; outcomes come back in input
//! order.

use glob::glob;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::mapping::Mapping;
use crate::rewrite::{rewrite_passes, RewriteOutput, Strategy};

/// Suffix of files written by a previous migration; never picked up as input
pub const MIGRATED_SUFFIX: &str = ".migrated.css";

/// Error while collecting or reading inputs
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BatchError {
    /// Invalid glob pattern
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    /// Input path does not exist
    #[error("No such file or directory: {}", .0.display())]
    Missing(PathBuf),
    /// Input could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What to run on every file
#[derive(Debug, Clone, Default)]
pub struct MigrationJob {
    /// Mappings applied one after another
    pub passes: Vec<Mapping>,
    pub strategy: Strategy,
}

impl MigrationJob {
    pub fn run(&self, text: &str) -> RewriteOutput {
        rewrite_passes(text, &self.passes, self.strategy)
    }
}

/// Result for one input file
#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub result: Result<RewriteOutput, BatchError>,
}

/// Expand files and directories into a sorted list of stylesheets.
///
/// Files are kept as given. Directories contribute every `**/*.css` below
/// them except earlier migration outputs and files named in `skip_names`.
pub fn collect_inputs(paths: &[PathBuf], skip_names: &[&str]) -> Result<Vec<PathBuf>, BatchError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            files.extend(discover_stylesheets(path, skip_names)?);
        } else {
            return Err(BatchError::Missing(path.clone()));
        }
    }
    let mut seen = BTreeSet::new();
    files.retain(|f| seen.insert(f.clone()));
    Ok(files)
}

/// Every `.css` file below `dir`, sorted.
pub fn discover_stylesheets(dir: &Path, skip_names: &[&str]) -> Result<Vec<PathBuf>, BatchError> {
    let full_pattern = dir.join("**").join("*.css");
    let pattern_str = full_pattern.to_string_lossy();

    let paths = glob(&pattern_str).map_err(|source| BatchError::InvalidPattern {
        pattern: pattern_str.to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                if path.is_file() && !is_migration_output(&path) && !has_name(&path, skip_names) {
                    files.push(path);
                }
            }
            Err(e) => {
                eprintln!("warning: error reading path: {}", e);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn is_migration_output(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(MIGRATED_SUFFIX))
}

fn has_name(path: &Path, names: &[&str]) -> bool {
    path.file_name().and_then(|n| n.to_str()).is_some_and(|n| names.contains(&n))
}

/// Rewrite every file in parallel. Outcomes keep the order of `inputs`.
pub fn migrate_files(inputs: &[PathBuf], job: &MigrationJob) -> Vec<FileOutcome> {
    inputs
        .par_iter()
        .map(|input| FileOutcome { input: input.clone(), result: migrate_file(input, job) })
        .collect()
}

fn migrate_file(input: &Path, job: &MigrationJob) -> Result<RewriteOutput, BatchError> {
    let text = fs::read_to_string(input)
        .map_err(|source| BatchError::Read { path: input.to_path_buf(), source })?;
    Ok(job.run(&text))
}

/// Union of the target variables of every successful outcome.
pub fn union_targets(outcomes: &[FileOutcome]) -> BTreeSet<String> {
    outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .flat_map(|out| out.target_variables.iter().cloned())
        .collect()
}

/// Default output path: `name.css` -> `name.migrated.css` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    input.with_file_name(format!("{}{}", stem, MIGRATED_SUFFIX))
}
