//! Watch mode for automatic re-migration on file changes
//!
//! Provides file system watching with debouncing for `tshift migrate --watch`.

use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::schema::WatchConfig;

/// Error during watch mode
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WatchError {
    /// Failed to initialize file watcher
    #[error("Failed to initialize file watcher: {0}")]
    WatcherInit(#[source] notify::Error),
    /// Failed to add watch path
    #[error("Failed to watch path: {0}")]
    WatchPath(#[source] notify::Error),
    /// Channel receive error
    #[error("Watch channel error: {0}")]
    ChannelError(String),
    /// Watched path not found
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),
}

/// A failure attached to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunError {
    pub file: PathBuf,
    pub message: String,
}

impl RunError {
    pub fn new(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self { file: file.into(), message: message.into() }
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error in {}: {}", self.file.display(), self.message)
    }
}

/// Tracks files with errors across runs to report recoveries
#[derive(Debug, Default)]
pub struct ErrorTracker {
    files_with_errors: HashSet<PathBuf>,
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update tracker with a new run, returns the files that were fixed
    pub fn update(&mut self, result: &RunResult) -> Vec<PathBuf> {
        let current: HashSet<PathBuf> = result.errors.iter().map(|e| e.file.clone()).collect();

        let mut fixed: Vec<PathBuf> = self.files_with_errors.difference(&current).cloned().collect();
        fixed.sort();

        self.files_with_errors = current;
        fixed
    }

    pub fn has_errors(&self) -> bool {
        !self.files_with_errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.files_with_errors.len()
    }
}

/// Options for watch mode
#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    /// Input files and directories, plus mapping files
    pub paths: Vec<PathBuf>,
    /// Watch configuration (debounce, clear screen)
    pub config: WatchConfig,
    /// File names written by each run (e.g. the companion stylesheet)
    pub ignored_names: Vec<String>,
}

/// Result of a single migration run
#[derive(Debug, Default)]
pub struct RunResult {
    pub files_processed: usize,
    /// Distinct target variables across all outputs
    pub targets: usize,
    pub errors: Vec<RunError>,
    /// Rendered diagnostics, one line each
    pub diagnostics: Vec<String>,
    /// How many of `diagnostics` are warnings
    pub warning_count: usize,
    pub duration: Duration,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: RunError) {
        self.errors.push(error);
    }
}

/// Clear the terminal screen
fn clear_screen() {
    print!("\x1B[2J\x1B[1;1H");
}

/// Format duration for display
fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

/// Current UTC time of day as `HH:MM:SS`
pub fn timestamp() -> String {
    use std::time::SystemTime;
    let now = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
    let secs = now.as_secs() % 86400;
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Run once and record how long it took.
pub fn timed_run<F>(run_fn: F) -> RunResult
where
    F: FnOnce() -> RunResult,
{
    let start = Instant::now();
    let mut result = run_fn();
    result.duration = start.elapsed();
    result
}

/// Watch `options.paths` and call `run_fn` on startup and after every
/// relevant change.
///
/// Blocks until interrupted. Failed runs are reported and watching
/// continues; only watcher setup or a closed event channel end the loop.
pub fn watch_and_rerun<F>(options: WatchOptions, mut run_fn: F) -> Result<(), WatchError>
where
    F: FnMut() -> RunResult,
{
    if let Some(missing) = options.paths.iter().find(|p| !p.exists()) {
        return Err(WatchError::PathNotFound(missing.clone()));
    }

    let (tx, rx) = channel();
    let debounce_duration = Duration::from_millis(options.config.debounce_ms as u64);
    let mut debouncer = new_debouncer(debounce_duration, tx).map_err(WatchError::WatcherInit)?;

    for path in &options.paths {
        let mode = if path.is_dir() { RecursiveMode::Recursive } else { RecursiveMode::NonRecursive };
        debouncer.watcher().watch(path, mode).map_err(WatchError::WatchPath)?;
    }

    let mut error_tracker = ErrorTracker::new();

    if options.config.clear_screen {
        clear_screen();
    }
    println!("[{}] Migrating...", timestamp());
    let result = timed_run(&mut run_fn);
    print_run_result(&result, &[]);
    error_tracker.update(&result);
    println!("[{}] Watching {} path(s) for changes...", timestamp(), options.paths.len());

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant_changes: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        matches!(e.kind, DebouncedEventKind::Any)
                            && is_relevant_file(&e.path, &options.ignored_names)
                    })
                    .collect();

                if relevant_changes.is_empty() {
                    continue;
                }

                for event in &relevant_changes {
                    if let Some(name) = event.path.file_name() {
                        println!("[{}] Changed: {}", timestamp(), name.to_string_lossy());
                    }
                }

                if options.config.clear_screen {
                    clear_screen();
                }

                println!("[{}] Migrating...", timestamp());
                let result = timed_run(&mut run_fn);
                let fixed_files = error_tracker.update(&result);
                print_run_result(&result, &fixed_files);
                println!("[{}] Watching {} path(s) for changes...", timestamp(), options.paths.len());
            }
            Ok(Err(error)) => {
                eprintln!("[{}] Watch error: {:?}", timestamp(), error);
                eprintln!("[{}] Continuing to watch...", timestamp());
            }
            Err(e) => {
                return Err(WatchError::ChannelError(e.to_string()));
            }
        }
    }
}

/// Stylesheets and mapping/config files trigger a re-run. Migration outputs
/// do not, or every run would trigger the next.
fn is_relevant_file(path: &Path, ignored_names: &[String]) -> bool {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    if name.ends_with(crate::batch::MIGRATED_SUFFIX) || ignored_names.iter().any(|n| *n == name) {
        return false;
    }
    if let Some(ext) = path.extension() {
        let ext = ext.to_string_lossy().to_lowercase();
        matches!(ext.as_str(), "css" | "json" | "json5" | "toml")
    } else {
        false
    }
}

fn print_run_result(result: &RunResult, fixed_files: &[PathBuf]) {
    for fixed in fixed_files {
        if let Some(name) = fixed.file_name() {
            println!("[{}] Fixed: {}", timestamp(), name.to_string_lossy());
        }
    }

    if result.success() {
        println!(
            "[{}] Migration complete ({}) - Files: {} | Target variables: {}",
            timestamp(),
            format_duration(result.duration),
            result.files_processed,
            result.targets
        );
    } else {
        let error_count = result.errors.len();
        println!(
            "[{}] Migration failed ({}) - {} error{}",
            timestamp(),
            format_duration(result.duration),
            error_count,
            if error_count == 1 { "" } else { "s" }
        );
        for error in &result.errors {
            eprintln!("[{}] {}", timestamp(), error);
        }
    }

    for line in &result.diagnostics {
        eprintln!("[{}] {}", timestamp(), line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_options_default() {
        let options = WatchOptions::default();
        assert!(options.paths.is_empty());
        assert_eq!(options.config.debounce_ms, 100);
        assert!(!options.config.clear_screen);
    }

    #[test]
    fn test_run_result() {
        let mut result = RunResult::new();
        assert!(result.success());

        result.add_error(RunError::new("site.css", "Failed to read"));
        assert!(!result.success());
    }

    #[test]
    fn test_is_relevant_file() {
        let ignored = vec!["theme-variables.css".to_string()];
        assert!(is_relevant_file(Path::new("site.css"), &ignored));
        assert!(is_relevant_file(Path::new("theme-map.json"), &ignored));
        assert!(is_relevant_file(Path::new("theme-map.JSON5"), &ignored));
        assert!(is_relevant_file(Path::new("themeshift.toml"), &ignored));
        assert!(!is_relevant_file(Path::new("out/theme-variables.css"), &ignored));
        assert!(!is_relevant_file(Path::new("site.migrated.css"), &ignored));
        assert!(!is_relevant_file(Path::new("readme.md"), &ignored));
        assert!(!is_relevant_file(Path::new("noextension"), &ignored));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = timestamp();
        assert_eq!(ts.len(), 8);
        assert_eq!(ts.as_bytes()[2], b':');
        assert_eq!(ts.as_bytes()[5], b':');
    }

    #[test]
    fn test_watch_missing_path() {
        let options = WatchOptions {
            paths: vec![PathBuf::from("/nonexistent/path/site.css")],
            ..Default::default()
        };
        let result = watch_and_rerun(options, RunResult::new);
        assert!(matches!(result, Err(WatchError::PathNotFound(_))));
    }

    #[test]
    fn test_timed_run() {
        let result = timed_run(|| RunResult { files_processed: 3, ..Default::default() });
        assert_eq!(result.files_processed, 3);
    }

    #[test]
    fn test_error_tracker_detects_fixed_files() {
        let mut tracker = ErrorTracker::new();

        let mut first = RunResult::new();
        first.add_error(RunError::new("a.css", "unreadable"));
        first.add_error(RunError::new("b.css", "unreadable"));
        assert!(tracker.update(&first).is_empty());
        assert_eq!(tracker.error_count(), 2);

        let mut second = RunResult::new();
        second.add_error(RunError::new("b.css", "unreadable"));
        assert_eq!(tracker.update(&second), vec![PathBuf::from("a.css")]);

        assert_eq!(tracker.update(&RunResult::new()), vec![PathBuf::from("b.css")]);
        assert!(!tracker.has_errors());
    }

    #[test]
    fn test_run_error_display() {
        let error = RunError::new("css/site.css", "Failed to read");
        assert_eq!(error.to_string(), "Error in css/site.css: Failed to read");
    }
}
