//! Migrate command implementation

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::batch::{collect_inputs, default_output_path, migrate_files, union_targets, MigrationJob};
use crate::companion::{placeholder_stylesheet, with_import};
use crate::config::{load_mapping_file, CliOverrides, ThemeshiftConfig};
use crate::diagnostics::Diagnostic;
use crate::rewrite::Strategy;
use crate::watch::{watch_and_rerun, RunError, RunResult, WatchOptions};

use super::{load_settings, render_diagnostics, MigrateArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Where rewritten stylesheets go
#[derive(Debug, Clone, PartialEq, Eq)]
enum Destination {
    /// `name.migrated.css` next to each input
    BesideInput,
    File(PathBuf),
    Dir(PathBuf),
    Stdout,
}

impl Destination {
    fn from_args(args: &MigrateArgs) -> Self {
        if args.stdout {
            Destination::Stdout
        } else if let Some(ref out) = args.output {
            Destination::File(out.clone())
        } else if let Some(ref dir) = args.out_dir {
            Destination::Dir(dir.clone())
        } else {
            Destination::BesideInput
        }
    }

    fn output_for(&self, input: &Path) -> Option<PathBuf> {
        match self {
            Destination::BesideInput => Some(default_output_path(input)),
            Destination::File(path) => Some(path.clone()),
            Destination::Dir(dir) => input.file_name().map(|name| dir.join(name)),
            Destination::Stdout => None,
        }
    }
}

/// Everything one migration run needs, resolved from config and flags
struct MigratePlan {
    inputs: Vec<PathBuf>,
    mapping_files: Vec<PathBuf>,
    strategy: Strategy,
    strategy_warning: Option<Diagnostic>,
    destination: Destination,
    companion: String,
    import: bool,
    quiet: bool,
}

/// Execute the migrate command
pub fn run_migrate(args: MigrateArgs) -> ExitCode {
    let overrides = CliOverrides {
        strategy: args.strategy.clone(),
        mapping: if args.mapping.is_empty() { None } else { Some(args.mapping.clone()) },
        companion: args.companion.clone(),
        import: if args.no_import { Some(false) } else { None },
        ..Default::default()
    };
    let config = match load_settings(args.config.as_deref(), &overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };

    if config.migrate.mapping.is_empty() {
        eprintln!("Error: No mapping files (use -m or set [migrate] mapping in themeshift.toml)");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let plan = plan_from(&args, &config);

    if args.inputs.is_empty() {
        if atty::is(atty::Stream::Stdin) || args.watch {
            eprintln!("Error: No input stylesheets (pass files or pipe one on stdin)");
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        return run_stdin(&plan, args.strict);
    }

    if let Destination::File(_) = plan.destination {
        if plan.inputs.len() > 1 || plan.inputs.iter().any(|p| p.is_dir()) {
            eprintln!("Error: --output takes a single input file; use --out-dir for several");
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    }

    if args.watch {
        let mut paths = plan.inputs.clone();
        paths.extend(plan.mapping_files.iter().cloned());
        let options = WatchOptions {
            paths,
            config: config.watch.clone(),
            ignored_names: vec![plan.companion.clone()],
        };
        return match watch_and_rerun(options, || execute(&plan)) {
            Ok(()) => ExitCode::from(EXIT_SUCCESS),
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    let result = execute(&plan);
    for line in &result.diagnostics {
        eprintln!("{}", line);
    }
    for error in &result.errors {
        eprintln!("Error: {}", error);
    }
    if !plan.quiet && result.success() && plan.destination != Destination::Stdout {
        eprintln!(
            "Migrated {} file(s); {} target variable(s) in {}",
            result.files_processed, result.targets, plan.companion
        );
    }

    exit_code(&result, args.strict)
}

fn plan_from(args: &MigrateArgs, config: &ThemeshiftConfig) -> MigratePlan {
    let (strategy, strategy_warning) = Strategy::from_selector(&config.migrate.strategy);
    MigratePlan {
        inputs: args.inputs.clone(),
        mapping_files: config.migrate.mapping.clone(),
        strategy,
        strategy_warning,
        destination: Destination::from_args(args),
        companion: config.migrate.companion.clone(),
        import: config.migrate.import,
        quiet: args.quiet,
    }
}

fn exit_code(result: &RunResult, strict: bool) -> ExitCode {
    if !result.success() || (strict && result.warning_count > 0) {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

/// Read every mapping file, in pass order.
fn load_job(plan: &MigratePlan) -> Result<MigrationJob, RunError> {
    let mut passes = Vec::with_capacity(plan.mapping_files.len());
    for path in &plan.mapping_files {
        let mapping = load_mapping_file(path).map_err(|e| RunError::new(path, e.to_string()))?;
        passes.push(mapping);
    }
    Ok(MigrationJob { passes, strategy: plan.strategy })
}

/// Record the strategy warning once per run rather than once per file.
fn start_result(plan: &MigratePlan) -> RunResult {
    let mut result = RunResult::new();
    if let Some(ref warning) = plan.strategy_warning {
        result.diagnostics.push(format!("tshift: {}", warning));
        result.warning_count += 1;
    }
    result
}

/// Migrate piped stdin to stdout.
fn run_stdin(plan: &MigratePlan, strict: bool) -> ExitCode {
    let mut result = start_result(plan);
    let job = match load_job(plan) {
        Ok(job) => job,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut text = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut text) {
        eprintln!("Error: Failed to read stdin: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }

    let output = job.run(&text);
    record_diagnostics(&mut result, "<stdin>", &output.diagnostics, plan.quiet);
    print!("{}", output.text);

    for line in &result.diagnostics {
        eprintln!("{}", line);
    }
    exit_code(&result, strict)
}

fn record_diagnostics(result: &mut RunResult, label: &str, diagnostics: &[Diagnostic], quiet: bool) {
    result.warning_count += diagnostics.iter().filter(|d| d.is_warning()).count();
    result.diagnostics.extend(render_diagnostics(label, diagnostics, quiet));
}

/// One full migration: read mappings, rewrite all inputs, write outputs and
/// companions.
fn execute(plan: &MigratePlan) -> RunResult {
    let mut result = start_result(plan);

    let job = match load_job(plan) {
        Ok(job) => job,
        Err(e) => {
            result.add_error(e);
            return result;
        }
    };

    let skip = [plan.companion.as_str()];
    let inputs = match collect_inputs(&plan.inputs, &skip) {
        Ok(inputs) => inputs,
        Err(e) => {
            result.add_error(RunError::new(plan.inputs.first().cloned().unwrap_or_default(), e.to_string()));
            return result;
        }
    };

    let outcomes = migrate_files(&inputs, &job);
    let targets = union_targets(&outcomes);
    result.targets = targets.len();

    let mut output_dirs = BTreeSet::new();
    for outcome in outcomes {
        let output = match outcome.result {
            Ok(output) => output,
            Err(e) => {
                result.add_error(RunError::new(&outcome.input, e.to_string()));
                continue;
            }
        };
        result.files_processed += 1;
        let label = outcome.input.display().to_string();
        record_diagnostics(&mut result, &label, &output.diagnostics, plan.quiet);

        let Some(path) = plan.destination.output_for(&outcome.input) else {
            print!("{}", output.text);
            continue;
        };
        let text = if plan.import { with_import(&output.text, &plan.companion) } else { output.text };
        if let Err(e) = write_output(&path, &text) {
            result.add_error(RunError::new(&path, e.to_string()));
            continue;
        }
        output_dirs.insert(path.parent().map(Path::to_path_buf).unwrap_or_default());
    }

    let companion = placeholder_stylesheet(&targets);
    for dir in output_dirs {
        let path = dir.join(&plan.companion);
        if let Err(e) = write_output(&path, &companion) {
            result.add_error(RunError::new(&path, e.to_string()));
        }
    }

    result
}

fn write_output(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, text)
}
