//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod classify;
mod extract;
mod migrate;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{load_config, CliOverrides, ThemeshiftConfig};
use crate::diagnostics::Diagnostic;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Themeshift - migrate stylesheet custom properties to a new vocabulary
#[derive(Parser)]
#[command(name = "tshift")]
#[command(about = "Themeshift - rewrite CSS custom properties according to a mapping")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rewrite stylesheets with one or more mapping files
    Migrate(MigrateArgs),

    /// Extract resolved values and aliases from a stylesheet
    Extract {
        /// Stylesheet to scan
        input: PathBuf,

        /// Property name prefix to scan for (default: --bs-)
        #[arg(long)]
        prefix: Option<String>,

        /// Prefix that replaces --prefix in derived theme names
        #[arg(long)]
        theme_prefix: Option<String>,

        /// Write the resolved table (as defaultMapping) to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the alias table to this file
        #[arg(long)]
        aliases: Option<PathBuf>,

        /// Write property -> theme name mapping to this file
        #[arg(long, requires = "theme_prefix")]
        theme_map: Option<PathBuf>,

        /// Path to themeshift.toml (default: search upward from the working directory)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Only print warnings
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show how values are classified
    Classify {
        /// Values to classify, e.g. "1.5rem" "10, 20, 30"
        #[arg(required = true)]
        values: Vec<String>,
    },
}

/// Arguments of `tshift migrate`
#[derive(Args, Debug, Clone)]
pub struct MigrateArgs {
    /// Stylesheets or directories (reads stdin when omitted and piped)
    pub inputs: Vec<PathBuf>,

    /// Mapping file (JSON or JSON5); repeat to run several passes in order
    #[arg(short, long = "mapping")]
    pub mapping: Vec<PathBuf>,

    /// Rewrite strategy: ast or regex
    #[arg(long)]
    pub strategy: Option<String>,

    /// Output file (single input only)
    #[arg(short, long, conflicts_with_all = ["out_dir", "stdout"])]
    pub output: Option<PathBuf>,

    /// Directory for rewritten files
    #[arg(long, conflicts_with = "stdout")]
    pub out_dir: Option<PathBuf>,

    /// Print rewritten stylesheets to stdout
    #[arg(long)]
    pub stdout: bool,

    /// File name of the companion placeholder stylesheet
    #[arg(long)]
    pub companion: Option<String>,

    /// Do not add an @import of the companion to outputs
    #[arg(long)]
    pub no_import: bool,

    /// Exit with an error when any warning is reported
    #[arg(long)]
    pub strict: bool,

    /// Only print warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Re-run when inputs or mapping files change
    #[arg(long, conflicts_with = "stdout")]
    pub watch: bool,

    /// Path to themeshift.toml (default: search upward from the working directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Load `themeshift.toml` and apply CLI overrides, printing any error.
pub(crate) fn load_settings(
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<ThemeshiftConfig, ExitCode> {
    let mut config = load_config(config_path).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })?;
    crate::config::merge_cli_overrides(&mut config, overrides);

    let errors = config.validate();
    if !errors.is_empty() {
        for e in errors {
            eprintln!("Error: {}", e);
        }
        return Err(ExitCode::from(EXIT_INVALID_ARGS));
    }
    Ok(config)
}

/// One line per diagnostic, prefixed with `label`. Notes are dropped when
/// `quiet` is set.
pub(crate) fn render_diagnostics(label: &str, diagnostics: &[Diagnostic], quiet: bool) -> Vec<String> {
    diagnostics
        .iter()
        .filter(|d| !quiet || d.is_warning())
        .map(|d| format!("{}: {}", label, d))
        .collect()
}

/// Main entry point for the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate(args) => migrate::run_migrate(args),
        Commands::Extract {
            input,
            prefix,
            theme_prefix,
            output,
            aliases,
            theme_map,
            config,
            quiet,
        } => extract::run_extract(
            &input,
            prefix,
            theme_prefix,
            output.as_deref(),
            aliases.as_deref(),
            theme_map.as_deref(),
            config.as_deref(),
            quiet,
        ),
        Commands::Classify { values } => classify::run_classify(&values),
    }
}
