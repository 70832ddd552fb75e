//! Extract command implementation

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use crate::alias::{extract_with, ExtractOptions};
use crate::config::{CliOverrides, MappingConfig};
use crate::mapping::Mapping;

use super::{load_settings, render_diagnostics, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the extract command
pub fn run_extract(
    input: &Path,
    prefix: Option<String>,
    theme_prefix: Option<String>,
    output: Option<&Path>,
    aliases: Option<&Path>,
    theme_map: Option<&Path>,
    config: Option<&Path>,
    quiet: bool,
) -> ExitCode {
    let overrides = CliOverrides { prefix, theme_prefix, ..Default::default() };
    let config = match load_settings(config, &overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let text = match fs::read_to_string(input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: Failed to read {}: {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let options = ExtractOptions {
        prefix: config.extract.prefix.clone(),
        theme_prefix: config.extract.theme_prefix.clone(),
    };
    let extraction = extract_with(&text, &options);

    for line in render_diagnostics(&input.display().to_string(), &extraction.diagnostics, quiet) {
        eprintln!("{}", line);
    }

    let resolved = MappingConfig { default_mapping: extraction.resolved.clone(), overrides: Mapping::new() };
    let resolved_json = match serde_json::to_string_pretty(&resolved) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match output {
        Some(path) => {
            if let Err(code) = write_json(path, &resolved_json) {
                return code;
            }
        }
        None => println!("{}", resolved_json),
    }

    if let Some(path) = aliases {
        if let Err(code) = write_mapping(path, &extraction.aliases) {
            return code;
        }
    }

    if let Some(path) = theme_map {
        if let Err(code) = write_mapping(path, &extraction.theme_mapping()) {
            return code;
        }
    }

    if !quiet {
        eprintln!(
            "Extracted {} propert{} with prefix {}; {} alias{}",
            extraction.resolved.len(),
            if extraction.resolved.len() == 1 { "y" } else { "ies" },
            options.prefix,
            extraction.aliases.len(),
            if extraction.aliases.len() == 1 { "" } else { "es" }
        );
    }

    ExitCode::from(EXIT_SUCCESS)
}

fn write_mapping(path: &Path, mapping: &Mapping) -> Result<(), ExitCode> {
    let json = serde_json::to_string_pretty(mapping).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })?;
    write_json(path, &json)
}

fn write_json(path: &Path, json: &str) -> Result<(), ExitCode> {
    fs::write(path, format!("{}\n", json)).map_err(|e| {
        eprintln!("Error: Failed to write {}: {}", path.display(), e);
        ExitCode::from(EXIT_ERROR)
    })
}
