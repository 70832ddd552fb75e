//! Themeshift - command-line tool for migrating stylesheet custom properties

use std::process::ExitCode;

use themeshift::cli;

fn main() -> ExitCode {
    cli::run()
}
