//! Classify command implementation

use std::process::ExitCode;

use crate::classify::classify;
use crate::rewrite::nodes::{render, synthesize};

use super::EXIT_SUCCESS;

/// Print how each value is classified and what a structural rewrite writes
/// for it.
pub fn run_classify(values: &[String]) -> ExitCode {
    for value in values {
        let classified = classify(value);
        let synthesized = synthesize(value);
        println!("{:?}", value);
        println!("  kind:    {}", classified.kind_name());
        println!("  value:   {}", classified);
        println!("  renders: {}", render(&synthesized.nodes));
    }
    ExitCode::from(EXIT_SUCCESS)
}
