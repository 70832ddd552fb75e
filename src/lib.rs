//! Themeshift - rewrite stylesheet custom properties from one variable
//! vocabulary to another
//!
//! This library provides:
//! - A mapping-application engine with a structural (`ast`) and a textual
//!   (`regex`) strategy
//! - Classification of mapping replacement strings
//! - Extraction of resolved values and aliases from `var()` reference chains
//! - Configuration, batch migration and watch mode for the `tshift` CLI

pub mod alias;
pub mod batch;
pub mod classify;
pub mod cli;
pub mod color;
pub mod companion;
pub mod config;
pub mod diagnostics;
pub mod mapping;
pub mod rewrite;
pub mod variables;
pub mod watch;
