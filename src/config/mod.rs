//! Configuration for themeshift
//!
//! Provides the `themeshift.toml` project file and mapping file types, plus
//! discovery and loading.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
