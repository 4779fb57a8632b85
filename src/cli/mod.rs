//! CLI command handlers for ObjectSwatch.
//!
//! This module provides headless, scriptable access to the catalog and
//! placement services for automation, testing, and CI/CD integration.

pub mod common;
pub mod config;
pub mod place;
pub mod scan;
pub mod search;
pub mod sections;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use place::PlaceArgs;
pub use scan::ScanArgs;
pub use search::SearchArgs;
pub use sections::SectionsArgs;
