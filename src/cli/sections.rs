//! List the sections of a template library.

use crate::cli::common::{load_config, print_json, CliError, CliResult, LibraryArgs};
use clap::Args;
use serde::Serialize;

/// List library sections that contain at least one asset
#[derive(Debug, Clone, Args)]
pub struct SectionsArgs {
    /// Library selection
    #[command(flatten)]
    pub library: LibraryArgs,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct SectionsResponse {
    sections: Vec<String>,
    count: usize,
}

impl SectionsArgs {
    /// Execute the sections command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config()?;
        let layers = config.layer_source();
        let root = self.library.root(&config)?;
        let sections = self
            .library
            .builder(&config, &layers)?
            .sections(&root)
            .map_err(|e| CliError::io(format!("Failed to list sections: {e:#}")))?;

        if self.json {
            let count = sections.len();
            print_json(&SectionsResponse { sections, count })
        } else {
            if sections.is_empty() {
                println!("No sections found");
            }
            for section in &sections {
                println!("{section}");
            }
            Ok(())
        }
    }
}
