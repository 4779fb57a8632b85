//! Search a template library by name.

use crate::cli::common::{load_config, print_json, CliResult, LibraryArgs};
use crate::models::PlaceableItem;
use clap::Args;
use serde::Serialize;

/// Find templates whose names contain a query (case-insensitive)
#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Library selection
    #[command(flatten)]
    pub library: LibraryArgs,

    /// Text to look for; empty matches everything
    #[arg(short, long, value_name = "TEXT", default_value = "")]
    pub query: String,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    query: String,
    items: Vec<PlaceableItem>,
    count: usize,
}

impl SearchArgs {
    /// Execute the search command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config()?;
        let layers = config.layer_source();
        let mut library = self.library.load_library(&config, &layers)?;
        library.set_query(&self.query);
        let query = library.query().to_string();
        let items = library.search(&query);

        if self.json {
            let count = items.len();
            print_json(&SearchResponse {
                query,
                items,
                count,
            })
        } else {
            if items.is_empty() {
                println!("No templates match '{query}'");
            }
            for item in &items {
                println!("{}  ({})", item.display_name, item.category_path);
            }
            Ok(())
        }
    }
}
