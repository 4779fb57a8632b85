//! Scan a template library and print its swatch catalog.

use crate::cli::common::{load_config, print_json, CliResult, LibraryArgs};
use crate::models::{PlaceableItem, SwatchCatalog};
use clap::Args;
use serde::Serialize;

/// Scan a library and print the discovered swatches
#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    /// Library selection
    #[command(flatten)]
    pub library: LibraryArgs,

    /// Show only the items of this primary swatch (0-based, clamped)
    #[arg(long, value_name = "INDEX")]
    pub primary: Option<usize>,

    /// Secondary group within the primary swatch (0-based, clamped)
    #[arg(long, value_name = "INDEX", requires = "primary")]
    pub group: Option<usize>,

    /// Show only the selected group instead of every group of the swatch
    #[arg(long)]
    pub no_squash: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct SelectionResponse<'a> {
    primary: Option<&'a str>,
    group: Option<&'a str>,
    items: &'a [PlaceableItem],
    count: usize,
}

impl ScanArgs {
    /// Execute the scan command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config()?;
        let layers = config.layer_source();
        let mut library = self.library.load_library(&config, &layers)?;

        let Some(primary_index) = self.primary else {
            return if self.json {
                print_json(library.catalog())
            } else {
                print_catalog(library.catalog());
                Ok(())
            };
        };

        if self.no_squash {
            library.set_squash_secondary(false);
        }
        library.select_primary(primary_index);
        library.select_secondary(self.group.unwrap_or(0));
        let items = library.visible_items();

        let primary = library.current_primary();
        let group = primary
            .filter(|_| !library.squash_secondary())
            .and_then(|p| p.secondary_groups.get(library.secondary_index()))
            .map(|g| g.name.as_str());

        if self.json {
            print_json(&SelectionResponse {
                primary: primary.map(|p| p.name.as_str()),
                group,
                items: &items,
                count: items.len(),
            })
        } else {
            match (primary, group) {
                (Some(p), Some(g)) => println!("{} / {}", p.name, g),
                (Some(p), None) => println!("{}", p.name),
                (None, _) => println!("(empty catalog)"),
            }
            for item in &items {
                println!("  {}", item.display_name);
            }
            Ok(())
        }
    }
}

fn print_catalog(catalog: &SwatchCatalog) {
    if catalog.is_empty() {
        println!("No swatches found");
        return;
    }

    for primary in &catalog.primaries {
        let count = primary.items().count();
        println!("{} ({} items)", primary.name, count);
        for item in &primary.loose_items {
            println!("  {}", item.display_name);
        }
        for group in &primary.secondary_groups {
            println!("  [{}]", group.name);
            for item in &group.items {
                println!("    {}", item.display_name);
            }
        }
    }
    println!();
    println!(
        "{} items in {} swatches",
        catalog.item_count(),
        catalog.primaries.len()
    );
}
