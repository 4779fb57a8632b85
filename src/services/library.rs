//! Swatch browser state over a catalog that is rebuilt in the background.
//!
//! The library owns the current catalog, the selected primary/secondary
//! indices, the "squash secondary groups" toggle, and the search query.
//! Reads that run into a template whose file has disappeared request a fresh
//! scan and return nothing for that call.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::models::{filter_items, PlaceableItem, PrimarySwatch, SwatchCatalog};
use crate::services::index::SwatchIndexBuilder;
use crate::services::loader::CatalogLoader;

/// Browser state for one asset kind.
#[derive(Debug)]
pub struct SwatchLibrary {
    builder: SwatchIndexBuilder,
    loader: CatalogLoader,
    catalog: SwatchCatalog,
    root: PathBuf,
    section: Option<String>,
    primary_index: usize,
    secondary_index: usize,
    squash_secondary: bool,
    query: String,
}

impl SwatchLibrary {
    /// Creates a library over `root` with an empty catalog.
    ///
    /// Call [`refresh`](Self::refresh) or [`refresh_blocking`](Self::refresh_blocking)
    /// to populate it.
    pub fn new(builder: SwatchIndexBuilder, root: impl Into<PathBuf>) -> Self {
        Self {
            builder,
            loader: CatalogLoader::new(),
            catalog: SwatchCatalog::empty(),
            root: root.into(),
            section: None,
            primary_index: 0,
            secondary_index: 0,
            squash_secondary: true,
            query: String::new(),
        }
    }

    /// Library root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Builder used for scans.
    pub fn builder(&self) -> &SwatchIndexBuilder {
        &self.builder
    }

    /// Current catalog.
    pub fn catalog(&self) -> &SwatchCatalog {
        &self.catalog
    }

    /// Returns true while a background scan is running.
    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    /// Error message of the most recent failed background scan.
    pub fn last_error(&self) -> Option<&str> {
        self.loader.last_error()
    }

    /// Sections available under the root.
    pub fn sections(&self) -> Result<Vec<String>> {
        self.builder.sections(&self.root)
    }

    /// Selected section, `None` meaning the root itself.
    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    /// Switches to another section and requests a scan of it.
    pub fn set_section(&mut self, section: Option<String>) {
        self.section = section;
        self.loader.cancel();
        self.refresh();
    }

    /// Starts a background scan. Returns false if one is already running.
    pub fn refresh(&mut self) -> bool {
        self.loader.request(
            self.builder.clone(),
            self.root.clone(),
            self.section.clone(),
        )
    }

    /// Scans on the calling thread and installs the result.
    pub fn refresh_blocking(&mut self) -> Result<()> {
        self.loader.cancel();
        let catalog = self
            .builder
            .rebuild_section(&self.root, self.section.as_deref())?;
        self.install(catalog);
        Ok(())
    }

    /// Installs a finished background scan, if any.
    ///
    /// Returns true when the catalog was replaced.
    pub fn poll(&mut self) -> bool {
        match self.loader.poll() {
            Some(catalog) => {
                self.install(catalog);
                true
            }
            None => false,
        }
    }

    /// Blocks until the running scan finishes and installs it.
    pub fn wait(&mut self) -> bool {
        match self.loader.wait() {
            Some(catalog) => {
                self.install(catalog);
                true
            }
            None => false,
        }
    }

    /// Replaces the catalog wholesale and resets the selection.
    pub fn install(&mut self, catalog: SwatchCatalog) {
        info!(
            "Installed catalog with {} items (scanned {})",
            catalog.item_count(),
            catalog.scanned_at.format("%H:%M:%S")
        );
        self.catalog = catalog;
        self.primary_index = 0;
        self.secondary_index = 0;
    }

    /// Index of the selected primary swatch.
    pub fn primary_index(&self) -> usize {
        self.primary_index
    }

    /// Index of the selected secondary group.
    pub fn secondary_index(&self) -> usize {
        self.secondary_index
    }

    /// Selects a primary swatch, clamping to the catalog, and resets the group.
    pub fn select_primary(&mut self, index: usize) {
        self.primary_index = clamp_index(index, self.catalog.primaries.len());
        self.secondary_index = 0;
    }

    /// Selects a secondary group of the current primary, clamping to its groups.
    pub fn select_secondary(&mut self, index: usize) {
        let groups = self
            .current_primary()
            .map_or(0, |primary| primary.secondary_groups.len());
        self.secondary_index = clamp_index(index, groups);
    }

    /// The selected primary swatch.
    pub fn current_primary(&self) -> Option<&PrimarySwatch> {
        self.catalog.primaries.get(self.primary_index)
    }

    /// Whether all groups of a primary are shown as one list.
    pub fn squash_secondary(&self) -> bool {
        self.squash_secondary
    }

    /// Toggles showing every group of a primary as one list.
    pub fn set_squash_secondary(&mut self, squash: bool) {
        self.squash_secondary = squash;
    }

    /// Current search query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Sets the search query; surrounding whitespace is ignored.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.trim().to_string();
    }

    /// Items the browser shows for the current selection and query.
    ///
    /// Returns nothing and requests a rescan when any of them went stale.
    pub fn visible_items(&mut self) -> Vec<PlaceableItem> {
        let items: Vec<PlaceableItem> = match self.current_primary() {
            None => Vec::new(),
            Some(primary) if self.squash_secondary || !primary.has_groups() => {
                filter_items(primary.items(), &self.query)
                    .into_iter()
                    .cloned()
                    .collect()
            }
            Some(primary) => primary
                .secondary_groups
                .get(self.secondary_index)
                .map(|group| {
                    filter_items(&group.items, &self.query)
                        .into_iter()
                        .cloned()
                        .collect()
                })
                .unwrap_or_default(),
        };
        self.checked(items)
    }

    /// Items across the whole catalog whose names contain `query`.
    ///
    /// Returns nothing and requests a rescan when any of them went stale.
    pub fn search(&mut self, query: &str) -> Vec<PlaceableItem> {
        let items = self
            .catalog
            .filter(query.trim())
            .into_iter()
            .cloned()
            .collect();
        self.checked(items)
    }

    fn checked(&mut self, items: Vec<PlaceableItem>) -> Vec<PlaceableItem> {
        let store = self.builder.store();
        if let Some(stale) = items.iter().find(|item| !store.is_valid(item.template)) {
            warn!(
                "Template '{}' no longer resolves, rescanning library",
                stale.display_name
            );
            self.refresh();
            return Vec::new();
        }
        items
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FsAssetStore, PrefabKind};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn library(root: &Path) -> SwatchLibrary {
        let builder = SwatchIndexBuilder::new(Arc::new(FsAssetStore::new()), Arc::new(PrefabKind));
        let mut library = SwatchLibrary::new(builder, root);
        library.refresh_blocking().unwrap();
        library
    }

    fn names(items: &[PlaceableItem]) -> Vec<&str> {
        items.iter().map(|i| i.display_name.as_str()).collect()
    }

    fn sample() -> TempDir {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Rocks/Large/Boulder.prefab");
        touch(dir.path(), "Rocks/Small/Pebble.prefab");
        touch(dir.path(), "Rocks/Small/Gravel.prefab");
        touch(dir.path(), "Trees/Oak.prefab");
        dir
    }

    #[test]
    fn test_squash_shows_all_groups() {
        let dir = sample();
        let mut library = library(dir.path());
        assert!(library.squash_secondary());
        assert_eq!(names(&library.visible_items()), vec!["Boulder", "Gravel", "Pebble"]);
    }

    #[test]
    fn test_unsquashed_shows_selected_group() {
        let dir = sample();
        let mut library = library(dir.path());
        library.set_squash_secondary(false);

        assert_eq!(names(&library.visible_items()), vec!["Boulder"]);
        library.select_secondary(1);
        assert_eq!(names(&library.visible_items()), vec!["Gravel", "Pebble"]);
    }

    #[test]
    fn test_indices_are_clamped() {
        let dir = sample();
        let mut library = library(dir.path());

        library.select_primary(10);
        assert_eq!(library.primary_index(), 1);
        assert_eq!(library.current_primary().unwrap().name, "Trees");

        library.select_secondary(5);
        assert_eq!(library.secondary_index(), 0);

        library.select_primary(0);
        library.select_secondary(5);
        assert_eq!(library.secondary_index(), 1);
    }

    #[test]
    fn test_install_resets_indices() {
        let dir = sample();
        let mut library = library(dir.path());
        library.select_primary(1);
        library.refresh_blocking().unwrap();
        assert_eq!(library.primary_index(), 0);
        assert_eq!(library.secondary_index(), 0);
    }

    #[test]
    fn test_query_is_trimmed_and_applied() {
        let dir = sample();
        let mut library = library(dir.path());
        library.set_query("  PEB ");
        assert_eq!(library.query(), "PEB");
        assert_eq!(names(&library.visible_items()), vec!["Pebble"]);
    }

    #[test]
    fn test_search_spans_catalog() {
        let dir = sample();
        let mut library = library(dir.path());
        assert_eq!(names(&library.search("o")), vec!["Boulder", "Oak"]);
    }

    #[test]
    fn test_stale_item_triggers_rescan() {
        let dir = sample();
        let mut library = library(dir.path());
        fs::remove_file(dir.path().join("Trees/Oak.prefab")).unwrap();

        assert!(library.search("oak").is_empty());
        assert!(library.is_loading());
        assert!(library.wait());
        assert_eq!(library.catalog().primary_names(), vec!["Rocks"]);
    }

    #[test]
    fn test_background_refresh() {
        let dir = sample();
        let builder = SwatchIndexBuilder::new(Arc::new(FsAssetStore::new()), Arc::new(PrefabKind));
        let mut library = SwatchLibrary::new(builder, dir.path());

        assert!(library.refresh());
        assert!(!library.refresh());
        assert!(library.wait());
        assert_eq!(library.catalog().item_count(), 4);
    }
}
