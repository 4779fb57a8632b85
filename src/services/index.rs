//! Directory scan that builds a [`SwatchCatalog`].
//!
//! The library is laid out as `<root>/<primary>/<secondary>/...`. A directory
//! only becomes a swatch when at least one asset of the requested kind lives
//! somewhere beneath it; empty directories are silently left out.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::host::{AssetKind, AssetStore};
use crate::models::{PlaceableItem, PrimarySwatch, SecondaryGroup, SwatchCatalog, TemplateHandle};

/// Builds catalogs for one asset kind.
#[derive(Clone)]
pub struct SwatchIndexBuilder {
    store: Arc<dyn AssetStore>,
    kind: Arc<dyn AssetKind>,
}

impl std::fmt::Debug for SwatchIndexBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwatchIndexBuilder")
            .field("kind", &self.kind.label())
            .finish_non_exhaustive()
    }
}

impl SwatchIndexBuilder {
    /// Creates a builder scanning for assets of `kind`.
    pub fn new(store: Arc<dyn AssetStore>, kind: Arc<dyn AssetKind>) -> Self {
        Self { store, kind }
    }

    /// The asset store items are resolved against.
    pub fn store(&self) -> &Arc<dyn AssetStore> {
        &self.store
    }

    /// The asset kind this builder scans for.
    pub fn kind(&self) -> &Arc<dyn AssetKind> {
        &self.kind
    }

    /// Scans `root` and returns a fresh catalog.
    ///
    /// A missing root produces an empty catalog.
    pub fn rebuild(&self, root: &Path) -> Result<SwatchCatalog> {
        self.rebuild_section(root, None)
    }

    /// Scans `<root>/<section>`, or `root` itself when no section is given.
    ///
    /// Category paths of the produced items start with the section name.
    pub fn rebuild_section(&self, root: &Path, section: Option<&str>) -> Result<SwatchCatalog> {
        let never = AtomicBool::new(false);
        // Without a cancel flag the scan always runs to completion
        Ok(self
            .rebuild_cancellable(root, section, &never)?
            .unwrap_or_default())
    }

    /// Scans like [`rebuild_section`](Self::rebuild_section), checking `cancel`
    /// between directories.
    ///
    /// Returns `Ok(None)` when the scan was cancelled.
    pub fn rebuild_cancellable(
        &self,
        root: &Path,
        section: Option<&str>,
        cancel: &AtomicBool,
    ) -> Result<Option<SwatchCatalog>> {
        let scan_root = match section {
            Some(section) => root.join(section),
            None => root.to_path_buf(),
        };
        info!(
            "Scanning {} library at {}",
            self.kind.label(),
            scan_root.display()
        );

        let mut primaries = Vec::new();
        let primary_names = self
            .store
            .list_subdirectories(&scan_root)
            .with_context(|| format!("Failed to list swatches in {}", scan_root.display()))?;

        for primary_name in primary_names {
            if cancel.load(Ordering::Relaxed) {
                info!("Library scan cancelled");
                return Ok(None);
            }

            let primary_dir = scan_root.join(&primary_name);
            let all = self.store.load_all(&primary_dir, self.kind.as_ref())?;
            if all.is_empty() {
                debug!("Excluding empty swatch directory {}", primary_dir.display());
                continue;
            }

            let primary_path = join_category(section, &primary_name);
            let mut groups = Vec::new();
            for secondary_name in self.store.list_subdirectories(&primary_dir)? {
                if cancel.load(Ordering::Relaxed) {
                    info!("Library scan cancelled");
                    return Ok(None);
                }
                let secondary_dir = primary_dir.join(&secondary_name);
                let handles = self.store.load_all(&secondary_dir, self.kind.as_ref())?;
                let category = format!("{}/{}", primary_path, secondary_name);
                match SecondaryGroup::new(secondary_name, self.items(&handles, &category)) {
                    Some(group) => groups.push(group),
                    None => debug!("Excluding empty group {}", secondary_dir.display()),
                }
            }

            let loose = if groups.is_empty() {
                self.items(&all, &primary_path)
            } else {
                Vec::new()
            };
            if let Some(primary) = PrimarySwatch::new(primary_name, loose, groups) {
                primaries.push(primary);
            }
        }

        let catalog = SwatchCatalog::new(primaries);
        info!(
            "Found {} {} templates in {} swatches",
            catalog.item_count(),
            self.kind.label().to_lowercase(),
            catalog.primaries.len()
        );
        Ok(Some(catalog))
    }

    /// First-level directories of `root` that hold at least one asset.
    pub fn sections(&self, root: &Path) -> Result<Vec<String>> {
        let mut sections = Vec::new();
        for name in self.store.list_subdirectories(root)? {
            if !self
                .store
                .load_all(&root.join(&name), self.kind.as_ref())?
                .is_empty()
            {
                sections.push(name);
            }
        }
        Ok(sections)
    }

    fn items(&self, handles: &[TemplateHandle], category: &str) -> Vec<PlaceableItem> {
        handles
            .iter()
            .filter_map(|handle| {
                self.store
                    .display_name(*handle)
                    .map(|name| PlaceableItem::new(*handle, name, category))
            })
            .collect()
    }
}

fn join_category(section: Option<&str>, name: &str) -> String {
    match section {
        Some(section) => format!("{}/{}", section, name),
        None => name.to_string(),
    }
}
