//! Template library backed by the real filesystem.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::warn;

use super::{AssetKind, AssetStore, TemplateDef};
use crate::models::TemplateHandle;

#[derive(Debug)]
struct Entry {
    path: PathBuf,
    def: TemplateDef,
}

#[derive(Debug, Default)]
struct Registry {
    by_key: HashMap<(PathBuf, &'static str), TemplateHandle>,
    entries: HashMap<TemplateHandle, Entry>,
    next_id: u64,
}

impl Registry {
    /// Returns the handle for `path`, reusing it across rescans.
    fn intern(&mut self, path: &Path, kind: &'static str, def: TemplateDef) -> TemplateHandle {
        let key = (path.to_path_buf(), kind);
        let handle = if let Some(handle) = self.by_key.get(&key) {
            *handle
        } else {
            self.next_id += 1;
            let handle = TemplateHandle(self.next_id);
            self.by_key.insert(key, handle);
            handle
        };
        self.entries.insert(
            handle,
            Entry {
                path: path.to_path_buf(),
                def,
            },
        );
        handle
    }
}

/// Asset store reading templates from a directory tree.
///
/// Handles stay stable for a given file across rescans. A handle stops
/// resolving once its backing file is deleted.
#[derive(Debug, Default)]
pub struct FsAssetStore {
    registry: RwLock<Registry>,
}

impl FsAssetStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory: {}", dir.display()))?;
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to read entry in: {}", dir.display()))?
                .path();
            if path.is_dir() {
                Self::collect_files(&path, out)?;
            } else if path.is_file() {
                out.push(path);
            }
        }
        Ok(())
    }
}

impl AssetStore for FsAssetStore {
    fn list_subdirectories(&self, path: &Path) -> Result<Vec<String>> {
        if !path.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        let entries = fs::read_dir(path)
            .with_context(|| format!("Failed to read directory: {}", path.display()))?;
        for entry in entries {
            let entry =
                entry.with_context(|| format!("Failed to read entry in: {}", path.display()))?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn load_all(&self, path: &Path, kind: &dyn AssetKind) -> Result<Vec<TemplateHandle>> {
        if !path.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        Self::collect_files(path, &mut files)?;
        files.retain(|file| kind.matches(file));
        files.sort();

        let mut handles = Vec::with_capacity(files.len());
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        for file in files {
            match kind.load(&file) {
                Ok(def) => handles.push(registry.intern(&file, kind.label(), def)),
                Err(e) => {
                    warn!("Skipping {} {}: {:#}", kind.label(), file.display(), e);
                }
            }
        }
        Ok(handles)
    }

    fn display_name(&self, handle: TemplateHandle) -> Option<String> {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        registry.entries.get(&handle).map(|e| e.def.name.clone())
    }

    fn template(&self, handle: TemplateHandle) -> Option<TemplateDef> {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        registry.entries.get(&handle).map(|e| e.def.clone())
    }

    fn is_valid(&self, handle: TemplateHandle) -> bool {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        registry
            .entries
            .get(&handle)
            .is_some_and(|e| e.path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{PrefabKind, SpriteKind};
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_list_subdirectories_sorted() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("Rocks")).unwrap();
        fs::create_dir_all(dir.path().join("Bushes")).unwrap();
        write(dir.path(), "loose.prefab", "");

        let store = FsAssetStore::new();
        let names = store.list_subdirectories(dir.path()).unwrap();
        assert_eq!(names, vec!["Bushes", "Rocks"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let store = FsAssetStore::new();
        let missing = Path::new("/definitely/not/here");
        assert!(store.list_subdirectories(missing).unwrap().is_empty());
        assert!(store.load_all(missing, &PrefabKind).unwrap().is_empty());
    }

    #[test]
    fn test_load_all_recursive_and_filtered_by_kind() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Trees/Oak.prefab", "name = \"Oak\"");
        write(dir.path(), "Trees/Conifers/Pine.prefab", "name = \"Pine\"");
        write(dir.path(), "Trees/bark.png", "");

        let store = FsAssetStore::new();
        let prefabs = store
            .load_all(&dir.path().join("Trees"), &PrefabKind)
            .unwrap();
        let names: Vec<_> = prefabs
            .iter()
            .filter_map(|h| store.display_name(*h))
            .collect();
        assert_eq!(names, vec!["Pine", "Oak"]);

        let sprites = store
            .load_all(&dir.path().join("Trees"), &SpriteKind::default())
            .unwrap();
        assert_eq!(sprites.len(), 1);
        assert_eq!(store.display_name(sprites[0]).as_deref(), Some("bark"));
    }

    #[test]
    fn test_unparseable_prefab_is_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Trees/Good.prefab", "");
        write(dir.path(), "Trees/Bad.prefab", "parts = [");

        let store = FsAssetStore::new();
        let handles = store.load_all(dir.path(), &PrefabKind).unwrap();
        assert_eq!(handles.len(), 1);
    }

    #[test]
    fn test_handles_stable_across_rescans() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Trees/Oak.prefab", "");

        let store = FsAssetStore::new();
        let first = store.load_all(dir.path(), &PrefabKind).unwrap();
        let second = store.load_all(dir.path(), &PrefabKind).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_deleted_file_invalidates_handle() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Trees/Oak.prefab", "");

        let store = FsAssetStore::new();
        let handle = store.load_all(dir.path(), &PrefabKind).unwrap()[0];
        assert!(store.is_valid(handle));

        fs::remove_file(dir.path().join("Trees/Oak.prefab")).unwrap();
        assert!(!store.is_valid(handle));
        assert!(!store.is_valid(TemplateHandle(999)));
    }
}
