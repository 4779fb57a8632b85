//! The two placeable asset kinds: prefab templates and bare sprites.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::{AssetKind, AssetStore, PartDef, SceneGraph, Spawned, TemplateDef};
use crate::models::{LayerId, Rgba, TemplateHandle};

/// File extension of prefab templates.
pub const PREFAB_EXTENSION: &str = "prefab";

/// Image extensions recognised as sprites.
pub const SPRITE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

fn has_extension(path: &Path, wanted: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| wanted.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .with_context(|| format!("Invalid file name: {}", path.display()))
}

/// On-disk format of a `.prefab` file.
#[derive(Debug, Deserialize)]
struct PrefabFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    parts: Vec<PartDef>,
}

/// Prefab templates stored as TOML `.prefab` files.
///
/// ```toml
/// name = "Oak"
///
/// [[parts]]
/// layer = 2
/// color = "#3A7D2C"
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefabKind;

impl AssetKind for PrefabKind {
    fn label(&self) -> &'static str {
        "Prefab"
    }

    fn hierarchy_root(&self) -> &'static str {
        "Prefabs"
    }

    fn matches(&self, path: &Path) -> bool {
        has_extension(path, &[PREFAB_EXTENSION])
    }

    fn load(&self, path: &Path) -> Result<TemplateDef> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read prefab: {}", path.display()))?;
        let file: PrefabFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse prefab: {}", path.display()))?;
        let name = match file.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => file_stem(path)?,
        };
        Ok(TemplateDef {
            name,
            parts: file.parts,
        })
    }

    fn spawn(
        &self,
        assets: &dyn AssetStore,
        scene: &mut dyn SceneGraph,
        template: TemplateHandle,
    ) -> Option<Spawned> {
        let def = assets.template(template)?;
        let node = scene.instantiate(&def);
        Some(Spawned {
            node,
            source_template: Some(template),
        })
    }
}

/// Image files placed as a single renderer on a chosen sorting layer.
///
/// Sprites have no template to clone from, so successors are duplicated from
/// the outgoing scene node.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpriteKind {
    /// Sorting layer new sprites are drawn on
    pub layer: LayerId,
}

impl SpriteKind {
    /// Sprites drawn on `layer`.
    #[must_use]
    pub const fn on_layer(layer: LayerId) -> Self {
        Self { layer }
    }
}

impl AssetKind for SpriteKind {
    fn label(&self) -> &'static str {
        "Sprite"
    }

    fn hierarchy_root(&self) -> &'static str {
        "Sprites"
    }

    fn matches(&self, path: &Path) -> bool {
        has_extension(path, SPRITE_EXTENSIONS)
    }

    fn load(&self, path: &Path) -> Result<TemplateDef> {
        Ok(TemplateDef {
            name: file_stem(path)?,
            parts: vec![PartDef {
                layer: 0,
                color: Rgba::WHITE,
            }],
        })
    }

    fn spawn(
        &self,
        assets: &dyn AssetStore,
        scene: &mut dyn SceneGraph,
        template: TemplateHandle,
    ) -> Option<Spawned> {
        let name = assets.display_name(template)?;
        let node = scene.create_empty_node(&name);
        scene.add_renderer(
            node,
            &PartDef {
                layer: self.layer,
                color: Rgba::WHITE,
            },
        );
        Some(Spawned {
            node,
            source_template: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_matches_by_extension() {
        assert!(PrefabKind.matches(&PathBuf::from("Trees/Oak.prefab")));
        assert!(PrefabKind.matches(&PathBuf::from("Trees/Oak.PREFAB")));
        assert!(!PrefabKind.matches(&PathBuf::from("Trees/Oak.png")));

        let sprites = SpriteKind::default();
        assert!(sprites.matches(&PathBuf::from("grass.png")));
        assert!(sprites.matches(&PathBuf::from("grass.JPEG")));
        assert!(!sprites.matches(&PathBuf::from("grass.prefab")));
        assert!(!sprites.matches(&PathBuf::from("README")));
    }

    #[test]
    fn test_load_prefab() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("oak.prefab");
        fs::write(
            &path,
            "name = \"Oak\"\n\n[[parts]]\nlayer = 2\ncolor = \"#3A7D2C\"\n\n[[parts]]\nlayer = 3\n",
        )
        .unwrap();

        let def = PrefabKind.load(&path).unwrap();
        assert_eq!(def.name, "Oak");
        assert_eq!(def.parts.len(), 2);
        assert_eq!(def.parts[0].layer, 2);
        assert_eq!(def.parts[0].color, Rgba::opaque(0x3A, 0x7D, 0x2C));
        assert_eq!(def.parts[1].color, Rgba::WHITE);
    }

    #[test]
    fn test_load_prefab_defaults_name_to_stem() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Birch.prefab");
        fs::write(&path, "").unwrap();

        let def = PrefabKind.load(&path).unwrap();
        assert_eq!(def.name, "Birch");
        assert!(def.parts.is_empty());
    }

    #[test]
    fn test_load_prefab_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.prefab");
        fs::write(&path, "parts = 12 [").unwrap();

        assert!(PrefabKind.load(&path).is_err());
    }

    #[test]
    fn test_load_sprite() {
        let def = SpriteKind::on_layer(4)
            .load(&PathBuf::from("tiles/grass.png"))
            .unwrap();
        assert_eq!(def.name, "grass");
        assert_eq!(def.parts.len(), 1);
    }
}
