//! Collaborator interfaces consumed by the catalog and placement services.
//!
//! The services never touch the filesystem, the scene, or the preference file
//! directly; they go through the narrow traits defined here. Concrete
//! implementations live in the submodules:
//!
//! - [`fs_store::FsAssetStore`] reads a template library from disk
//! - [`memory::MemoryScene`] is an in-process scene graph
//! - [`memory::StaticLayers`] and [`memory::MemoryPreferences`] back the
//!   layer source and preference store in tests and the CLI
//! - [`kinds`] provides the two asset kinds (prefabs and sprites)

pub mod fs_store;
pub mod kinds;
pub mod memory;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::models::{LayerId, NodeHandle, RendererHandle, Rgba, TemplateHandle, Vec2};

pub use fs_store::FsAssetStore;
pub use kinds::{PrefabKind, SpriteKind};
pub use memory::{MemoryPreferences, MemoryScene, NodeSnapshot, SceneSnapshot, StaticLayers};

/// One renderable part of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDef {
    /// Layer the part is drawn on
    #[serde(default)]
    pub layer: LayerId,
    /// Base color of the part
    #[serde(default)]
    pub color: Rgba,
}

/// Renderable description of a loaded template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDef {
    /// Display name
    pub name: String,
    /// Renderable parts, in draw order within the template
    #[serde(default)]
    pub parts: Vec<PartDef>,
}

/// Result of spawning a template into the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawned {
    /// The new scene node
    pub node: NodeHandle,
    /// Template to clone successors from; `None` means clone the node itself
    pub source_template: Option<TemplateHandle>,
}

/// A kind of placeable asset.
///
/// The catalog and placement algorithms are written once against this
/// capability set; prefabs and sprites are the two concrete kinds.
pub trait AssetKind: fmt::Debug + Send + Sync {
    /// Singular label, e.g. "Prefab".
    fn label(&self) -> &'static str;

    /// Name of the organizational scene node that placed objects of this kind go under.
    fn hierarchy_root(&self) -> &'static str;

    /// Returns true if the file at `path` is an asset of this kind.
    fn matches(&self, path: &Path) -> bool;

    /// Loads the template stored at `path`.
    fn load(&self, path: &Path) -> Result<TemplateDef>;

    /// Creates a live scene object for `template`.
    fn spawn(
        &self,
        assets: &dyn AssetStore,
        scene: &mut dyn SceneGraph,
        template: TemplateHandle,
    ) -> Option<Spawned>;
}

/// Read access to the on-disk template library.
pub trait AssetStore: Send + Sync {
    /// Names of the directories directly inside `path`, sorted.
    fn list_subdirectories(&self, path: &Path) -> Result<Vec<String>>;

    /// Every asset of `kind` anywhere under `path`, in path order.
    ///
    /// A missing directory yields an empty list.
    fn load_all(&self, path: &Path, kind: &dyn AssetKind) -> Result<Vec<TemplateHandle>>;

    /// Display name of a loaded template, `None` if the handle no longer resolves.
    fn display_name(&self, handle: TemplateHandle) -> Option<String>;

    /// Renderable description of a loaded template.
    fn template(&self, handle: TemplateHandle) -> Option<TemplateDef>;

    /// Returns true while the handle still resolves to a live asset.
    fn is_valid(&self, handle: TemplateHandle) -> bool {
        self.display_name(handle).is_some()
    }
}

/// Ordered draw layers of the host scene.
pub trait LayerSource {
    /// Layer ids from back to front.
    fn layer_ids_in_order(&self) -> Vec<LayerId>;

    /// Display name of a layer, if the host names them.
    fn layer_name(&self, _id: LayerId) -> Option<String> {
        None
    }
}

/// Persisted float preferences (snap cell components).
pub trait PreferenceStore {
    /// Reads a stored value.
    fn get_float(&self, key: &str) -> Option<f32>;

    /// Stores a value.
    fn set_float(&mut self, key: &str, value: f32) -> Result<()>;
}

/// Mutable access to the live scene.
///
/// Operations on handles that no longer exist are ignored; queries on them
/// return `None` or an empty list.
pub trait SceneGraph {
    /// Creates a node tree for a template, one renderer per part.
    fn instantiate(&mut self, template: &TemplateDef) -> NodeHandle;

    /// Creates a node with no renderers at the scene root.
    fn create_empty_node(&mut self, name: &str) -> NodeHandle;

    /// Attaches a renderer to `node`.
    fn add_renderer(&mut self, node: NodeHandle, part: &PartDef) -> Option<RendererHandle>;

    /// Copies `node` and its descendants; the copy has no parent.
    fn duplicate(&mut self, node: NodeHandle) -> Option<NodeHandle>;

    /// Removes `node` and its descendants.
    fn destroy(&mut self, node: NodeHandle);

    /// Returns true if `node` is alive.
    fn exists(&self, node: NodeHandle) -> bool;

    /// Reparents `node`; `None` moves it to the scene root.
    fn set_parent(&mut self, node: NodeHandle, parent: Option<NodeHandle>);

    /// Parent of `node`, `None` for root nodes.
    fn parent(&self, node: NodeHandle) -> Option<NodeHandle>;

    /// Direct children of `node`, in insertion order.
    fn children(&self, node: NodeHandle) -> Vec<NodeHandle>;

    /// Nodes without a parent, in insertion order.
    fn roots(&self) -> Vec<NodeHandle>;

    /// Name of `node`.
    fn name(&self, node: NodeHandle) -> Option<String>;

    /// Renames `node`.
    fn set_name(&mut self, node: NodeHandle, name: &str);

    /// Finds a direct child of `parent` by exact name.
    fn find_child_by_name(&self, parent: NodeHandle, name: &str) -> Option<NodeHandle> {
        self.children(parent)
            .into_iter()
            .find(|child| self.name(*child).as_deref() == Some(name))
    }

    /// Finds a root node by exact name.
    fn find_root_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.roots()
            .into_iter()
            .find(|node| self.name(*node).as_deref() == Some(name))
    }

    /// World position of `node`.
    fn position(&self, node: NodeHandle) -> Option<Vec2>;

    /// Moves `node`.
    fn set_position(&mut self, node: NodeHandle, position: Vec2);

    /// Rotation of `node` around Z, in degrees.
    fn rotation(&self, node: NodeHandle) -> Option<f32>;

    /// Rotates `node` around Z, in degrees.
    fn set_rotation(&mut self, node: NodeHandle, degrees: f32);

    /// Local scale of `node`.
    fn scale(&self, node: NodeHandle) -> Option<Vec2>;

    /// Sets the local scale of `node`.
    fn set_scale(&mut self, node: NodeHandle, scale: Vec2);

    /// Renderers on `node` and all of its descendants.
    fn renderers(&self, node: NodeHandle) -> Vec<RendererHandle>;

    /// Current color of a renderer.
    fn renderer_color(&self, renderer: RendererHandle) -> Option<Rgba>;

    /// Recolors a renderer.
    fn set_renderer_color(&mut self, renderer: RendererHandle, color: Rgba);

    /// Current layer of a renderer.
    fn renderer_layer(&self, renderer: RendererHandle) -> Option<LayerId>;

    /// Moves a renderer to another layer.
    fn set_renderer_layer(&mut self, renderer: RendererHandle, layer: LayerId);

    /// Tags `node` as a grid container with the given cell size.
    fn mark_grid(&mut self, node: NodeHandle, cell: Vec2);

    /// Cell size of a grid container, `None` for ordinary nodes.
    fn grid_cell(&self, node: NodeHandle) -> Option<Vec2>;
}
