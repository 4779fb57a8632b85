//! In-process implementations of the scene graph, layer source, and preference store.

use anyhow::Result;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::{LayerSource, PartDef, PreferenceStore, SceneGraph, TemplateDef};
use crate::models::{LayerId, NodeHandle, RendererHandle, Rgba, Vec2};

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
    position: Vec2,
    rotation: f32,
    scale: Vec2,
    renderers: Vec<RendererHandle>,
    grid_cell: Option<Vec2>,
}

impl Node {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            renderers: Vec::new(),
            grid_cell: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Renderer {
    layer: LayerId,
    color: Rgba,
}

/// Arena-backed scene graph.
///
/// Node and renderer handles are never reused within one scene.
#[derive(Debug, Default)]
pub struct MemoryScene {
    nodes: HashMap<NodeHandle, Node>,
    renderers: HashMap<RendererHandle, Renderer>,
    roots: Vec<NodeHandle>,
    next_id: u64,
}

impl MemoryScene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Resolves a slash-delimited path of node names starting at a root.
    pub fn find_path(&self, path: &str) -> Option<NodeHandle> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let mut current = self.find_root_by_name(segments.next()?)?;
        for segment in segments {
            current = self.find_child_by_name(current, segment)?;
        }
        Some(current)
    }

    /// Names of the direct children of `node`.
    pub fn child_names(&self, node: NodeHandle) -> Vec<String> {
        self.children(node)
            .into_iter()
            .filter_map(|child| self.name(child))
            .collect()
    }

    /// Serializable view of the whole scene.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            roots: self
                .roots
                .iter()
                .filter_map(|root| self.snapshot_node(*root))
                .collect(),
        }
    }

    fn snapshot_node(&self, handle: NodeHandle) -> Option<NodeSnapshot> {
        let node = self.nodes.get(&handle)?;
        Some(NodeSnapshot {
            name: node.name.clone(),
            position: node.position,
            rotation: node.rotation,
            scale: node.scale,
            grid_cell: node.grid_cell,
            layers: node
                .renderers
                .iter()
                .filter_map(|r| self.renderers.get(r).map(|renderer| renderer.layer))
                .collect(),
            children: node
                .children
                .iter()
                .filter_map(|child| self.snapshot_node(*child))
                .collect(),
        })
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn insert_node(&mut self, node: Node) -> NodeHandle {
        let handle = NodeHandle(self.allocate());
        self.nodes.insert(handle, node);
        self.roots.push(handle);
        handle
    }

    fn detach(&mut self, node: NodeHandle) {
        let parent = self.nodes.get(&node).and_then(|n| n.parent);
        match parent {
            Some(parent) => {
                if let Some(parent_node) = self.nodes.get_mut(&parent) {
                    parent_node.children.retain(|child| *child != node);
                }
            }
            None => self.roots.retain(|root| *root != node),
        }
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = None;
        }
    }

    fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.nodes.get(&handle).and_then(|n| n.parent);
        }
        false
    }

    fn collect_renderers(&self, handle: NodeHandle, out: &mut Vec<RendererHandle>) {
        if let Some(node) = self.nodes.get(&handle) {
            out.extend(node.renderers.iter().copied());
            for child in &node.children {
                self.collect_renderers(*child, out);
            }
        }
    }
}

impl SceneGraph for MemoryScene {
    fn instantiate(&mut self, template: &TemplateDef) -> NodeHandle {
        let node = self.create_empty_node(&template.name);
        for part in &template.parts {
            self.add_renderer(node, part);
        }
        node
    }

    fn create_empty_node(&mut self, name: &str) -> NodeHandle {
        self.insert_node(Node::new(name))
    }

    fn add_renderer(&mut self, node: NodeHandle, part: &PartDef) -> Option<RendererHandle> {
        if !self.nodes.contains_key(&node) {
            return None;
        }
        let handle = RendererHandle(self.allocate());
        self.renderers.insert(
            handle,
            Renderer {
                layer: part.layer,
                color: part.color,
            },
        );
        self.nodes.get_mut(&node)?.renderers.push(handle);
        Some(handle)
    }

    fn duplicate(&mut self, node: NodeHandle) -> Option<NodeHandle> {
        let source = self.nodes.get(&node)?.clone();
        let copy = self.insert_node(Node {
            parent: None,
            children: Vec::new(),
            renderers: Vec::new(),
            ..source.clone()
        });
        for renderer in &source.renderers {
            if let Some(r) = self.renderers.get(renderer).copied() {
                self.add_renderer(
                    copy,
                    &PartDef {
                        layer: r.layer,
                        color: r.color,
                    },
                );
            }
        }
        for child in &source.children {
            if let Some(child_copy) = self.duplicate(*child) {
                self.set_parent(child_copy, Some(copy));
            }
        }
        Some(copy)
    }

    fn destroy(&mut self, node: NodeHandle) {
        if !self.nodes.contains_key(&node) {
            return;
        }
        self.detach(node);
        let mut pending = vec![node];
        while let Some(handle) = pending.pop() {
            if let Some(removed) = self.nodes.remove(&handle) {
                for renderer in removed.renderers {
                    self.renderers.remove(&renderer);
                }
                pending.extend(removed.children);
            }
        }
    }

    fn exists(&self, node: NodeHandle) -> bool {
        self.nodes.contains_key(&node)
    }

    fn set_parent(&mut self, node: NodeHandle, parent: Option<NodeHandle>) {
        if !self.nodes.contains_key(&node) {
            return;
        }
        if let Some(parent) = parent {
            // Refuse unknown parents and cycles
            if !self.nodes.contains_key(&parent) || self.is_ancestor(node, parent) {
                return;
            }
        }
        self.detach(node);
        match parent {
            Some(parent) => {
                if let Some(parent_node) = self.nodes.get_mut(&parent) {
                    parent_node.children.push(node);
                }
            }
            None => self.roots.push(node),
        }
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = parent;
        }
    }

    fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(&node)?.parent
    }

    fn children(&self, node: NodeHandle) -> Vec<NodeHandle> {
        self.nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn roots(&self) -> Vec<NodeHandle> {
        self.roots.clone()
    }

    fn name(&self, node: NodeHandle) -> Option<String> {
        self.nodes.get(&node).map(|n| n.name.clone())
    }

    fn set_name(&mut self, node: NodeHandle, name: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.name = name.to_string();
        }
    }

    fn position(&self, node: NodeHandle) -> Option<Vec2> {
        self.nodes.get(&node).map(|n| n.position)
    }

    fn set_position(&mut self, node: NodeHandle, position: Vec2) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.position = position;
        }
    }

    fn rotation(&self, node: NodeHandle) -> Option<f32> {
        self.nodes.get(&node).map(|n| n.rotation)
    }

    fn set_rotation(&mut self, node: NodeHandle, degrees: f32) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.rotation = degrees;
        }
    }

    fn scale(&self, node: NodeHandle) -> Option<Vec2> {
        self.nodes.get(&node).map(|n| n.scale)
    }

    fn set_scale(&mut self, node: NodeHandle, scale: Vec2) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.scale = scale;
        }
    }

    fn renderers(&self, node: NodeHandle) -> Vec<RendererHandle> {
        let mut out = Vec::new();
        self.collect_renderers(node, &mut out);
        out
    }

    fn renderer_color(&self, renderer: RendererHandle) -> Option<Rgba> {
        self.renderers.get(&renderer).map(|r| r.color)
    }

    fn set_renderer_color(&mut self, renderer: RendererHandle, color: Rgba) {
        if let Some(r) = self.renderers.get_mut(&renderer) {
            r.color = color;
        }
    }

    fn renderer_layer(&self, renderer: RendererHandle) -> Option<LayerId> {
        self.renderers.get(&renderer).map(|r| r.layer)
    }

    fn set_renderer_layer(&mut self, renderer: RendererHandle, layer: LayerId) {
        if let Some(r) = self.renderers.get_mut(&renderer) {
            r.layer = layer;
        }
    }

    fn mark_grid(&mut self, node: NodeHandle, cell: Vec2) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.grid_cell = Some(cell);
        }
    }

    fn grid_cell(&self, node: NodeHandle) -> Option<Vec2> {
        self.nodes.get(&node)?.grid_cell
    }
}

/// Serializable tree view of a [`MemoryScene`].
#[derive(Debug, Clone, Serialize)]
pub struct SceneSnapshot {
    /// Root nodes in insertion order
    pub roots: Vec<NodeSnapshot>,
}

/// One node of a [`SceneSnapshot`].
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    /// Node name
    pub name: String,
    /// World position
    pub position: Vec2,
    /// Rotation in degrees
    pub rotation: f32,
    /// Local scale
    pub scale: Vec2,
    /// Grid cell when the node is a grid container
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_cell: Option<Vec2>,
    /// Layers of the node's own renderers
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<LayerId>,
    /// Child nodes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl SceneSnapshot {
    /// Renders the tree as indented text, one node per line.
    pub fn to_tree_string(&self) -> String {
        let mut out = String::new();
        for root in &self.roots {
            root.write_tree(0, &mut out);
        }
        out
    }
}

impl NodeSnapshot {
    fn write_tree(&self, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&self.name);
        if !self.layers.is_empty() {
            out.push_str(&format!(
                "  @ ({})  rot {}  scale ({})  layers {:?}",
                self.position, self.rotation, self.scale, self.layers
            ));
        }
        if let Some(cell) = self.grid_cell {
            out.push_str(&format!("  [grid {}]", cell));
        }
        out.push('\n');
        for child in &self.children {
            child.write_tree(depth + 1, out);
        }
    }
}

/// Layer source backed by a fixed, ordered list.
#[derive(Debug, Clone, Default)]
pub struct StaticLayers {
    layers: Vec<(LayerId, String)>,
}

impl StaticLayers {
    /// Creates a source from `(id, name)` pairs, back to front.
    pub fn new(layers: Vec<(LayerId, String)>) -> Self {
        Self { layers }
    }

    /// Creates a source from bare ids; names are the ids as text.
    pub fn from_ids(ids: impl IntoIterator<Item = LayerId>) -> Self {
        Self::new(ids.into_iter().map(|id| (id, id.to_string())).collect())
    }
}

impl LayerSource for StaticLayers {
    fn layer_ids_in_order(&self) -> Vec<LayerId> {
        self.layers.iter().map(|(id, _)| *id).collect()
    }

    fn layer_name(&self, id: LayerId) -> Option<String> {
        self.layers
            .iter()
            .find(|(layer, _)| *layer == id)
            .map(|(_, name)| name.clone())
    }
}

/// Preference store that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: BTreeMap<String, f32>,
}

impl MemoryPreferences {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_float(&self, key: &str) -> Option<f32> {
        self.values.get(key).copied()
    }

    fn set_float(&mut self, key: &str, value: f32) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(name: &str, layers: &[LayerId]) -> TemplateDef {
        TemplateDef {
            name: name.to_string(),
            parts: layers
                .iter()
                .map(|layer| PartDef {
                    layer: *layer,
                    color: Rgba::WHITE,
                })
                .collect(),
        }
    }

    #[test]
    fn test_instantiate_creates_root_with_renderers() {
        let mut scene = MemoryScene::new();
        let node = scene.instantiate(&template("Oak", &[1, 2]));

        assert_eq!(scene.roots(), vec![node]);
        assert_eq!(scene.name(node).as_deref(), Some("Oak"));
        let renderers = scene.renderers(node);
        assert_eq!(renderers.len(), 2);
        assert_eq!(scene.renderer_layer(renderers[1]), Some(2));
    }

    #[test]
    fn test_set_parent_moves_between_roots_and_children() {
        let mut scene = MemoryScene::new();
        let parent = scene.create_empty_node("Trees");
        let child = scene.create_empty_node("Oak");

        scene.set_parent(child, Some(parent));
        assert_eq!(scene.roots(), vec![parent]);
        assert_eq!(scene.children(parent), vec![child]);
        assert_eq!(scene.parent(child), Some(parent));

        scene.set_parent(child, None);
        assert_eq!(scene.roots(), vec![parent, child]);
        assert!(scene.children(parent).is_empty());
    }

    #[test]
    fn test_set_parent_rejects_cycles() {
        let mut scene = MemoryScene::new();
        let a = scene.create_empty_node("A");
        let b = scene.create_empty_node("B");
        scene.set_parent(b, Some(a));
        scene.set_parent(a, Some(b));

        assert_eq!(scene.parent(a), None);
        assert_eq!(scene.parent(b), Some(a));
    }

    #[test]
    fn test_destroy_removes_subtree() {
        let mut scene = MemoryScene::new();
        let parent = scene.instantiate(&template("Parent", &[0]));
        let child = scene.instantiate(&template("Child", &[0]));
        scene.set_parent(child, Some(parent));

        scene.destroy(parent);
        assert!(!scene.exists(parent));
        assert!(!scene.exists(child));
        assert_eq!(scene.node_count(), 0);
        assert!(scene.roots().is_empty());
    }

    #[test]
    fn test_duplicate_copies_renderer_state() {
        let mut scene = MemoryScene::new();
        let node = scene.instantiate(&template("Bush", &[3]));
        let renderer = scene.renderers(node)[0];
        scene.set_renderer_layer(renderer, 4);
        scene.set_position(node, Vec2::new(16.0, 32.0));

        let copy = scene.duplicate(node).unwrap();
        assert_ne!(copy, node);
        assert_eq!(scene.name(copy).as_deref(), Some("Bush"));
        assert_eq!(scene.position(copy), Some(Vec2::new(16.0, 32.0)));
        let copied = scene.renderers(copy);
        assert_eq!(copied.len(), 1);
        assert_ne!(copied[0], renderer);
        assert_eq!(scene.renderer_layer(copied[0]), Some(4));
    }

    #[test]
    fn test_find_path_and_child_lookup() {
        let mut scene = MemoryScene::new();
        let root = scene.create_empty_node("Prefabs");
        let trees = scene.create_empty_node("Trees");
        scene.set_parent(trees, Some(root));

        assert_eq!(scene.find_path("Prefabs/Trees"), Some(trees));
        assert_eq!(scene.find_path("Prefabs/Rocks"), None);
        // Lookup is by direct child only
        assert_eq!(scene.find_root_by_name("Trees"), None);
    }

    #[test]
    fn test_static_layers() {
        let layers = StaticLayers::new(vec![(7, "Back".into()), (3, "Front".into())]);
        assert_eq!(layers.layer_ids_in_order(), vec![7, 3]);
        assert_eq!(layers.layer_name(3).as_deref(), Some("Front"));
        assert_eq!(layers.layer_name(9), None);
    }

    #[test]
    fn test_memory_preferences() {
        let mut prefs = MemoryPreferences::new();
        assert_eq!(prefs.get_float("placement.snap_x"), None);
        prefs.set_float("placement.snap_x", 24.0).unwrap();
        assert_eq!(prefs.get_float("placement.snap_x"), Some(24.0));
    }
}
