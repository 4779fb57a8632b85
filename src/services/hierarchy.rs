//! Organizational scene hierarchy for committed objects.
//!
//! A category path such as `Prefabs/Trees/Conifers` maps to a chain of empty
//! scene nodes. The first segment is a root node tagged as a grid container;
//! each following segment is found among the previous node's direct children
//! or created there.

use std::collections::HashMap;
use tracing::debug;

use crate::constants::FALLBACK_ROOT_NODE;
use crate::host::SceneGraph;
use crate::models::{NodeHandle, Vec2};

/// Finds or creates the parent node chain for category paths.
#[derive(Debug, Default)]
pub struct SceneHierarchyResolver {
    roots: HashMap<String, NodeHandle>,
}

impl SceneHierarchyResolver {
    /// Creates a resolver with no cached roots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node objects with `category_path` should be parented under.
    ///
    /// Empty segments are skipped. A path with no segments resolves to the
    /// fallback root.
    pub fn resolve(
        &mut self,
        scene: &mut dyn SceneGraph,
        category_path: &str,
        cell: Vec2,
    ) -> NodeHandle {
        let mut segments = category_path
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty());
        let root_name = segments.next().unwrap_or(FALLBACK_ROOT_NODE);

        let mut parent = self.root(scene, root_name, cell);
        for segment in segments {
            parent = match scene.find_child_by_name(parent, segment) {
                Some(child) => child,
                None => {
                    let child = scene.create_empty_node(segment);
                    scene.set_parent(child, Some(parent));
                    child
                }
            };
        }
        parent
    }

    fn root(&mut self, scene: &mut dyn SceneGraph, name: &str, cell: Vec2) -> NodeHandle {
        let cached = self
            .roots
            .get(name)
            .copied()
            .filter(|node| scene.exists(*node));
        let node = match cached.or_else(|| scene.find_root_by_name(name)) {
            Some(node) => node,
            None => {
                debug!("Creating hierarchy root '{}'", name);
                scene.create_empty_node(name)
            }
        };
        if scene.grid_cell(node).is_none() {
            scene.mark_grid(node, cell);
        }
        self.roots.insert(name.to_string(), node);
        node
    }
}

/// Strips a trailing `" (n)"` clone suffix from a node name.
///
/// ```
/// use objswatch::services::hierarchy::base_name;
///
/// assert_eq!(base_name("Oak (2)"), "Oak");
/// assert_eq!(base_name("Oak"), "Oak");
/// assert_eq!(base_name("Oak (big)"), "Oak (big)");
/// ```
pub fn base_name(name: &str) -> &str {
    let trimmed = name.trim_end();
    if let Some(stripped) = trimmed.strip_suffix(')') {
        if let Some(open) = stripped.rfind('(') {
            let digits = &stripped[open + 1..];
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                return stripped[..open].trim_end();
            }
        }
    }
    trimmed
}

/// Number of same-base siblings of `node` (itself included), minus one.
///
/// Returns 0 for a node without a parent.
pub fn sibling_index(scene: &dyn SceneGraph, node: NodeHandle) -> usize {
    let Some(parent) = scene.parent(node) else {
        return 0;
    };
    let Some(name) = scene.name(node) else {
        return 0;
    };
    let base = base_name(&name);
    scene
        .children(parent)
        .into_iter()
        .filter_map(|child| scene.name(child))
        .filter(|child_name| base_name(child_name) == base)
        .count()
        .saturating_sub(1)
}

/// Name a committed node should carry given its sibling index.
///
/// Index 0 leaves the base name unsuffixed.
pub fn disambiguated_name(base: &str, index: usize) -> String {
    if index == 0 {
        base.to_string()
    } else {
        format!("{} ({})", base, index)
    }
}
