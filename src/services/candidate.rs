//! The object currently being positioned by a placement session.

use std::fmt;
use std::sync::Arc;

use crate::host::{AssetKind, SceneGraph};
use crate::models::{LayerId, NodeHandle, RendererHandle, Rgba, TemplateHandle};

/// One renderable part of a candidate with the state it had when captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualPart {
    /// Renderer in the scene
    pub renderer: RendererHandle,
    /// Layer the part was on before any offset
    pub original_layer: LayerId,
    /// Color the part had before tinting
    pub original_color: Rgba,
}

/// The single armed object of a placement session.
#[derive(Clone)]
pub struct Candidate {
    /// Scene node of the candidate
    pub node: NodeHandle,
    /// Template successors are spawned from; `None` clones the node itself
    pub source_template: Option<TemplateHandle>,
    /// Category path used to resolve the parent chain on commit
    pub category_path: String,
    /// Captured renderable parts
    pub parts: Vec<VisualPart>,
    /// Asset kind the candidate was spawned as
    pub kind: Arc<dyn AssetKind>,
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("node", &self.node)
            .field("source_template", &self.source_template)
            .field("category_path", &self.category_path)
            .field("parts", &self.parts.len())
            .field("kind", &self.kind.label())
            .finish()
    }
}

impl Candidate {
    /// Records every renderer under `node` with its current layer and color.
    pub fn capture(
        scene: &dyn SceneGraph,
        node: NodeHandle,
        source_template: Option<TemplateHandle>,
        category_path: impl Into<String>,
        kind: Arc<dyn AssetKind>,
    ) -> Self {
        let parts = scene
            .renderers(node)
            .into_iter()
            .filter_map(|renderer| {
                Some(VisualPart {
                    renderer,
                    original_layer: scene.renderer_layer(renderer)?,
                    original_color: scene.renderer_color(renderer)?,
                })
            })
            .collect();
        Self {
            node,
            source_template,
            category_path: category_path.into(),
            parts,
            kind,
        }
    }

    /// Recolors every part with the preview tint.
    pub fn apply_tint(&self, scene: &mut dyn SceneGraph, tint: Rgba) {
        for part in &self.parts {
            scene.set_renderer_color(part.renderer, tint);
        }
    }

    /// Puts every part back to its captured color.
    pub fn restore_colors(&self, scene: &mut dyn SceneGraph) {
        for part in &self.parts {
            scene.set_renderer_color(part.renderer, part.original_color);
        }
    }
}
