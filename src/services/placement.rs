//! Placement session: the state machine behind interactive object painting.
//!
//! A session is either idle or armed with exactly one candidate. While armed,
//! the candidate follows the pointer (optionally snapped to a grid), carries
//! the session's rotation, flip and layer offset, and is drawn with a
//! translucent tint. Committing parents the candidate into the organizational
//! hierarchy, gives it a unique sibling name, and immediately arms a fresh
//! clone at the same spot so the user can keep painting.

use anyhow::Result;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::constants::{
    DEFAULT_PREVIEW_ALPHA, DEFAULT_SNAP_CELL, MIN_SNAP_CELL, PREF_SNAP_X, PREF_SNAP_Y,
};
use crate::host::{AssetKind, AssetStore, LayerSource, PreferenceStore, SceneGraph, Spawned};
use crate::models::{FlipAxis, NodeHandle, PlaceableItem, Rgba, TemplateHandle, Vec2};
use crate::services::candidate::Candidate;
use crate::services::hierarchy::{
    base_name, disambiguated_name, sibling_index, SceneHierarchyResolver,
};
use crate::services::layers::{LayerError, LayerRegistry};

/// Observable state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No candidate
    Idle,
    /// A candidate is following the pointer
    Armed,
}

/// Notifications emitted to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new candidate was armed or the current one moved
    CandidateChanged,
    /// Toolbars should redraw (rotation, flip or layer state changed or was rejected)
    RepaintRequested,
    /// The candidate was discarded
    Deselected,
    /// A candidate was placed into the scene
    Committed(NodeHandle),
    /// A selected template no longer resolves; the catalog is out of date
    /// and should be rebuilt with [`SwatchLibrary::refresh`](crate::services::SwatchLibrary::refresh)
    StaleTemplate(TemplateHandle),
}

/// Outcome of [`PlacementSession::move_layer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerMove {
    /// Every part moved by the requested delta
    Moved,
    /// At least one part would have left the layer range; nothing changed
    Rejected,
    /// The session was idle
    Ignored,
}

/// Start-up settings of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    /// Whether pointer positions snap to the grid
    pub snap_enabled: bool,
    /// Snap cell used when the preference store has none
    pub default_snap_cell: f32,
    /// Alpha of the preview tint
    pub preview_alpha: u8,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            snap_enabled: true,
            default_snap_cell: DEFAULT_SNAP_CELL,
            preview_alpha: DEFAULT_PREVIEW_ALPHA,
        }
    }
}

type DeselectCallback = Box<dyn FnOnce()>;
type Listener = Box<dyn FnMut(&SessionEvent)>;

/// Rounds `position` to the nearest intersection of a grid with cell `cell`.
///
/// Halfway values round to the even multiple. A non-positive cell component
/// leaves the position untouched.
///
/// ```
/// use objswatch::models::Vec2;
/// use objswatch::services::placement::snap_position;
///
/// let cell = Vec2::new(16.0, 16.0);
/// assert_eq!(snap_position(Vec2::new(23.0, 9.0), cell), Vec2::new(16.0, 16.0));
/// ```
pub fn snap_position(position: Vec2, cell: Vec2) -> Vec2 {
    if cell.x <= 0.0 || cell.y <= 0.0 {
        return position;
    }
    Vec2::new(
        (position.x / cell.x).round_ties_even() * cell.x,
        (position.y / cell.y).round_ties_even() * cell.y,
    )
}

/// Interactive placement of catalog items into a scene.
pub struct PlacementSession<S: SceneGraph> {
    scene: S,
    assets: Arc<dyn AssetStore>,
    layers: LayerRegistry,
    resolver: SceneHierarchyResolver,
    prefs: Box<dyn PreferenceStore>,
    candidate: Option<Candidate>,
    rotation_z: f32,
    scale: Vec2,
    layer_offset: i64,
    snap_enabled: bool,
    snap_cell: Vec2,
    tint: Rgba,
    on_deselect: Option<DeselectCallback>,
    listeners: Vec<Listener>,
}

impl<S: SceneGraph> fmt::Debug for PlacementSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlacementSession")
            .field("candidate", &self.candidate)
            .field("rotation_z", &self.rotation_z)
            .field("scale", &self.scale)
            .field("layer_offset", &self.layer_offset)
            .field("snap_enabled", &self.snap_enabled)
            .field("snap_cell", &self.snap_cell)
            .finish_non_exhaustive()
    }
}

impl<S: SceneGraph> PlacementSession<S> {
    /// Creates an idle session over `scene`.
    ///
    /// The snap cell is read from `prefs`, falling back to the default cell
    /// from `settings`.
    pub fn new(
        scene: S,
        assets: Arc<dyn AssetStore>,
        layer_source: &dyn LayerSource,
        prefs: Box<dyn PreferenceStore>,
        settings: SessionSettings,
    ) -> Self {
        let snap_cell = Vec2::new(
            prefs
                .get_float(PREF_SNAP_X)
                .unwrap_or(settings.default_snap_cell),
            prefs
                .get_float(PREF_SNAP_Y)
                .unwrap_or(settings.default_snap_cell),
        )
        .max(Vec2::new(MIN_SNAP_CELL, MIN_SNAP_CELL));

        Self {
            scene,
            assets,
            layers: LayerRegistry::from_source(layer_source),
            resolver: SceneHierarchyResolver::new(),
            prefs,
            candidate: None,
            rotation_z: 0.0,
            scale: Vec2::ONE,
            layer_offset: 0,
            snap_enabled: settings.snap_enabled,
            snap_cell,
            tint: Rgba::WHITE.with_alpha(settings.preview_alpha),
            on_deselect: None,
            listeners: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Readouts
    // ------------------------------------------------------------------

    /// Current state.
    pub fn state(&self) -> SessionState {
        if self.candidate.is_some() {
            SessionState::Armed
        } else {
            SessionState::Idle
        }
    }

    /// The armed candidate, if any.
    pub fn candidate(&self) -> Option<&Candidate> {
        self.candidate.as_ref()
    }

    /// Scene position of the armed candidate.
    pub fn candidate_position(&self) -> Option<Vec2> {
        self.scene.position(self.candidate.as_ref()?.node)
    }

    /// Accumulated rotation in degrees (never wrapped).
    pub fn rotation(&self) -> f32 {
        self.rotation_z
    }

    /// Current scale, negative components meaning flipped.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Ordinal shift applied to every part of the candidate.
    pub fn layer_offset(&self) -> i64 {
        self.layer_offset
    }

    /// Whether pointer positions are snapped.
    pub fn snap_enabled(&self) -> bool {
        self.snap_enabled
    }

    /// Current snap cell.
    pub fn snap_cell(&self) -> Vec2 {
        self.snap_cell
    }

    /// Layer snapshot used for offset arithmetic.
    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    /// The scene being edited.
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Mutable access to the scene being edited.
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Ends the session, handing back the scene.
    ///
    /// An armed candidate is discarded first.
    pub fn into_scene(mut self) -> S {
        self.deselect();
        self.scene
    }

    // ------------------------------------------------------------------
    // Wiring
    // ------------------------------------------------------------------

    /// Registers a listener for session events.
    pub fn subscribe(&mut self, listener: impl FnMut(&SessionEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Sets the one-shot callback run when the current candidate is discarded.
    ///
    /// Replaces any previously registered callback.
    pub fn set_on_deselect(&mut self, callback: impl FnOnce() + 'static) {
        self.on_deselect = Some(Box::new(callback));
    }

    /// Re-reads the host's layer list.
    pub fn refresh_layers(&mut self, source: &dyn LayerSource) {
        self.layers.refresh(source);
    }

    /// Enables or disables grid snapping.
    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.snap_enabled = enabled;
        self.emit(SessionEvent::RepaintRequested);
    }

    /// Changes the snap cell, clamping each axis to the minimum, and persists it.
    pub fn set_snap_cell(&mut self, cell: Vec2) -> Result<()> {
        self.snap_cell = cell.max(Vec2::new(MIN_SNAP_CELL, MIN_SNAP_CELL));
        self.prefs.set_float(PREF_SNAP_X, self.snap_cell.x)?;
        self.prefs.set_float(PREF_SNAP_Y, self.snap_cell.y)?;
        self.emit(SessionEvent::RepaintRequested);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Arms a candidate for `item`, discarding any current one first.
    ///
    /// Returns false without touching the session when the item's template no
    /// longer resolves or cannot be spawned. An unresolved template also emits
    /// [`SessionEvent::StaleTemplate`] so the owner can rescan the catalog.
    pub fn select_item(&mut self, item: &PlaceableItem, kind: Arc<dyn AssetKind>) -> bool {
        if !self.assets.is_valid(item.template) {
            warn!("Template for '{}' no longer resolves", item.display_name);
            self.emit(SessionEvent::StaleTemplate(item.template));
            return false;
        }

        self.deselect();

        let Some(spawned) = kind.spawn(self.assets.as_ref(), &mut self.scene, item.template) else {
            warn!("Failed to spawn '{}'", item.display_name);
            return false;
        };

        let category_path = format!("{}/{}", kind.hierarchy_root(), item.category_path);
        self.layer_offset = 0;
        self.arm(spawned, category_path, kind);
        debug!("Armed '{}'", item.display_name);
        true
    }

    /// Moves the candidate to follow the pointer.
    ///
    /// Ignored while idle or while the free-placement modifier is held.
    pub fn update_pointer(&mut self, world_position: Vec2, free_placement: bool) {
        if free_placement {
            return;
        }
        let Some(node) = self.candidate.as_ref().map(|c| c.node) else {
            return;
        };
        let target = if self.snap_enabled {
            snap_position(world_position, self.snap_cell)
        } else {
            world_position
        };
        self.scene.set_position(node, target);
        self.apply_transform(node);
        self.emit(SessionEvent::CandidateChanged);
    }

    /// Places the candidate and arms a clone of it for continuous placement.
    ///
    /// Returns the placed node, or `None` when idle.
    pub fn commit(&mut self) -> Option<NodeHandle> {
        self.place(true)
    }

    /// Places the candidate and returns to idle.
    pub fn commit_and_finish(&mut self) -> Option<NodeHandle> {
        self.place(false)
    }

    /// Discards the candidate; alias of [`deselect`](Self::deselect).
    pub fn cancel(&mut self) {
        self.deselect();
    }

    /// Destroys the candidate and notifies the deselect callback.
    ///
    /// Does nothing while idle.
    pub fn deselect(&mut self) {
        let Some(candidate) = self.candidate.take() else {
            return;
        };
        self.scene.destroy(candidate.node);
        if let Some(callback) = self.on_deselect.take() {
            callback();
        }
        self.emit(SessionEvent::Deselected);
    }

    /// Adds `delta_degrees` to the session rotation.
    pub fn add_rotation(&mut self, delta_degrees: f32) {
        let Some(node) = self.candidate.as_ref().map(|c| c.node) else {
            return;
        };
        self.rotation_z += delta_degrees;
        self.scene.set_rotation(node, self.rotation_z);
        self.emit(SessionEvent::RepaintRequested);
    }

    /// Mirrors the candidate; the flip carries over to later clones.
    pub fn flip(&mut self, axis: FlipAxis) {
        let Some(node) = self.candidate.as_ref().map(|c| c.node) else {
            return;
        };
        match axis {
            FlipAxis::Horizontal => self.scale.x = -self.scale.x,
            FlipAxis::Vertical => self.scale.y = -self.scale.y,
        }
        self.scene.set_scale(node, self.scale);
        self.emit(SessionEvent::RepaintRequested);
    }

    /// Shifts every part of the candidate by `delta` layers, or none of them.
    ///
    /// The move is rejected when any part would leave the layer range or sits
    /// on a layer the registry does not know.
    pub fn move_layer(&mut self, delta: i64) -> LayerMove {
        let Some(candidate) = self.candidate.as_ref() else {
            return LayerMove::Ignored;
        };

        let targets: Result<(i64, Vec<_>), LayerError> = self
            .layer_offset
            .checked_add(delta)
            .ok_or(LayerError::Overflow { delta })
            .and_then(|offset| {
                let parts = candidate
                    .parts
                    .iter()
                    .map(|part| {
                        let ordinal = self.layers.ordinal_of(part.original_layer)?;
                        let target = (ordinal as i64)
                            .checked_add(offset)
                            .ok_or(LayerError::Overflow { delta })?;
                        Ok((part.renderer, self.layers.id_at(target)?))
                    })
                    .collect::<Result<Vec<_>, LayerError>>()?;
                Ok((offset, parts))
            });
        let (offset, targets) = match targets {
            Ok(targets) => targets,
            Err(e) => {
                debug!("Layer move by {} rejected: {}", delta, e);
                self.emit(SessionEvent::RepaintRequested);
                return LayerMove::Rejected;
            }
        };

        for (renderer, id) in targets {
            self.scene.set_renderer_layer(renderer, id);
        }
        self.layer_offset = offset;
        self.emit(SessionEvent::RepaintRequested);
        LayerMove::Moved
    }

    /// Discards any candidate and clears rotation, flip and layer offset.
    pub fn reset(&mut self) {
        self.deselect();
        self.rotation_z = 0.0;
        self.scale = Vec2::ONE;
        self.layer_offset = 0;
        self.emit(SessionEvent::RepaintRequested);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn arm(&mut self, spawned: Spawned, category_path: String, kind: Arc<dyn AssetKind>) {
        let candidate = Candidate::capture(
            &self.scene,
            spawned.node,
            spawned.source_template,
            category_path,
            kind,
        );
        candidate.apply_tint(&mut self.scene, self.tint);
        self.apply_transform(candidate.node);
        self.candidate = Some(candidate);
        self.emit(SessionEvent::CandidateChanged);
    }

    fn apply_transform(&mut self, node: NodeHandle) {
        self.scene.set_rotation(node, self.rotation_z);
        self.scene.set_scale(node, self.scale);
    }

    fn place(&mut self, continuous: bool) -> Option<NodeHandle> {
        let candidate = self.candidate.take()?;
        let node = candidate.node;

        let parent = self
            .resolver
            .resolve(&mut self.scene, &candidate.category_path, self.snap_cell);
        self.scene.set_parent(node, Some(parent));
        candidate.restore_colors(&mut self.scene);

        let name = self.scene.name(node).unwrap_or_default();
        let base = base_name(&name).to_string();
        let index = sibling_index(&self.scene, node);

        let successor = if continuous {
            self.spawn_successor(&candidate, &name)
        } else {
            None
        };

        let placed_name = disambiguated_name(&base, index);
        self.scene.set_name(node, &placed_name);
        info!("Placed '{}' under '{}'", placed_name, candidate.category_path);
        self.emit(SessionEvent::Committed(node));

        match successor {
            Some(spawned) => {
                self.arm(spawned, candidate.category_path, candidate.kind);
                if self.move_layer(0) == LayerMove::Rejected {
                    warn!("Layer offset {} no longer fits the clone", self.layer_offset);
                }
            }
            None => {
                if let Some(callback) = self.on_deselect.take() {
                    callback();
                }
                self.emit(SessionEvent::Deselected);
            }
        }
        Some(node)
    }

    /// Spawns the clone that replaces a committed candidate.
    fn spawn_successor(&mut self, outgoing: &Candidate, name: &str) -> Option<Spawned> {
        let spawned = match outgoing.source_template {
            Some(template) => {
                outgoing
                    .kind
                    .spawn(self.assets.as_ref(), &mut self.scene, template)?
            }
            None => {
                let clone = self.scene.duplicate(outgoing.node)?;
                // Undo the layer offset copied from the outgoing node
                let renderers = self.scene.renderers(clone);
                for (renderer, part) in renderers.into_iter().zip(&outgoing.parts) {
                    self.scene.set_renderer_layer(renderer, part.original_layer);
                    self.scene.set_renderer_color(renderer, part.original_color);
                }
                Spawned {
                    node: clone,
                    source_template: None,
                }
            }
        };

        self.scene.set_name(spawned.node, name);
        if let Some(position) = self.scene.position(outgoing.node) {
            self.scene.set_position(spawned.node, position);
        }
        Some(spawned)
    }

    fn emit(&mut self, event: SessionEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryPreferences, MemoryScene, PartDef, StaticLayers, TemplateDef};
    use crate::models::LayerId;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::Path;
    use std::rc::Rc;
    use std::sync::Mutex;

    /// Asset store serving templates from memory.
    #[derive(Default)]
    struct FakeStore {
        templates: Mutex<HashMap<TemplateHandle, TemplateDef>>,
    }

    impl FakeStore {
        fn with(templates: Vec<(u64, TemplateDef)>) -> Arc<Self> {
            let store = Self::default();
            {
                let mut map = store.templates.lock().unwrap();
                for (id, def) in templates {
                    map.insert(TemplateHandle(id), def);
                }
            }
            Arc::new(store)
        }

        fn remove(&self, id: u64) {
            self.templates.lock().unwrap().remove(&TemplateHandle(id));
        }
    }

    impl AssetStore for FakeStore {
        fn list_subdirectories(&self, _path: &Path) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn load_all(&self, _path: &Path, _kind: &dyn AssetKind) -> Result<Vec<TemplateHandle>> {
            Ok(Vec::new())
        }

        fn display_name(&self, handle: TemplateHandle) -> Option<String> {
            self.templates
                .lock()
                .unwrap()
                .get(&handle)
                .map(|d| d.name.clone())
        }

        fn template(&self, handle: TemplateHandle) -> Option<TemplateDef> {
            self.templates.lock().unwrap().get(&handle).cloned()
        }
    }

    fn oak(layers: &[LayerId]) -> TemplateDef {
        TemplateDef {
            name: "Oak".into(),
            parts: layers
                .iter()
                .map(|layer| PartDef {
                    layer: *layer,
                    color: Rgba::opaque(20, 120, 20),
                })
                .collect(),
        }
    }

    fn session_with(
        store: Arc<FakeStore>,
        layers: &[LayerId],
    ) -> PlacementSession<MemoryScene> {
        PlacementSession::new(
            MemoryScene::new(),
            store,
            &StaticLayers::from_ids(layers.iter().copied()),
            Box::new(MemoryPreferences::new()),
            SessionSettings::default(),
        )
    }

    fn item() -> PlaceableItem {
        PlaceableItem::new(TemplateHandle(1), "Oak", "Trees")
    }

    fn prefab() -> Arc<dyn AssetKind> {
        Arc::new(crate::host::PrefabKind)
    }

    #[test]
    fn test_snap_is_idempotent() {
        let cell = Vec2::new(16.0, 12.0);
        for p in [
            Vec2::new(23.0, 9.0),
            Vec2::new(-7.9, 5.99),
            Vec2::new(8.0, 6.0),
            Vec2::new(1000.3, -0.1),
        ] {
            let once = snap_position(p, cell);
            assert_eq!(snap_position(once, cell), once);
        }
    }

    #[test]
    fn test_snap_halfway_rounds_to_even() {
        let cell = Vec2::new(16.0, 16.0);
        assert_eq!(snap_position(Vec2::new(8.0, 24.0), cell), Vec2::new(0.0, 32.0));
    }

    #[test]
    fn test_select_tints_and_applies_transform() {
        let store = FakeStore::with(vec![(1, oak(&[0]))]);
        let mut session = session_with(store, &[0, 1]);

        assert!(session.select_item(&item(), prefab()));
        assert_eq!(session.state(), SessionState::Armed);
        let candidate = session.candidate().unwrap();
        let renderer = candidate.parts[0].renderer;
        assert_eq!(
            session.scene().renderer_color(renderer),
            Some(Rgba::new(255, 255, 255, 128))
        );
        assert_eq!(candidate.category_path, "Prefabs/Trees");
    }

    #[test]
    fn test_select_invalid_template_is_noop() {
        let store = FakeStore::with(vec![(1, oak(&[0]))]);
        let mut session = session_with(Arc::clone(&store), &[0]);
        assert!(session.select_item(&item(), prefab()));
        let armed = session.candidate().unwrap().node;

        store.remove(1);
        assert!(!session.select_item(&item(), prefab()));
        assert_eq!(session.candidate().unwrap().node, armed);
    }

    #[test]
    fn test_select_invalid_template_signals_rescan() {
        let store = FakeStore::with(vec![(1, oak(&[0]))]);
        let mut session = session_with(Arc::clone(&store), &[0]);
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        session.subscribe(move |event| sink.borrow_mut().push(*event));

        store.remove(1);
        assert!(!session.select_item(&item(), prefab()));
        assert_eq!(
            *events.borrow(),
            vec![SessionEvent::StaleTemplate(TemplateHandle(1))]
        );
        assert!(session.candidate().is_none());
    }

    #[test]
    fn test_update_pointer_snaps_and_respects_modifier() {
        let store = FakeStore::with(vec![(1, oak(&[0]))]);
        let mut session = session_with(store, &[0]);
        session.select_item(&item(), prefab());

        session.update_pointer(Vec2::new(23.0, 9.0), false);
        assert_eq!(session.candidate_position(), Some(Vec2::new(16.0, 16.0)));

        session.update_pointer(Vec2::new(40.0, 40.0), true);
        assert_eq!(session.candidate_position(), Some(Vec2::new(16.0, 16.0)));

        session.set_snap_enabled(false);
        session.update_pointer(Vec2::new(23.0, 9.0), false);
        assert_eq!(session.candidate_position(), Some(Vec2::new(23.0, 9.0)));
    }

    #[test]
    fn test_idle_operations_are_noops() {
        let store = FakeStore::with(vec![]);
        let mut session = session_with(store, &[0]);

        session.update_pointer(Vec2::new(1.0, 1.0), false);
        session.add_rotation(45.0);
        session.flip(FlipAxis::Horizontal);
        assert_eq!(session.move_layer(1), LayerMove::Ignored);
        assert_eq!(session.commit(), None);
        session.cancel();

        assert_eq!(session.rotation(), 0.0);
        assert_eq!(session.scale(), Vec2::ONE);
        assert_eq!(session.scene().node_count(), 0);
    }

    #[test]
    fn test_rotation_accumulates_unbounded() {
        let store = FakeStore::with(vec![(1, oak(&[0]))]);
        let mut session = session_with(store, &[0]);
        session.select_item(&item(), prefab());

        for _ in 0..9 {
            session.add_rotation(45.0);
        }
        assert_eq!(session.rotation(), 405.0);
        let node = session.candidate().unwrap().node;
        assert_eq!(session.scene().rotation(node), Some(405.0));
    }

    #[test]
    fn test_move_layer_all_or_nothing() {
        let store = FakeStore::with(vec![(1, oak(&[20, 30]))]);
        let mut session = session_with(store, &[10, 20, 30]);
        session.select_item(&item(), prefab());
        let parts = session.candidate().unwrap().parts.clone();

        // Second part already sits on the top layer
        assert_eq!(session.move_layer(1), LayerMove::Rejected);
        assert_eq!(session.layer_offset(), 0);
        assert_eq!(session.scene().renderer_layer(parts[0].renderer), Some(20));
        assert_eq!(session.scene().renderer_layer(parts[1].renderer), Some(30));

        assert_eq!(session.move_layer(-1), LayerMove::Moved);
        assert_eq!(session.layer_offset(), -1);
        assert_eq!(session.scene().renderer_layer(parts[0].renderer), Some(10));
        assert_eq!(session.scene().renderer_layer(parts[1].renderer), Some(20));

        // First part is now on the bottom layer
        assert_eq!(session.move_layer(-1), LayerMove::Rejected);
        assert_eq!(session.layer_offset(), -1);
    }

    #[test]
    fn test_move_layer_huge_delta_rejected() {
        let store = FakeStore::with(vec![(1, oak(&[1]))]);
        let mut session = session_with(store, &[0, 1, 2]);
        session.select_item(&item(), prefab());
        let renderer = session.candidate().unwrap().parts[0].renderer;

        assert_eq!(session.move_layer(i64::MAX), LayerMove::Rejected);
        assert_eq!(session.move_layer(i64::MIN), LayerMove::Rejected);
        assert_eq!(session.layer_offset(), 0);
        assert_eq!(session.scene().renderer_layer(renderer), Some(1));

        assert_eq!(session.move_layer(1), LayerMove::Moved);
        assert_eq!(session.move_layer(i64::MAX), LayerMove::Rejected);
        assert_eq!(session.layer_offset(), 1);
        assert_eq!(session.scene().renderer_layer(renderer), Some(2));
    }

    #[test]
    fn test_move_layer_unknown_layer_rejected() {
        let store = FakeStore::with(vec![(1, oak(&[99]))]);
        let mut session = session_with(store, &[0, 1]);
        session.select_item(&item(), prefab());
        assert_eq!(session.move_layer(0), LayerMove::Rejected);
    }

    #[test]
    fn test_snap_cell_clamped_and_persisted() {
        let store = FakeStore::with(vec![]);
        let mut session = session_with(store, &[0]);
        assert_eq!(session.snap_cell(), Vec2::new(16.0, 16.0));

        session.set_snap_cell(Vec2::new(4.0, 32.0)).unwrap();
        assert_eq!(session.snap_cell(), Vec2::new(8.0, 32.0));
        assert_eq!(session.prefs.get_float(PREF_SNAP_X), Some(8.0));
        assert_eq!(session.prefs.get_float(PREF_SNAP_Y), Some(32.0));
    }

    #[test]
    fn test_snap_cell_read_from_preferences() {
        let mut prefs = MemoryPreferences::new();
        prefs.set_float(PREF_SNAP_X, 24.0).unwrap();
        prefs.set_float(PREF_SNAP_Y, 2.0).unwrap();
        let session: PlacementSession<MemoryScene> = PlacementSession::new(
            MemoryScene::new(),
            FakeStore::with(vec![]),
            &StaticLayers::from_ids([0]),
            Box::new(prefs),
            SessionSettings::default(),
        );
        assert_eq!(session.snap_cell(), Vec2::new(24.0, 8.0));
    }

    #[test]
    fn test_reset_clears_transform_state() {
        let store = FakeStore::with(vec![(1, oak(&[0, 1]))]);
        let mut session = session_with(store, &[0, 1, 2]);
        session.select_item(&item(), prefab());
        session.add_rotation(90.0);
        session.flip(FlipAxis::Vertical);
        session.move_layer(1);

        session.reset();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.rotation(), 0.0);
        assert_eq!(session.scale(), Vec2::ONE);
        assert_eq!(session.layer_offset(), 0);
        assert_eq!(session.scene().node_count(), 0);
    }

    #[test]
    fn test_commit_and_finish_returns_to_idle() {
        let store = FakeStore::with(vec![(1, oak(&[0]))]);
        let mut session = session_with(store, &[0]);
        session.select_item(&item(), prefab());

        let placed = session.commit_and_finish().unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.scene().find_path("Prefabs/Trees/Oak"), Some(placed));
    }
}
