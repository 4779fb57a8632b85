//! Run a placement session against an in-memory scene.
//!
//! The command selects one catalog item, applies the requested rotation,
//! flips and layer shift, commits once per `--at` position, and prints the
//! resulting scene hierarchy.

use crate::cli::common::{load_config, print_json, CliError, CliResult, LibraryArgs};
use crate::config::PreferenceFile;
use crate::host::{LayerSource, MemoryScene, SceneGraph, SceneSnapshot, StaticLayers};
use crate::models::{FlipAxis, LayerId, Vec2};
use crate::services::{LayerMove, PlacementSession};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Place copies of a template into a fresh scene and print the result
#[derive(Debug, Clone, Args)]
pub struct PlaceArgs {
    /// Library selection
    #[command(flatten)]
    pub library: LibraryArgs,

    /// Display name of the template to place (case-insensitive)
    #[arg(short, long, value_name = "NAME")]
    pub item: String,

    /// Pointer position to commit at (repeatable); defaults to the origin
    #[arg(long = "at", value_name = "X,Y", allow_hyphen_values = true)]
    pub positions: Vec<Vec2>,

    /// Degrees to rotate by before placing
    #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
    pub rotate: Option<f32>,

    /// Number of rotate presses, each adding the configured rotation step
    #[arg(long, value_name = "N", allow_hyphen_values = true)]
    pub turns: Option<i32>,

    /// Mirror horizontally
    #[arg(long)]
    pub flip_x: bool,

    /// Mirror vertically
    #[arg(long)]
    pub flip_y: bool,

    /// Layers to shift every part by (rejected if any part leaves the range)
    #[arg(long, value_name = "N", allow_hyphen_values = true)]
    pub layer_shift: Option<i64>,

    /// Place at raw pointer positions
    #[arg(long)]
    pub no_snap: bool,

    /// Snap cell to use and remember (each axis at least 8)
    #[arg(long, value_name = "X,Y")]
    pub snap: Option<Vec2>,

    /// Scene layer ids back to front (overrides the configured layers)
    #[arg(long, value_name = "ID,ID,..", value_delimiter = ',', allow_hyphen_values = true)]
    pub layers: Option<Vec<LayerId>>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct PlacedNode {
    name: String,
    position: Vec2,
}

#[derive(Debug, Serialize)]
struct PlaceResponse {
    item: String,
    placed: Vec<PlacedNode>,
    rotation: f32,
    scale: Vec2,
    layer_offset: i64,
    layer_shift_rejected: bool,
    snap_cell: Vec2,
    scene: SceneSnapshot,
}

impl PlaceArgs {
    /// Execute the place command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config()?;
        let layers: StaticLayers = match &self.layers {
            Some(ids) => StaticLayers::from_ids(ids.iter().copied()),
            None => config.layer_source(),
        };
        if layers.layer_ids_in_order().is_empty() {
            return Err(CliError::validation("At least one layer is required"));
        }

        let library = self.library.load_library(&config, &layers)?;
        let item = library
            .catalog()
            .find_item(&self.item)
            .cloned()
            .ok_or_else(|| CliError::validation(format!("Template not found: {}", self.item)))?;
        let kind = Arc::clone(library.builder().kind());

        let prefs = PreferenceFile::open()
            .map_err(|e| CliError::io(format!("Failed to open preferences: {e:#}")))?;
        let mut settings = config.placement.session_settings();
        if self.no_snap {
            settings.snap_enabled = false;
        }

        let mut session = PlacementSession::new(
            MemoryScene::new(),
            Arc::clone(library.builder().store()),
            &layers,
            Box::new(prefs),
            settings,
        );
        if let Some(cell) = self.snap {
            session
                .set_snap_cell(cell)
                .map_err(|e| CliError::io(format!("Failed to save snap cell: {e:#}")))?;
        }

        if !session.select_item(&item, kind) {
            return Err(CliError::io(format!(
                "Template '{}' could not be instantiated",
                item.display_name
            )));
        }

        if let Some(degrees) = self.rotate {
            session.add_rotation(degrees);
        }
        for _ in 0..self.turns.unwrap_or(0).unsigned_abs() {
            let step = config.placement.rotation_step;
            session.add_rotation(if self.turns.unwrap_or(0) < 0 { -step } else { step });
        }
        if self.flip_x {
            session.flip(FlipAxis::Horizontal);
        }
        if self.flip_y {
            session.flip(FlipAxis::Vertical);
        }
        let layer_shift_rejected = match self.layer_shift {
            Some(delta) => session.move_layer(delta) == LayerMove::Rejected,
            None => false,
        };
        if layer_shift_rejected {
            eprintln!("Warning: layer shift rejected, a part would leave the layer range");
        }

        let positions = if self.positions.is_empty() {
            vec![Vec2::ZERO]
        } else {
            self.positions.clone()
        };
        let mut placed = Vec::with_capacity(positions.len());
        let last = positions.len() - 1;
        for (index, position) in positions.into_iter().enumerate() {
            session.update_pointer(position, false);
            let node = if index == last {
                session.commit_and_finish()
            } else {
                session.commit()
            };
            if let Some(node) = node {
                let scene = session.scene();
                placed.push(PlacedNode {
                    name: scene.name(node).unwrap_or_default(),
                    position: scene.position(node).unwrap_or_default(),
                });
            }
        }

        let response = PlaceResponse {
            item: item.display_name.clone(),
            placed,
            rotation: session.rotation(),
            scale: session.scale(),
            layer_offset: session.layer_offset(),
            layer_shift_rejected,
            snap_cell: session.snap_cell(),
            scene: session.scene().snapshot(),
        };

        if self.json {
            print_json(&response)
        } else {
            print!("{}", response.scene.to_tree_string());
            println!();
            for node in &response.placed {
                println!("Placed {} at ({})", node.name, node.position);
            }
            Ok(())
        }
    }
}
