//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution, plus the small
//! preference file that remembers the snap cell between sessions.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

use crate::constants::{
    CONFIG_DIR_ENV, CONFIG_DIR_NAME, DEFAULT_PREVIEW_ALPHA, DEFAULT_ROTATION_STEP,
    DEFAULT_SNAP_CELL,
};
use crate::host::{AssetKind, PreferenceStore, PrefabKind, SpriteKind, StaticLayers};
use crate::models::LayerId;
use crate::services::SessionSettings;

/// Kind of asset a library scan looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AssetKindChoice {
    /// `.prefab` template files
    #[default]
    Prefab,
    /// Image files placed as single sprites
    Sprite,
}

impl AssetKindChoice {
    /// Builds the asset kind; sprites are drawn on `sprite_layer`.
    pub fn build(self, sprite_layer: LayerId) -> Arc<dyn AssetKind> {
        match self {
            Self::Prefab => Arc::new(PrefabKind),
            Self::Sprite => Arc::new(SpriteKind::on_layer(sprite_layer)),
        }
    }
}

/// Path configuration for file system locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Root directory of the template library
    pub library_root: Option<PathBuf>,
}

/// Placement defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Snap pointer positions to the grid
    pub snap_enabled: bool,
    /// Snap cell used until the user changes it
    pub default_snap_cell: f32,
    /// Degrees added per rotate action
    pub rotation_step: f32,
    /// Alpha of the preview tint (0-255)
    pub preview_alpha: u8,
    /// Show every secondary group of a swatch as one list
    pub squash_secondary: bool,
    /// Asset kind browsed by default
    pub default_kind: AssetKindChoice,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            snap_enabled: true,
            default_snap_cell: DEFAULT_SNAP_CELL,
            rotation_step: DEFAULT_ROTATION_STEP,
            preview_alpha: DEFAULT_PREVIEW_ALPHA,
            squash_secondary: true,
            default_kind: AssetKindChoice::default(),
        }
    }
}

impl PlacementConfig {
    /// Session settings derived from these defaults.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            snap_enabled: self.snap_enabled,
            default_snap_cell: self.default_snap_cell,
            preview_alpha: self.preview_alpha,
        }
    }
}

/// One draw-order layer of the scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Layer id
    pub id: LayerId,
    /// Display name
    pub name: String,
}

fn default_layers() -> Vec<LayerConfig> {
    vec![LayerConfig {
        id: 0,
        name: "Default".to_string(),
    }]
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/ObjectSwatch/config.toml`
/// - macOS: `~/Library/Application Support/ObjectSwatch/config.toml`
/// - Windows: `%APPDATA%\ObjectSwatch\config.toml`
///
/// The directory can be overridden with the `OBJSWATCH_CONFIG_DIR`
/// environment variable.
///
/// # Validation
///
/// - `library_root` is checked when set and when a command uses it; a
///   stale root in the file only logs a warning on load
/// - `default_snap_cell` and `rotation_step` must be positive
/// - at least one layer; layer ids and names must be unique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// File system paths
    #[serde(default)]
    pub paths: PathConfig,
    /// Placement defaults
    #[serde(default)]
    pub placement: PlacementConfig,
    /// Scene layers, back to front
    #[serde(default = "default_layers")]
    pub layers: Vec<LayerConfig>,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            paths: PathConfig::default(),
            placement: PlacementConfig::default(),
            layers: default_layers(),
        }
    }

    /// Gets the config directory path.
    ///
    /// - Linux: `~/.config/ObjectSwatch/`
    /// - macOS: `~/Library/Application Support/ObjectSwatch/`
    /// - Windows: `%APPDATA%\ObjectSwatch\`
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_dir()?)
    }

    /// Loads configuration from `config.toml` inside `dir`.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let config_path = dir.join("config.toml");

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;
        if let Some(root) = config.paths.library_root.as_ref().filter(|root| !root.is_dir()) {
            warn!("Configured library root does not exist: {}", root.display());
        }
        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_dir()?)
    }

    /// Saves configuration to `config.toml` inside `dir`.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, dir: &Path) -> Result<()> {
        self.validate()?;

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        write_atomic(&dir.join("config.toml"), &content)
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.placement.default_snap_cell <= 0.0 {
            anyhow::bail!(
                "Snap cell must be positive, got {}",
                self.placement.default_snap_cell
            );
        }

        if self.placement.rotation_step <= 0.0 {
            anyhow::bail!(
                "Rotation step must be positive, got {}",
                self.placement.rotation_step
            );
        }

        if self.layers.is_empty() {
            anyhow::bail!("At least one layer must be configured");
        }

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for layer in &self.layers {
            if !ids.insert(layer.id) {
                anyhow::bail!("Duplicate layer id: {}", layer.id);
            }
            if !names.insert(layer.name.to_lowercase()) {
                anyhow::bail!("Duplicate layer name: {}", layer.name);
            }
        }

        Ok(())
    }

    /// Sets the library root with validation.
    pub fn set_library_root(&mut self, path: PathBuf) -> Result<()> {
        if !path.is_dir() {
            anyhow::bail!("Library root does not exist: {}", path.display());
        }
        self.paths.library_root = Some(path);
        self.validate()
    }

    /// Layer source backed by the configured layers.
    pub fn layer_source(&self) -> StaticLayers {
        StaticLayers::new(
            self.layers
                .iter()
                .map(|layer| (layer.id, layer.name.clone()))
                .collect(),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes `content` to `path` via a temp file and rename.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context(format!(
            "Failed to create config directory: {}",
            dir.display()
        ))?;
    }

    let temp_path = path.with_extension("toml.tmp");

    fs::write(&temp_path, content).context(format!(
        "Failed to write temp file: {}",
        temp_path.display()
    ))?;

    fs::rename(&temp_path, path).context(format!(
        "Failed to rename temp file to: {}",
        path.display()
    ))?;

    Ok(())
}

/// Float preferences persisted in `preferences.toml`.
///
/// Every write goes straight to disk.
#[derive(Debug, Clone)]
pub struct PreferenceFile {
    path: PathBuf,
    values: BTreeMap<String, f32>,
}

impl PreferenceFile {
    /// Opens the preference file in the config directory.
    pub fn open() -> Result<Self> {
        Self::open_in(&Config::config_dir()?)
    }

    /// Opens `preferences.toml` inside `dir`; a missing file starts empty.
    pub fn open_in(dir: &Path) -> Result<Self> {
        let path = dir.join("preferences.toml");
        let values = if path.exists() {
            let content = fs::read_to_string(&path)
                .context(format!("Failed to read preferences: {}", path.display()))?;
            toml::from_str(&content)
                .context(format!("Failed to parse preferences: {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for PreferenceFile {
    fn get_float(&self, key: &str) -> Option<f32> {
        self.values.get(key).copied()
    }

    fn set_float(&mut self, key: &str, value: f32) -> Result<()> {
        self.values.insert(key.to_string(), value);
        let content =
            toml::to_string_pretty(&self.values).context("Failed to serialize preferences")?;
        write_atomic(&self.path, &content)
    }
}
