//! Configuration management CLI commands.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::{AssetKindChoice, Config, PreferenceFile};
use crate::constants::{APP_NAME, MIN_SNAP_CELL, PREF_SNAP_X, PREF_SNAP_Y};
use crate::host::PreferenceStore;
use crate::models::Vec2;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Set configuration values
    Set(ConfigSetArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set configuration values
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Template library root directory
    #[arg(long, value_name = "DIR")]
    library_root: Option<PathBuf>,

    /// Remembered snap cell (each axis at least 8)
    #[arg(long, value_name = "X,Y")]
    snap: Option<Vec2>,

    /// Whether pointer positions snap to the grid
    #[arg(long, value_name = "BOOL")]
    snap_enabled: Option<bool>,

    /// Asset kind browsed by default
    #[arg(long, value_enum)]
    default_kind: Option<AssetKindChoice>,
}

/// Configuration plus the remembered snap cell, for output
#[derive(Serialize, Debug)]
struct ConfigOutput<'a> {
    config_file: String,
    #[serde(flatten)]
    config: &'a Config,
    snap_cell: Option<Vec2>,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Set(args) => args.execute(),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = Config::load()
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;
        let config_file = Config::config_file_path()
            .map_err(|e| CliError::io(format!("Failed to locate configuration: {e:#}")))?;
        let prefs = PreferenceFile::open()
            .map_err(|e| CliError::io(format!("Failed to open preferences: {e:#}")))?;
        let snap_cell = match (prefs.get_float(PREF_SNAP_X), prefs.get_float(PREF_SNAP_Y)) {
            (Some(x), Some(y)) => Some(Vec2::new(x, y)),
            _ => None,
        };

        if self.json {
            print_json(&ConfigOutput {
                config_file: config_file.to_string_lossy().to_string(),
                config: &config,
                snap_cell,
            })
        } else {
            output_human_readable(&config, &config_file, snap_cell);
            Ok(())
        }
    }
}

impl ConfigSetArgs {
    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        if self.library_root.is_none()
            && self.snap.is_none()
            && self.snap_enabled.is_none()
            && self.default_kind.is_none()
        {
            return Err(CliError::validation(
                "At least one configuration option must be specified: --library-root, --snap, --snap-enabled, or --default-kind",
            ));
        }

        let mut config = Config::load()
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;

        if let Some(path) = &self.library_root {
            if !path.is_dir() {
                return Err(CliError::validation(format!(
                    "Library root does not exist: {}",
                    path.display()
                )));
            }
            config
                .set_library_root(path.clone())
                .map_err(|e| CliError::validation(format!("{e:#}")))?;
        }
        if let Some(enabled) = self.snap_enabled {
            config.placement.snap_enabled = enabled;
        }
        if let Some(kind) = self.default_kind {
            config.placement.default_kind = kind;
        }

        config
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        if let Some(cell) = self.snap {
            let cell = cell.max(Vec2::new(MIN_SNAP_CELL, MIN_SNAP_CELL));
            let mut prefs = PreferenceFile::open()
                .map_err(|e| CliError::io(format!("Failed to open preferences: {e:#}")))?;
            prefs
                .set_float(PREF_SNAP_X, cell.x)
                .and_then(|()| prefs.set_float(PREF_SNAP_Y, cell.y))
                .map_err(|e| CliError::io(format!("Failed to save preferences: {e:#}")))?;
            println!("Snap cell set to ({cell}).");
        }

        println!("Configuration updated successfully.");

        Ok(())
    }
}

/// Output configuration in human-readable format
fn output_human_readable(config: &Config, config_file: &std::path::Path, snap: Option<Vec2>) {
    let title = format!("{APP_NAME} Configuration");
    println!("{title}");
    println!("{}", "=".repeat(title.len()));
    println!("File: {}", config_file.display());
    println!();

    println!("Paths:");
    if let Some(root) = &config.paths.library_root {
        println!("  Library Root: {}", root.display());
    } else {
        println!("  Library Root: (not configured)");
    }
    println!();

    let placement = &config.placement;
    println!("Placement:");
    println!("  Snap Enabled: {}", placement.snap_enabled);
    match snap {
        Some(cell) => println!("  Snap Cell: {cell}"),
        None => println!(
            "  Snap Cell: {0}, {0} (default)",
            placement.default_snap_cell
        ),
    }
    println!("  Rotation Step: {}", placement.rotation_step);
    println!("  Preview Alpha: {}", placement.preview_alpha);
    println!("  Squash Groups: {}", placement.squash_secondary);
    println!(
        "  Default Kind: {}",
        format!("{:?}", placement.default_kind).to_lowercase()
    );
    println!();

    println!("Layers:");
    for layer in &config.layers {
        println!("  {:>4}  {}", layer.id, layer.name);
    }
}
