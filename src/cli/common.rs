//! Shared CLI plumbing: error type, exit codes, and library arguments.

use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{AssetKindChoice, Config};
use crate::constants::APP_BINARY_NAME;
use crate::host::{AssetKind, FsAssetStore, LayerSource};
use crate::services::{LayerRegistry, SwatchIndexBuilder, SwatchLibrary};

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command succeeded
    Success = 0,
    /// Invalid arguments or configuration
    Validation = 1,
    /// Filesystem or serialization failure
    Io = 2,
}

/// Error returned by CLI commands.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CliError {
    /// Exit code the process should end with
    pub code: ExitCode,
    /// Human-readable message
    pub message: String,
}

impl CliError {
    /// An invalid-input error (exit code 1).
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            code: ExitCode::Validation,
            message: message.into(),
        }
    }

    /// An I/O error (exit code 2).
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            code: ExitCode::Io,
            message: message.into(),
        }
    }

    /// Numeric exit code.
    pub fn exit_code(&self) -> i32 {
        self.code as i32
    }
}

/// Result type of CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Loads the configuration, mapping failures to validation errors.
pub fn load_config() -> CliResult<Config> {
    Config::load()
        .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Arguments selecting a template library.
#[derive(Debug, Clone, Args)]
pub struct LibraryArgs {
    /// Library root directory (defaults to the configured library root)
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Asset kind to scan for (defaults to the configured kind)
    #[arg(short, long, value_enum)]
    pub kind: Option<AssetKindChoice>,

    /// Scan only this section of the library
    #[arg(long, value_name = "NAME")]
    pub section: Option<String>,

    /// Layer name sprites are drawn on (defaults to the first layer)
    #[arg(long, value_name = "LAYER")]
    pub sprite_layer: Option<String>,
}

impl LibraryArgs {
    /// Library root from the arguments or the configuration.
    pub fn root(&self, config: &Config) -> CliResult<PathBuf> {
        let root = self
            .root
            .clone()
            .or_else(|| config.paths.library_root.clone())
            .ok_or_else(|| {
                CliError::validation(format!(
                    "No library root given: pass --root or run `{APP_BINARY_NAME} config set --library-root DIR`"
                ))
            })?;
        if !root.is_dir() {
            return Err(CliError::io(format!(
                "Library root does not exist: {}",
                root.display()
            )));
        }
        Ok(root)
    }

    /// Asset kind from the arguments or the configuration.
    pub fn kind(
        &self,
        config: &Config,
        layers: &dyn LayerSource,
    ) -> CliResult<Arc<dyn AssetKind>> {
        let registry = LayerRegistry::from_source(layers);
        let sprite_layer = match &self.sprite_layer {
            Some(name) => registry
                .id_by_name(name)
                .ok_or_else(|| CliError::validation(format!("Unknown layer: {name}")))?,
            None => registry.descriptors().first().map_or(0, |d| d.id),
        };
        Ok(self
            .kind
            .unwrap_or(config.placement.default_kind)
            .build(sprite_layer))
    }

    /// Builder over a fresh filesystem store.
    pub fn builder(
        &self,
        config: &Config,
        layers: &dyn LayerSource,
    ) -> CliResult<SwatchIndexBuilder> {
        Ok(SwatchIndexBuilder::new(
            Arc::new(FsAssetStore::new()),
            self.kind(config, layers)?,
        ))
    }

    /// Browser state with the catalog scanned in the background and installed.
    pub fn load_library(
        &self,
        config: &Config,
        layers: &dyn LayerSource,
    ) -> CliResult<SwatchLibrary> {
        let root = self.root(config)?;
        let mut library = SwatchLibrary::new(self.builder(config, layers)?, root);
        library.set_squash_secondary(config.placement.squash_secondary);
        if self.section.is_some() {
            library.set_section(self.section.clone());
        } else {
            library.refresh();
        }
        library.wait();
        if let Some(error) = library.last_error() {
            return Err(CliError::io(format!("Failed to scan library: {error}")));
        }
        Ok(library)
    }
}
