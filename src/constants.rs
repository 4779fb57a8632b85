//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name, preference keys, and placement defaults.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Object Swatch";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "objswatch";

/// Directory name used under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "ObjectSwatch";

/// Environment variable that overrides the config directory (used by tests).
pub const CONFIG_DIR_ENV: &str = "OBJSWATCH_CONFIG_DIR";

/// Preference key for the horizontal snap cell component.
pub const PREF_SNAP_X: &str = "placement.snap_x";

/// Preference key for the vertical snap cell component.
pub const PREF_SNAP_Y: &str = "placement.snap_y";

/// Snap cell used when no preference has been stored yet.
pub const DEFAULT_SNAP_CELL: f32 = 16.0;

/// Smallest snap cell accepted per axis when the cell is edited.
pub const MIN_SNAP_CELL: f32 = 8.0;

/// Default rotation applied per rotate action, in degrees.
pub const DEFAULT_ROTATION_STEP: f32 = 45.0;

/// Alpha of the translucent tint applied to an armed candidate.
pub const DEFAULT_PREVIEW_ALPHA: u8 = 128;

/// Root organizational node used when a category path is empty.
pub const FALLBACK_ROOT_NODE: &str = "Act Grid";
