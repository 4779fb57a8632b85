//! Service layer for catalog discovery and placement.
//!
//! Services hold only the collaborators they need (asset store, scene graph,
//! layer source, preference store) and are composed by the CLI.

pub mod candidate;
pub mod hierarchy;
pub mod index;
pub mod layers;
pub mod library;
pub mod loader;
pub mod placement;

// Re-export commonly used types
pub use candidate::{Candidate, VisualPart};
pub use hierarchy::SceneHierarchyResolver;
pub use index::SwatchIndexBuilder;
pub use layers::{LayerError, LayerRegistry};
pub use library::SwatchLibrary;
pub use loader::{CatalogLoader, ScanMessage};
pub use placement::{
    snap_position, LayerMove, PlacementSession, SessionEvent, SessionSettings, SessionState,
};
