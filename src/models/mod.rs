//! Data models for the swatch catalog, scene handles, and layers.
//!
//! Models are plain data; they hold no references to the filesystem or the
//! scene and can be freely cloned and serialized.

pub mod catalog;
pub mod color;
pub mod geometry;
pub mod handle;
pub mod layer;

// Re-export all model types
pub use catalog::{filter_items, PlaceableItem, PrimarySwatch, SecondaryGroup, SwatchCatalog};
pub use color::Rgba;
pub use geometry::{FlipAxis, Vec2};
pub use handle::{NodeHandle, RendererHandle, TemplateHandle};
pub use layer::{LayerDescriptor, LayerId};
