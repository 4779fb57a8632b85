//! Draw-order layer registry.
//!
//! The registry snapshots the host's ordered layer list and maps between
//! layer ids and their ordinals so that layer offsets can be bounds-checked
//! with plain integer arithmetic.

use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::host::LayerSource;
use crate::models::{LayerDescriptor, LayerId};

/// Failed layer lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    /// The id is not part of the current snapshot.
    #[error("layer {0} is not known to the scene")]
    NotFound(LayerId),
    /// The ordinal lies outside `0..len`.
    #[error("layer ordinal {ordinal} is out of range (0..{len})")]
    OutOfRange {
        /// Requested ordinal
        ordinal: i64,
        /// Number of layers in the snapshot
        len: usize,
    },
    /// A layer shift does not fit in an ordinal.
    #[error("layer shift by {delta} overflows")]
    Overflow {
        /// Requested shift
        delta: i64,
    },
}

/// Ordered snapshot of the host's layers.
///
/// Ordinals are contiguous and stable until the next [`refresh`](Self::refresh).
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: Vec<LayerDescriptor>,
    ordinals: HashMap<LayerId, usize>,
}

impl LayerRegistry {
    /// Creates a registry populated from `source`.
    pub fn from_source(source: &dyn LayerSource) -> Self {
        let mut registry = Self::default();
        registry.refresh(source);
        registry
    }

    /// Re-reads the host's layer list.
    ///
    /// Repeated ids keep their first position so ordinals stay unique.
    pub fn refresh(&mut self, source: &dyn LayerSource) {
        self.layers.clear();
        self.ordinals.clear();
        for id in source.layer_ids_in_order() {
            if self.ordinals.contains_key(&id) {
                continue;
            }
            let ordinal = self.layers.len();
            let mut descriptor = LayerDescriptor::new(id, ordinal);
            if let Some(name) = source.layer_name(id) {
                descriptor = descriptor.with_name(name);
            }
            self.ordinals.insert(id, ordinal);
            self.layers.push(descriptor);
        }
        debug!("Layer registry refreshed with {} layers", self.layers.len());
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if the host reported no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Position of `id` in the ordering.
    pub fn ordinal_of(&self, id: LayerId) -> Result<usize, LayerError> {
        self.ordinals
            .get(&id)
            .copied()
            .ok_or(LayerError::NotFound(id))
    }

    /// Layer id at `ordinal`.
    pub fn id_at(&self, ordinal: i64) -> Result<LayerId, LayerError> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| self.layers.get(index))
            .map(|descriptor| descriptor.id)
            .ok_or(LayerError::OutOfRange {
                ordinal,
                len: self.layers.len(),
            })
    }

    /// Finds a layer id by display name, ignoring case.
    pub fn id_by_name(&self, name: &str) -> Option<LayerId> {
        self.layers
            .iter()
            .find(|d| {
                d.name
                    .as_deref()
                    .is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
            .map(|d| d.id)
    }

    /// Display name of `id`, if the host names its layers.
    pub fn name_of(&self, id: LayerId) -> Option<&str> {
        let ordinal = self.ordinal_of(id).ok()?;
        self.layers.get(ordinal)?.name.as_deref()
    }

    /// All descriptors, back to front.
    pub fn descriptors(&self) -> &[LayerDescriptor] {
        &self.layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticLayers;

    fn registry() -> LayerRegistry {
        LayerRegistry::from_source(&StaticLayers::new(vec![
            (10, "Background".into()),
            (-3, "Ground".into()),
            (7, "Foreground".into()),
        ]))
    }

    #[test]
    fn test_ordinals_follow_host_order() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.ordinal_of(10), Ok(0));
        assert_eq!(registry.ordinal_of(-3), Ok(1));
        assert_eq!(registry.ordinal_of(7), Ok(2));
        assert_eq!(registry.id_at(1), Ok(-3));
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        assert_eq!(registry().ordinal_of(99), Err(LayerError::NotFound(99)));
    }

    #[test]
    fn test_id_at_out_of_range() {
        let registry = registry();
        assert_eq!(
            registry.id_at(3),
            Err(LayerError::OutOfRange { ordinal: 3, len: 3 })
        );
        assert!(registry.id_at(-1).is_err());
    }

    #[test]
    fn test_duplicate_ids_keep_first_position() {
        let registry = LayerRegistry::from_source(&StaticLayers::from_ids([4, 5, 4]));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ordinal_of(4), Ok(0));
    }

    #[test]
    fn test_refresh_replaces_snapshot() {
        let mut registry = registry();
        registry.refresh(&StaticLayers::from_ids([1]));
        assert_eq!(registry.len(), 1);
        assert!(registry.ordinal_of(10).is_err());
    }

    #[test]
    fn test_names() {
        let registry = registry();
        assert_eq!(registry.id_by_name("ground"), Some(-3));
        assert_eq!(registry.id_by_name("Sky"), None);
        assert_eq!(registry.name_of(7), Some("Foreground"));
        let ordinals: Vec<_> = registry.descriptors().iter().map(|d| d.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
    }
}
