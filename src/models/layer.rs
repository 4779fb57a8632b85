//! Draw-order layer descriptors.

use serde::{Deserialize, Serialize};

/// Identifier of a draw-order layer as known to the host scene.
///
/// Ids are arbitrary integers; only their position in the host's ordering
/// (the ordinal) carries meaning for stacking.
pub type LayerId = i32;

/// A layer id paired with its position in the host's fixed ordering.
///
/// # Invariants
///
/// Within one registry snapshot the ordinals are contiguous `0..N-1` and unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    /// Host layer id
    pub id: LayerId,
    /// Position of `id` in the ordering (0 = drawn first)
    pub ordinal: usize,
    /// Human-readable name, when the host provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LayerDescriptor {
    /// Creates a descriptor without a name.
    #[must_use]
    pub const fn new(id: LayerId, ordinal: usize) -> Self {
        Self {
            id,
            ordinal,
            name: None,
        }
    }

    /// Attaches a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
