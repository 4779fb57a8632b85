//! Opaque handles into the asset store and the scene graph.
//!
//! Handles are plain ids; only the collaborator that issued one can resolve it.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

opaque_handle!(
    /// A discovered template in the asset store.
    TemplateHandle,
    "template"
);

opaque_handle!(
    /// A node in the scene graph.
    NodeHandle,
    "node"
);

opaque_handle!(
    /// A renderable part attached to a scene node.
    RendererHandle,
    "renderer"
);
