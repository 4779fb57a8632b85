//! Plain 2D value types shared by the scene and placement code.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 2D vector in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component
    pub x: f32,
    /// Vertical component
    pub y: f32,
}

impl Vec2 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0);
    /// Unit scale.
    pub const ONE: Self = Self::new(1.0, 1.0);

    /// Creates a new vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise maximum.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// Parses "X,Y" (whitespace around either component is ignored).
impl FromStr for Vec2 {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (x, y) = s
            .split_once(',')
            .with_context(|| format!("Expected 'X,Y' but got '{s}'"))?;
        let x = x
            .trim()
            .parse::<f32>()
            .with_context(|| format!("Invalid X component in '{s}'"))?;
        let y = y
            .trim()
            .parse::<f32>()
            .with_context(|| format!("Invalid Y component in '{s}'"))?;
        Ok(Self::new(x, y))
    }
}

/// Axis along which a candidate is mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipAxis {
    /// Mirror left/right (negates scale x)
    Horizontal,
    /// Mirror top/bottom (negates scale y)
    Vertical,
}
