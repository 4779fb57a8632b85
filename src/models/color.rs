//! RGBA color handling with hex parsing and serialization.

// Allow small types passed by reference for API consistency
#![allow(clippy::trivially_copy_pass_by_ref)]

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// RGBA color of a renderable part.
///
/// Template files store colors as hex strings (`#RRGGBB` or `#RRGGBBAA`);
/// a missing alpha channel means fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
    /// Alpha channel (0 = transparent, 255 = opaque)
    pub a: u8,
}

impl Rgba {
    /// Opaque white, the neutral renderer color.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Creates a new color from individual channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parses a color from a hex string.
    ///
    /// Supports "#RRGGBB", "RRGGBB", "#RRGGBBAA" and "RRGGBBAA" (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use objswatch::models::Rgba;
    ///
    /// let color = Rgba::from_hex("#FF0000").unwrap();
    /// assert_eq!(color, Rgba::opaque(255, 0, 0));
    ///
    /// let color = Rgba::from_hex("ffffff80").unwrap();
    /// assert_eq!(color, Rgba::new(255, 255, 255, 128));
    /// ```
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);

        if hex.len() != 6 && hex.len() != 8 {
            anyhow::bail!(
                "Invalid hex color format '{hex}'. Expected 6 or 8 hex digits (RRGGBB[AA])"
            );
        }

        let channel = |range: std::ops::Range<usize>, label: &str| {
            hex.get(range)
                .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                .with_context(|| format!("Invalid {label} channel in hex color '{hex}'"))
        };

        let r = channel(0..2, "red")?;
        let g = channel(2..4, "green")?;
        let b = channel(4..6, "blue")?;
        let a = if hex.len() == 8 {
            channel(6..8, "alpha")?
        } else {
            255
        };

        Ok(Self::new(r, g, b, a))
    }

    /// Converts the color to an uppercase hex string.
    ///
    /// Opaque colors are written as "#RRGGBB", translucent ones as "#RRGGBBAA".
    #[must_use]
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Returns the same color with a different alpha.
    #[must_use]
    pub const fn with_alpha(&self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}
