//! Hex color handling.
//!
//! Every color that enters the crate is parsed into [`Color`] and printed back
//! in the normalized `#RRGGBB` form, so templates, palettes and config files all
//! agree on one spelling.

use std::fmt;
use std::str::FromStr;

use image::Rgba;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ColorError;

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::from_u32(0xFFFFFF);
    pub const BLACK: Color = Color::from_u32(0x000000);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a `0xRRGGBB` literal
    pub const fn from_u32(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    /// Parse `#RGB` or `#RRGGBB`, with or without the leading `#`
    pub fn from_hex(value: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex {
            value: value.to_string(),
        };

        let digits = value.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(invalid()),
        };

        let parsed = u32::from_str_radix(&expanded, 16).map_err(|_| invalid())?;
        Ok(Self::from_u32(parsed))
    }

    /// Normalized `#RRGGBB` representation
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn rgba(&self) -> Rgba<u8> {
        self.with_alpha(255)
    }

    pub fn with_alpha(&self, alpha: u8) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, alpha])
    }

    /// Linear interpolation towards `other`, `t` clamped to `[0, 1]`
    pub fn lerp(&self, other: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parse a palette, dropping entries that are not valid hex colors
pub fn parse_palette<S: AsRef<str>>(entries: &[S]) -> Vec<Color> {
    entries
        .iter()
        .filter_map(|entry| match Color::from_hex(entry.as_ref()) {
            Ok(color) => Some(color),
            Err(err) => {
                tracing::warn!("Ignoring palette entry: {}", err);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_normalize() {
        assert_eq!(Color::from_hex("#ff6b6b").unwrap().to_hex(), "#FF6B6B");
        assert_eq!(Color::from_hex("FF6B6B").unwrap().to_hex(), "#FF6B6B");
        assert_eq!(Color::from_hex(" #abc ").unwrap().to_hex(), "#AABBCC");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#GGGGGG").is_err());
        assert!(Color::from_hex("").is_err());
        assert!(Color::from_hex("#+12345").is_err());
    }

    #[test]
    fn test_palette_skips_invalid_entries() {
        let palette = parse_palette(&["#FFFFFF", "nope", "#000"]);
        assert_eq!(palette, vec![Color::WHITE, Color::BLACK]);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Color::from_u32(0x000000);
        let b = Color::from_u32(0xFF8040);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
    }

    #[test]
    fn test_serde_uses_normalized_hex() {
        let json = serde_json::to_string(&Color::from_u32(0xfc5c65)).unwrap();
        assert_eq!(json, "\"#FC5C65\"");
        let back: Color = serde_json::from_str("\"#fc5c65\"").unwrap();
        assert_eq!(back, Color::from_u32(0xFC5C65));
    }
}
