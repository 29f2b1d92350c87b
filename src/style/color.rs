//! RGB colors shared by every style facet.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const RED: Color = Color::rgb(0xFF, 0x00, 0x00);
    pub const GREEN: Color = Color::rgb(0x00, 0xFF, 0x00);
    pub const BLUE: Color = Color::rgb(0x00, 0x00, 0xFF);
    pub const TEAL: Color = Color::rgb(0x00, 0x80, 0x80);
    pub const YELLOW: Color = Color::rgb(0xFF, 0xFF, 0x00);
    pub const GREY_25_PERCENT: Color = Color::rgb(0xC0, 0xC0, 0xC0);
    pub const GREY_50_PERCENT: Color = Color::rgb(0x80, 0x80, 0x80);
    pub const LIGHT_TURQUOISE: Color = Color::rgb(0xCC, 0xFF, 0xFF);
    pub const LIGHT_GREEN: Color = Color::rgb(0xCC, 0xFF, 0xCC);

    /// Create a color from its components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Upper-case hex without a leading `#`, as OOXML expects (`"00FF00"`).
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Lower-case CSS form (`"#00ff00"`).
    pub fn to_css(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Components scaled to `0.0..=1.0` for PDF color operators.
    pub fn to_unit(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Parse `"#RRGGBB"` or `"RRGGBB"`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(Color::GREEN.to_hex(), "00FF00");
        assert_eq!(Color::TEAL.to_css(), "#008080");
        assert_eq!(Color::GREY_50_PERCENT.to_string(), "#808080");
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#CCFFCC"), Some(Color::LIGHT_GREEN));
        assert_eq!(Color::from_hex("ff0000"), Some(Color::RED));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("zzzzzz"), None);
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Color::BLUE).unwrap();
        assert_eq!(json, "\"#0000FF\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::BLUE);
    }
}
