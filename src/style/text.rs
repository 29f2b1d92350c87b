//! Text facet: font, size, emphasis and color.

use super::color::Color;
use serde::{Deserialize, Serialize};

/// Generic font family class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    #[default]
    Serif,
    SansSerif,
    Monospaced,
}

impl FontFamily {
    /// CSS generic family keyword.
    pub fn css_generic(&self) -> &'static str {
        match self {
            FontFamily::Serif => "serif",
            FontFamily::SansSerif => "sans-serif",
            FontFamily::Monospaced => "monospace",
        }
    }

    /// Token used in font file names (`arial_SansSerif_bold.ttf`).
    pub fn file_token(&self) -> &'static str {
        match self {
            FontFamily::Serif => "Serif",
            FontFamily::SansSerif => "SansSerif",
            FontFamily::Monospaced => "Monospaced",
        }
    }
}

/// Default font size in points.
pub const DEFAULT_FONT_SIZE: u16 = 10;

/// Text-level styling. Every attribute is optional so that two styles can be
/// merged attribute by attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<FontFamily>,

    /// Explicit font name (e.g. "Arial"); used by font lookup to pick a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_name_resource: Option<String>,

    /// Size in points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,

    /// Locale hint for glyph coverage checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Match bold/italic/underline against font file names as well.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_ttf_font_attributes: Option<bool>,
}

impl TextStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font_family(mut self, family: FontFamily) -> Self {
        self.font_family = Some(family);
        self
    }

    pub fn with_font_name_resource(mut self, name: impl Into<String>) -> Self {
        self.font_name_resource = Some(name.into());
        self
    }

    pub fn with_font_size(mut self, size: u16) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = Some(underline);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_ttf_font_attributes(mut self, enabled: bool) -> Self {
        self.use_ttf_font_attributes = Some(enabled);
        self
    }

    pub fn family(&self) -> FontFamily {
        self.font_family.unwrap_or_default()
    }

    pub fn size(&self) -> u16 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }

    pub fn is_bold(&self) -> bool {
        self.bold.unwrap_or(false)
    }

    pub fn is_italic(&self) -> bool {
        self.italic.unwrap_or(false)
    }

    pub fn is_underline(&self) -> bool {
        self.underline.unwrap_or(false)
    }

    pub fn text_color(&self) -> Color {
        self.color.unwrap_or(Color::BLACK)
    }

    /// Merge `later` over `self`: any attribute set in `later` wins.
    pub fn merge(&self, later: &TextStyle) -> TextStyle {
        TextStyle {
            font_family: later.font_family.or(self.font_family),
            font_name_resource: later
                .font_name_resource
                .clone()
                .or_else(|| self.font_name_resource.clone()),
            font_size: later.font_size.or(self.font_size),
            bold: later.bold.or(self.bold),
            italic: later.italic.or(self.italic),
            underline: later.underline.or(self.underline),
            color: later.color.or(self.color),
            locale: later.locale.clone().or_else(|| self.locale.clone()),
            use_ttf_font_attributes: later
                .use_ttf_font_attributes
                .or(self.use_ttf_font_attributes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let style = TextStyle::new();
        assert_eq!(style.family(), FontFamily::Serif);
        assert_eq!(style.size(), DEFAULT_FONT_SIZE);
        assert!(!style.is_bold());
        assert_eq!(style.text_color(), Color::BLACK);
    }

    #[test]
    fn test_merge_keeps_unset_attributes() {
        let base = TextStyle::new()
            .with_font_family(FontFamily::SansSerif)
            .with_bold(true)
            .with_font_size(14);
        let later = TextStyle::new().with_font_size(9).with_italic(true);

        let merged = base.merge(&later);
        assert_eq!(merged.font_family, Some(FontFamily::SansSerif));
        assert_eq!(merged.bold, Some(true));
        assert_eq!(merged.font_size, Some(9));
        assert_eq!(merged.italic, Some(true));
    }

    #[test]
    fn test_explicit_false_overrides() {
        let base = TextStyle::new().with_bold(true);
        let merged = base.merge(&TextStyle::new().with_bold(false));
        assert_eq!(merged.bold, Some(false));
    }
}
