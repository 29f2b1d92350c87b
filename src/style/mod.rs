//! Style model and style resolution.
//!
//! A [`Style`] carries one or both facets, text ([`TextStyle`]) and
//! layout ([`LayoutStyle`]), plus an optional [`StyleCondition`] deciding
//! which document items it applies to. Styles are registered on a
//! [`StyleService`], which picks the first matching one for each item.

mod color;
mod condition;
pub mod font;
mod layout;
mod number;
mod service;
mod text;

pub use color::Color;
pub use condition::{Predicate, StyleCondition};
pub use font::{FontDirectory, FontProvider, FontResource, StandardFonts};
pub use layout::{
    BorderStyle, BorderWeight, Borders, FillPattern, HorAlignment, LayoutStyle, VertAlignment,
};
pub use number::NumberFormat;
pub use service::StyleService;
pub use text::{FontFamily, TextStyle, DEFAULT_FONT_SIZE};

use serde::{Deserialize, Serialize};

/// Text and layout facets held together. Decomposes losslessly with
/// [`LayoutTextStyle::into_parts`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutTextStyle {
    pub text: TextStyle,
    pub layout: LayoutStyle,
}

impl LayoutTextStyle {
    pub fn new(text: TextStyle, layout: LayoutStyle) -> Self {
        Self { text, layout }
    }

    pub fn into_parts(self) -> (TextStyle, LayoutStyle) {
        (self.text, self.layout)
    }
}

/// The facets a style carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Facets {
    Text(TextStyle),
    Layout(LayoutStyle),
    LayoutText(LayoutTextStyle),
}

/// A style: facets plus an optional applicability condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    #[serde(flatten)]
    pub facets: Facets,

    #[serde(skip)]
    pub condition: Option<StyleCondition>,
}

impl Style {
    pub fn text(text: TextStyle) -> Self {
        Self::from_facets(Facets::Text(text))
    }

    pub fn layout(layout: LayoutStyle) -> Self {
        Self::from_facets(Facets::Layout(layout))
    }

    pub fn layout_text(text: TextStyle, layout: LayoutStyle) -> Self {
        Self::from_facets(Facets::LayoutText(LayoutTextStyle::new(text, layout)))
    }

    pub fn from_facets(facets: Facets) -> Self {
        Self {
            facets,
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: StyleCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Text facet, whether standalone or part of a combined style.
    pub fn text_facet(&self) -> Option<&TextStyle> {
        match &self.facets {
            Facets::Text(t) => Some(t),
            Facets::LayoutText(lt) => Some(&lt.text),
            Facets::Layout(_) => None,
        }
    }

    /// Layout facet, whether standalone or part of a combined style.
    pub fn layout_facet(&self) -> Option<&LayoutStyle> {
        match &self.facets {
            Facets::Layout(l) => Some(l),
            Facets::LayoutText(lt) => Some(&lt.layout),
            Facets::Text(_) => None,
        }
    }

    /// Both facets, with defaults for a missing one.
    pub fn split(&self) -> (TextStyle, LayoutStyle) {
        (
            self.text_facet().cloned().unwrap_or_default(),
            self.layout_facet().cloned().unwrap_or_default(),
        )
    }

    /// Merge two styles facet by facet; attributes set in `later` win.
    /// The result keeps the condition of `later`.
    pub fn join(earlier: &Style, later: &Style) -> Style {
        let text = merge_facet(earlier.text_facet(), later.text_facet(), TextStyle::merge);
        let layout = merge_facet(
            earlier.layout_facet(),
            later.layout_facet(),
            LayoutStyle::merge,
        );

        let facets = match (text, layout) {
            (Some(t), Some(l)) => Facets::LayoutText(LayoutTextStyle::new(t, l)),
            (Some(t), None) => Facets::Text(t),
            (None, Some(l)) => Facets::Layout(l),
            // Every style has at least one facet.
            (None, None) => Facets::Text(TextStyle::default()),
        };

        Style {
            facets,
            condition: later.condition.clone(),
        }
    }
}

fn merge_facet<T: Clone>(
    earlier: Option<&T>,
    later: Option<&T>,
    merge: fn(&T, &T) -> T,
) -> Option<T> {
    match (earlier, later) {
        (Some(a), Some(b)) => Some(merge(a, b)),
        (Some(a), None) => Some(a.clone()),
        (None, Some(b)) => Some(b.clone()),
        (None, None) => None,
    }
}

impl From<TextStyle> for Style {
    fn from(text: TextStyle) -> Self {
        Style::text(text)
    }
}

impl From<LayoutStyle> for Style {
    fn from(layout: LayoutStyle) -> Self {
        Style::layout(layout)
    }
}

impl From<LayoutTextStyle> for Style {
    fn from(style: LayoutTextStyle) -> Self {
        Style::from_facets(Facets::LayoutText(style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemKind;

    #[test]
    fn test_layout_text_decomposes() {
        let text = TextStyle::new().with_bold(true);
        let layout = LayoutStyle::new().with_auto_width(true);
        let style = Style::layout_text(text.clone(), layout.clone());

        assert_eq!(style.text_facet(), Some(&text));
        assert_eq!(style.layout_facet(), Some(&layout));
        assert_eq!(style.split(), (text, layout));
    }

    #[test]
    fn test_join_combines_facets() {
        let a = Style::text(TextStyle::new().with_font_size(12).with_bold(true));
        let b = Style::layout(LayoutStyle::new().with_fill_foreground(Color::RED));

        let joined = Style::join(&a, &b);
        assert!(matches!(joined.facets, Facets::LayoutText(_)));
        assert_eq!(joined.text_facet().unwrap().font_size, Some(12));
        assert_eq!(
            joined.layout_facet().unwrap().fill_foreground,
            Some(Color::RED)
        );
    }

    #[test]
    fn test_join_later_wins_per_attribute() {
        let a = Style::text(TextStyle::new().with_font_size(12).with_bold(true));
        let b = Style::text(TextStyle::new().with_font_size(8))
            .with_condition(StyleCondition::of_kind(ItemKind::Footer));

        let joined = Style::join(&a, &b);
        let text = joined.text_facet().unwrap();
        assert_eq!(text.font_size, Some(8));
        assert_eq!(text.bold, Some(true));
        assert_eq!(
            joined.condition.as_ref().map(|c| c.declared_kind()),
            Some(ItemKind::Footer)
        );
    }

    #[test]
    fn test_style_json() {
        let json = r#"{"kind":"layout_text","text":{"bold":true},"layout":{"auto_width":true}}"#;
        let style: Style = serde_json::from_str(json).unwrap();
        assert!(style.condition.is_none());
        assert_eq!(style.text_facet().unwrap().bold, Some(true));
        assert!(style.layout_facet().unwrap().is_auto_width());
    }
}
