//! Leaf text items: titles, headings, paragraphs, footers and separators.

use super::kind::ItemKind;
use super::node::impl_node;
use crate::style::{BorderWeight, Style};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Document title, rendered once near the top.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
    #[serde(skip)]
    pub style: Option<Arc<Style>>,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    pub fn create() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// Section heading with a nesting depth.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Heading {
    pub text: String,
    pub depth: u8,
    #[serde(skip)]
    pub style: Option<Arc<Style>>,
}

impl Heading {
    pub fn new(text: impl Into<String>, depth: u8) -> Self {
        Self {
            text: text.into(),
            depth,
            style: None,
        }
    }

    pub fn create(depth: u8) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_depth(mut self, depth: u8) -> Self {
        self.depth = depth;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    #[serde(skip)]
    pub style: Option<Arc<Style>>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    pub fn create() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// Text repeated at the bottom of every page in paged formats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Footer {
    pub text: String,
    #[serde(skip)]
    pub style: Option<Arc<Style>>,
}

impl Footer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    pub fn create() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// Horizontal rule between blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Separator {
    #[serde(default = "default_separator_weight")]
    pub weight: BorderWeight,
    #[serde(skip)]
    pub style: Option<Arc<Style>>,
}

fn default_separator_weight() -> BorderWeight {
    BorderWeight::Thin
}

impl Default for Separator {
    fn default() -> Self {
        Self {
            weight: default_separator_weight(),
            style: None,
        }
    }
}

impl Separator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(weight: BorderWeight) -> Self {
        Self {
            weight,
            style: None,
        }
    }

    /// Effective line weight: a bottom border in the given style wins over
    /// the separator's own weight.
    pub fn effective_weight(&self, style: Option<&Style>) -> BorderWeight {
        style
            .and_then(|s| s.layout_facet())
            .and_then(|l| l.borders.bottom.weight)
            .unwrap_or(self.weight)
    }
}

impl_node!(Title, Title, ItemKind::Title);
impl_node!(Heading, Heading, ItemKind::Heading);
impl_node!(Paragraph, Paragraph, ItemKind::Paragraph);
impl_node!(Footer, Footer, ItemKind::Footer);
impl_node!(Separator, Separator, ItemKind::Separator);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{BorderStyle, Color, LayoutStyle};

    #[test]
    fn test_builders() {
        let heading = Heading::create(2).with_text("Intro");
        assert_eq!(heading.text, "Intro");
        assert_eq!(heading.depth, 2);

        let title = Title::create().with_text("Report");
        assert_eq!(title.text, "Report");
    }

    #[test]
    fn test_separator_weight() {
        let sep = Separator::new();
        assert_eq!(sep.effective_weight(None), BorderWeight::Thin);

        let style = Style::layout(
            LayoutStyle::new()
                .with_border_bottom(BorderStyle::new(Color::BLACK, BorderWeight::None)),
        );
        assert_eq!(sep.effective_weight(Some(&style)), BorderWeight::None);
    }
}
