//! Layout facet: borders, fill, alignment and sizing.

use super::color::Color;
use serde::{Deserialize, Serialize};

/// Line weight of a single border edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderWeight {
    #[default]
    None,
    Thin,
    Medium,
    Dashed,
    Dotted,
    Thick,
    Double,
    Hair,
}

impl BorderWeight {
    /// Stroke width in points, used by vector formats.
    pub fn stroke_width(&self) -> f32 {
        match self {
            BorderWeight::None => 0.0,
            BorderWeight::Hair => 0.25,
            BorderWeight::Thin | BorderWeight::Dotted | BorderWeight::Dashed => 0.5,
            BorderWeight::Medium | BorderWeight::Double => 1.0,
            BorderWeight::Thick => 2.0,
        }
    }

    pub fn is_visible(&self) -> bool {
        *self != BorderWeight::None
    }
}

/// Fill pattern of a cell or block background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPattern {
    #[default]
    NoFill,
    SolidForeground,
    FineDots,
    AltBars,
    SparseDots,
    ThickHorzBands,
    ThickVertBands,
    ThinHorzBands,
    ThinVertBands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorAlignment {
    #[default]
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertAlignment {
    Top,
    Center,
    #[default]
    Bottom,
    Justify,
}

/// One border edge. Color and weight merge independently: an unset part
/// keeps the earlier value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<BorderWeight>,
}

impl BorderStyle {
    pub fn new(color: Color, weight: BorderWeight) -> Self {
        Self {
            color: Some(color),
            weight: Some(weight),
        }
    }

    pub fn weight(&self) -> BorderWeight {
        self.weight.unwrap_or_default()
    }

    pub fn color(&self) -> Color {
        self.color.unwrap_or(Color::BLACK)
    }

    pub fn is_visible(&self) -> bool {
        self.weight().is_visible()
    }

    fn merge(&self, later: &BorderStyle) -> BorderStyle {
        BorderStyle {
            color: later.color.or(self.color),
            weight: later.weight.or(self.weight),
        }
    }
}

/// Four independent border edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Borders {
    pub top: BorderStyle,
    pub left: BorderStyle,
    pub right: BorderStyle,
    pub bottom: BorderStyle,
}

impl Borders {
    pub fn all(edge: BorderStyle) -> Self {
        Self {
            top: edge,
            left: edge,
            right: edge,
            bottom: edge,
        }
    }

    pub fn any_visible(&self) -> bool {
        self.edges().iter().any(|(_, e)| e.is_visible())
    }

    /// Edges paired with their names, in top/left/right/bottom order.
    pub fn edges(&self) -> [(&'static str, BorderStyle); 4] {
        [
            ("top", self.top),
            ("left", self.left),
            ("right", self.right),
            ("bottom", self.bottom),
        ]
    }

    pub fn merge(&self, later: &Borders) -> Borders {
        Borders {
            top: self.top.merge(&later.top),
            left: self.left.merge(&later.left),
            right: self.right.merge(&later.right),
            bottom: self.bottom.merge(&later.bottom),
        }
    }
}

/// Layout-level styling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutStyle {
    pub borders: Borders,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_foreground: Option<Color>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_background: Option<Color>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_pattern: Option<FillPattern>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_alignment: Option<HorAlignment>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_alignment: Option<VertAlignment>,

    /// Fit the column to its content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_width: Option<bool>,

    /// Fixed column width in characters; `0` means unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shrink_to_fit: Option<bool>,
}

impl LayoutStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the same edge on all four sides.
    pub fn with_border(mut self, border: BorderStyle) -> Self {
        self.borders = Borders::all(border);
        self
    }

    pub fn with_border_top(mut self, border: BorderStyle) -> Self {
        self.borders.top = border;
        self
    }

    pub fn with_border_left(mut self, border: BorderStyle) -> Self {
        self.borders.left = border;
        self
    }

    pub fn with_border_right(mut self, border: BorderStyle) -> Self {
        self.borders.right = border;
        self
    }

    pub fn with_border_bottom(mut self, border: BorderStyle) -> Self {
        self.borders.bottom = border;
        self
    }

    pub fn with_fill_foreground(mut self, color: Color) -> Self {
        self.fill_foreground = Some(color);
        self
    }

    pub fn with_fill_background(mut self, color: Color) -> Self {
        self.fill_background = Some(color);
        self
    }

    pub fn with_fill_pattern(mut self, pattern: FillPattern) -> Self {
        self.fill_pattern = Some(pattern);
        self
    }

    pub fn with_horizontal_alignment(mut self, alignment: HorAlignment) -> Self {
        self.horizontal_alignment = Some(alignment);
        self
    }

    pub fn with_vertical_alignment(mut self, alignment: VertAlignment) -> Self {
        self.vertical_alignment = Some(alignment);
        self
    }

    pub fn with_auto_width(mut self, auto_width: bool) -> Self {
        self.auto_width = Some(auto_width);
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_shrink_to_fit(mut self, shrink: bool) -> Self {
        self.shrink_to_fit = Some(shrink);
        self
    }

    pub fn pattern(&self) -> FillPattern {
        self.fill_pattern.unwrap_or_default()
    }

    pub fn h_align(&self) -> HorAlignment {
        self.horizontal_alignment.unwrap_or_default()
    }

    pub fn v_align(&self) -> VertAlignment {
        self.vertical_alignment.unwrap_or_default()
    }

    pub fn is_auto_width(&self) -> bool {
        self.auto_width.unwrap_or(false)
    }

    pub fn column_width(&self) -> u32 {
        self.width.unwrap_or(0)
    }

    /// True when the style asks for a column width adjustment.
    pub fn needs_width_adjust(&self) -> bool {
        self.is_auto_width() || self.column_width() > 0
    }

    /// Effective fill color: the foreground when a pattern is painted.
    pub fn fill_color(&self) -> Option<Color> {
        match self.pattern() {
            FillPattern::NoFill => None,
            _ => self.fill_foreground.or(self.fill_background),
        }
    }

    /// Merge `later` over `self`: any attribute set in `later` wins.
    pub fn merge(&self, later: &LayoutStyle) -> LayoutStyle {
        LayoutStyle {
            borders: self.borders.merge(&later.borders),
            fill_foreground: later.fill_foreground.or(self.fill_foreground),
            fill_background: later.fill_background.or(self.fill_background),
            fill_pattern: later.fill_pattern.or(self.fill_pattern),
            horizontal_alignment: later.horizontal_alignment.or(self.horizontal_alignment),
            vertical_alignment: later.vertical_alignment.or(self.vertical_alignment),
            auto_width: later.auto_width.or(self.auto_width),
            width: later.width.or(self.width),
            shrink_to_fit: later.shrink_to_fit.or(self.shrink_to_fit),
        }
    }
}
