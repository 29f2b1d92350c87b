//! Formatter configuration.

use crate::error::{Error, Result};
use crate::model::{ItemKind, TableRow};
use crate::style::{
    BorderStyle, BorderWeight, Color, FillPattern, FontFamily, HorAlignment, LayoutStyle,
    NumberFormat, Style, StyleCondition, TextStyle, VertAlignment,
};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

/// Quote character for delimited text.
pub const CSV_QUOTE: char = '"';

/// Line terminator for delimited text.
pub const CSV_LINE_TERMINATOR: &str = "\n";

/// Configuration shared by every formatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterContext {
    /// Output character encoding label (WHATWG names, e.g. "UTF-8", "windows-1251")
    pub encoding: String,

    /// Language tag used for glyph checks and default styles
    pub locale: String,

    /// Offset from UTC in seconds
    pub time_zone_offset_seconds: i32,

    /// Rule for numeric-looking text
    pub number_format: NumberFormat,

    /// Field delimiter for delimited text
    pub delimiter: char,
}

impl Default for FormatterContext {
    fn default() -> Self {
        Self {
            encoding: "UTF-8".to_string(),
            locale: "en".to_string(),
            time_zone_offset_seconds: 0,
            number_format: NumberFormat::default(),
            delimiter: ';',
        }
    }
}

impl FormatterContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_time_zone_offset(mut self, seconds: i32) -> Self {
        self.time_zone_offset_seconds = seconds;
        self
    }

    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = format;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Resolve the encoding label.
    pub fn output_encoding(&self) -> Result<&'static Encoding> {
        let encoding = Encoding::for_label(self.encoding.trim().as_bytes())
            .ok_or_else(|| Error::Encoding(format!("Unknown encoding: {}", self.encoding)))?;
        if encoding == encoding_rs::REPLACEMENT {
            return Err(Error::Encoding(format!(
                "Encoding {} can't be used for output",
                self.encoding
            )));
        }
        Ok(encoding)
    }

    /// Configured time zone; out-of-range offsets fall back to UTC.
    pub fn time_zone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.time_zone_offset_seconds).unwrap_or_else(|| Utc.fix())
    }

    /// Timestamp in the configured zone, e.g. `2024-03-01 14:05:00 +03:00`.
    pub fn formatted_zone_date_time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.time_zone())
            .format("%Y-%m-%d %H:%M:%S %:z")
            .to_string()
    }

    /// Header cells: bold sans-serif on a grey fill with double borders.
    pub fn header_cell_style(&self) -> Style {
        Style::layout_text(
            TextStyle::new()
                .with_font_family(FontFamily::SansSerif)
                .with_font_size(12)
                .with_bold(true)
                .with_locale(self.locale.clone()),
            LayoutStyle::new()
                .with_horizontal_alignment(HorAlignment::Left)
                .with_vertical_alignment(VertAlignment::Center)
                .with_fill_foreground(Color::GREY_25_PERCENT)
                .with_fill_pattern(FillPattern::SolidForeground)
                .with_border(BorderStyle::new(Color::GREY_50_PERCENT, BorderWeight::Double))
                .with_auto_width(true),
        )
        .with_condition(StyleCondition::of_kind(ItemKind::TableHeaderCell))
    }

    /// Even rows: light green fill with thin borders.
    pub fn row_style_interlinear(&self) -> Style {
        Style::layout_text(
            TextStyle::new()
                .with_font_family(FontFamily::Serif)
                .with_font_size(10)
                .with_locale(self.locale.clone()),
            LayoutStyle::new()
                .with_fill_foreground(Color::LIGHT_GREEN)
                .with_fill_pattern(FillPattern::SolidForeground)
                .with_border(BorderStyle::new(Color::GREY_50_PERCENT, BorderWeight::Thin)),
        )
        .with_condition(StyleCondition::when::<TableRow, _>(|row| row.row_index() % 2 == 0))
    }

    /// Any row: thin borders, no fill.
    pub fn row_style_normal(&self) -> Style {
        Style::layout_text(
            TextStyle::new()
                .with_font_family(FontFamily::Serif)
                .with_font_size(10)
                .with_locale(self.locale.clone()),
            LayoutStyle::new()
                .with_border(BorderStyle::new(Color::GREY_50_PERCENT, BorderWeight::Thin)),
        )
        .with_condition(StyleCondition::of_kind(ItemKind::TableRow))
    }

    pub fn footer_style(&self) -> Style {
        Style::text(
            TextStyle::new()
                .with_font_family(FontFamily::Serif)
                .with_font_size(8)
                .with_italic(true)
                .with_locale(self.locale.clone()),
        )
        .with_condition(StyleCondition::of_kind(ItemKind::Footer))
    }

    /// The four default styles in precedence order.
    pub fn default_styles(&self) -> Vec<Style> {
        vec![
            self.header_cell_style(),
            self.row_style_interlinear(),
            self.row_style_normal(),
            self.footer_style(),
        ]
    }
}
