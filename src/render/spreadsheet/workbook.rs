//! In-memory workbook built during traversal and serialized at finalize.

use crate::style::{LayoutStyle, Style, TextStyle};
use log::warn;
use std::collections::BTreeMap;

/// Longest sheet name spreadsheet applications accept.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Fallback sheet name for blank input.
pub const DEFAULT_SHEET_NAME: &str = "Sheet";

/// Replace characters sheet names can't hold and cap the length.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { ' ' } else { c })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    if cleaned.trim().is_empty() {
        DEFAULT_SHEET_NAME.to_string()
    } else {
        cleaned
    }
}

/// Fully resolved formatting of one cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellFormat {
    pub text: TextStyle,
    pub layout: LayoutStyle,
}

impl CellFormat {
    pub fn from_style(style: &Style) -> Self {
        let (text, layout) = style.split();
        Self { text, layout }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub column: usize,
    pub text: String,
    /// Index into [`Workbook::formats`]
    pub format: Option<usize>,
}

impl Cell {
    pub fn new(column: usize, text: impl Into<String>, format: Option<usize>) -> Self {
        Self {
            column,
            text: text.into(),
            format,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Cell>>,
    column_widths: BTreeMap<usize, f64>,
}

impl Sheet {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn push_row(&mut self, cells: Vec<Cell>) {
        self.rows.push(cells);
    }

    /// Width in character units, keyed by 0-based column.
    pub fn column_widths(&self) -> &BTreeMap<usize, f64> {
        &self.column_widths
    }

    pub fn set_column_width(&mut self, column: usize, width: f64) {
        self.column_widths.insert(column, width);
    }
}

#[derive(Debug, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    formats: Vec<CellFormat>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet with a sanitized, unique name and return its index.
    pub fn add_sheet(&mut self, name: &str) -> usize {
        let base = sanitize_sheet_name(name);
        let mut unique = base.clone();
        let mut n = 2;
        while self.has_sheet(&unique) {
            let suffix = format!(" ({})", n);
            let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
            unique = base.chars().take(keep).collect::<String>() + &suffix;
            n += 1;
        }
        if unique != name {
            warn!("Sheet name {:?} stored as {:?}", name, unique);
        }
        self.sheets.push(Sheet {
            name: unique,
            ..Sheet::default()
        });
        self.sheets.len() - 1
    }

    fn has_sheet(&self, name: &str) -> bool {
        self.sheets
            .iter()
            .any(|s| s.name.to_lowercase() == name.to_lowercase())
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    pub fn formats(&self) -> &[CellFormat] {
        &self.formats
    }

    /// Index of an equal format, registering it when new.
    pub fn format_index(&mut self, style: &Style) -> usize {
        let format = CellFormat::from_style(style);
        match self.formats.iter().position(|f| *f == format) {
            Some(i) => i,
            None => {
                self.formats.push(format);
                self.formats.len() - 1
            }
        }
    }
}

/// Spreadsheet column letters: 0 is `A`, 26 is `AA`.
pub fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("Q1/Q2: [draft]"), "Q1 Q2   draft ");
        assert_eq!(sanitize_sheet_name("   "), DEFAULT_SHEET_NAME);
        assert_eq!(sanitize_sheet_name(&"x".repeat(40)).len(), MAX_SHEET_NAME_LEN);
    }

    #[test]
    fn test_duplicate_sheet_names() {
        let mut book = Workbook::new();
        book.add_sheet("Data");
        book.add_sheet("data");
        book.add_sheet("Data");
        let names: Vec<&str> = book.sheets().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Data", "data (2)", "Data (3)"]);
    }

    #[test]
    fn test_long_duplicate_keeps_limit() {
        let mut book = Workbook::new();
        let long = "y".repeat(31);
        book.add_sheet(&long);
        book.add_sheet(&long);
        let second = book.sheets()[1].name();
        assert_eq!(second.chars().count(), MAX_SHEET_NAME_LEN);
        assert!(second.ends_with(" (2)"));
    }

    #[test]
    fn test_format_dedup() {
        let mut book = Workbook::new();
        let bold = Style::text(TextStyle::new().with_bold(true));
        let a = book.format_index(&bold);
        let b = book.format_index(&bold.clone());
        let c = book.format_index(&Style::text(TextStyle::new().with_italic(true)));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(book.formats().len(), 2);
    }

    #[test]
    fn test_column_name() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }
}
