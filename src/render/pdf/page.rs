//! Page geometry and drawing operations.
//!
//! Positions are measured from the top-left corner of the page and turned
//! into PDF user space (origin bottom-left) when operations are emitted.

use crate::style::{BorderWeight, Color};
use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

/// A4 portrait, in points.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const MARGIN: f32 = 20.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

/// Space kept free above the bottom margin for footers.
pub const FOOTER_RESERVE: f32 = 30.0;

/// Line height as a multiple of font size.
pub const LINE_SPACING: f32 = 1.2;

#[derive(Debug)]
pub struct Page {
    operations: Vec<Operation>,
    cursor: f32,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
            cursor: MARGIN,
        }
    }

    /// Distance from the top edge to the next free position.
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    pub fn advance(&mut self, height: f32) {
        self.cursor += height;
    }

    pub fn is_blank(&self) -> bool {
        self.operations.is_empty() && self.cursor <= MARGIN
    }

    /// Height left above the footer reserve.
    pub fn remaining(&self) -> f32 {
        PAGE_HEIGHT - MARGIN - FOOTER_RESERVE - self.cursor
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn fill_rect(&mut self, x: f32, top: f32, width: f32, height: f32, color: Color) {
        let [r, g, b] = color.to_unit();
        self.push("q", vec![]);
        self.push("rg", vec![r.into(), g.into(), b.into()]);
        self.push(
            "re",
            vec![x.into(), (PAGE_HEIGHT - top - height).into(), width.into(), height.into()],
        );
        self.push("f", vec![]);
        self.push("Q", vec![]);
    }

    /// Straight line between two points given as (x, top).
    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), weight: BorderWeight, color: Color) {
        if !weight.is_visible() {
            return;
        }
        let [r, g, b] = color.to_unit();
        self.push("q", vec![]);
        self.push("w", vec![weight.stroke_width().into()]);
        self.push("RG", vec![r.into(), g.into(), b.into()]);
        let dash: Vec<Object> = match weight {
            BorderWeight::Dashed => vec![3.into(), 2.into()],
            BorderWeight::Dotted => vec![1.into(), 2.into()],
            _ => vec![],
        };
        if !dash.is_empty() {
            self.push("d", vec![dash.into(), 0.into()]);
        }
        let strokes: &[f32] = if weight == BorderWeight::Double {
            &[-0.75, 0.75]
        } else {
            &[0.0]
        };
        let vertical = (from.0 - to.0).abs() < f32::EPSILON;
        for offset in strokes {
            let (dx, dy) = if vertical { (*offset, 0.0) } else { (0.0, *offset) };
            self.push(
                "m",
                vec![(from.0 + dx).into(), (PAGE_HEIGHT - from.1 - dy).into()],
            );
            self.push(
                "l",
                vec![(to.0 + dx).into(), (PAGE_HEIGHT - to.1 - dy).into()],
            );
            self.push("S", vec![]);
        }
        self.push("Q", vec![]);
    }

    /// One line of text with its baseline at `baseline` from the top.
    /// `hex` writes the string in hexadecimal form (2-byte glyph ids).
    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        x: f32,
        baseline: f32,
        font: &str,
        size: f32,
        color: Color,
        bytes: Vec<u8>,
        hex: bool,
    ) {
        let [r, g, b] = color.to_unit();
        let format = if hex {
            StringFormat::Hexadecimal
        } else {
            StringFormat::Literal
        };
        self.push("BT", vec![]);
        self.push("Tf", vec![Object::Name(font.as_bytes().to_vec()), size.into()]);
        self.push("rg", vec![r.into(), g.into(), b.into()]);
        self.push("Td", vec![x.into(), (PAGE_HEIGHT - baseline).into()]);
        self.push("Tj", vec![Object::String(bytes, format)]);
        self.push("ET", vec![]);
    }

    pub fn into_content(self) -> Content {
        Content {
            operations: self.operations,
        }
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }
}

/// Greedy word wrap. Explicit newlines are kept; words wider than the
/// line are split by character.
pub fn wrap<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if measure(&candidate) <= max_width {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if measure(word) <= max_width {
                line = word.to_string();
                continue;
            }
            for ch in word.chars() {
                line.push(ch);
                if measure(&line) > max_width && line.chars().count() > 1 {
                    line.pop();
                    lines.push(std::mem::take(&mut line));
                    line.push(ch);
                }
            }
        }
        lines.push(line);
    }
    lines
}
