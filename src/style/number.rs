//! Locale-aware number formatting for numeric-looking text.

use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::OnceLock;

fn numeric_regex() -> &'static Regex {
    static NUMERIC: OnceLock<Regex> = OnceLock::new();
    NUMERIC.get_or_init(|| Regex::new(r"^([+-]?)(\d+)(?:\.(\d+))?$").unwrap())
}

/// Decimal formatting rule, the equivalent of a `#,##0.###` pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    /// Thousands separator; `None` disables grouping
    pub grouping_separator: Option<char>,

    pub decimal_separator: char,

    /// Digits per group
    pub grouping_size: usize,

    pub min_fraction_digits: usize,

    pub max_fraction_digits: usize,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            grouping_separator: Some(','),
            decimal_separator: '.',
            grouping_size: 3,
            min_fraction_digits: 0,
            max_fraction_digits: 3,
        }
    }
}

impl NumberFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a pattern such as `#,##0.00` or `0.###`. Separators in the
    /// pattern are always `,` and `.`; localized symbols come from
    /// [`NumberFormat::with_symbols`] or [`NumberFormat::for_locale`].
    pub fn from_pattern(pattern: &str) -> Self {
        let (integer, fraction) = match pattern.split_once('.') {
            Some((i, f)) => (i, f),
            None => (pattern, ""),
        };

        let grouping_size = integer
            .rfind(',')
            .map(|pos| integer[pos + 1..].chars().filter(|c| matches!(c, '#' | '0')).count())
            .filter(|&n| n > 0);

        Self {
            grouping_separator: grouping_size.map(|_| ','),
            decimal_separator: '.',
            grouping_size: grouping_size.unwrap_or(3),
            min_fraction_digits: fraction.chars().filter(|&c| c == '0').count(),
            max_fraction_digits: fraction.chars().filter(|c| matches!(c, '#' | '0')).count(),
        }
    }

    /// Default pattern with the separators customary for a language tag.
    pub fn for_locale(tag: &str) -> Self {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        let base = Self::default();
        match language.as_str() {
            "de" | "es" | "it" | "pt" | "nl" => base.with_symbols(Some('.'), ','),
            "fr" => base.with_symbols(Some('\u{202f}'), ','),
            "ru" | "uk" => base.with_symbols(Some('\u{a0}'), ','),
            _ => base,
        }
    }

    pub fn with_symbols(mut self, grouping: Option<char>, decimal: char) -> Self {
        self.grouping_separator = grouping;
        self.decimal_separator = decimal;
        self
    }

    pub fn with_fraction_digits(mut self, min: usize, max: usize) -> Self {
        self.min_fraction_digits = min.min(max);
        self.max_fraction_digits = max;
        self
    }

    /// True when the text looks like a plain decimal number.
    pub fn is_numeric(text: &str) -> bool {
        numeric_regex().is_match(text)
    }

    /// Reformat numeric-looking text; anything else is returned unchanged.
    pub fn localize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let Some(caps) = numeric_regex().captures(text) else {
            return Cow::Borrowed(text);
        };
        let sign = caps.get(1).map_or("", |m| m.as_str());
        let integer = caps.get(2).map_or("0", |m| m.as_str());
        let fraction = caps.get(3).map_or("", |m| m.as_str());

        let (integer, fraction) = self.round(integer, fraction);
        let integer = integer.trim_start_matches('0');
        let integer = if integer.is_empty() { "0" } else { integer };

        let mut out = String::with_capacity(text.len() + text.len() / 3 + 2);
        if sign == "-" {
            out.push('-');
        }
        out.push_str(&self.group(integer));
        if !fraction.is_empty() {
            out.push(self.decimal_separator);
            out.push_str(&fraction);
        }
        Cow::Owned(out)
    }

    /// Round half-even to `max_fraction_digits`, then trim trailing zeros
    /// down to `min_fraction_digits`.
    fn round(&self, integer: &str, fraction: &str) -> (String, String) {
        let max = self.max_fraction_digits;
        let mut digits: Vec<u8> = integer.bytes().map(|b| b - b'0').collect();
        let kept = fraction.len().min(max);
        digits.extend(fraction[..kept].bytes().map(|b| b - b'0'));

        if fraction.len() > max {
            let rest = &fraction.as_bytes()[max..];
            let first = rest[0];
            let tail_nonzero = rest[1..].iter().any(|&b| b != b'0');
            let last_odd = digits.last().is_some_and(|d| d % 2 == 1);
            let round_up = first > b'5' || (first == b'5' && (tail_nonzero || last_odd));
            if round_up && !increment(&mut digits) {
                digits.insert(0, 1);
            }
        }

        let split = digits.len() - kept;
        let to_str = |ds: &[u8]| ds.iter().map(|d| char::from(b'0' + d)).collect::<String>();
        let int_part = to_str(&digits[..split]);
        let mut frac_part = to_str(&digits[split..]);

        while frac_part.len() > self.min_fraction_digits && frac_part.ends_with('0') {
            frac_part.pop();
        }
        while frac_part.len() < self.min_fraction_digits {
            frac_part.push('0');
        }
        (int_part, frac_part)
    }

    fn group(&self, integer: &str) -> String {
        let Some(separator) = self.grouping_separator else {
            return integer.to_string();
        };
        if self.grouping_size == 0 {
            warn!("Grouping size 0 with a grouping separator; grouping disabled");
            return integer.to_string();
        }
        let len = integer.len();
        let mut out = String::with_capacity(len + len / self.grouping_size);
        for (i, ch) in integer.chars().enumerate() {
            if i > 0 && (len - i) % self.grouping_size == 0 {
                out.push(separator);
            }
            out.push(ch);
        }
        out
    }
}

/// Add one to a little digit vector; returns false on overflow of the
/// leading digit.
fn increment(digits: &mut [u8]) -> bool {
    for d in digits.iter_mut().rev() {
        if *d == 9 {
            *d = 0;
        } else {
            *d += 1;
            return true;
        }
    }
    false
}
