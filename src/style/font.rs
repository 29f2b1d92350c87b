//! Font lookup.
//!
//! Formatters that embed fonts (PDF) ask a [`FontProvider`] for the font
//! matching a [`TextStyle`] and locale. Two providers ship with the crate:
//! [`StandardFonts`] maps families onto the PDF base-14 fonts, and
//! [`FontDirectory`] picks TrueType files from a directory.

use super::text::{FontFamily, TextStyle};
use crate::error::{Error, Result};
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A resolved font.
#[derive(Debug, Clone, PartialEq)]
pub struct FontResource {
    /// PostScript/base name (e.g. "Helvetica-Bold", "arial")
    pub name: String,

    /// TrueType program; `None` for built-in standard fonts
    pub data: Option<Arc<Vec<u8>>>,
}

impl FontResource {
    pub fn standard(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: None,
        }
    }

    pub fn is_embedded(&self) -> bool {
        self.data.is_some()
    }
}

/// Font lookup capability.
pub trait FontProvider: Send + Sync + fmt::Debug {
    /// Find a font for the style that can display the locale's alphabet.
    fn font_resource(&self, style: &TextStyle, locale: &str) -> Result<FontResource>;
}

/// Letters a font must display for the locale. Unknown locales check
/// only ASCII letters.
pub fn locale_alphabet(locale: &str) -> String {
    const ASCII: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let language = locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let extra = match language.as_str() {
        "de" => "äöüÄÖÜß",
        "fr" => "àâæçéèêëîïôœùûüÿÀÂÆÇÉÈÊËÎÏÔŒÙÛÜŸ",
        "es" => "áéíñóúüÁÉÍÑÓÚÜ¿¡",
        "it" => "àèéìíîòóùúÀÈÉÌÍÎÒÓÙÚ",
        "pt" => "ãõáâàçéêíóôúÃÕÁÂÀÇÉÊÍÓÔÚ",
        "ru" => {
            return "абвгдеёжзийклмнопрстуфхцчшщъыьэюяАБВГДЕЁЖЗИЙКЛМНОПРСТУФХЦЧШЩЪЫЬЭЮЯ".to_string()
        }
        "uk" => {
            return "абвгґдеєжзиіїйклмнопрстуфхцчшщьюяАБВГҐДЕЄЖЗИІЇЙКЛМНОПРСТУФХЦЧШЩЬЮЯ".to_string()
        }
        _ => "",
    };
    format!("{}{}", ASCII, extra)
}

/// The PDF base-14 text fonts. Their built-in encoding is WinAnsi, so a
/// locale is supported when its alphabet fits in windows-1252.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFonts;

impl StandardFonts {
    pub fn new() -> Self {
        Self
    }

    /// Base-14 name for a family and emphasis.
    pub fn base_name(family: FontFamily, bold: bool, italic: bool) -> &'static str {
        match (family, bold, italic) {
            (FontFamily::Serif, false, false) => "Times-Roman",
            (FontFamily::Serif, true, false) => "Times-Bold",
            (FontFamily::Serif, false, true) => "Times-Italic",
            (FontFamily::Serif, true, true) => "Times-BoldItalic",
            (FontFamily::SansSerif, false, false) => "Helvetica",
            (FontFamily::SansSerif, true, false) => "Helvetica-Bold",
            (FontFamily::SansSerif, false, true) => "Helvetica-Oblique",
            (FontFamily::SansSerif, true, true) => "Helvetica-BoldOblique",
            (FontFamily::Monospaced, false, false) => "Courier",
            (FontFamily::Monospaced, true, false) => "Courier-Bold",
            (FontFamily::Monospaced, false, true) => "Courier-Oblique",
            (FontFamily::Monospaced, true, true) => "Courier-BoldOblique",
        }
    }
}

impl FontProvider for StandardFonts {
    fn font_resource(&self, style: &TextStyle, locale: &str) -> Result<FontResource> {
        let name = Self::base_name(style.family(), style.is_bold(), style.is_italic());
        let mut buf = [0u8; 4];
        for ch in locale_alphabet(locale).chars() {
            let (_, _, unmappable) = encoding_rs::WINDOWS_1252.encode(ch.encode_utf8(&mut buf));
            if unmappable {
                return Err(Error::GlyphNotDisplayable {
                    glyph: ch,
                    font: name.to_string(),
                    locale: locale.to_string(),
                });
            }
        }
        Ok(FontResource::standard(name))
    }
}

/// One TrueType file found in a [`FontDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFile {
    pub path: PathBuf,
    /// Font name, the first `_`-separated token of the file stem
    pub name: String,
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl FontFile {
    /// Parse `<name>_<Family>[_attr...].ttf`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let is_ttf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ttf"));
        if !is_ttf {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let mut tokens = stem.split('_');
        let name = tokens.next().filter(|n| !n.is_empty())?.to_string();
        let family = match tokens.next()? {
            "Serif" => FontFamily::Serif,
            "SansSerif" => FontFamily::SansSerif,
            "Monospaced" => FontFamily::Monospaced,
            _ => return None,
        };
        let attrs: Vec<String> = tokens.map(|t| t.to_ascii_lowercase()).collect();
        let has = |attr: &str| attrs.iter().any(|a| a.contains(attr));

        Some(Self {
            path: path.to_path_buf(),
            name,
            family,
            bold: has("bold"),
            italic: has("italic"),
            underline: has("underline"),
        })
    }
}

/// TrueType fonts from a directory, matched by family and name.
pub struct FontDirectory {
    fonts: Vec<FontFile>,
    cache: Mutex<HashMap<PathBuf, Arc<Vec<u8>>>>,
}

impl FontDirectory {
    /// Scan a directory (non-recursively) for font files.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let mut fonts = Vec::new();
        for entry in fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if let Some(font) = FontFile::from_path(&path) {
                fonts.push(font);
            }
        }
        fonts.sort_by(|a, b| a.path.cmp(&b.path));
        debug!("Found {} font files in {}", fonts.len(), dir.as_ref().display());
        Ok(Self::from_files(fonts))
    }

    pub fn from_files(fonts: Vec<FontFile>) -> Self {
        Self {
            fonts,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn fonts(&self) -> &[FontFile] {
        &self.fonts
    }

    /// Best file for the style, without checking glyph coverage.
    pub fn select(&self, style: &TextStyle) -> Option<&FontFile> {
        let use_attrs = style.use_ttf_font_attributes.unwrap_or(false);
        let wanted = style
            .font_name_resource
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        self.fonts
            .iter()
            .filter(|f| f.family == style.family())
            .filter(|f| {
                !use_attrs
                    || (f.bold == style.is_bold()
                        && f.italic == style.is_italic()
                        && f.underline == style.is_underline())
            })
            .min_by_key(|f| levenshtein(&f.name.to_lowercase(), &wanted))
    }

    fn load(&self, path: &Path) -> Result<Arc<Vec<u8>>> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| Error::Other("font cache poisoned".to_string()))?;
        if let Some(data) = cache.get(path) {
            return Ok(Arc::clone(data));
        }
        let data = Arc::new(fs::read(path)?);
        cache.insert(path.to_path_buf(), Arc::clone(&data));
        Ok(data)
    }
}

impl fmt::Debug for FontDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontDirectory")
            .field("fonts", &self.fonts)
            .finish()
    }
}

impl FontProvider for FontDirectory {
    fn font_resource(&self, style: &TextStyle, locale: &str) -> Result<FontResource> {
        let file = self.select(style).ok_or_else(|| Error::FontNotFound {
            style: describe(style),
            locale: locale.to_string(),
        })?;
        let data = self.load(&file.path)?;
        let face = ttf_parser::Face::parse(data.as_slice(), 0)
            .map_err(|e| Error::Other(format!("Invalid font {}: {}", file.path.display(), e)))?;

        if let Some(glyph) = locale_alphabet(locale)
            .chars()
            .find(|&ch| face.glyph_index(ch).is_none())
        {
            return Err(Error::GlyphNotDisplayable {
                glyph,
                font: file.name.clone(),
                locale: locale.to_string(),
            });
        }

        debug!("Font {} selected for {}", file.name, describe(style));
        Ok(FontResource {
            name: file.name.clone(),
            data: Some(data),
        })
    }
}

fn describe(style: &TextStyle) -> String {
    format!(
        "family={:?} name={} bold={} italic={} underline={}",
        style.family(),
        style.font_name_resource.as_deref().unwrap_or("-"),
        style.is_bold(),
        style.is_italic(),
        style.is_underline()
    )
}

/// Edit distance between two strings, by characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> FontFile {
        FontFile::from_path(Path::new(name)).unwrap()
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("arial", "arial"), 0);
        assert_eq!(levenshtein("arial", "ariel"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn test_font_file_name_parsing() {
        let f = file("/fonts/arial_SansSerif_bold_italic.ttf");
        assert_eq!(f.name, "arial");
        assert_eq!(f.family, FontFamily::SansSerif);
        assert!(f.bold && f.italic && !f.underline);

        assert!(FontFile::from_path(Path::new("/fonts/readme.txt")).is_none());
        assert!(FontFile::from_path(Path::new("/fonts/arial_Fancy.ttf")).is_none());
    }

    #[test]
    fn test_select_by_family_and_name() {
        let dir = FontDirectory::from_files(vec![
            file("arial_SansSerif_(regular).ttf"),
            file("verdana_SansSerif_(regular).ttf"),
            file("times_Serif_(regular).ttf"),
        ]);

        let style = TextStyle::new()
            .with_font_family(FontFamily::SansSerif)
            .with_font_name_resource("Verdana");
        assert_eq!(dir.select(&style).unwrap().name, "verdana");

        let style = TextStyle::new().with_font_family(FontFamily::Monospaced);
        assert!(dir.select(&style).is_none());
    }

    #[test]
    fn test_select_with_attributes() {
        let dir = FontDirectory::from_files(vec![
            file("arial_SansSerif_regular.ttf"),
            file("arial_SansSerif_bold.ttf"),
        ]);
        let style = TextStyle::new()
            .with_font_family(FontFamily::SansSerif)
            .with_bold(true)
            .with_ttf_font_attributes(true);
        assert!(dir.select(&style).unwrap().bold);
    }

    #[test]
    fn test_missing_font_error() {
        let dir = FontDirectory::from_files(Vec::new());
        let err = dir.font_resource(&TextStyle::new(), "en").unwrap_err();
        assert!(matches!(err, Error::FontNotFound { .. }));
    }

    #[test]
    fn test_standard_fonts() {
        let fonts = StandardFonts::new();
        let style = TextStyle::new()
            .with_font_family(FontFamily::SansSerif)
            .with_bold(true);
        let font = fonts.font_resource(&style, "de").unwrap();
        assert_eq!(font.name, "Helvetica-Bold");
        assert!(!font.is_embedded());

        let err = fonts.font_resource(&style, "ru").unwrap_err();
        assert!(matches!(err, Error::GlyphNotDisplayable { .. }));
    }
}
