//! Fonts used by one PDF render.
//!
//! Base-14 fonts are referenced by name with WinAnsi encoding. TrueType
//! programs are embedded as Type0 fonts with Identity-H encoding, so text
//! is written as 2-byte glyph ids and only the used glyphs get widths.

use super::metrics::StandardMetrics;
use crate::error::{Error, Result};
use crate::style::FontResource;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::sync::Arc;
use ttf_parser::{Face, GlyphId};

#[derive(Debug)]
enum Program {
    Standard(StandardMetrics),
    Embedded {
        data: Arc<Vec<u8>>,
        /// Glyph id to (advance in 1/1000 em, character)
        used: BTreeMap<u16, (u32, char)>,
    },
}

#[derive(Debug)]
pub struct PdfFont {
    name: String,
    resource: String,
    program: Program,
}

impl PdfFont {
    /// Resource key in page dictionaries (`F1`, `F2`, ...).
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self.program, Program::Embedded { .. })
    }

    /// Width of `text` in points at `size`.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        match &self.program {
            Program::Standard(metrics) => metrics.text_width(text, size),
            Program::Embedded { data, .. } => match Face::parse(data, 0) {
                Ok(face) => {
                    let units: u32 = text.chars().map(|c| glyph(&face, c).1).sum();
                    units as f32 * size / 1000.0
                }
                Err(_) => 0.0,
            },
        }
    }

    /// Bytes for a `Tj` string. Embedded fonts remember the glyphs used.
    pub fn encode(&mut self, text: &str) -> Vec<u8> {
        match &mut self.program {
            Program::Standard(_) => win_ansi(text),
            Program::Embedded { data, used } => {
                let face = match Face::parse(data, 0) {
                    Ok(face) => face,
                    Err(_) => return Vec::new(),
                };
                let mut bytes = Vec::with_capacity(text.len() * 2);
                for ch in text.chars() {
                    let (gid, width) = glyph(&face, ch);
                    used.entry(gid).or_insert((width, ch));
                    bytes.extend_from_slice(&gid.to_be_bytes());
                }
                bytes
            }
        }
    }
}

/// Glyph id and advance in 1/1000 em; unknown characters map to glyph 0.
fn glyph(face: &Face<'_>, ch: char) -> (u16, u32) {
    let gid = face.glyph_index(ch).unwrap_or(GlyphId(0));
    let advance = face.glyph_hor_advance(gid).unwrap_or(0) as u32;
    let per_em = face.units_per_em().max(1) as u32;
    (gid.0, advance * 1000 / per_em)
}

/// WinAnsi bytes; unmappable characters become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        let (bytes, _, unmappable) = encoding_rs::WINDOWS_1252.encode(ch.encode_utf8(&mut buf));
        if unmappable || bytes.len() != 1 {
            out.push(b'?');
        } else {
            out.push(bytes[0]);
        }
    }
    out
}

/// Font registry, keyed by font name.
#[derive(Debug, Default)]
pub struct FontBook {
    fonts: Vec<PdfFont>,
    by_name: HashMap<String, usize>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the font, registering it on first use.
    pub fn register(&mut self, resource: &FontResource) -> Result<usize> {
        if let Some(&index) = self.by_name.get(&resource.name) {
            return Ok(index);
        }
        let program = match &resource.data {
            Some(data) => {
                Face::parse(data, 0).map_err(|e| {
                    Error::Pdf(format!("Can't parse font {}: {}", resource.name, e))
                })?;
                Program::Embedded {
                    data: Arc::clone(data),
                    used: BTreeMap::new(),
                }
            }
            None => Program::Standard(StandardMetrics::for_font(&resource.name)),
        };
        let index = self.fonts.len();
        self.fonts.push(PdfFont {
            name: resource.name.clone(),
            resource: format!("F{}", index + 1),
            program,
        });
        self.by_name.insert(resource.name.clone(), index);
        Ok(index)
    }

    pub fn get(&self, index: usize) -> Option<&PdfFont> {
        self.fonts.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut PdfFont> {
        self.fonts.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Add font objects to the document and return the `/Font` resource
    /// dictionary.
    pub fn write_objects(&self, doc: &mut Document) -> Result<Dictionary> {
        let mut resources = Dictionary::new();
        for font in &self.fonts {
            let id = match &font.program {
                Program::Standard(_) => doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => Object::Name(font.name.as_bytes().to_vec()),
                    "Encoding" => "WinAnsiEncoding",
                }),
                Program::Embedded { data, used } => embed(doc, &font.name, data, used)?,
            };
            resources.set(font.resource.as_bytes().to_vec(), id);
        }
        Ok(resources)
    }
}

fn embed(
    doc: &mut Document,
    name: &str,
    data: &Arc<Vec<u8>>,
    used: &BTreeMap<u16, (u32, char)>,
) -> Result<lopdf::ObjectId> {
    let face = Face::parse(data, 0)
        .map_err(|e| Error::Pdf(format!("Can't parse font {}: {}", name, e)))?;
    let per_em = face.units_per_em().max(1) as f32;
    let scale = |v: i16| (v as f32 * 1000.0 / per_em).round() as i64;
    let base_font: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    let program = Stream::new(
        dictionary! {
            "Length1" => data.len() as i64,
            "Filter" => "FlateDecode",
        },
        deflate(data)?,
    );
    let program_id = doc.add_object(program);

    let bbox = face.global_bounding_box();
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => Object::Name(base_font.as_bytes().to_vec()),
        "Flags" => 32,
        "FontBBox" => vec![
            scale(bbox.x_min).into(),
            scale(bbox.y_min).into(),
            scale(bbox.x_max).into(),
            scale(bbox.y_max).into(),
        ],
        "ItalicAngle" => 0,
        "Ascent" => scale(face.ascender()),
        "Descent" => scale(face.descender()),
        "CapHeight" => scale(face.capital_height().unwrap_or(face.ascender())),
        "StemV" => 80,
        "FontFile2" => program_id,
    });

    let mut widths = Vec::with_capacity(used.len() * 2);
    for (&gid, &(width, _)) in used {
        widths.push(Object::Integer(gid as i64));
        widths.push(Object::Array(vec![Object::Integer(width as i64)]));
    }
    let descendant_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor_id,
        "W" => widths,
        "CIDToGIDMap" => "Identity",
    });

    let to_unicode_id = doc.add_object(Stream::new(
        Dictionary::new(),
        to_unicode_cmap(used).into_bytes(),
    ));

    Ok(doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(descendant_id)],
        "ToUnicode" => to_unicode_id,
    }))
}

/// Map used glyph ids back to Unicode for text extraction.
fn to_unicode_cmap(used: &BTreeMap<u16, (u32, char)>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n/CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );
    let entries: Vec<(u16, char)> = used.iter().map(|(&gid, &(_, ch))| (gid, ch)).collect();
    // At most 100 entries per bfchar block.
    for chunk in entries.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, ch) in chunk {
            let mut units = [0u16; 2];
            let hex: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{:04X}", u))
                .collect();
            cmap.push_str(&format!("<{:04X}> <{}>\n", gid, hex));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}

pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// PDF text string: literal when ASCII, UTF-16BE with a byte order mark
/// otherwise.
pub fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi("Aé€"), vec![b'A', 0xE9, 0x80]);
        assert_eq!(win_ansi("Ж"), vec![b'?']);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut book = FontBook::new();
        let a = book.register(&FontResource::standard("Helvetica")).unwrap();
        let b = book.register(&FontResource::standard("Helvetica")).unwrap();
        let c = book.register(&FontResource::standard("Times-Bold")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(book.get(c).unwrap().resource(), "F2");
        assert!(!book.get(a).unwrap().is_embedded());
    }

    #[test]
    fn test_invalid_program_is_rejected() {
        let mut book = FontBook::new();
        let resource = FontResource {
            name: "broken".to_string(),
            data: Some(Arc::new(vec![0, 1, 2, 3])),
        };
        assert!(matches!(book.register(&resource), Err(Error::Pdf(_))));
        assert!(book.is_empty());
    }

    #[test]
    fn test_text_string() {
        match text_string("Q1") {
            Object::String(bytes, StringFormat::Literal) => assert_eq!(bytes, b"Q1"),
            other => panic!("unexpected {:?}", other),
        }
        match text_string("é") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(bytes, vec![0xFE, 0xFF, 0x00, 0xE9])
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_to_unicode_cmap() {
        let mut used = BTreeMap::new();
        used.insert(36u16, (600u32, 'A'));
        let cmap = to_unicode_cmap(&used);
        assert!(cmap.contains("1 beginbfchar\n<0024> <0041>\n"));
    }
}
