use std::collections::BTreeMap;

use crate::error::{RacunError, Result};
use crate::pdf::objects::{ObjId, PdfObject};

/// A TrueType font face embedded as a Type0/CIDFontType2 composite font
/// with Identity-H encoding, so any character the face covers can be drawn.
pub struct TrueTypeFont {
    pub(crate) postscript_name: String,
    pub(crate) font_data: Vec<u8>,
    units_per_em: u16,
    ascent: i16,
    descent: i16,
    bbox: [i16; 4],
    cap_height: i16,
    italic_angle: f64,
    flags: u32,
    stem_v: i16,
    /// Unicode codepoint -> glyph id.
    cmap: BTreeMap<u32, u16>,
    /// Advance width per glyph id, in font units.
    advances: Vec<u16>,
    /// Glyphs drawn so far; only these go into /W and the ToUnicode map.
    used: BTreeMap<u16, char>,
}

impl TrueTypeFont {
    /// Parse raw .ttf bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| RacunError::Font(format!("failed to parse font face: {e}")))?;

        let units_per_em = face.units_per_em();
        let ascent = face.ascender();
        let bbox = face.global_bounding_box();

        let mut cmap = BTreeMap::new();
        let subtables = face
            .tables()
            .cmap
            .ok_or_else(|| RacunError::Font("font has no cmap table".to_string()))?
            .subtables;
        for subtable in subtables {
            if !subtable.is_unicode() {
                continue;
            }
            subtable.codepoints(|cp| {
                if let Some(gid) = subtable.glyph_index(cp) {
                    cmap.entry(cp).or_insert(gid.0);
                }
            });
        }
        if cmap.is_empty() {
            return Err(RacunError::Font("font has no unicode mappings".to_string()));
        }

        let advances = (0..face.number_of_glyphs())
            .map(|gid| face.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0))
            .collect();

        let postscript_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME && n.is_unicode())
            .and_then(|n| n.to_string())
            .map(|n| n.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '-').collect::<String>())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "EmbeddedFont".to_string());

        // Nonsymbolic, plus FixedPitch / Italic where the face says so.
        let mut flags = 32;
        if face.is_monospaced() {
            flags |= 1;
        }
        if face.is_italic() {
            flags |= 64;
        }
        let weight = face.weight().to_number() as f64 / 1000.0;
        let descent = face.descender();
        let cap_height = face.capital_height().unwrap_or(ascent);
        let italic_angle = face.italic_angle() as f64;

        Ok(TrueTypeFont {
            postscript_name,
            units_per_em,
            ascent,
            descent,
            bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
            cap_height,
            italic_angle,
            flags,
            stem_v: (10.0 + 220.0 * weight * weight) as i16,
            cmap,
            advances,
            used: BTreeMap::new(),
            font_data: data,
        })
    }

    fn glyph(&self, ch: char) -> u16 {
        self.cmap.get(&(ch as u32)).copied().unwrap_or(0)
    }

    /// Advance of a glyph in 1/1000 text space units.
    fn glyph_width(&self, gid: u16) -> i64 {
        let raw = self.advances.get(gid as usize).copied().unwrap_or(0);
        raw as i64 * 1000 / self.units_per_em as i64
    }

    fn scale(&self, value: i16) -> i64 {
        value as i64 * 1000 / self.units_per_em as i64
    }

    /// Text width in points.
    pub fn measure(&self, text: &str, font_size: f64) -> f64 {
        let total: i64 = text.chars().map(|ch| self.glyph_width(self.glyph(ch))).sum();
        total as f64 * font_size / 1000.0
    }

    pub fn line_height(&self, font_size: f64) -> f64 {
        (self.ascent as f64 - self.descent as f64) / self.units_per_em as f64 * font_size
    }

    /// Hex string of glyph ids for a `Tj` operator, e.g. `<0048006C>`.
    /// Records every glyph as used.
    pub fn encode_hex(&mut self, text: &str) -> String {
        let mut hex = String::with_capacity(text.len() * 4 + 2);
        hex.push('<');
        for ch in text.chars() {
            let gid = self.glyph(ch);
            self.used.entry(gid).or_insert(ch);
            hex.push_str(&format!("{gid:04X}"));
        }
        hex.push('>');
        hex
    }

    /// `/W` array covering used glyphs, grouped into consecutive runs.
    pub fn width_array(&self) -> Vec<PdfObject> {
        let mut result = Vec::new();
        let mut run: Vec<PdfObject> = Vec::new();
        let mut run_start = 0u16;
        let mut prev: Option<u16> = None;

        for &gid in self.used.keys() {
            if prev.is_some_and(|p| p + 1 != gid) {
                result.push(PdfObject::Integer(run_start as i64));
                result.push(PdfObject::Array(std::mem::take(&mut run)));
            }
            if run.is_empty() {
                run_start = gid;
            }
            run.push(PdfObject::Integer(self.glyph_width(gid)));
            prev = Some(gid);
        }
        if !run.is_empty() {
            result.push(PdfObject::Integer(run_start as i64));
            result.push(PdfObject::Array(run));
        }
        result
    }

    /// ToUnicode CMap so text in the PDF stays searchable.
    pub fn to_unicode_cmap(&self) -> Vec<u8> {
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
        );
        let mappings: Vec<(u16, char)> = self.used.iter().map(|(&g, &c)| (g, c)).collect();
        // At most 100 entries per bfchar section.
        for chunk in mappings.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for &(gid, ch) in chunk {
                let mut units = [0u16; 2];
                let utf16: String = ch
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{u:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{utf16}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }
        cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
        cmap.into_bytes()
    }

    pub fn descriptor_dict(&self, font_file: ObjId) -> PdfObject {
        PdfObject::dict(vec![
            ("Type", PdfObject::name("FontDescriptor")),
            ("FontName", PdfObject::name(&self.postscript_name)),
            ("Flags", PdfObject::Integer(self.flags as i64)),
            (
                "FontBBox",
                PdfObject::array(self.bbox.iter().map(|&v| PdfObject::Integer(self.scale(v))).collect()),
            ),
            ("ItalicAngle", PdfObject::Real(self.italic_angle)),
            ("Ascent", PdfObject::Integer(self.scale(self.ascent))),
            ("Descent", PdfObject::Integer(self.scale(self.descent))),
            ("CapHeight", PdfObject::Integer(self.scale(self.cap_height))),
            ("StemV", PdfObject::Integer(self.stem_v as i64)),
            ("FontFile2", PdfObject::Reference(font_file)),
        ])
    }

    pub fn cid_font_dict(&self, descriptor: ObjId) -> PdfObject {
        PdfObject::dict(vec![
            ("Type", PdfObject::name("Font")),
            ("Subtype", PdfObject::name("CIDFontType2")),
            ("BaseFont", PdfObject::name(&self.postscript_name)),
            (
                "CIDSystemInfo",
                PdfObject::dict(vec![
                    ("Registry", PdfObject::LiteralString(b"Adobe".to_vec())),
                    ("Ordering", PdfObject::LiteralString(b"Identity".to_vec())),
                    ("Supplement", PdfObject::Integer(0)),
                ]),
            ),
            ("FontDescriptor", PdfObject::Reference(descriptor)),
            ("DW", PdfObject::Integer(self.glyph_width(0))),
            ("W", PdfObject::Array(self.width_array())),
            ("CIDToGIDMap", PdfObject::name("Identity")),
        ])
    }

    pub fn type0_dict(&self, descendant: ObjId, to_unicode: ObjId) -> PdfObject {
        PdfObject::dict(vec![
            ("Type", PdfObject::name("Font")),
            ("Subtype", PdfObject::name("Type0")),
            ("BaseFont", PdfObject::name(&self.postscript_name)),
            ("Encoding", PdfObject::name("Identity-H")),
            ("DescendantFonts", PdfObject::array(vec![PdfObject::Reference(descendant)])),
            ("ToUnicode", PdfObject::Reference(to_unicode)),
        ])
    }
}
