use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::pdf::objects::{ObjId, PdfObject};

/// Serializes PDF objects to any `Write` target while recording byte
/// offsets for the cross-reference table.
pub struct PdfWriter<W: Write> {
    writer: W,
    offset: usize,
    xref: BTreeMap<u32, usize>,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(writer: W) -> Self {
        PdfWriter {
            writer,
            offset: 0,
            xref: BTreeMap::new(),
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)?;
        self.offset += data.len();
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.write_bytes(s.as_bytes())
    }

    /// PDF 1.7 header followed by a binary marker comment.
    pub fn write_header(&mut self) -> io::Result<()> {
        self.write_str("%PDF-1.7\n")?;
        self.write_bytes(b"%\xe2\xe3\xcf\xd3\n")
    }

    /// Write an indirect object and remember where it starts.
    pub fn write_object(&mut self, id: ObjId, obj: &PdfObject) -> io::Result<()> {
        self.xref.insert(id.0, self.offset);
        self.write_str(&format!("{} {} obj\n", id.0, id.1))?;
        self.write_value(obj)?;
        self.write_str("\nendobj\n")
    }

    fn write_value(&mut self, obj: &PdfObject) -> io::Result<()> {
        match obj {
            PdfObject::Integer(n) => self.write_str(&n.to_string()),
            PdfObject::Real(f) => self.write_str(&format_real(*f)),
            PdfObject::Name(name) => {
                self.write_str("/")?;
                self.write_str(name)
            }
            PdfObject::LiteralString(bytes) => {
                self.write_str("(")?;
                self.write_bytes(&escape_pdf_bytes(bytes))?;
                self.write_str(")")
            }
            PdfObject::TextString(s) => {
                if s.is_ascii() {
                    self.write_str("(")?;
                    self.write_bytes(&escape_pdf_bytes(s.as_bytes()))?;
                    self.write_str(")")
                } else {
                    let mut hex = String::from("<FEFF");
                    for unit in s.encode_utf16() {
                        hex.push_str(&format!("{unit:04X}"));
                    }
                    hex.push('>');
                    self.write_str(&hex)
                }
            }
            PdfObject::Array(items) => {
                self.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.write_str(" ")?;
                    }
                    self.write_value(item)?;
                }
                self.write_str("]")
            }
            PdfObject::Dictionary(entries) => {
                self.write_str("<<")?;
                self.write_entries(entries)?;
                self.write_str(" >>")
            }
            PdfObject::Stream { dict, data } => {
                self.write_str("<<")?;
                self.write_entries(dict)?;
                self.write_str(&format!(" /Length {} >>\nstream\n", data.len()))?;
                self.write_bytes(data)?;
                self.write_str("\nendstream")
            }
            PdfObject::Reference(id) => self.write_str(&format!("{} {} R", id.0, id.1)),
        }
    }

    fn write_entries(&mut self, entries: &[(String, PdfObject)]) -> io::Result<()> {
        for (key, val) in entries {
            self.write_str(" /")?;
            self.write_str(key)?;
            self.write_str(" ")?;
            self.write_value(val)?;
        }
        Ok(())
    }

    /// Write the xref table, trailer, startxref and `%%EOF`.
    /// Object numbers never written become free entries.
    pub fn write_xref_and_trailer(&mut self, root: ObjId, info: Option<ObjId>) -> io::Result<()> {
        let xref_offset = self.offset;
        let size = self.xref.keys().next_back().map_or(0, |&n| n) + 1;

        self.write_str(&format!("xref\n0 {size}\n"))?;
        // Each entry is exactly 20 bytes including the CRLF.
        self.write_bytes(b"0000000000 65535 f\r\n")?;
        for obj_num in 1..size {
            let entry = match self.xref.get(&obj_num) {
                Some(off) => format!("{off:010} 00000 n\r\n"),
                None => "0000000000 00000 f\r\n".to_string(),
            };
            self.write_str(&entry)?;
        }

        let mut trailer = format!("trailer\n<< /Size {size} /Root {} {} R", root.0, root.1);
        if let Some(info) = info {
            trailer.push_str(&format!(" /Info {} {} R", info.0, info.1));
        }
        trailer.push_str(" >>\n");
        self.write_str(&trailer)?;
        self.write_str(&format!("startxref\n{xref_offset}\n%%EOF\n"))
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Escape `\`, `(` and `)` in a literal string.
pub fn escape_pdf_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for &b in bytes {
        if matches!(b, b'\\' | b'(' | b')') {
            out.push(b'\\');
        }
        out.push(b);
    }
    out
}

/// Reals for object values: always with a fractional part, never
/// scientific notation.
fn format_real(f: f64) -> String {
    if f == f.floor() && f.abs() < 1e15 {
        format!("{f:.1}")
    } else {
        trim_decimal(format!("{f:.6}"))
    }
}

/// Numbers inside content streams: integers without a fraction, otherwise
/// up to four decimals.
pub(crate) fn format_coord(v: f64) -> String {
    if v == v.floor() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        trim_decimal(format!("{v:.4}"))
    }
}

fn trim_decimal(s: String) -> String {
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
