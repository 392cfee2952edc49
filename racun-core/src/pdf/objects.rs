/// Object identifier: (object_number, generation_number).
/// Generation is always 0 since documents are written once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId(pub u32, pub u16);

/// The subset of PDF object types (ISO 32000-1, 7.3) the exporter emits.
#[derive(Debug, Clone)]
pub enum PdfObject {
    Integer(i64),
    Real(f64),
    /// Name object, stored without the leading `/`.
    Name(String),
    /// Byte string written as a literal `( ... )`.
    LiteralString(Vec<u8>),
    /// Text string for the info dictionary. ASCII text is written as a
    /// literal, anything else as UTF-16BE hex with a byte order mark.
    TextString(String),
    Array(Vec<PdfObject>),
    /// Key-value pairs. A Vec keeps output order deterministic.
    Dictionary(Vec<(String, PdfObject)>),
    Stream {
        dict: Vec<(String, PdfObject)>,
        data: Vec<u8>,
    },
    Reference(ObjId),
}

impl PdfObject {
    pub fn name(s: &str) -> Self {
        PdfObject::Name(s.to_string())
    }

    pub fn text(s: &str) -> Self {
        PdfObject::TextString(s.to_string())
    }

    pub fn array(items: Vec<PdfObject>) -> Self {
        PdfObject::Array(items)
    }

    pub fn dict(entries: Vec<(&str, PdfObject)>) -> Self {
        PdfObject::Dictionary(owned_entries(entries))
    }

    pub fn stream(dict_entries: Vec<(&str, PdfObject)>, data: Vec<u8>) -> Self {
        PdfObject::Stream {
            dict: owned_entries(dict_entries),
            data,
        }
    }

    /// `[0 0 w h]` rectangle, as used by MediaBox and FontBBox.
    pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        PdfObject::Array(vec![
            PdfObject::Real(x0),
            PdfObject::Real(y0),
            PdfObject::Real(x1),
            PdfObject::Real(y1),
        ])
    }
}

fn owned_entries(entries: Vec<(&str, PdfObject)>) -> Vec<(String, PdfObject)> {
    entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dict_keeps_insertion_order() {
        let obj = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::Reference(ObjId(2, 0))),
        ]);
        match obj {
            PdfObject::Dictionary(entries) => {
                assert_eq!(entries[0].0, "Type");
                assert_eq!(entries[1].0, "Pages");
            }
            _ => panic!("expected Dictionary"),
        }
    }

    #[test]
    fn rect_has_four_numbers() {
        match PdfObject::rect(0.0, 0.0, 595.0, 842.0) {
            PdfObject::Array(items) => assert_eq!(items.len(), 4),
            _ => panic!("expected Array"),
        }
    }
}
