use std::io::{self, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::pdf::fonts::{encode_win_ansi, BuiltinFont};
use crate::pdf::graphics::Color;
use crate::pdf::images::ImageData;
use crate::pdf::objects::{ObjId, PdfObject};
use crate::pdf::truetype::TrueTypeFont;
use crate::pdf::writer::{escape_pdf_bytes, format_coord, PdfWriter};

const CATALOG_OBJ: ObjId = ObjId(1, 0);
const PAGES_OBJ: ObjId = ObjId(2, 0);
const FIRST_FREE_OBJ_NUM: u32 = 3;

/// Handle to a font registered with a [`PdfDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(usize);

/// Handle to an image registered with a [`PdfDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(usize);

enum FontKind {
    Builtin(BuiltinFont),
    TrueType(TrueTypeFont),
}

struct FontSlot {
    id: ObjId,
    kind: FontKind,
}

struct PageBuilder {
    width: f64,
    height: f64,
    content_ops: Vec<u8>,
}

/// Streaming PDF document builder.
///
/// Generic over `Write`, so it writes to a `BufWriter<File>` or an
/// in-memory `Vec<u8>` alike. `end_page()` writes the page out and frees
/// its content. Builtin fonts and images are written when registered;
/// TrueType fonts are written in `end_document()`, once the set of used
/// glyphs is known.
pub struct PdfDocument<W: Write> {
    writer: PdfWriter<W>,
    info: Vec<(String, String)>,
    page_ids: Vec<ObjId>,
    current_page: Option<PageBuilder>,
    next_obj_num: u32,
    compress: bool,
    fonts: Vec<FontSlot>,
    images: Vec<ObjId>,
}

impl<W: Write> PdfDocument<W> {
    /// Start a document. Writes the header immediately.
    pub fn new(writer: W) -> io::Result<Self> {
        let mut writer = PdfWriter::new(writer);
        writer.write_header()?;
        Ok(PdfDocument {
            writer,
            info: Vec::new(),
            page_ids: Vec::new(),
            current_page: None,
            next_obj_num: FIRST_FREE_OBJ_NUM,
            compress: false,
            fonts: Vec::new(),
            images: Vec::new(),
        })
    }

    /// Flate-compress content, image and font streams written from now on.
    pub fn set_compression(&mut self, compress: bool) -> &mut Self {
        self.compress = compress;
        self
    }

    /// Add a document info entry such as "Title" or "Creator".
    pub fn set_info(&mut self, key: &str, value: &str) -> &mut Self {
        self.info.push((key.to_string(), value.to_string()));
        self
    }

    fn alloc_id(&mut self) -> ObjId {
        let id = ObjId(self.next_obj_num, 0);
        self.next_obj_num += 1;
        id
    }

    /// Stream dictionary entries and data, compressed if enabled.
    fn stream_object(&self, mut dict: Vec<(&str, PdfObject)>, data: Vec<u8>) -> io::Result<PdfObject> {
        if !self.compress {
            return Ok(PdfObject::stream(dict, data));
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&data)?;
        dict.push(("Filter", PdfObject::name("FlateDecode")));
        Ok(PdfObject::stream(dict, encoder.finish()?))
    }

    pub fn add_builtin_font(&mut self, font: BuiltinFont) -> io::Result<FontId> {
        let id = self.alloc_id();
        let dict = PdfObject::dict(vec![
            ("Type", PdfObject::name("Font")),
            ("Subtype", PdfObject::name("Type1")),
            ("BaseFont", PdfObject::name(font.base_name())),
            ("Encoding", PdfObject::name("WinAnsiEncoding")),
        ]);
        self.writer.write_object(id, &dict)?;
        self.fonts.push(FontSlot {
            id,
            kind: FontKind::Builtin(font),
        });
        Ok(FontId(self.fonts.len() - 1))
    }

    /// Register a TrueType face. Its objects are written at the end.
    pub fn add_truetype_font(&mut self, font: TrueTypeFont) -> FontId {
        let id = self.alloc_id();
        self.fonts.push(FontSlot {
            id,
            kind: FontKind::TrueType(font),
        });
        FontId(self.fonts.len() - 1)
    }

    /// Write an image XObject (plus soft mask) and return its handle.
    pub fn add_image(&mut self, image: &ImageData) -> io::Result<ImageId> {
        let smask = match &image.alpha {
            Some(alpha) => {
                let id = self.alloc_id();
                let obj = self.stream_object(image_dict(image.width, image.height, "DeviceGray"), alpha.clone())?;
                self.writer.write_object(id, &obj)?;
                Some(id)
            }
            None => None,
        };

        let id = self.alloc_id();
        let mut dict = image_dict(image.width, image.height, image.color_space.pdf_name());
        if let Some(smask) = smask {
            dict.push(("SMask", PdfObject::Reference(smask)));
        }
        let obj = self.stream_object(dict, image.data.clone())?;
        self.writer.write_object(id, &obj)?;
        self.images.push(id);
        Ok(ImageId(self.images.len() - 1))
    }

    /// Text width in points for a registered font.
    pub fn measure_text(&self, font: FontId, text: &str, font_size: f64) -> f64 {
        match &self.fonts[font.0].kind {
            FontKind::Builtin(f) => f.measure(text, font_size),
            FontKind::TrueType(f) => f.measure(text, font_size),
        }
    }

    pub fn line_height(&self, font: FontId, font_size: f64) -> f64 {
        match &self.fonts[font.0].kind {
            FontKind::Builtin(f) => f.line_height(font_size),
            FontKind::TrueType(f) => f.line_height(font_size),
        }
    }

    /// Begin a page of the given size in points, closing any open page.
    pub fn begin_page(&mut self, width: f64, height: f64) -> io::Result<&mut Self> {
        if self.current_page.is_some() {
            self.end_page()?;
        }
        self.current_page = Some(PageBuilder {
            width,
            height,
            content_ops: Vec::new(),
        });
        Ok(self)
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len() + usize::from(self.current_page.is_some())
    }

    fn page(&mut self) -> &mut PageBuilder {
        // Drawing with no open page starts an A4 page.
        self.current_page.get_or_insert_with(|| PageBuilder {
            width: 595.28,
            height: 841.89,
            content_ops: Vec::new(),
        })
    }

    fn push_ops(&mut self, ops: &str) {
        self.page().content_ops.extend_from_slice(ops.as_bytes());
    }

    /// Draw text with its baseline at (x, y), bottom-left origin.
    pub fn place_text(&mut self, text: &str, x: f64, y: f64, font: FontId, font_size: f64) -> &mut Self {
        let slot = &mut self.fonts[font.0];
        let resource = format!("F{}", font.0 + 1);
        let mut encoded = Vec::new();
        match &mut slot.kind {
            FontKind::Builtin(_) => {
                encoded.push(b'(');
                encoded.extend(escape_pdf_bytes(&encode_win_ansi(text)));
                encoded.push(b')');
            }
            FontKind::TrueType(f) => encoded.extend(f.encode_hex(text).into_bytes()),
        }
        let head = format!(
            "BT\n/{resource} {} Tf\n{} {} Td\n",
            format_coord(font_size),
            format_coord(x),
            format_coord(y)
        );
        let page = self.page();
        page.content_ops.extend_from_slice(head.as_bytes());
        page.content_ops.extend_from_slice(&encoded);
        page.content_ops.extend_from_slice(b" Tj\nET\n");
        self
    }

    pub fn save_state(&mut self) -> &mut Self {
        self.push_ops("q\n");
        self
    }

    pub fn restore_state(&mut self) -> &mut Self {
        self.push_ops("Q\n");
        self
    }

    pub fn set_fill_color(&mut self, c: Color) -> &mut Self {
        let ops = format!("{} {} {} rg\n", format_coord(c.r), format_coord(c.g), format_coord(c.b));
        self.push_ops(&ops);
        self
    }

    pub fn set_stroke_color(&mut self, c: Color) -> &mut Self {
        let ops = format!("{} {} {} RG\n", format_coord(c.r), format_coord(c.g), format_coord(c.b));
        self.push_ops(&ops);
        self
    }

    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        let ops = format!("{} w\n", format_coord(width));
        self.push_ops(&ops);
        self
    }

    /// Stroke a straight line with the current stroke color and width.
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> &mut Self {
        let ops = format!(
            "{} {} m\n{} {} l\nS\n",
            format_coord(x1),
            format_coord(y1),
            format_coord(x2),
            format_coord(y2)
        );
        self.push_ops(&ops);
        self
    }

    /// Fill a rectangle whose bottom-left corner is (x, y).
    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        let ops = format!(
            "{} {} {} {} re\nf\n",
            format_coord(x),
            format_coord(y),
            format_coord(width),
            format_coord(height)
        );
        self.push_ops(&ops);
        self
    }

    /// Paint an image scaled to `width` x `height` with its bottom-left
    /// corner at (x, y). Parts outside the page are clipped by the viewer.
    pub fn draw_image(&mut self, image: ImageId, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        let ops = format!(
            "q\n{} 0 0 {} {} {} cm\n/Im{} Do\nQ\n",
            format_coord(width),
            format_coord(height),
            format_coord(x),
            format_coord(y),
            image.0 + 1
        );
        self.push_ops(&ops);
        self
    }

    fn resources(&self) -> PdfObject {
        let mut entries = Vec::new();
        if !self.fonts.is_empty() {
            let fonts = self
                .fonts
                .iter()
                .enumerate()
                .map(|(i, slot)| (format!("F{}", i + 1), PdfObject::Reference(slot.id)))
                .collect();
            entries.push(("Font".to_string(), PdfObject::Dictionary(fonts)));
        }
        if !self.images.is_empty() {
            let images = self
                .images
                .iter()
                .enumerate()
                .map(|(i, id)| (format!("Im{}", i + 1), PdfObject::Reference(*id)))
                .collect();
            entries.push(("XObject".to_string(), PdfObject::Dictionary(images)));
        }
        PdfObject::Dictionary(entries)
    }

    /// Write the open page's content stream and page dictionary.
    pub fn end_page(&mut self) -> io::Result<()> {
        let Some(page) = self.current_page.take() else {
            return Ok(());
        };
        let content_id = self.alloc_id();
        let page_id = self.alloc_id();

        let content = self.stream_object(vec![], page.content_ops)?;
        self.writer.write_object(content_id, &content)?;

        let page_dict = PdfObject::dict(vec![
            ("Type", PdfObject::name("Page")),
            ("Parent", PdfObject::Reference(PAGES_OBJ)),
            ("MediaBox", PdfObject::rect(0.0, 0.0, page.width, page.height)),
            ("Contents", PdfObject::Reference(content_id)),
            ("Resources", self.resources()),
        ]);
        self.writer.write_object(page_id, &page_dict)?;
        self.page_ids.push(page_id);
        Ok(())
    }

    fn write_truetype_fonts(&mut self) -> io::Result<()> {
        let fonts = std::mem::take(&mut self.fonts);
        for slot in &fonts {
            let FontKind::TrueType(font) = &slot.kind else {
                continue;
            };
            let file_id = self.alloc_id();
            let file = self.stream_object(
                vec![("Length1", PdfObject::Integer(font.font_data.len() as i64))],
                font.font_data.clone(),
            )?;
            self.writer.write_object(file_id, &file)?;

            let descriptor_id = self.alloc_id();
            self.writer.write_object(descriptor_id, &font.descriptor_dict(file_id))?;

            let cid_id = self.alloc_id();
            self.writer.write_object(cid_id, &font.cid_font_dict(descriptor_id))?;

            let cmap_id = self.alloc_id();
            let cmap = self.stream_object(vec![], font.to_unicode_cmap())?;
            self.writer.write_object(cmap_id, &cmap)?;

            self.writer.write_object(slot.id, &font.type0_dict(cid_id, cmap_id))?;
        }
        self.fonts = fonts;
        Ok(())
    }

    /// Finish the document: fonts, info, page tree, catalog, xref and
    /// trailer. Returns the underlying writer.
    pub fn end_document(mut self) -> io::Result<W> {
        self.end_page()?;
        self.write_truetype_fonts()?;

        let info_id = if self.info.is_empty() {
            None
        } else {
            let id = self.alloc_id();
            let entries = self
                .info
                .iter()
                .map(|(k, v)| (k.as_str(), PdfObject::text(v)))
                .collect();
            self.writer.write_object(id, &PdfObject::dict(entries))?;
            Some(id)
        };

        let kids = self.page_ids.iter().map(|id| PdfObject::Reference(*id)).collect();
        let pages = PdfObject::dict(vec![
            ("Type", PdfObject::name("Pages")),
            ("Kids", PdfObject::Array(kids)),
            ("Count", PdfObject::Integer(self.page_ids.len() as i64)),
        ]);
        self.writer.write_object(PAGES_OBJ, &pages)?;

        let catalog = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::Reference(PAGES_OBJ)),
        ]);
        self.writer.write_object(CATALOG_OBJ, &catalog)?;
        self.writer.write_xref_and_trailer(CATALOG_OBJ, info_id)?;
        Ok(self.writer.into_inner())
    }
}

fn image_dict(width: u32, height: u32, color_space: &str) -> Vec<(&'static str, PdfObject)> {
    vec![
        ("Type", PdfObject::name("XObject")),
        ("Subtype", PdfObject::name("Image")),
        ("Width", PdfObject::Integer(width as i64)),
        ("Height", PdfObject::Integer(height as i64)),
        ("ColorSpace", PdfObject::name(color_space)),
        ("BitsPerComponent", PdfObject::Integer(8)),
    ]
}
