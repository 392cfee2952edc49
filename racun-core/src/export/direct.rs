use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::export::{ExportReport, ExportStrategy, A4_HEIGHT_MM, A4_WIDTH_MM};
use crate::pdf::{mm, BuiltinFont, Color, FontId, PdfDocument, TrueTypeFont};
use crate::view::{Block, ChargeLine, InvoiceView, Line, TotalLine};

const MARGIN_MM: f64 = 15.0;
const CONTENT_WIDTH_MM: f64 = 180.0;
const LABEL_COLUMN_MM: f64 = 45.0;
/// Charge table columns: description, calculation, amount.
const CHARGE_COLUMNS_MM: [f64; 3] = [95.0, 50.0, 35.0];
const CELL_PADDING_MM: f64 = 1.5;

const BODY_SIZE: f64 = 9.0;
const HEADING_SIZE: f64 = 11.0;
const TITLE_SIZE: f64 = 20.0;
const NOTE_SIZE: f64 = 8.0;

const LABEL_GRAY: Color = Color::gray(0.4);
const RULE_GRAY: Color = Color::gray(0.75);
const HEADER_FILL: Color = Color::gray(0.92);

/// Regular and bold TrueType faces to embed.
#[derive(Debug, Clone)]
pub struct FontFaces {
    regular: Vec<u8>,
    bold: Vec<u8>,
}

impl FontFaces {
    /// Read both faces and check that they parse.
    pub fn load(regular: &Path, bold: &Path) -> Result<Self> {
        Self::from_bytes(std::fs::read(regular)?, std::fs::read(bold)?)
    }

    pub fn from_bytes(regular: Vec<u8>, bold: Vec<u8>) -> Result<Self> {
        TrueTypeFont::from_bytes(regular.clone())?;
        TrueTypeFont::from_bytes(bold.clone())?;
        Ok(FontFaces { regular, bold })
    }
}

/// Lays the view out as PDF text and vector graphics on A4 pages with
/// 15 mm margins and a 180 mm content column, breaking to a new page
/// whenever the next line or table row would cross the bottom margin.
#[derive(Debug, Clone)]
pub struct DirectRender {
    faces: Option<FontFaces>,
    compress: bool,
}

impl DirectRender {
    /// Without faces the builtin Helvetica pair is used.
    pub fn new(faces: Option<FontFaces>) -> Self {
        DirectRender {
            faces,
            compress: true,
        }
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

impl ExportStrategy for DirectRender {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn render(&self, view: &InvoiceView, out: &mut dyn Write) -> Result<ExportReport> {
        let mut doc = PdfDocument::new(out)?;
        doc.set_compression(self.compress);
        doc.set_info("Title", &format!("Račun {}", view.number));
        doc.set_info("Creator", "racun");

        let (regular, bold) = match &self.faces {
            Some(faces) => (
                doc.add_truetype_font(TrueTypeFont::from_bytes(faces.regular.clone())?),
                doc.add_truetype_font(TrueTypeFont::from_bytes(faces.bold.clone())?),
            ),
            None => (
                doc.add_builtin_font(BuiltinFont::Helvetica)?,
                doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
            ),
        };

        let mut layout = Layout::start(&mut doc, regular, bold)?;
        for block in &view.blocks {
            layout.block(block)?;
        }
        let pages = layout.pages;
        doc.end_document()?;
        Ok(ExportReport { pages })
    }
}

/// Top-down cursor over the pages of one document. `y` is the distance of
/// the next line's top edge from the top of the page, in points.
struct Layout<'a, W: Write> {
    doc: &'a mut PdfDocument<W>,
    regular: FontId,
    bold: FontId,
    y: f64,
    pages: usize,
}

impl<'a, W: Write> Layout<'a, W> {
    fn start(doc: &'a mut PdfDocument<W>, regular: FontId, bold: FontId) -> Result<Self> {
        let mut layout = Layout {
            doc,
            regular,
            bold,
            y: 0.0,
            pages: 0,
        };
        layout.new_page()?;
        Ok(layout)
    }

    fn page_height() -> f64 {
        mm(A4_HEIGHT_MM)
    }

    fn left() -> f64 {
        mm(MARGIN_MM)
    }

    fn right() -> f64 {
        mm(MARGIN_MM + CONTENT_WIDTH_MM)
    }

    fn new_page(&mut self) -> Result<()> {
        self.doc.begin_page(mm(A4_WIDTH_MM), Self::page_height())?;
        self.y = mm(MARGIN_MM);
        self.pages += 1;
        Ok(())
    }

    /// Start a new page unless `height` more points fit above the bottom
    /// margin. A fresh page always accepts the content.
    fn ensure(&mut self, height: f64) -> Result<()> {
        let bottom = Self::page_height() - mm(MARGIN_MM);
        if self.y + height > bottom && self.y > mm(MARGIN_MM) {
            self.new_page()?;
        }
        Ok(())
    }

    fn gap(&mut self, millimetres: f64) {
        self.y += mm(millimetres);
    }

    fn line_height(&self, font: FontId, size: f64) -> f64 {
        self.doc.line_height(font, size)
    }

    fn measure(&self, font: FontId, text: &str, size: f64) -> f64 {
        self.doc.measure_text(font, text, size)
    }

    /// Text whose top edge sits `top` points below the page top.
    fn text_at(&mut self, text: &str, x: f64, top: f64, font: FontId, size: f64) {
        let baseline = Self::page_height() - (top + size);
        self.doc.place_text(text, x, baseline, font, size);
    }

    fn text_right(&mut self, text: &str, right: f64, top: f64, font: FontId, size: f64) {
        let x = right - self.measure(font, text, size);
        self.text_at(text, x, top, font, size);
    }

    fn rule(&mut self, color: Color, width: f64) {
        let y = Self::page_height() - self.y;
        self.doc
            .save_state()
            .set_stroke_color(color)
            .set_line_width(width)
            .line(Self::left(), y, Self::right(), y)
            .restore_state();
    }

    fn wrap(&self, text: &str, font: FontId, size: f64, width: f64) -> Vec<String> {
        wrap_text(text, width, |s| self.measure(font, s, size))
    }

    fn block(&mut self, block: &Block) -> Result<()> {
        match block {
            Block::Title { title, lines } => self.title(title, lines),
            Block::Section { heading, lines } => self.section(heading, lines),
            Block::Charges(charges) => self.charges(charges),
            Block::Totals(totals) => self.totals(totals),
            Block::Note(note) => self.note(note),
        }
    }

    fn title(&mut self, title: &str, lines: &[Line]) -> Result<()> {
        let lh = self.line_height(self.bold, TITLE_SIZE);
        self.ensure(lh)?;
        self.text_at(title, Self::left(), self.y, self.bold, TITLE_SIZE);
        self.y += lh;
        self.gap(2.0);
        self.labelled_lines(lines, self.bold)?;
        self.gap(2.0);
        self.rule(Color::BLACK, 1.0);
        self.gap(3.0);
        Ok(())
    }

    fn section(&mut self, heading: &str, lines: &[Line]) -> Result<()> {
        self.gap(3.0);
        let lh = self.line_height(self.bold, HEADING_SIZE);
        // Keep the heading on the same page as its first line.
        self.ensure(lh + self.line_height(self.regular, BODY_SIZE) + mm(1.0))?;
        self.text_at(heading, Self::left(), self.y, self.bold, HEADING_SIZE);
        self.y += lh;
        self.rule(RULE_GRAY, 0.5);
        self.gap(1.0);
        self.labelled_lines(lines, self.regular)
    }

    fn labelled_lines(&mut self, lines: &[Line], value_font: FontId) -> Result<()> {
        let lh = self.line_height(self.regular, BODY_SIZE);
        let value_x = Self::left() + mm(LABEL_COLUMN_MM);
        let value_width = mm(CONTENT_WIDTH_MM - LABEL_COLUMN_MM);
        for line in lines {
            let wrapped = self.wrap(&line.value, value_font, BODY_SIZE, value_width);
            for (i, part) in wrapped.iter().enumerate() {
                self.ensure(lh)?;
                if i == 0 {
                    self.doc.save_state().set_fill_color(LABEL_GRAY);
                    self.text_at(&line.label, Self::left(), self.y, self.regular, BODY_SIZE);
                    self.doc.restore_state();
                }
                self.text_at(part, value_x, self.y, value_font, BODY_SIZE);
                self.y += lh;
            }
        }
        Ok(())
    }

    fn charges(&mut self, charges: &[ChargeLine]) -> Result<()> {
        self.gap(5.0);
        self.charge_row("Opis", "Obračun", "Iznos", self.bold, Some(HEADER_FILL))?;
        for charge in charges {
            self.charge_row(&charge.description, &charge.detail, &charge.amount, self.regular, None)?;
        }
        self.rule(RULE_GRAY, 0.5);
        self.gap(2.0);
        Ok(())
    }

    fn charge_row(
        &mut self,
        description: &str,
        detail: &str,
        amount: &str,
        font: FontId,
        fill: Option<Color>,
    ) -> Result<()> {
        let pad = mm(CELL_PADDING_MM);
        let [desc_w, detail_w, _] = CHARGE_COLUMNS_MM.map(mm);
        let lh = self.line_height(font, BODY_SIZE);
        let desc_lines = self.wrap(description, font, BODY_SIZE, desc_w - 2.0 * pad);
        let detail_lines = self.wrap(detail, font, BODY_SIZE, detail_w - 2.0 * pad);
        let rows = desc_lines.len().max(detail_lines.len());
        let height = rows as f64 * lh + 2.0 * pad;

        self.ensure(height)?;
        if let Some(fill) = fill {
            let bottom = Self::page_height() - (self.y + height);
            self.doc
                .save_state()
                .set_fill_color(fill)
                .fill_rect(Self::left(), bottom, mm(CONTENT_WIDTH_MM), height)
                .restore_state();
        }

        let top = self.y + pad;
        for (i, part) in desc_lines.iter().enumerate() {
            self.text_at(part, Self::left() + pad, top + i as f64 * lh, font, BODY_SIZE);
        }
        for (i, part) in detail_lines.iter().enumerate() {
            self.text_at(part, Self::left() + desc_w + pad, top + i as f64 * lh, font, BODY_SIZE);
        }
        self.text_right(amount, Self::right() - pad, top, font, BODY_SIZE);
        self.y += height;
        Ok(())
    }

    fn totals(&mut self, totals: &[TotalLine]) -> Result<()> {
        let label_right = Self::right() - mm(CHARGE_COLUMNS_MM[2]);
        let pad = mm(CELL_PADDING_MM);
        for total in totals {
            let (font, size) = if total.emphasis {
                (self.bold, HEADING_SIZE)
            } else {
                (self.regular, BODY_SIZE)
            };
            let lh = self.line_height(font, size);
            self.ensure(lh + pad)?;
            if total.emphasis {
                let y = Self::page_height() - self.y;
                self.doc
                    .save_state()
                    .set_line_width(1.0)
                    .line(label_right - mm(40.0), y, Self::right(), y)
                    .restore_state();
                self.y += pad;
            }
            self.text_right(&total.label, label_right - pad, self.y, font, size);
            self.text_right(&total.amount, Self::right() - pad, self.y, font, size);
            self.y += lh;
        }
        Ok(())
    }

    fn note(&mut self, note: &str) -> Result<()> {
        self.gap(8.0);
        let lh = self.line_height(self.regular, NOTE_SIZE);
        for part in self.wrap(note, self.regular, NOTE_SIZE, mm(CONTENT_WIDTH_MM)) {
            self.ensure(lh)?;
            self.doc.save_state().set_fill_color(LABEL_GRAY);
            self.text_at(&part, Self::left(), self.y, self.regular, NOTE_SIZE);
            self.doc.restore_state();
            self.y += lh;
        }
        Ok(())
    }
}

/// Greedy word wrap. Words wider than the line are split between
/// characters. Always returns at least one (possibly empty) line.
fn wrap_text(text: &str, max_width: f64, measure: impl Fn(&str) -> f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if measure(&candidate) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if measure(word) <= max_width {
            current = word.to_string();
            continue;
        }
        for ch in word.chars() {
            current.push(ch);
            if measure(&current) > max_width && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::replace(&mut current, ch.to_string()));
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is one point wide.
    fn chars(s: &str) -> f64 {
        s.chars().count() as f64
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap_text("Sea View Apartment", 40.0, chars), vec!["Sea View Apartment"]);
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let lines = wrap_text("Jadranska Cesta 123, 21300 Makarska", 16.0, chars);
        assert_eq!(lines, vec!["Jadranska Cesta", "123, 21300", "Makarska"]);
    }

    #[test]
    fn splits_overlong_words() {
        let lines = wrap_text("HR1234567890", 5.0, chars);
        assert_eq!(lines, vec!["HR123", "45678", "90"]);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(wrap_text("", 10.0, chars), vec![String::new()]);
        assert_eq!(wrap_text("   ", 10.0, chars), vec![String::new()]);
    }

    #[test]
    fn invalid_faces_are_rejected() {
        assert!(FontFaces::from_bytes(vec![1, 2, 3], vec![4, 5, 6]).is_err());
    }
}
