use std::path::Path;

use chrono::NaiveDate;
use racun_core::export::{export_to_dir, page_offsets, Rasterizer};
use racun_core::pdf::ImageData;
use racun_core::view::{Block, ChargeLine, InvoiceView};
use racun_core::{
    DirectRender, ExportStrategy, FieldEdit, InvoiceRecords, RacunError, RasterPaginate, Session,
    SnapshotRasterizer,
};

fn mounted_session() -> Session {
    let mut s = Session::new(InvoiceRecords::seed(NaiveDate::from_ymd_opt(2024, 9, 8).unwrap()));
    s.mount();
    s
}

fn pdf_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn page_count(bytes: &[u8]) -> usize {
    pdf_text(bytes).matches("/Type /Page /Parent").count()
}

fn write_png(path: &Path, width: u32, height: u32) {
    let file = std::fs::File::create(path).unwrap();
    let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().unwrap();
    writer
        .write_image_data(&vec![200u8; (width * height * 3) as usize])
        .unwrap();
}

/// White bitmap with a fixed aspect ratio, no capture involved.
struct BlankRasterizer {
    width: u32,
    height: u32,
}

impl Rasterizer for BlankRasterizer {
    fn rasterize(&self, _view: &InvoiceView, scale: f64) -> racun_core::Result<ImageData> {
        assert_eq!(scale, 2.0);
        let pixels = vec![255u8; (self.width * self.height * 4) as usize];
        ImageData::from_rgba(self.width, self.height, &pixels)
    }
}

// -------------------------------------------------------
// Export to a directory
// -------------------------------------------------------

#[test]
fn export_writes_racun_number_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let s = mounted_session();
    let path = s
        .export_pdf(&DirectRender::new(None), dir.path())
        .unwrap()
        .unwrap();
    assert_eq!(path, dir.path().join("racun-2024-001.pdf"));

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.7"));
    assert!(pdf_text(&bytes).ends_with("%%EOF\n"));
}

#[test]
fn export_before_mount_does_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let s = Session::new(InvoiceRecords::seed(NaiveDate::from_ymd_opt(2024, 9, 8).unwrap()));
    let written = s.export_pdf(&DirectRender::new(None), dir.path()).unwrap();
    assert!(written.is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn file_name_follows_edited_number() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = mounted_session();
    s.edit(&FieldEdit::new("invoice.number", "2024-015")).unwrap();
    let path = s
        .export_pdf(&DirectRender::new(None), dir.path())
        .unwrap()
        .unwrap();
    assert!(path.ends_with("racun-2024-015.pdf"));
}

#[test]
fn missing_directory_is_an_io_error() {
    let s = mounted_session();
    let err = export_to_dir(
        &DirectRender::new(None),
        s.preview(),
        Path::new("/nonexistent/racun/out"),
    )
    .err()
    .unwrap();
    assert!(matches!(err, RacunError::Io(_)));
}

// -------------------------------------------------------
// Direct render
// -------------------------------------------------------

#[test]
fn direct_render_fits_seeded_invoice_on_one_page() {
    let s = mounted_session();
    let mut out = Vec::new();
    let report = DirectRender::new(None)
        .with_compression(false)
        .render(s.preview().unwrap(), &mut out)
        .unwrap();
    assert_eq!(report.pages, 1);
    assert_eq!(page_count(&out), 1);

    let text = pdf_text(&out);
    assert!(text.contains("/BaseFont /Helvetica"));
    assert!(text.contains("/BaseFont /Helvetica-Bold"));
    assert!(text.contains("/Encoding /WinAnsiEncoding"));
    // "Račun 2024-001" as a UTF-16BE info string.
    assert!(text.contains("/Title <FEFF0052"));
    assert!(text.contains("(racun)"));
    assert!(text.contains("(911,00 "));
}

#[test]
fn direct_render_breaks_long_content_across_pages() {
    let charges = (1..=120)
        .map(|i| ChargeLine {
            description: format!("Noćenje {i}"),
            detail: "1 × 120,00 €".to_string(),
            amount: "120,00 €".to_string(),
        })
        .collect();
    let view = InvoiceView {
        number: "2024-001".to_string(),
        blocks: vec![Block::Charges(charges), Block::Note("Hvala!".to_string())],
    };

    let mut out = Vec::new();
    let report = DirectRender::new(None)
        .with_compression(false)
        .render(&view, &mut out)
        .unwrap();
    assert!(report.pages >= 3, "got {} pages", report.pages);
    assert_eq!(page_count(&out), report.pages);
    assert!(pdf_text(&out).contains(&format!("/Count {}", report.pages)));
}

#[test]
fn compressed_content_uses_flate() {
    let s = mounted_session();
    let mut out = Vec::new();
    DirectRender::new(None)
        .render(s.preview().unwrap(), &mut out)
        .unwrap();
    assert!(pdf_text(&out).contains("/Filter /FlateDecode"));
}

// -------------------------------------------------------
// Rasterize and paginate
// -------------------------------------------------------

#[test]
fn raster_short_image_is_one_page() {
    let s = mounted_session();
    // 210 x 148.5 mm
    let strategy = RasterPaginate::new(BlankRasterizer {
        width: 420,
        height: 297,
    });
    let mut out = Vec::new();
    let report = strategy.render(s.preview().unwrap(), &mut out).unwrap();
    assert_eq!(report.pages, 1);
    assert_eq!(page_count(&out), 1);
}

#[test]
fn raster_tall_image_slices_into_a4_pages() {
    let s = mounted_session();
    // 210 x 735 mm: 2.47 page heights
    let strategy = RasterPaginate::new(BlankRasterizer {
        width: 200,
        height: 700,
    })
    .with_compression(false);
    let mut out = Vec::new();
    let report = strategy.render(s.preview().unwrap(), &mut out).unwrap();
    assert_eq!(report.pages, 3);
    assert_eq!(page_count(&out), 3);

    let text = pdf_text(&out);
    // Embedded once, drawn on every page.
    assert_eq!(text.matches("/Subtype /Image").count(), 1);
    assert_eq!(text.matches("/Im1 Do").count(), 3);
}

#[test]
fn raster_page_count_matches_offsets() {
    for height_mm in [100.0, 297.0, 400.0, 1000.0] {
        let pages = page_offsets(height_mm).len();
        assert_eq!(pages, (height_mm / 297.0_f64).ceil() as usize);
    }
}

#[test]
fn snapshot_png_is_exported() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("preview.png");
    write_png(&snapshot, 100, 300);

    let s = mounted_session();
    let strategy = RasterPaginate::new(SnapshotRasterizer::new(&snapshot));
    let path = s.export_pdf(&strategy, dir.path()).unwrap().unwrap();
    let bytes = std::fs::read(path).unwrap();
    // 210 x 630 mm
    assert_eq!(page_count(&bytes), 3);
}

#[test]
fn missing_snapshot_fails_export() {
    let dir = tempfile::tempdir().unwrap();
    let s = mounted_session();
    let strategy = RasterPaginate::new(SnapshotRasterizer::new(dir.path().join("none.png")));
    let err = s.export_pdf(&strategy, dir.path()).err().unwrap();
    assert!(matches!(err, RacunError::Rasterize(_)));
}
