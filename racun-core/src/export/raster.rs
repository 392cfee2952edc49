use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::config::DEFAULT_RASTER_SCALE;
use crate::error::{RacunError, Result};
use crate::export::{ExportReport, ExportStrategy, A4_HEIGHT_MM, A4_WIDTH_MM};
use crate::pdf::{mm, ImageData, PdfDocument};
use crate::view::InvoiceView;

/// Produces one bitmap of the whole rendered invoice.
pub trait Rasterizer {
    /// `scale` is device pixels per CSS pixel of the captured layout.
    fn rasterize(&self, view: &InvoiceView, scale: f64) -> Result<ImageData>;
}

/// Uses a PNG captured ahead of time, e.g. a browser screenshot of the
/// print layout. The capture already carries its scale.
#[derive(Debug, Clone)]
pub struct SnapshotRasterizer {
    path: PathBuf,
}

impl SnapshotRasterizer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotRasterizer { path: path.into() }
    }
}

impl Rasterizer for SnapshotRasterizer {
    fn rasterize(&self, view: &InvoiceView, scale: f64) -> Result<ImageData> {
        debug!(
            invoice = %view.number,
            snapshot = %self.path.display(),
            scale,
            "loading invoice snapshot"
        );
        if scale != DEFAULT_RASTER_SCALE {
            warn!(scale, "snapshot is used at its captured scale, raster_scale ignored");
        }
        ImageData::load_png(&self.path).map_err(|e| {
            RacunError::Rasterize(format!("snapshot {}: {e}", self.path.display()))
        })
    }
}

/// Scales the bitmap to the A4 width and slices it into A4-height pages.
/// The image is embedded once and drawn on every page, shifted up by one
/// page height each time.
pub struct RasterPaginate<R> {
    rasterizer: R,
    scale: f64,
    compress: bool,
}

impl<R: Rasterizer> RasterPaginate<R> {
    pub fn new(rasterizer: R) -> Self {
        RasterPaginate {
            rasterizer,
            scale: DEFAULT_RASTER_SCALE,
            compress: true,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

impl<R: Rasterizer> ExportStrategy for RasterPaginate<R> {
    fn name(&self) -> &'static str {
        "raster"
    }

    fn render(&self, view: &InvoiceView, out: &mut dyn Write) -> Result<ExportReport> {
        let image = self.rasterizer.rasterize(view, self.scale)?;
        if image.width == 0 || image.height == 0 {
            return Err(RacunError::Rasterize("rasterized invoice is empty".to_string()));
        }
        let image_height_mm = A4_WIDTH_MM * image.height as f64 / image.width as f64;

        let mut doc = PdfDocument::new(out)?;
        doc.set_compression(self.compress);
        doc.set_info("Title", &format!("Račun {}", view.number));
        doc.set_info("Creator", "racun");
        let image_id = doc.add_image(&image)?;

        let offsets = page_offsets(image_height_mm);
        for position in &offsets {
            let bottom = A4_HEIGHT_MM - (position + image_height_mm);
            doc.begin_page(mm(A4_WIDTH_MM), mm(A4_HEIGHT_MM))?
                .draw_image(image_id, 0.0, mm(bottom), mm(A4_WIDTH_MM), mm(image_height_mm));
        }
        debug!(
            width = image.width,
            height = image.height,
            height_mm = image_height_mm,
            pages = offsets.len(),
            "paginated rasterized invoice"
        );
        doc.end_document()?;
        Ok(ExportReport { pages: offsets.len() })
    }
}

/// Vertical offsets, in millimetres from the page top, at which the image
/// is placed on each successive page. The first page shows the image at
/// the top; each following page moves it up by one page height while any
/// of it is left to show.
pub fn page_offsets(image_height_mm: f64) -> Vec<f64> {
    let mut offsets = vec![0.0];
    let mut position = 0.0;
    let mut height_left = image_height_mm - A4_HEIGHT_MM;
    while height_left > 0.0 {
        position -= A4_HEIGHT_MM;
        offsets.push(position);
        height_left -= A4_HEIGHT_MM;
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_image_is_one_page() {
        assert_eq!(page_offsets(0.0), vec![0.0]);
        assert_eq!(page_offsets(120.0), vec![0.0]);
        assert_eq!(page_offsets(297.0), vec![0.0]);
    }

    #[test]
    fn pages_step_up_by_page_height() {
        assert_eq!(page_offsets(297.5), vec![0.0, -297.0]);
        assert_eq!(page_offsets(594.0), vec![0.0, -297.0]);
        assert_eq!(page_offsets(700.0), vec![0.0, -297.0, -594.0]);
    }

    #[test]
    fn page_count_is_height_over_page_height_rounded_up() {
        for h in [1.0, 150.0, 296.9, 298.0, 600.0, 891.0, 1200.0] {
            let expected = (h / A4_HEIGHT_MM).ceil() as usize;
            assert_eq!(page_offsets(h).len(), expected, "height {h}");
        }
    }

    #[test]
    fn snapshot_keeps_its_captured_size_at_any_scale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.png");
        let mut png_bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_bytes, 3, 5);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0u8; 15]).unwrap();
        }
        std::fs::write(&path, png_bytes).unwrap();

        let view = InvoiceView {
            number: "2024-001".to_string(),
            blocks: Vec::new(),
        };
        let rasterizer = SnapshotRasterizer::new(&path);
        for scale in [1.0, DEFAULT_RASTER_SCALE, 4.0] {
            let image = rasterizer.rasterize(&view, scale).unwrap();
            assert_eq!((image.width, image.height), (3, 5));
        }
    }

    #[test]
    fn missing_snapshot_is_a_rasterize_error() {
        let view = InvoiceView {
            number: "2024-001".to_string(),
            blocks: Vec::new(),
        };
        let err = SnapshotRasterizer::new("/nonexistent/snapshot.png")
            .rasterize(&view, 2.0)
            .err()
            .unwrap();
        assert!(matches!(err, RacunError::Rasterize(_)));
    }
}
