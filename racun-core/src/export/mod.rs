//! Turning the rendered invoice view into a PDF file.

mod direct;
mod raster;

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{Config, StrategyKind};
use crate::error::{RacunError, Result};
use crate::view::InvoiceView;

pub use direct::{DirectRender, FontFaces};
pub use raster::{page_offsets, RasterPaginate, Rasterizer, SnapshotRasterizer};

/// A4 width in millimetres.
pub const A4_WIDTH_MM: f64 = 210.0;
/// A4 height in millimetres; also the raster slice height.
pub const A4_HEIGHT_MM: f64 = 297.0;

/// What an export produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportReport {
    pub pages: usize,
}

/// One way of turning a view into PDF bytes.
pub trait ExportStrategy {
    fn name(&self) -> &'static str;

    fn render(&self, view: &InvoiceView, out: &mut dyn Write) -> Result<ExportReport>;
}

/// `racun-<number>.pdf`. Path separators in the number are replaced so the
/// file always lands in the target directory.
pub fn export_file_name(invoice_number: &str) -> String {
    let safe: String = invoice_number
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect();
    format!("racun-{safe}.pdf")
}

/// Render `view` into `dir`. With no rendered view there is nothing to
/// export and the call does nothing. The file is only created once the
/// whole document rendered.
pub fn export_to_dir(
    strategy: &dyn ExportStrategy,
    view: Option<&InvoiceView>,
    dir: &Path,
) -> Result<Option<PathBuf>> {
    let Some(view) = view else {
        debug!("no invoice preview rendered, export skipped");
        return Ok(None);
    };
    let mut pdf = Vec::new();
    let report = strategy.render(view, &mut pdf)?;

    let path = dir.join(export_file_name(&view.number));
    std::fs::write(&path, &pdf)?;
    info!(
        strategy = strategy.name(),
        pages = report.pages,
        path = %path.display(),
        "invoice exported"
    );
    Ok(Some(path))
}

/// Build the strategy the configuration asks for.
pub fn strategy_from_config(config: &Config) -> Result<Box<dyn ExportStrategy>> {
    let export = &config.export;
    match export.strategy {
        StrategyKind::Direct => {
            let faces = match (&config.fonts.regular, &config.fonts.bold) {
                (Some(regular), Some(bold)) => Some(FontFaces::load(regular, bold)?),
                (None, None) => None,
                _ => {
                    return Err(RacunError::Config(
                        "fonts.regular and fonts.bold must be set together".to_string(),
                    ))
                }
            };
            Ok(Box::new(DirectRender::new(faces).with_compression(export.compress)))
        }
        StrategyKind::Raster => {
            let snapshot = export.snapshot.clone().ok_or_else(|| {
                RacunError::Config("the raster strategy needs export.snapshot".to_string())
            })?;
            Ok(Box::new(
                RasterPaginate::new(SnapshotRasterizer::new(snapshot))
                    .with_scale(export.raster_scale)
                    .with_compression(export.compress),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_uses_invoice_number() {
        assert_eq!(export_file_name("2024-001"), "racun-2024-001.pdf");
        assert_eq!(export_file_name("7/2024"), "racun-7-2024.pdf");
    }

    #[test]
    fn raster_without_snapshot_is_a_config_error() {
        let mut config = Config::default();
        config.export.strategy = StrategyKind::Raster;
        let err = strategy_from_config(&config).err().unwrap();
        assert!(matches!(err, RacunError::Config(_)));
    }

    #[test]
    fn a_single_font_face_is_a_config_error() {
        let mut config = Config::default();
        config.fonts.regular = Some(PathBuf::from("fonts/Regular.ttf"));
        let err = strategy_from_config(&config).err().unwrap();
        assert!(matches!(err, RacunError::Config(_)));

        let mut config = Config::default();
        config.fonts.bold = Some(PathBuf::from("fonts/Bold.ttf"));
        assert!(strategy_from_config(&config).is_err());
    }

    #[test]
    fn direct_is_the_default_strategy() {
        let strategy = strategy_from_config(&Config::default()).unwrap();
        assert_eq!(strategy.name(), "direct");
    }
}
