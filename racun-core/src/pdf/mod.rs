//! Minimal PDF 1.7 writer used by the export strategies.

pub mod document;
pub mod fonts;
pub mod graphics;
pub mod images;
pub mod objects;
pub mod truetype;
pub mod writer;

pub use document::{FontId, ImageId, PdfDocument};
pub use fonts::BuiltinFont;
pub use graphics::Color;
pub use images::ImageData;
pub use truetype::TrueTypeFont;

/// PDF points per millimetre.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Convert millimetres to points.
pub fn mm(value: f64) -> f64 {
    value * PT_PER_MM
}
