use crate::error::{RacunError, Result};

/// Color space of decoded pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceRGB,
    DeviceGray,
}

impl ColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceGray => "DeviceGray",
        }
    }

    fn components(&self) -> usize {
        match self {
            ColorSpace::DeviceRGB => 3,
            ColorSpace::DeviceGray => 1,
        }
    }
}

/// 8-bit pixel data ready to become an image XObject. Alpha, if any, is
/// split off into its own grayscale plane for an /SMask.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    pub data: Vec<u8>,
    pub alpha: Option<Vec<u8>>,
}

impl ImageData {
    /// Build from tightly packed RGBA pixels, e.g. a rasterized page.
    /// Fully opaque bitmaps carry no alpha plane.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(RacunError::Image(format!(
                "expected {expected} bytes for {width}x{height} RGBA, got {}",
                rgba.len()
            )));
        }
        let (data, alpha) = split_alpha(rgba, 4);
        Ok(ImageData {
            width,
            height,
            color_space: ColorSpace::DeviceRGB,
            data,
            alpha,
        })
    }

    /// Decode a PNG. Palette and 16-bit images are normalized to 8-bit
    /// gray or RGB, with alpha split off.
    pub fn decode_png(bytes: &[u8]) -> Result<Self> {
        let mut decoder = png::Decoder::new(bytes);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder
            .read_info()
            .map_err(|e| RacunError::Image(format!("PNG decode error: {e}")))?;
        let mut buf = vec![0u8; reader.output_buffer_size()];
        let info = reader
            .next_frame(&mut buf)
            .map_err(|e| RacunError::Image(format!("PNG frame error: {e}")))?;
        buf.truncate(info.buffer_size());

        let (color_space, stride) = match info.color_type {
            png::ColorType::Rgb => (ColorSpace::DeviceRGB, 3),
            png::ColorType::Rgba => (ColorSpace::DeviceRGB, 4),
            png::ColorType::Grayscale => (ColorSpace::DeviceGray, 1),
            png::ColorType::GrayscaleAlpha => (ColorSpace::DeviceGray, 2),
            other => {
                return Err(RacunError::Image(format!("unsupported PNG color type: {other:?}")));
            }
        };
        let (data, alpha) = if stride > color_space.components() {
            split_alpha(&buf, stride)
        } else {
            (buf, None)
        };
        Ok(ImageData {
            width: info.width,
            height: info.height,
            color_space,
            data,
            alpha,
        })
    }

    pub fn load_png<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::decode_png(&bytes)
    }
}

/// Separate interleaved color+alpha pixels. The alpha plane is dropped
/// when every pixel is opaque.
fn split_alpha(pixels: &[u8], stride: usize) -> (Vec<u8>, Option<Vec<u8>>) {
    let color = stride - 1;
    let count = pixels.len() / stride;
    let mut data = Vec::with_capacity(count * color);
    let mut alpha = Vec::with_capacity(count);
    for px in pixels.chunks_exact(stride) {
        data.extend_from_slice(&px[..color]);
        alpha.push(px[color]);
    }
    let alpha = if alpha.iter().all(|&a| a == 255) {
        None
    } else {
        Some(alpha)
    };
    (data, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_png(width: u32, height: u32, color: png::ColorType, pixels: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(pixels).unwrap();
        }
        out
    }

    #[test]
    fn opaque_rgba_drops_alpha() {
        let img = ImageData::from_rgba(2, 1, &[255, 0, 0, 255, 0, 255, 0, 255]).unwrap();
        assert_eq!(img.data, vec![255, 0, 0, 0, 255, 0]);
        assert!(img.alpha.is_none());
    }

    #[test]
    fn rgba_size_mismatch_is_an_error() {
        assert!(matches!(
            ImageData::from_rgba(2, 2, &[0; 4]),
            Err(RacunError::Image(_))
        ));
    }

    #[test]
    fn decodes_rgb_png() {
        let png = encode_png(2, 2, png::ColorType::Rgb, &[10; 12]);
        let img = ImageData::decode_png(&png).unwrap();
        assert_eq!((img.width, img.height), (2, 2));
        assert_eq!(img.color_space, ColorSpace::DeviceRGB);
        assert_eq!(img.data.len(), 12);
    }

    #[test]
    fn decodes_translucent_gray_png() {
        let png = encode_png(2, 1, png::ColorType::GrayscaleAlpha, &[0, 128, 255, 255]);
        let img = ImageData::decode_png(&png).unwrap();
        assert_eq!(img.color_space, ColorSpace::DeviceGray);
        assert_eq!(img.data, vec![0, 255]);
        assert_eq!(img.alpha, Some(vec![128, 255]));
    }

    #[test]
    fn rejects_non_png() {
        assert!(ImageData::decode_png(b"GIF89a....").is_err());
    }
}
