use image::ImageEncoder as _;
use image::codecs::png::{CompressionType, FilterType};

use crate::foundation::core::PixelBuffer;
use crate::foundation::error::{TipmaskError, TipmaskResult};

/// Serializes a composited [`PixelBuffer`] for storage.
///
/// Encoding the same buffer twice must yield identical bytes, and the format must keep alpha.
pub trait ImageEncoder: Send + Sync {
    fn encode(&self, buffer: &PixelBuffer) -> TipmaskResult<Vec<u8>>;

    /// File extension of the produced format, without the dot.
    fn extension(&self) -> &'static str;
}

/// Lossless RGBA8 PNG with fixed compression and filter settings.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn encode(&self, buffer: &PixelBuffer) -> TipmaskResult<Vec<u8>> {
        encode_png(buffer)
    }

    fn extension(&self) -> &'static str {
        "png"
    }
}

pub fn encode_png(buffer: &PixelBuffer) -> TipmaskResult<Vec<u8>> {
    if buffer.is_empty() {
        return Err(TipmaskError::encode("cannot encode a zero-area image"));
    }

    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new_with_quality(
        &mut out,
        CompressionType::Default,
        FilterType::Adaptive,
    )
    .write_image(
        buffer.as_bytes(),
        buffer.width(),
        buffer.height(),
        image::ExtendedColorType::Rgba8,
    )
    .map_err(|e| TipmaskError::encode(format!("write png: {e}")))?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
