use std::io::Cursor;

use crate::foundation::core::PixelBuffer;
use crate::foundation::error::{TipmaskError, TipmaskResult};

/// Turns encoded image bytes into a straight-alpha RGBA8 [`PixelBuffer`].
///
/// Sources without an alpha channel come back fully opaque.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> TipmaskResult<PixelBuffer>;
}

/// Upper bounds applied while decoding untrusted uploads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_width: u32,
    pub max_height: u32,
    pub max_alloc_bytes: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_width: 16_384,
            max_height: 16_384,
            max_alloc_bytes: 512 * 1024 * 1024,
        }
    }
}

/// [`ImageDecoder`] backed by the `image` crate. Format is sniffed from the bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct RasterDecoder {
    limits: DecodeLimits,
}

impl RasterDecoder {
    pub fn new(limits: DecodeLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> DecodeLimits {
        self.limits
    }
}

impl ImageDecoder for RasterDecoder {
    fn decode(&self, bytes: &[u8]) -> TipmaskResult<PixelBuffer> {
        decode_rgba8(bytes, self.limits)
    }
}

/// Decode `bytes` into RGBA8, synthesizing an opaque alpha channel when the source has none.
pub fn decode_rgba8(bytes: &[u8], limits: DecodeLimits) -> TipmaskResult<PixelBuffer> {
    if bytes.is_empty() {
        return Err(TipmaskError::decode("image bytes are empty"));
    }

    let mut reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| TipmaskError::decode(format!("sniff image format: {e}")))?;
    if reader.format().is_none() {
        return Err(TipmaskError::decode("unrecognized image format"));
    }

    let mut image_limits = image::Limits::default();
    image_limits.max_image_width = Some(limits.max_width);
    image_limits.max_image_height = Some(limits.max_height);
    image_limits.max_alloc = Some(limits.max_alloc_bytes);
    reader.limits(image_limits);

    let dyn_img = reader
        .decode()
        .map_err(|e| TipmaskError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    PixelBuffer::new(width, height, rgba.into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
