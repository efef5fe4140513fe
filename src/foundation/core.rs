use crate::foundation::error::{TipmaskError, TipmaskResult};
use crate::shape::registry::Shape;

/// Bytes per pixel in every [`PixelBuffer`].
pub const CHANNELS: usize = 4;

/// Straight (non-premultiplied) RGBA8 pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Build a pixel from its straight-alpha channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// From `[r, g, b, a]`.
    pub const fn from_array(px: [u8; 4]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }

    /// As `[r, g, b, a]`.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Row-major RGBA8 image, tightly packed.
///
/// `data.len() == width * height * 4` holds for every value of this type; the only way to build
/// one is through a constructor that checks it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap `data`, checking that it holds exactly `width * height` RGBA8 pixels.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> TipmaskResult<Self> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(TipmaskError::dimension(format!(
                "pixel buffer {width}x{height} expects {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Buffer with every pixel set to `px`.
    pub fn filled(width: u32, height: u32, px: Rgba8) -> TipmaskResult<Self> {
        let count = byte_len(width, height)? / CHANNELS;
        Self::new(width, height, px.to_array().repeat(count))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels, `width * height`.
    pub fn pixel_count(&self) -> usize {
        self.data.len() / CHANNELS
    }

    /// True for zero-area buffers.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when both buffers have the same width and height.
    pub fn same_dimensions(&self, other: &PixelBuffer) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// Raw row-major RGBA8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Pixel at linear index `i` (row-major). Panics when `i >= pixel_count()`.
    pub fn pixel(&self, i: usize) -> Rgba8 {
        let o = i * CHANNELS;
        Rgba8::from_array([
            self.data[o],
            self.data[o + 1],
            self.data[o + 2],
            self.data[o + 3],
        ])
    }

    /// Overwrite the pixel at linear index `i`. Panics when `i >= pixel_count()`.
    pub fn set_pixel(&mut self, i: usize, px: Rgba8) {
        let o = i * CHANNELS;
        self.data[o..o + CHANNELS].copy_from_slice(&px.to_array());
    }

    /// Alpha channel of the pixel at linear index `i`.
    pub fn alpha(&self, i: usize) -> u8 {
        self.data[i * CHANNELS + 3]
    }

    pub fn pixel_at(&self, x: u32, y: u32) -> Rgba8 {
        self.pixel(self.index_of(x, y))
    }

    /// Linear index of `(x, y)`. Does not bounds-check.
    pub fn index_of(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Every pixel in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgba8> + '_ {
        self.data.chunks_exact(CHANNELS).map(|px| {
            Rgba8::from_array([px[0], px[1], px[2], px[3]])
        })
    }
}

pub(crate) fn byte_len(width: u32, height: u32) -> TipmaskResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(CHANNELS))
        .ok_or_else(|| TipmaskError::dimension("pixel buffer size overflow"))
}

/// One unit of preview work: a shape plus the caller's encoded color image.
#[derive(Clone, Debug)]
pub struct CompositeRequest {
    pub shape: Shape,
    pub color_bytes: Vec<u8>,
}

/// Output of the compositor before encoding. Same dimensions as the resolved mask.
pub type CompositeResult = PixelBuffer;

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
