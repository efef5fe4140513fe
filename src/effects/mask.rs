use crate::foundation::core::{PixelBuffer, Rgba8};
use crate::foundation::error::{TipmaskError, TipmaskResult};

/// Mask alpha strictly below this value marks the silhouette interior.
///
/// With byte alpha this means exactly `0`: the template is treated as a binary silhouette and any
/// non-zero alpha, however faint, counts as exterior.
pub const MASK_INTERIOR_ALPHA_LIMIT: u8 = 1;

/// Whether a mask pixel with this alpha lets the color image through.
#[inline]
pub fn is_interior(mask_alpha: u8) -> bool {
    mask_alpha < MASK_INTERIOR_ALPHA_LIMIT
}

/// Keep `color` where `mask` is transparent, clear it to `(0,0,0,0)` everywhere else.
///
/// Both buffers must already have identical dimensions; a mismatch is a
/// [`TipmaskError::DimensionPrecondition`] and is never corrected here. Interior pixels are copied
/// byte-for-byte, there is no blending. The color buffer is consumed and becomes the output.
pub fn composite_masked(mask: &PixelBuffer, color: PixelBuffer) -> TipmaskResult<PixelBuffer> {
    if !mask.same_dimensions(&color) {
        return Err(TipmaskError::dimension(format!(
            "composite expects matching dimensions, mask is {}x{} and color is {}x{}",
            mask.width(),
            mask.height(),
            color.width(),
            color.height()
        )));
    }

    let mut out = color;
    for i in 0..mask.pixel_count() {
        if !is_interior(mask.alpha(i)) {
            out.set_pixel(i, Rgba8::TRANSPARENT);
        }
    }
    Ok(out)
}

/// Pixel counts on each side of a mask's silhouette.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct MaskCoverage {
    pub interior: usize,
    pub exterior: usize,
}

impl MaskCoverage {
    pub fn total(self) -> usize {
        self.interior + self.exterior
    }
}

pub fn mask_coverage(mask: &PixelBuffer) -> MaskCoverage {
    let interior = mask.pixels().filter(|px| is_interior(px.a)).count();
    MaskCoverage {
        interior,
        exterior: mask.pixel_count() - interior,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/mask.rs"]
mod tests;
