use crate::foundation::core::{CHANNELS, PixelBuffer, byte_len};
use crate::foundation::error::{TipmaskError, TipmaskResult};

/// Rescale `source` to exactly `target_width x target_height` by nearest-neighbor sampling.
///
/// Destination pixel `(x, y)` copies source pixel
/// `(floor(x * src_w / dst_w), floor(y * src_h / dst_h))` verbatim. No interpolation happens, so
/// every output pixel is a byte-exact copy of some input pixel and the compositor's hard mask
/// edge never meets blended color.
///
/// A zero-area source or target is rejected. A source already at the target size is returned
/// as-is.
pub fn resize_nearest(
    source: PixelBuffer,
    target_width: u32,
    target_height: u32,
) -> TipmaskResult<PixelBuffer> {
    let (src_w, src_h) = source.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(TipmaskError::dimension(format!(
            "resize source must be non-empty, got {src_w}x{src_h}"
        )));
    }
    if target_width == 0 || target_height == 0 {
        return Err(TipmaskError::dimension(format!(
            "resize target must be non-empty, got {target_width}x{target_height}"
        )));
    }
    if (src_w, src_h) == (target_width, target_height) {
        return Ok(source);
    }

    let src = source.as_bytes();
    let src_stride = src_w as usize * CHANNELS;
    let mut out = Vec::with_capacity(byte_len(target_width, target_height)?);

    let src_xs: Vec<usize> = (0..target_width)
        .map(|x| nearest_index(x, src_w, target_width) * CHANNELS)
        .collect();

    for y in 0..target_height {
        let row = nearest_index(y, src_h, target_height) * src_stride;
        for &sx in &src_xs {
            out.extend_from_slice(&src[row + sx..row + sx + CHANNELS]);
        }
    }

    PixelBuffer::new(target_width, target_height, out)
}

fn nearest_index(dst: u32, src_len: u32, dst_len: u32) -> usize {
    let i = (u64::from(dst) * u64::from(src_len)) / u64::from(dst_len);
    i.min(u64::from(src_len) - 1) as usize
}

#[cfg(test)]
#[path = "../../tests/unit/render/resize.rs"]
mod tests;
