use super::*;
use crate::foundation::error::ErrorKind;

#[test]
fn new_rejects_length_mismatch() {
    let err = PixelBuffer::new(2, 2, vec![0u8; 15]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DimensionPrecondition);

    let ok = PixelBuffer::new(2, 2, vec![0u8; 16]).unwrap();
    assert_eq!(ok.pixel_count(), 4);
    assert_eq!(ok.dimensions(), (2, 2));
}

#[test]
fn new_rejects_overflowing_dimensions() {
    let err = PixelBuffer::new(u32::MAX, u32::MAX, Vec::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DimensionPrecondition);
}

#[test]
fn accessors_address_rgba_channels_in_order() {
    let mut buf = PixelBuffer::filled(3, 2, Rgba8::TRANSPARENT).unwrap();
    let idx = buf.index_of(2, 1);
    assert_eq!(idx, 5);

    buf.set_pixel(idx, Rgba8::new(1, 2, 3, 4));
    assert_eq!(buf.pixel_at(2, 1), Rgba8::new(1, 2, 3, 4));
    assert_eq!(buf.alpha(idx), 4);
    assert_eq!(&buf.as_bytes()[20..24], &[1, 2, 3, 4]);
    assert_eq!(buf.pixels().filter(|p| *p != Rgba8::TRANSPARENT).count(), 1);
}

#[test]
fn zero_area_buffer_is_representable() {
    let buf = PixelBuffer::new(0, 5, Vec::new()).unwrap();
    assert!(buf.is_empty());
    assert_eq!(buf.pixel_count(), 0);
}
