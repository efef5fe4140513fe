use std::io::Cursor;

use super::*;
use crate::foundation::core::Rgba8;
use crate::foundation::error::ErrorKind;

fn encode_png(img: image::DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_keeps_straight_alpha() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50u8, 200u8, 128u8]).unwrap();
    let bytes = encode_png(image::DynamicImage::ImageRgba8(img));

    let buf = RasterDecoder::default().decode(&bytes).unwrap();
    assert_eq!(buf.dimensions(), (1, 1));
    assert_eq!(buf.as_bytes(), &[100, 50, 200, 128]);
}

#[test]
fn decode_rgb_synthesizes_opaque_alpha() {
    let img = image::RgbImage::from_raw(2, 1, vec![10, 20, 30, 40, 50, 60]).unwrap();
    let bytes = encode_png(image::DynamicImage::ImageRgb8(img));

    let buf = RasterDecoder::default().decode(&bytes).unwrap();
    assert_eq!(buf.pixel(0), Rgba8::new(10, 20, 30, 255));
    assert_eq!(buf.pixel(1), Rgba8::new(40, 50, 60, 255));
}

#[test]
fn decode_rejects_garbage_and_empty_input() {
    let decoder = RasterDecoder::default();
    assert_eq!(decoder.decode(&[]).unwrap_err().kind(), ErrorKind::Decode);
    assert_eq!(
        decoder.decode(b"definitely not an image").unwrap_err().kind(),
        ErrorKind::Decode
    );

    let mut truncated = encode_png(image::DynamicImage::ImageRgba8(image::RgbaImage::new(8, 8)));
    truncated.truncate(truncated.len() / 2);
    assert_eq!(decoder.decode(&truncated).unwrap_err().kind(), ErrorKind::Decode);
}

#[test]
fn decode_enforces_dimension_limits() {
    let bytes = encode_png(image::DynamicImage::ImageRgba8(image::RgbaImage::new(32, 4)));
    let decoder = RasterDecoder::new(DecodeLimits {
        max_width: 16,
        ..DecodeLimits::default()
    });
    assert_eq!(decoder.decode(&bytes).unwrap_err().kind(), ErrorKind::Decode);
}
