use std::io::Cursor;

use super::*;
use crate::assets::store::MemoryAssetStore;
use crate::foundation::core::Rgba8;
use crate::foundation::error::ErrorKind;

fn png_bytes(buf: &PixelBuffer) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(buf.width(), buf.height(), buf.as_bytes().to_vec())
        .unwrap();
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

/// 4x4 mask, transparent only at (1,1) and (2,2).
fn diagonal_mask() -> PixelBuffer {
    let mut mask = PixelBuffer::filled(4, 4, Rgba8::new(255, 255, 255, 255)).unwrap();
    for (x, y) in [(1, 1), (2, 2)] {
        let i = mask.index_of(x, y);
        mask.set_pixel(i, Rgba8::TRANSPARENT);
    }
    mask
}

fn engine_with(shape: Shape, mask: &PixelBuffer) -> PreviewEngine {
    let reference = MaskRegistry::default().resolve(shape);
    let store = MemoryAssetStore::new().with_object(reference.bucket, reference.key, png_bytes(mask));
    PreviewEngine::new(Arc::new(store))
}

#[test]
fn red_2x2_through_diagonal_mask() {
    let engine = engine_with(Shape::Round, &diagonal_mask());
    let red = PixelBuffer::filled(2, 2, Rgba8::new(255, 0, 0, 255)).unwrap();

    let out = engine.composite(Shape::Round, &png_bytes(&red)).unwrap();
    assert_eq!(out.dimensions(), (4, 4));
    for y in 0..4 {
        for x in 0..4 {
            let expected = if x == y && (x == 1 || x == 2) {
                Rgba8::new(255, 0, 0, 255)
            } else {
                Rgba8::TRANSPARENT
            };
            assert_eq!(out.pixel_at(x, y), expected);
        }
    }
}

#[test]
fn generate_preview_encodes_composite() {
    let engine = engine_with(Shape::Square, &diagonal_mask());
    let red = PixelBuffer::filled(2, 2, Rgba8::new(255, 0, 0, 255)).unwrap();
    let bytes = png_bytes(&red);

    let encoded = engine.generate_preview(Shape::Square, &bytes).unwrap();
    let composited = engine.composite(Shape::Square, &bytes).unwrap();
    assert_eq!(encoded, PngEncoder.encode(&composited).unwrap());

    let request = CompositeRequest {
        shape: Shape::Square,
        color_bytes: bytes,
    };
    assert_eq!(engine.run(&request).unwrap(), encoded);
}

#[test]
fn missing_mask_is_asset_not_found() {
    let engine = engine_with(Shape::Round, &diagonal_mask());
    let red = PixelBuffer::filled(2, 2, Rgba8::new(255, 0, 0, 255)).unwrap();
    let err = engine
        .generate_preview(Shape::Almond, &png_bytes(&red))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AssetNotFound);
    assert!(err.to_string().contains("base/almond.png"));
}

#[test]
fn bad_color_image_is_decode_error() {
    let engine = engine_with(Shape::Round, &diagonal_mask());
    let err = engine.generate_preview(Shape::Round, b"nope").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().contains("color image"));
}

#[test]
fn corrupt_mask_is_decode_error_naming_the_mask() {
    let reference = MaskRegistry::default().resolve(Shape::Round);
    let store = MemoryAssetStore::new().with_object(reference.bucket, reference.key, b"junk".to_vec());
    let engine = PreviewEngine::new(Arc::new(store));
    let red = PixelBuffer::filled(1, 1, Rgba8::new(255, 0, 0, 255)).unwrap();

    let err = engine.generate_preview(Shape::Round, &png_bytes(&red)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().contains("base/round.png"));
}

#[test]
fn composite_with_mask_conforms_any_input_size() {
    let mask = diagonal_mask();
    for (w, h) in [(1, 1), (3, 9), (4, 4), (17, 5)] {
        let color = PixelBuffer::filled(w, h, Rgba8::new(1, 2, 3, 4)).unwrap();
        let out = composite_with_mask(&mask, color).unwrap();
        assert_eq!(out.dimensions(), mask.dimensions());
    }
}

#[test]
fn custom_registry_points_at_other_keys() {
    let registry = MaskRegistry::new("b", "masks", "png").unwrap();
    let store = MemoryAssetStore::new().with_object("b", "masks/almond.png", png_bytes(&diagonal_mask()));
    let engine = PreviewEngine::new(Arc::new(store)).with_registry(registry);
    assert_eq!(engine.load_mask(Shape::Almond).unwrap(), diagonal_mask());
}

#[derive(Clone, Default)]
struct SpanNames(Arc<std::sync::Mutex<Vec<&'static str>>>);

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for SpanNames {
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        self.0.lock().unwrap().push(attrs.metadata().name());
    }
}

#[test]
fn generate_preview_opens_its_own_span() {
    use tracing_subscriber::layer::SubscriberExt as _;

    let engine = engine_with(Shape::Round, &diagonal_mask());
    let red = png_bytes(&PixelBuffer::filled(2, 2, Rgba8::new(255, 0, 0, 255)).unwrap());
    let names = SpanNames::default();
    let subscriber = tracing_subscriber::registry().with(names.clone());

    tracing::subscriber::with_default(subscriber, || {
        engine.generate_preview(Shape::Round, &red).unwrap();
    });

    let names = names.0.lock().unwrap();
    assert!(names.contains(&"generate_preview"));
    assert!(names.contains(&"composite"));
}
