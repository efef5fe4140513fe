//! Tipmask turns an uploaded nail tip image into a shape-masked preview.
//!
//! Given a [`Shape`] and encoded color image bytes, the engine fetches that shape's silhouette
//! template, resizes the color image to the template's size with nearest-neighbor sampling, keeps
//! color only where the template is fully transparent, and encodes the result as PNG.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: `Shape -> MaskReference` ([`MaskRegistry`], exhaustive, no I/O)
//! 2. **Fetch + decode**: mask bytes from an [`AssetStore`], decoded by an [`ImageDecoder`]
//! 3. **Resize**: [`resize_nearest`] to the mask's dimensions
//! 4. **Composite**: [`composite_masked`] with a binary (`alpha == 0`) interior test
//! 5. **Encode**: deterministic lossless PNG via [`ImageEncoder`]
//!
//! [`PreviewEngine::generate_preview`] runs all of it; [`PreviewEngine::generate_batch`] fans a
//! batch out over a rayon pool under an explicit [`BatchPolicy`].
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: same shape and bytes in, same bytes out.
//! - **Straight alpha**: buffers are never premultiplied, interior pixels are copied verbatim.
//! - **Typed failures**: every stage error keeps its [`ErrorKind`] up to the caller.
#![forbid(unsafe_code)]

mod assets;
mod effects;
mod encode;
mod foundation;
mod render;
mod session;
mod shape;

/// Engine configuration loading.
pub mod config;

pub use assets::decode::{DecodeLimits, ImageDecoder, RasterDecoder, decode_rgba8};
pub use assets::store::{
    AssetStore, FsAssetStore, MemoryAssetStore, content_key, normalize_rel_path,
};
pub use config::EngineConfig;
pub use effects::mask::{
    MASK_INTERIOR_ALPHA_LIMIT, MaskCoverage, composite_masked, is_interior, mask_coverage,
};
pub use encode::png::{ImageEncoder, PngEncoder, encode_png};
pub use foundation::core::{CHANNELS, CompositeRequest, CompositeResult, PixelBuffer, Rgba8};
pub use foundation::error::{ErrorKind, TipmaskError, TipmaskResult};
pub use render::resize::resize_nearest;
pub use session::batch::{BatchOpts, BatchPolicy, BatchReport};
pub use session::preview::{PreviewEngine, composite_with_mask};
pub use shape::registry::{
    DEFAULT_BUCKET, DEFAULT_MASK_EXTENSION, DEFAULT_MASK_PREFIX, MaskReference, MaskRegistry,
    Shape, resolve_mask,
};
