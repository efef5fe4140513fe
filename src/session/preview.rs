use std::sync::Arc;

use crate::assets::decode::{ImageDecoder, RasterDecoder};
use crate::assets::store::{AssetStore, FsAssetStore};
use crate::config::EngineConfig;
use crate::effects::mask::{composite_masked, mask_coverage};
use crate::encode::png::{ImageEncoder, PngEncoder};
use crate::foundation::core::{CompositeRequest, CompositeResult, PixelBuffer};
use crate::foundation::error::{TipmaskError, TipmaskResult};
use crate::render::resize::resize_nearest;
use crate::shape::registry::{MaskRegistry, Shape};

/// Produces shape-masked previews of uploaded tip images.
///
/// One call runs one linear pipeline:
///
/// 1. resolve the shape's [`MaskReference`](crate::MaskReference)
/// 2. fetch and decode the mask template
/// 3. decode the color image
/// 4. nearest-neighbor resize the color image to the mask's dimensions
/// 5. composite
/// 6. encode
///
/// Any stage failure aborts the call; there is no partial output. The engine holds no
/// per-invocation state and can be shared across threads.
#[derive(Clone)]
pub struct PreviewEngine {
    registry: MaskRegistry,
    store: Arc<dyn AssetStore>,
    decoder: Arc<dyn ImageDecoder>,
    encoder: Arc<dyn ImageEncoder>,
}

impl std::fmt::Debug for PreviewEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewEngine")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl PreviewEngine {
    /// Engine over `store` with the default registry, decoder and PNG encoder.
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self {
            registry: MaskRegistry::default(),
            store,
            decoder: Arc::new(RasterDecoder::default()),
            encoder: Arc::new(PngEncoder),
        }
    }

    /// Filesystem-backed engine rooted at `cfg.asset_root`.
    pub fn from_config(cfg: &EngineConfig) -> TipmaskResult<Self> {
        cfg.validate()?;
        Ok(Self {
            registry: MaskRegistry::from_config(cfg)?,
            store: Arc::new(FsAssetStore::new(&cfg.asset_root)),
            decoder: Arc::new(RasterDecoder::new(cfg.decode_limits())),
            encoder: Arc::new(PngEncoder),
        })
    }

    pub fn with_registry(mut self, registry: MaskRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn ImageDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn ImageEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn registry(&self) -> &MaskRegistry {
        &self.registry
    }

    pub fn encoder(&self) -> &dyn ImageEncoder {
        self.encoder.as_ref()
    }

    /// Fetch and decode the mask template for `shape`.
    #[tracing::instrument(skip(self))]
    pub fn load_mask(&self, shape: Shape) -> TipmaskResult<PixelBuffer> {
        let reference = self.registry.resolve(shape);
        let bytes = self.store.get_ref(&reference)?;
        let mask = self
            .decoder
            .decode(&bytes)
            .map_err(|e| label_decode(e, format_args!("mask '{reference}'")))?;
        let coverage = mask_coverage(&mask);
        tracing::debug!(
            %reference,
            width = mask.width(),
            height = mask.height(),
            interior = coverage.interior,
            "mask loaded"
        );
        Ok(mask)
    }

    /// Run the pipeline up to, but not including, encoding.
    #[tracing::instrument(skip(self, color_bytes), fields(input_len = color_bytes.len()))]
    pub fn composite(&self, shape: Shape, color_bytes: &[u8]) -> TipmaskResult<CompositeResult> {
        let mask = self.load_mask(shape)?;
        let color = self
            .decoder
            .decode(color_bytes)
            .map_err(|e| label_decode(e, "color image"))?;
        tracing::debug!(
            width = color.width(),
            height = color.height(),
            "color image decoded"
        );
        composite_with_mask(&mask, color)
    }

    /// Produce the encoded preview for `shape` from the caller's encoded color image.
    #[tracing::instrument(skip(self, color_bytes), fields(input_len = color_bytes.len()))]
    pub fn generate_preview(&self, shape: Shape, color_bytes: &[u8]) -> TipmaskResult<Vec<u8>> {
        let composited = self.composite(shape, color_bytes)?;
        self.encoder.encode(&composited)
    }

    pub fn run(&self, request: &CompositeRequest) -> TipmaskResult<Vec<u8>> {
        self.generate_preview(request.shape, &request.color_bytes)
    }
}

/// Resize `color` to the mask's size, then composite.
pub fn composite_with_mask(mask: &PixelBuffer, color: PixelBuffer) -> TipmaskResult<PixelBuffer> {
    let resized = resize_nearest(color, mask.width(), mask.height())?;
    if !resized.same_dimensions(mask) {
        return Err(TipmaskError::dimension(format!(
            "resize produced {}x{}, mask is {}x{}",
            resized.width(),
            resized.height(),
            mask.width(),
            mask.height()
        )));
    }
    composite_masked(mask, resized)
}

fn label_decode(err: TipmaskError, what: impl std::fmt::Display) -> TipmaskError {
    match err {
        TipmaskError::Decode(msg) => TipmaskError::decode(format!("{what}: {msg}")),
        other => other,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/preview.rs"]
mod tests;
