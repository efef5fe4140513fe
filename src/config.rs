use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::assets::decode::DecodeLimits;
use crate::foundation::error::{TipmaskError, TipmaskResult};
use crate::session::batch::BatchPolicy;
use crate::shape::registry::{DEFAULT_BUCKET, DEFAULT_MASK_EXTENSION, DEFAULT_MASK_PREFIX};

/// Overrides [`EngineConfig::bucket`] when set.
pub const ENV_BUCKET: &str = "TIPMASK_BUCKET";
/// Overrides [`EngineConfig::asset_root`] when set.
pub const ENV_ASSET_ROOT: &str = "TIPMASK_ASSET_ROOT";

/// Engine settings, usually loaded from a JSON file.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Bucket holding the mask templates.
    pub bucket: String,
    /// Key prefix of the mask templates inside the bucket.
    pub mask_prefix: String,
    /// File extension of the mask templates.
    pub mask_extension: String,
    /// Local directory standing in for the object store (`<root>/<bucket>/<key>`).
    pub asset_root: PathBuf,
    /// Worker threads for batch runs. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Largest accepted width or height of a decoded image.
    pub max_image_dim: u32,
    /// Largest allocation the decoder may make for one image.
    pub max_alloc_bytes: u64,
    /// How a batch reacts to a failing item.
    pub batch_policy: BatchPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let limits = DecodeLimits::default();
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            mask_prefix: DEFAULT_MASK_PREFIX.to_string(),
            mask_extension: DEFAULT_MASK_EXTENSION.to_string(),
            asset_root: PathBuf::from("."),
            threads: None,
            max_image_dim: limits.max_width,
            max_alloc_bytes: limits.max_alloc_bytes,
            batch_policy: BatchPolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> TipmaskResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| TipmaskError::config(format!("parse engine config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> TipmaskResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            TipmaskError::config(format!("open engine config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Apply [`ENV_BUCKET`] and [`ENV_ASSET_ROOT`] from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    pub(crate) fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(bucket) = lookup(ENV_BUCKET).filter(|v| !v.trim().is_empty()) {
            self.bucket = bucket.trim().to_string();
        }
        if let Some(root) = lookup(ENV_ASSET_ROOT).filter(|v| !v.trim().is_empty()) {
            self.asset_root = PathBuf::from(root);
        }
        self
    }

    pub fn validate(&self) -> TipmaskResult<()> {
        if self.bucket.trim().is_empty() {
            return Err(TipmaskError::config("bucket must be non-empty"));
        }
        if self.mask_prefix.trim_matches('/').is_empty() {
            return Err(TipmaskError::config("mask_prefix must be non-empty"));
        }
        if self.mask_extension.trim_start_matches('.').is_empty() {
            return Err(TipmaskError::config("mask_extension must be non-empty"));
        }
        if self.threads == Some(0) {
            return Err(TipmaskError::config("threads must be >= 1 when set"));
        }
        if self.max_image_dim == 0 {
            return Err(TipmaskError::config("max_image_dim must be > 0"));
        }
        if self.max_alloc_bytes == 0 {
            return Err(TipmaskError::config("max_alloc_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_width: self.max_image_dim,
            max_height: self.max_image_dim,
            max_alloc_bytes: self.max_alloc_bytes,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
