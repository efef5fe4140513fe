use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use sha2::Digest as _;

use crate::foundation::error::{TipmaskError, TipmaskResult};
use crate::shape::registry::MaskReference;

/// Byte source for mask templates, addressed by bucket and key.
///
/// Implementations must report an absent object as [`TipmaskError::AssetNotFound`]. The pipeline
/// never retries.
pub trait AssetStore: Send + Sync {
    fn get(&self, bucket: &str, key: &str) -> TipmaskResult<Vec<u8>>;

    fn get_ref(&self, reference: &MaskReference) -> TipmaskResult<Vec<u8>> {
        self.get(&reference.bucket, &reference.key)
    }
}

/// Filesystem-backed store: `bucket/key` is read from `root/bucket/key`.
#[derive(Clone, Debug)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, bucket: &str, key: &str) -> TipmaskResult<PathBuf> {
        let bucket = normalize_rel_path(bucket)?;
        let key = normalize_rel_path(key)?;
        Ok(self.root.join(bucket).join(key))
    }
}

impl AssetStore for FsAssetStore {
    fn get(&self, bucket: &str, key: &str) -> TipmaskResult<Vec<u8>> {
        let path = self.path_for(bucket, key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TipmaskError::asset_not_found(bucket, key))
            }
            Err(e) => Err(e)
                .with_context(|| format!("read asset bytes from '{}'", path.display()))
                .map_err(TipmaskError::from),
        }
    }
}

/// In-memory store, mostly for tests and embedding callers that already hold the templates.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetStore {
    objects: HashMap<(String, String), Vec<u8>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, bucket: impl Into<String>, key: impl Into<String>, bytes: Vec<u8>) {
        self.objects.insert((bucket.into(), key.into()), bytes);
    }

    pub fn with_object(
        mut self,
        bucket: impl Into<String>,
        key: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.insert(bucket, key, bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl AssetStore for MemoryAssetStore {
    fn get(&self, bucket: &str, key: &str) -> TipmaskResult<Vec<u8>> {
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| TipmaskError::asset_not_found(bucket, key))
    }
}

/// Normalize and validate store-relative paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> TipmaskResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(TipmaskError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(TipmaskError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(TipmaskError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(TipmaskError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

/// Content-addressed key for an encoded preview: `nail/<aa>/<sha256>.png`.
pub fn content_key(encoded: &[u8]) -> String {
    let digest = sha2::Sha256::digest(encoded);
    let mut hex = String::with_capacity(digest.len() * 2);
    for b in digest {
        hex.push_str(&format!("{b:02x}"));
    }
    format!("nail/{}/{hex}.png", &hex[..2])
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
