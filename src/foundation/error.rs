/// Crate-wide result alias.
pub type TipmaskResult<T> = Result<T, TipmaskError>;

/// Errors produced by the mask compositing pipeline.
///
/// Every stage failure aborts the invocation. The variant is preserved all the way to the caller
/// so a missing mask can be told apart from a bad input image; only [`TipmaskError::user_message`]
/// collapses it into a generic string.
#[derive(thiserror::Error, Debug)]
pub enum TipmaskError {
    /// The referenced object does not exist in the asset store.
    #[error("asset not found: {bucket}/{key}")]
    AssetNotFound {
        /// Storage location (bucket) that was queried.
        bucket: String,
        /// Object key inside the bucket.
        key: String,
    },

    /// Mask template or color image bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A pixel buffer size invariant was violated.
    #[error("dimension precondition violated: {0}")]
    DimensionPrecondition(String),

    /// The composited buffer could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),

    /// Caller input was rejected before any pixel work started.
    #[error("validation error: {0}")]
    Validation(String),

    /// Engine configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// One item of a batch failed under the all-or-nothing policy.
    #[error("batch item {index} failed: {source}")]
    Batch {
        /// Zero-based input index of the first failing item.
        index: usize,
        /// The item's own failure.
        #[source]
        source: Box<TipmaskError>,
    },

    /// Anything else, usually I/O with attached context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse, copyable classification of a [`TipmaskError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`TipmaskError::AssetNotFound`].
    AssetNotFound,
    /// See [`TipmaskError::Decode`].
    Decode,
    /// See [`TipmaskError::DimensionPrecondition`].
    DimensionPrecondition,
    /// See [`TipmaskError::Encode`].
    Encode,
    /// See [`TipmaskError::Validation`].
    Validation,
    /// See [`TipmaskError::Config`].
    Config,
    /// See [`TipmaskError::Other`].
    Other,
}

impl TipmaskError {
    /// Message shown at the outermost user-facing layer.
    pub const GENERIC_MESSAGE: &'static str = "image processing failed";

    /// Build a [`TipmaskError::AssetNotFound`] value.
    pub fn asset_not_found(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::AssetNotFound {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Build a [`TipmaskError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`TipmaskError::DimensionPrecondition`] value.
    pub fn dimension(msg: impl Into<String>) -> Self {
        Self::DimensionPrecondition(msg.into())
    }

    /// Build a [`TipmaskError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`TipmaskError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TipmaskError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap the failure of batch item `index`.
    pub(crate) fn batch(index: usize, source: TipmaskError) -> Self {
        Self::Batch {
            index,
            source: Box::new(source),
        }
    }

    /// Classify this error. Batch failures report the kind of the failing item.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AssetNotFound { .. } => ErrorKind::AssetNotFound,
            Self::Decode(_) => ErrorKind::Decode,
            Self::DimensionPrecondition(_) => ErrorKind::DimensionPrecondition,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Config(_) => ErrorKind::Config,
            Self::Batch { source, .. } => source.kind(),
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// Opaque message for end users. Operators should log the full error instead.
    pub fn user_message(&self) -> &'static str {
        Self::GENERIC_MESSAGE
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
