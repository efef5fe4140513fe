use std::fmt;
use std::str::FromStr;

use crate::config::EngineConfig;
use crate::foundation::error::{TipmaskError, TipmaskResult};

/// Bucket holding the mask templates when nothing else is configured.
pub const DEFAULT_BUCKET: &str = "nailian-assets";
/// Key prefix shared by every mask template.
pub const DEFAULT_MASK_PREFIX: &str = "base";
/// File extension of the mask templates.
pub const DEFAULT_MASK_EXTENSION: &str = "png";

/// Nail outline identifiers. Closed set; every variant has a mask template.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shape {
    Round,
    Square,
    Stiletto,
    Ballerina,
    Almond,
}

impl Shape {
    pub const ALL: [Shape; 5] = [
        Shape::Round,
        Shape::Square,
        Shape::Stiletto,
        Shape::Ballerina,
        Shape::Almond,
    ];

    /// Lowercase asset name used in mask keys.
    pub fn slug(self) -> &'static str {
        match self {
            Shape::Round => "round",
            Shape::Square => "square",
            Shape::Stiletto => "stiletto",
            Shape::Ballerina => "ballerina",
            Shape::Almond => "almond",
        }
    }

    /// Identifier as stored by the dashboard (`ROUND`, `SQUARE`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Shape::Round => "ROUND",
            Shape::Square => "SQUARE",
            Shape::Stiletto => "STILETTO",
            Shape::Ballerina => "BALLERINA",
            Shape::Almond => "ALMOND",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Shape {
    type Err = TipmaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Shape::ALL
            .into_iter()
            .find(|shape| shape.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| TipmaskError::validation(format!("unknown nail shape '{s}'")))
    }
}

/// Where a shape's mask template lives.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct MaskReference {
    pub bucket: String,
    pub key: String,
}

impl fmt::Display for MaskReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Maps every [`Shape`] to its [`MaskReference`].
///
/// Keys follow `<prefix>/<slug>.<extension>`. The mapping is total: adding a `Shape` variant
/// without a slug does not compile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskRegistry {
    bucket: String,
    prefix: String,
    extension: String,
}

impl Default for MaskRegistry {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            prefix: DEFAULT_MASK_PREFIX.to_string(),
            extension: DEFAULT_MASK_EXTENSION.to_string(),
        }
    }
}

impl MaskRegistry {
    pub fn new(
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        extension: impl Into<String>,
    ) -> TipmaskResult<Self> {
        let bucket = bucket.into();
        let prefix = prefix.into().trim_matches('/').to_string();
        let extension = extension.into().trim_start_matches('.').to_string();
        if bucket.is_empty() {
            return Err(TipmaskError::validation("mask bucket must be non-empty"));
        }
        if prefix.is_empty() {
            return Err(TipmaskError::validation("mask prefix must be non-empty"));
        }
        if extension.is_empty() {
            return Err(TipmaskError::validation("mask extension must be non-empty"));
        }
        Ok(Self {
            bucket,
            prefix,
            extension,
        })
    }

    pub fn from_config(cfg: &EngineConfig) -> TipmaskResult<Self> {
        Self::new(&cfg.bucket, &cfg.mask_prefix, &cfg.mask_extension)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn resolve(&self, shape: Shape) -> MaskReference {
        MaskReference {
            bucket: self.bucket.clone(),
            key: format!("{}/{}.{}", self.prefix, shape.slug(), self.extension),
        }
    }

    /// Every shape with its reference, in [`Shape::ALL`] order.
    pub fn entries(&self) -> impl Iterator<Item = (Shape, MaskReference)> + '_ {
        Shape::ALL.into_iter().map(|s| (s, self.resolve(s)))
    }
}

/// Resolve against the default registry.
pub fn resolve_mask(shape: Shape) -> MaskReference {
    MaskRegistry::default().resolve(shape)
}

#[cfg(test)]
#[path = "../../tests/unit/shape/registry.rs"]
mod tests;
