//! Bake pipeline error types.

use std::path::PathBuf;

use strata_bounds::BoundsError;
use strata_config::ConfigError;
use strata_heightfield::HeightfieldError;
use strata_tin::TinError;

/// Errors that abort a bake.
#[derive(Debug, thiserror::Error)]
pub enum BakeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Heightfield(#[from] HeightfieldError),

    #[error(transparent)]
    Tin(#[from] TinError),

    #[error(transparent)]
    Bounds(#[from] BoundsError),

    /// Reading the heightmap or writing artifacts failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The heightmap is not a decodable PNG.
    #[error("failed to decode PNG: {0}")]
    Png(#[from] png::DecodingError),

    /// The PNG decodes but is not single-channel grayscale.
    #[error("unsupported PNG format {color_type} at {bit_depth} bits; expected grayscale")]
    UnsupportedPng { color_type: String, bit_depth: u8 },

    /// The source cannot hold a single tile of the configured size.
    #[error("a {width}x{height} source cannot hold one {tile_size}-sample tile")]
    TileSize {
        width: u32,
        height: u32,
        tile_size: u32,
    },

    /// Writing a JSON document failed.
    #[error("failed to encode {what}: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl BakeError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
