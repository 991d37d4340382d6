//! Heightfield construction errors.

/// Errors raised while building or windowing a heightfield.
#[derive(Debug, thiserror::Error)]
pub enum HeightfieldError {
    /// One of the grid dimensions is zero or below the two-sample minimum.
    #[error("heightfield must be at least 2x2 samples, got {width}x{height}")]
    EmptyGrid {
        /// Requested width in samples.
        width: u32,
        /// Requested height in samples.
        height: u32,
    },

    /// The sample buffer does not hold `width * height` values.
    #[error("expected {expected} samples, got {actual}")]
    SizeMismatch {
        /// `width * height`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },

    /// A tile window does not fit inside the source grid.
    #[error("tile at ({x}, {y}) with size {size} exceeds the {width}x{height} source")]
    TileOutOfRange {
        /// Sample-space x origin of the window.
        x: u32,
        /// Sample-space y origin of the window.
        y: u32,
        /// Window edge length in samples.
        size: u32,
        /// Source width in samples.
        width: u32,
        /// Source height in samples.
        height: u32,
    },
}
