/// Errors raised while building or (de)serializing a [`BoundTree`](crate::BoundTree).
#[derive(Debug, thiserror::Error)]
pub enum BoundsError {
    /// The tile grid has no tiles.
    #[error("bound tree needs at least one tile, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },

    /// The bound list does not match the grid dimensions.
    #[error("expected {expected} tile bounds, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// JSON encoding or decoding failed.
    #[error("bound tree JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// RON encoding failed.
    #[error("bound tree RON error: {0}")]
    Ron(#[from] ron::Error),
}
