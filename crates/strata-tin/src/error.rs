//! Configuration errors for LOD extraction and snapshot packing.

/// Errors reported before or during LOD extraction.
///
/// All of these are caller mistakes; none is transient or retryable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TinError {
    /// A threshold at or below the error floor would never terminate.
    #[error("LOD threshold {threshold} must be greater than the error floor {floor}")]
    ThresholdBelowFloor {
        /// Offending threshold.
        threshold: f32,
        /// Configured minimum error of the triangulator.
        floor: f32,
    },

    /// Error thresholds must strictly decrease from coarse to fine.
    #[error("LOD thresholds must strictly decrease: {previous} then {next}")]
    ThresholdsNotDescending {
        /// Earlier threshold.
        previous: f32,
        /// Threshold that did not decrease.
        next: f32,
    },

    /// Triangle budgets must strictly increase from coarse to fine.
    #[error("LOD triangle budgets must strictly increase and be non-zero: {previous} then {next}")]
    BudgetsNotAscending {
        /// Earlier budget.
        previous: usize,
        /// Budget that did not increase.
        next: usize,
    },

    /// The LOD schedule has no levels.
    #[error("LOD schedule is empty")]
    EmptySchedule,

    /// Grid coordinates do not fit the two-byte packed vertex format.
    #[error("a {width}x{height} grid cannot be packed into byte coordinates (max {max})")]
    GridTooLarge {
        /// Grid width in samples.
        width: i32,
        /// Grid height in samples.
        height: i32,
        /// Largest supported edge length.
        max: i32,
    },
}
