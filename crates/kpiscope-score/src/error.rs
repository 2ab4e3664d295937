//! Error types for scoring configuration.

/// Errors from building a [`ScoreConfig`](crate::ScoreConfig) or
/// [`LabelThresholds`](crate::LabelThresholds).
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    /// Returned when label cutoffs are negative, non-finite or out of order.
    #[error("label cutoffs must be finite, non-negative and non-decreasing, got minor={minor}, moderate={moderate}, strong={strong}")]
    InvalidThresholds {
        /// Cutoff for the minor label.
        minor: f64,
        /// Cutoff for the moderate label.
        moderate: f64,
        /// Cutoff for the strong label.
        strong: f64,
    },

    /// Returned when the flat threshold is negative or non-finite.
    #[error("flat threshold must be finite and non-negative, got {value}")]
    InvalidFlatThreshold {
        /// The rejected value.
        value: f64,
    },

    /// Returned when the volatility ceiling is negative or non-finite.
    #[error("volatility ceiling must be finite and non-negative, got {value}")]
    InvalidVolatilityCeiling {
        /// The rejected value.
        value: f64,
    },
}
