/// Errors from building a [`DriverConfig`](crate::DriverConfig).
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Returned when the minimum volume share is outside `[0, 1]`.
    #[error("minimum volume share must be within [0, 1], got {value}")]
    InvalidMinVolumeShare {
        /// The rejected value.
        value: f64,
    },

    /// Returned when the presentation cutoff is zero.
    #[error("top_k must be at least 1, got {top_k}")]
    InvalidTopK {
        /// The rejected value.
        top_k: usize,
    },
}
