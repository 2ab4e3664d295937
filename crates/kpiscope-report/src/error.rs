//! Error type for the analysis pipeline.

use kpiscope_drivers::DriverError;
use kpiscope_score::ScoreError;
use kpiscope_series::SeriesError;

/// Errors that abort an analysis.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Wraps an aggregation or windowing failure, e.g. insufficient history.
    #[error("{0}")]
    Series(#[from] SeriesError),

    /// Wraps an invalid scoring constant.
    #[error("invalid scoring configuration: {0}")]
    Score(#[from] ScoreError),

    /// Returned when window means or segment aggregates overflow although
    /// every period aggregate is finite.
    #[error("{field} is not finite: metric values are too large to compare")]
    NonFiniteResult {
        /// Name of the first overflowing output field.
        field: &'static str,
    },

    /// Wraps an invalid attribution constant.
    #[error("invalid driver configuration: {0}")]
    Driver(#[from] DriverError),
}
