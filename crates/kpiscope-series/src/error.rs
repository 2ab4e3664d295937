//! Error types for row validation, aggregation and window splitting.

/// Errors from building the period table and comparison windows.
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    /// Returned when there are fewer periods than two full windows need.
    #[error("insufficient data: {required} periods required, {available} available")]
    InsufficientData {
        /// Minimum number of periods required (twice the window length).
        required: usize,
        /// Number of periods actually present.
        available: usize,
    },

    /// Returned when a window length of zero is requested.
    #[error("window length must be at least 1, got {window_length}")]
    InvalidWindowLength {
        /// The invalid window length.
        window_length: usize,
    },

    /// Returned when aggregation is asked to process zero rows.
    #[error("no rows to aggregate")]
    EmptyInput,

    /// Returned when a row value is NaN or infinite.
    #[error("non-finite metric value {value} on {date}")]
    NonFiniteValue {
        /// Date of the offending row.
        date: chrono::NaiveDate,
        /// The rejected value.
        value: f64,
    },

    /// Returned when summing finite row values overflows a period or segment aggregate.
    #[error("aggregate overflow in the {granularity} starting {start}: values are too large to sum")]
    AggregateOverflow {
        /// Start of the affected period.
        start: chrono::NaiveDate,
        /// Bucket size of the period.
        granularity: crate::Granularity,
    },

    /// Returned when a bucket boundary falls outside the representable calendar.
    #[error("date {date} is too close to the calendar limits for {granularity} buckets")]
    DateOutOfRange {
        /// The date whose bucket could not be computed.
        date: chrono::NaiveDate,
        /// Bucket size being computed.
        granularity: crate::Granularity,
    },

    /// Returned when a binning constant is zero.
    #[error("binning {parameter} must be at least 1")]
    InvalidBinning {
        /// Name of the rejected constant.
        parameter: &'static str,
    },

    /// Returned when a row does not carry the same dimension columns as the first row.
    #[error("row {row_index} has dimensions {got:?}, expected {expected:?}")]
    InconsistentDimensions {
        /// Zero-based index of the offending row.
        row_index: usize,
        /// Dimension names taken from the first row.
        expected: Vec<String>,
        /// Dimension names found on the offending row.
        got: Vec<String>,
    },

    /// Returned when a granularity name is not one of day, week or month.
    #[error("unknown granularity \"{name}\" (expected day, week or month)")]
    UnknownGranularity {
        /// The unrecognized name.
        name: String,
    },

    /// Returned when an aggregation mode name is not sum or mean.
    #[error("unknown aggregation mode \"{name}\" (expected sum or mean)")]
    UnknownAggregationMode {
        /// The unrecognized name.
        name: String,
    },
}
