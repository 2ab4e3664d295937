//! I/O error types for kpiscope-io.

use std::path::PathBuf;

/// Errors from file I/O, CSV parsing, normalization, and result serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when two header cells carry the same column name.
    #[error("duplicate column \"{column}\" in {path}")]
    DuplicateColumn {
        /// Path to the CSV file.
        path: PathBuf,
        /// The repeated column name.
        column: String,
    },

    /// Returned when the table has no `date` column.
    #[error("missing required column \"date\"")]
    MissingDateColumn,

    /// Returned when a wide table has no column named after the metric.
    #[error("metric \"{metric}\" not found; available columns: {available:?}")]
    MetricNotFound {
        /// The requested metric.
        metric: String,
        /// Columns present in the table.
        available: Vec<String>,
    },

    /// Returned when no row carries the requested metric.
    #[error("no data found for metric \"{metric}\"")]
    NoRowsForMetric {
        /// The requested metric.
        metric: String,
    },

    /// Returned when a date cell is not `YYYY-MM-DD` (optionally followed by a time).
    #[error("unparseable date \"{raw}\" in row {row_index}")]
    UnparseableDate {
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// The raw cell.
        raw: String,
    },

    /// Returned when a metric cell is empty, unparseable, NaN, or infinite.
    #[error("invalid value \"{raw}\" in row {row_index}, column \"{column}\": expected a finite number")]
    InvalidValue {
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Column holding the value.
        column: String,
        /// The raw cell.
        raw: String,
    },

    /// Returned when a requested dimension is `date`, the metric column, or a long-format column.
    #[error("column \"{column}\" is reserved and cannot be used as a dimension")]
    ReservedDimension {
        /// The reserved column.
        column: String,
    },

    /// Returned when a requested dimension is not a column of the table.
    #[error("dimension column \"{column}\" not found")]
    UnknownDimension {
        /// The missing column.
        column: String,
    },

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
