//! Normalized metric rows, period aggregation and comparison windows.
//!
//! Pure data library with zero I/O. Buckets rows into day/week/month periods,
//! keeps a per-(dimension, category) side table for attribution, and carves
//! the ordered period sequence into previous/current comparison windows.
//! Continuous numeric dimensions can be replaced by shared quantile bins
//! before aggregation.

mod aggregate;
mod binning;
mod error;
mod granularity;
mod period;
mod row;
mod window;

pub use aggregate::AggregateConfig;
pub use binning::{BinnedDimension, BinnedRows, BinningConfig};
pub use error::SeriesError;
pub use granularity::{AggregationMode, Granularity};
pub use period::{Period, PeriodTable, SegmentCell};
pub use row::NormalizedRow;
pub use window::{Window, WindowPair, split_windows};
