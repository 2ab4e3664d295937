//! End-to-end change analysis for one metric.
//!
//! Wires aggregation, window splitting, change scoring and driver attribution
//! into a single [`AnalysisConfig::run`] call, then adds a data quality
//! assessment and plain-language summaries.

mod error;
mod pipeline;
mod quality;
mod summary;

pub use error::AnalysisError;
pub use pipeline::{Analysis, AnalysisConfig, AnalysisRequest, analyze_batch};
pub use quality::{DataQuality, assess};
pub use summary::{Summary, summarize};
