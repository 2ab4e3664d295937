//! Attribution of a metric's change to the categorical segments behind it.
//!
//! For each dimension, computes every category's contribution to the overall
//! change between the comparison windows, filters out constant dimensions and
//! low-volume categories, and ranks the survivors across dimensions.

mod config;
mod entry;
mod error;
mod report;

pub use config::DriverConfig;
pub use entry::{CategoryChange, DimensionBreakdown, DriverEntry};
pub use error::DriverError;
pub use report::DriverReport;
