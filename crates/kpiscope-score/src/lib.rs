//! Level and trend change scoring between two comparison windows.
//!
//! Computes noise-normalized effect sizes for the shift in a metric's mean
//! and linear slope, maps them onto an ordered strength scale, and flags
//! whether the signal looks trustworthy.

mod config;
mod direction;
mod effect;
mod error;
mod label;
mod metrics;
pub mod stats;

pub use config::ScoreConfig;
pub use direction::Direction;
pub use effect::EffectSize;
pub use error::ScoreError;
pub use label::{LabelThresholds, StrengthLabel};
pub use metrics::ChangeMetrics;
