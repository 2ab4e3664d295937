//! Per-category change records.

use kpiscope_score::{Direction, EffectSize, StrengthLabel};

/// Change of one category between the windows, before any filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryChange {
    /// Category label.
    pub category: String,
    /// Category aggregate over the previous window.
    pub previous_agg: f64,
    /// Category aggregate over the current window.
    pub current_agg: f64,
    /// `current_agg - previous_agg`.
    pub delta: f64,
    /// Volume across both windows (absolute values in sum mode, rows in mean mode).
    pub volume: f64,
    /// `volume` over the dimension's total volume.
    pub volume_share: f64,
    /// `delta` over the category's pooled std across its periods.
    pub effect_size: EffectSize,
    /// Label of `effect_size`.
    pub strength: StrengthLabel,
    /// Direction of `delta` after the flat threshold.
    pub direction: Direction,
}

/// Every category of one dimension, unfiltered.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionBreakdown {
    /// Dimension name.
    pub dimension: String,
    /// All categories observed in the dataset, sorted by label.
    pub categories: Vec<CategoryChange>,
    /// Sum of `delta` over all categories.
    pub delta_sum: f64,
    /// Overall change minus `delta_sum`. Zero up to rounding in sum mode.
    pub residual: f64,
}

/// A (dimension, category) segment credited with part of the overall change.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverEntry {
    /// Dimension name.
    pub dimension: String,
    /// Category label.
    pub category: String,
    /// Share of the overall change, in percent, signed.
    pub impact_pct: f64,
    /// Contribution to the overall change in metric units, signed.
    pub abs_contribution: f64,
    /// Direction of the category's own change.
    pub direction: Direction,
    /// Strength of the category's own change.
    pub strength: StrengthLabel,
    /// Category aggregate over the previous window.
    pub previous_agg: f64,
    /// Category aggregate over the current window.
    pub current_agg: f64,
    /// Combined volume share within the dimension.
    pub volume_share: f64,
    /// The category's own effect size.
    pub effect_size: EffectSize,
}
