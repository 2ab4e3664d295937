//! Attribution configuration and the per-dimension decomposition.

use kpiscope_score::stats::{self, pooled_std};
use kpiscope_score::{Direction, EffectSize, ScoreConfig};
use kpiscope_series::{AggregationMode, PeriodTable, SegmentCell, Window, WindowPair};
use tracing::{debug, info, instrument};

use crate::entry::{CategoryChange, DimensionBreakdown, DriverEntry};
use crate::error::DriverError;
use crate::report::DriverReport;

/// Configuration for driver attribution.
///
/// Construct via [`DriverConfig::new`], then chain `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter          | Default                  |
/// |--------------------|--------------------------|
/// | `min_volume_share` | 0.01                     |
/// | `top_k`            | 10                       |
/// | `score`            | [`ScoreConfig::default`] |
///
/// The flat threshold and label cutoffs of `score` classify each category's
/// own change, on the same scale as the overall metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverConfig {
    min_volume_share: f64,
    top_k: usize,
    score: ScoreConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Category aggregate over one window plus the per-period values behind it.
struct WindowSlice {
    aggregate: f64,
    values: Vec<f64>,
    volume: f64,
}

impl DriverConfig {
    /// Create an attribution config with default constants.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_volume_share: 0.01,
            top_k: 10,
            score: ScoreConfig::new(),
        }
    }

    /// Set the minimum combined volume share a category needs to be ranked.
    /// A share exactly at the threshold is kept.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DriverError::InvalidMinVolumeShare`] | Outside `[0, 1]` or NaN |
    pub fn with_min_volume_share(mut self, min_volume_share: f64) -> Result<Self, DriverError> {
        if !(0.0..=1.0).contains(&min_volume_share) {
            return Err(DriverError::InvalidMinVolumeShare { value: min_volume_share });
        }
        self.min_volume_share = min_volume_share;
        Ok(self)
    }

    /// Set how many ranked entries [`DriverReport::top`] returns.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DriverError::InvalidTopK`] | `top_k` is zero |
    pub fn with_top_k(mut self, top_k: usize) -> Result<Self, DriverError> {
        if top_k == 0 {
            return Err(DriverError::InvalidTopK { top_k });
        }
        self.top_k = top_k;
        Ok(self)
    }

    /// Set the flat threshold and label cutoffs used for per-category labels.
    #[must_use]
    pub fn with_score_config(mut self, score: ScoreConfig) -> Self {
        self.score = score;
        self
    }

    /// Return the minimum volume share.
    #[must_use]
    pub fn min_volume_share(&self) -> f64 {
        self.min_volume_share
    }

    /// Return the presentation cutoff.
    #[must_use]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Attribute `total_delta` (the overall change in per-period mean) to the
    /// categories of every dimension in `table`.
    ///
    /// In sum mode a category's window aggregate is its average contribution
    /// per period (absent periods count as zero), so the deltas of one
    /// dimension add up to `total_delta`. In mean mode it is the mean of the
    /// periods where the category is present.
    ///
    /// A `total_delta` within rounding error of zero counts as no change:
    /// every impact percentage is 0 and a note says so.
    #[instrument(skip_all, fields(n_periods = table.len(), total_delta = total_delta))]
    pub fn attribute(&self, table: &PeriodTable, windows: &WindowPair, total_delta: f64) -> DriverReport {
        let mode = table.mode();
        let mut entries = Vec::new();
        let mut breakdowns = Vec::new();
        let mut excluded_dimensions = Vec::new();
        let mut notes = Vec::new();

        let unchanged = stats::is_negligible(
            total_delta,
            stats::mean(&windows.previous.values()),
            stats::mean(&windows.current.values()),
        );
        if unchanged {
            notes.push(
                "the metric did not change overall; impact percentages are reported as 0".to_string(),
            );
        }

        for dimension in table.dimensions() {
            let Some(categories) = table.categories(dimension) else {
                continue;
            };
            if categories.len() <= 1 {
                debug!(dimension, "constant dimension excluded");
                excluded_dimensions.push(dimension.to_string());
                continue;
            }

            let mut changes: Vec<CategoryChange> = categories
                .iter()
                .map(|category| self.category_change(table, windows, mode, dimension, category))
                .collect();

            let total_volume: f64 = changes.iter().map(|c| c.volume).sum();
            for change in &mut changes {
                change.volume_share = if total_volume > 0.0 {
                    change.volume / total_volume
                } else {
                    0.0
                };
            }

            let delta_sum: f64 = changes.iter().map(|c| c.delta).sum();
            let residual = total_delta - delta_sum;
            debug!(dimension, delta_sum, residual, "dimension decomposed");

            entries.extend(
                changes
                    .iter()
                    .filter(|c| c.volume_share >= self.min_volume_share)
                    .map(|c| DriverEntry {
                        dimension: dimension.to_string(),
                        category: c.category.clone(),
                        impact_pct: if unchanged {
                            0.0
                        } else {
                            100.0 * c.delta / total_delta
                        },
                        abs_contribution: c.delta,
                        direction: c.direction,
                        strength: c.strength,
                        previous_agg: c.previous_agg,
                        current_agg: c.current_agg,
                        volume_share: c.volume_share,
                        effect_size: c.effect_size,
                    }),
            );

            breakdowns.push(DimensionBreakdown {
                dimension: dimension.to_string(),
                categories: changes,
                delta_sum,
                residual,
            });
        }

        entries.sort_by(|a, b| {
            b.impact_pct
                .abs()
                .total_cmp(&a.impact_pct.abs())
                .then_with(|| a.dimension.cmp(&b.dimension))
                .then_with(|| a.category.cmp(&b.category))
        });

        info!(
            n_entries = entries.len(),
            n_dimensions = breakdowns.len(),
            n_excluded = excluded_dimensions.len(),
            "drivers ranked"
        );

        DriverReport {
            entries,
            breakdowns,
            excluded_dimensions,
            top_k: self.top_k,
            notes,
        }
    }

    fn category_change(
        &self,
        table: &PeriodTable,
        windows: &WindowPair,
        mode: AggregationMode,
        dimension: &str,
        category: &str,
    ) -> CategoryChange {
        let previous = window_slice(table, &windows.previous, mode, dimension, category);
        let current = window_slice(table, &windows.current, mode, dimension, category);

        let delta = current.aggregate - previous.aggregate;
        let effect_size = EffectSize::from_ratio(delta, pooled_std(&previous.values, &current.values));
        let direction = Direction::classify(
            delta,
            stats::relative_change(delta, previous.aggregate),
            self.score.flat_threshold(),
        );

        CategoryChange {
            category: category.to_string(),
            previous_agg: previous.aggregate,
            current_agg: current.aggregate,
            delta,
            volume: previous.volume + current.volume,
            volume_share: 0.0,
            effect_size,
            strength: effect_size.label(self.score.thresholds()),
            direction,
        }
    }
}

fn window_slice(
    table: &PeriodTable,
    window: &Window,
    mode: AggregationMode,
    dimension: &str,
    category: &str,
) -> WindowSlice {
    let cells: Vec<Option<&SegmentCell>> = window
        .positions()
        .map(|i| table.segment(i, dimension, category))
        .collect();

    match mode {
        AggregationMode::Sum => {
            let values: Vec<f64> = cells
                .iter()
                .map(|c| c.map_or(0.0, |c| c.aggregate))
                .collect();
            WindowSlice {
                aggregate: stats::mean(&values),
                volume: cells.iter().flatten().map(|c| c.volume).sum(),
                values,
            }
        }
        AggregationMode::Mean => {
            let values: Vec<f64> = cells.iter().flatten().map(|c| c.aggregate).collect();
            WindowSlice {
                aggregate: stats::mean(&values),
                volume: cells.iter().flatten().map(|c| c.row_count as f64).sum(),
                values,
            }
        }
    }
}
