//! Analysis configuration and the end-to-end run.

use kpiscope_drivers::{DriverConfig, DriverReport};
use kpiscope_score::{ChangeMetrics, ScoreConfig};
use kpiscope_series::{
    AggregateConfig, AggregationMode, BinnedDimension, BinningConfig, Granularity, NormalizedRow,
    WindowPair,
};
use rayon::prelude::*;
use tracing::{info, instrument};

use crate::error::AnalysisError;
use crate::quality::{DataQuality, assess};
use crate::summary::{Summary, summarize};

/// Configuration for one metric analysis.
///
/// Construct via [`AnalysisConfig::new`], then chain `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter     | Default                   |
/// |---------------|---------------------------|
/// | `metric_name` | `"metric"`                |
/// | `score`       | [`ScoreConfig::default`]  |
/// | `drivers`     | [`DriverConfig::default`] |
/// | `binning`     | off                       |
///
/// The score config also governs per-category labels during attribution,
/// replacing whatever score config `drivers` carries.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    metric_name: String,
    aggregate: AggregateConfig,
    window_length: usize,
    score: ScoreConfig,
    drivers: DriverConfig,
    binning: Option<BinningConfig>,
}

impl AnalysisConfig {
    /// Create a new analysis configuration.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AnalysisError::Series`] | `window_length` is zero |
    pub fn new(
        granularity: Granularity,
        window_length: usize,
        mode: AggregationMode,
    ) -> Result<Self, AnalysisError> {
        let aggregate = AggregateConfig::new(granularity, mode).with_window_length(window_length)?;
        Ok(Self {
            metric_name: "metric".to_string(),
            aggregate,
            window_length,
            score: ScoreConfig::new(),
            drivers: DriverConfig::new(),
            binning: None,
        })
    }

    /// Set the metric name used in summaries and output.
    #[must_use]
    pub fn with_metric_name(mut self, metric_name: impl Into<String>) -> Self {
        self.metric_name = metric_name.into();
        self
    }

    /// Set the change scoring constants.
    #[must_use]
    pub fn with_score_config(mut self, score: ScoreConfig) -> Self {
        self.score = score;
        self
    }

    /// Set the attribution constants.
    #[must_use]
    pub fn with_driver_config(mut self, drivers: DriverConfig) -> Self {
        self.drivers = drivers;
        self
    }

    /// Replace continuous numeric dimensions with quantile bins shared by
    /// both comparison windows.
    #[must_use]
    pub fn with_binning(mut self, binning: BinningConfig) -> Self {
        self.binning = Some(binning);
        self
    }

    /// Return the metric name.
    #[must_use]
    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }

    /// Return the bucket size.
    #[must_use]
    pub fn granularity(&self) -> Granularity {
        self.aggregate.granularity()
    }

    /// Return the aggregation mode.
    #[must_use]
    pub fn mode(&self) -> AggregationMode {
        self.aggregate.mode()
    }

    /// Return the number of periods per comparison window.
    #[must_use]
    pub fn window_length(&self) -> usize {
        self.window_length
    }

    /// Run the full analysis over `rows`.
    ///
    /// Identical rows and configuration always produce an identical [`Analysis`].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AnalysisError::Series`] | No rows, a non-finite value, rows with differing dimensions, an overflowing period sum, or fewer than `2 * window_length` periods |
    /// | [`AnalysisError::NonFiniteResult`] | Window means, deltas or segment aggregates overflow |
    #[instrument(skip_all, fields(
        metric = %self.metric_name,
        granularity = %self.aggregate.granularity(),
        mode = %self.aggregate.mode(),
        window_length = self.window_length,
        n_rows = rows.len(),
    ))]
    pub fn run(&self, rows: &[NormalizedRow]) -> Result<Analysis, AnalysisError> {
        let mut table = self.aggregate.aggregate(rows)?;
        let mut windows = table.split(self.window_length)?;

        let mut binned_dimensions = Vec::new();
        if let Some(binning) = &self.binning {
            let binned = binning.apply(rows, windows.previous.start(), windows.current.end());
            if !binned.dimensions.is_empty() {
                // Dates are unchanged, so the periods and windows stay the same.
                table = self.aggregate.aggregate(&binned.rows)?;
                windows = table.split(self.window_length)?;
                binned_dimensions = binned.dimensions;
            }
        }

        let metrics = self.score.score(&windows);
        ensure_finite_metrics(&metrics)?;
        let drivers = self
            .drivers
            .with_score_config(self.score)
            .attribute(&table, &windows, metrics.abs_delta);
        ensure_finite_drivers(&drivers)?;
        let quality = assess(&table, &windows);
        let summary = summarize(&self.metric_name, &metrics, drivers.entries());

        info!(
            direction = %metrics.direction,
            level = %metrics.level_label,
            trend = %metrics.trend_label,
            n_drivers = drivers.entries().len(),
            "analysis complete"
        );

        Ok(Analysis {
            metric_name: self.metric_name.clone(),
            granularity: self.aggregate.granularity(),
            mode: self.aggregate.mode(),
            windows,
            metrics,
            drivers,
            binned_dimensions,
            quality,
            summary,
        })
    }
}

fn ensure_finite_metrics(metrics: &ChangeMetrics) -> Result<(), AnalysisError> {
    let fields = [
        ("previous_mean", metrics.previous_mean),
        ("current_mean", metrics.current_mean),
        ("abs_delta", metrics.abs_delta),
        ("rel_delta", metrics.rel_delta.unwrap_or(0.0)),
        ("previous_slope", metrics.previous_slope),
        ("current_slope", metrics.current_slope),
        ("slope_delta", metrics.slope_delta),
    ];
    match fields.into_iter().find(|(_, v)| !v.is_finite()) {
        Some((field, _)) => Err(AnalysisError::NonFiniteResult { field }),
        None => Ok(()),
    }
}

fn ensure_finite_drivers(drivers: &DriverReport) -> Result<(), AnalysisError> {
    for change in drivers.breakdowns().iter().flat_map(|b| &b.categories) {
        let fields = [
            ("previous_agg", change.previous_agg),
            ("current_agg", change.current_agg),
            ("category_delta", change.delta),
            ("volume_share", change.volume_share),
        ];
        if let Some((field, _)) = fields.into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(AnalysisError::NonFiniteResult { field });
        }
    }
    Ok(())
}

/// Everything computed for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Name of the analyzed metric.
    pub metric_name: String,
    /// Bucket size used.
    pub granularity: Granularity,
    /// Aggregation mode used.
    pub mode: AggregationMode,
    /// The compared windows.
    pub windows: WindowPair,
    /// Level and trend change scores.
    pub metrics: ChangeMetrics,
    /// Segment attribution.
    pub drivers: DriverReport,
    /// Dimensions whose numeric labels were replaced by quantile bins.
    pub binned_dimensions: Vec<BinnedDimension>,
    /// Calendar coverage.
    pub quality: DataQuality,
    /// Plain-language description.
    pub summary: Summary,
}

/// One independent analysis: a configuration and the rows it reads.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    /// Configuration for this request.
    pub config: &'a AnalysisConfig,
    /// Rows for this request's metric.
    pub rows: &'a [NormalizedRow],
}

/// Run independent requests in parallel on the current rayon pool.
///
/// Results come back in request order; one failing request does not affect
/// the others.
#[instrument(skip_all, fields(n_requests = requests.len()))]
pub fn analyze_batch(requests: &[AnalysisRequest<'_>]) -> Vec<Result<Analysis, AnalysisError>> {
    requests
        .par_iter()
        .map(|request| request.config.run(request.rows))
        .collect()
}
