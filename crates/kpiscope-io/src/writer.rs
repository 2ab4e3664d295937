//! JSON result writer for analysis outputs.

use std::fs;
use std::path::{Path, PathBuf};

use kpiscope_drivers::{CategoryChange, DimensionBreakdown, DriverEntry};
use kpiscope_report::Analysis;
use kpiscope_score::EffectSize;
use kpiscope_series::{BinnedDimension, Window};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::ExperimentName;
use crate::IoError;

/// Writes analysis results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_analysis.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Return the path [`write_analyses`](Self::write_analyses) writes to.
    #[must_use]
    pub fn analysis_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_analysis.json", self.experiment.as_str()))
    }

    /// Write analyses to `{experiment}_analysis.json` and return its path.
    ///
    /// Unbounded effect sizes are written as a `null` value with the
    /// `unbounded` field set to `"positive"` or `"negative"`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all, fields(n_analyses = analyses.len()))]
    pub fn write_analyses(&self, analyses: &[Analysis]) -> Result<PathBuf, IoError> {
        let path = self.analysis_path();

        let artifact = AnalysisArtifact {
            experiment: self.experiment.as_str(),
            analyses: analyses.iter().map(AnalysisEntry::from).collect(),
        };

        let json = serde_json::to_string_pretty(&artifact).expect("serialization cannot fail");
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "analysis result written");
        Ok(path)
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct AnalysisArtifact<'a> {
    experiment: &'a str,
    analyses: Vec<AnalysisEntry<'a>>,
}

#[derive(Serialize)]
struct AnalysisEntry<'a> {
    metric: &'a str,
    granularity: &'static str,
    aggregation: &'static str,
    window_length: usize,
    windows: WindowsEntry,
    period_comparison: ComparisonEntry,
    change_strength: StrengthEntry,
    reliability: ReliabilityEntry<'a>,
    any_change_detected: bool,
    notes: &'a [String],
    drivers: DriversEntry<'a>,
    binned_dimensions: Vec<BinnedEntry<'a>>,
    data_quality: QualityEntry<'a>,
    summary: SummaryEntry<'a>,
}

#[derive(Serialize)]
struct WindowsEntry {
    previous: WindowEntry,
    current: WindowEntry,
}

#[derive(Serialize)]
struct WindowEntry {
    start: String,
    end: String,
    periods: usize,
}

#[derive(Serialize)]
struct ComparisonEntry {
    previous_mean: f64,
    current_mean: f64,
    abs_delta: f64,
    rel_delta: Option<f64>,
    direction: &'static str,
}

#[derive(Serialize)]
struct StrengthEntry {
    level_score: ScoreEntry,
    trend_score: ScoreEntry,
    level_label: &'static str,
    trend_label: &'static str,
    previous_slope: f64,
    current_slope: f64,
    slope_delta: f64,
    slope_direction_changed: bool,
}

#[derive(Serialize)]
struct ScoreEntry {
    value: Option<f64>,
    unbounded: Option<&'static str>,
}

#[derive(Serialize)]
struct ReliabilityEntry<'a> {
    trustworthy: bool,
    current_cv: Option<f64>,
    note: &'a str,
}

#[derive(Serialize)]
struct DriversEntry<'a> {
    top_k: usize,
    top: Vec<DriverRow<'a>>,
    entries: Vec<DriverRow<'a>>,
    excluded_dimensions: &'a [String],
    breakdowns: Vec<BreakdownEntry<'a>>,
    notes: &'a [String],
}

#[derive(Serialize)]
struct BinnedEntry<'a> {
    dimension: &'a str,
    edges: &'a [f64],
}

impl<'a> From<&'a BinnedDimension> for BinnedEntry<'a> {
    fn from(binned: &'a BinnedDimension) -> Self {
        Self {
            dimension: binned.dimension(),
            edges: binned.edges(),
        }
    }
}

#[derive(Serialize)]
struct DriverRow<'a> {
    dimension: &'a str,
    category: &'a str,
    impact_pct: f64,
    abs_contribution: f64,
    direction: &'static str,
    strength: &'static str,
    previous_agg: f64,
    current_agg: f64,
    volume_share: f64,
    effect_size: ScoreEntry,
}

#[derive(Serialize)]
struct BreakdownEntry<'a> {
    dimension: &'a str,
    delta_sum: f64,
    residual: f64,
    categories: Vec<CategoryRow<'a>>,
}

#[derive(Serialize)]
struct CategoryRow<'a> {
    category: &'a str,
    previous_agg: f64,
    current_agg: f64,
    delta: f64,
    volume_share: f64,
    direction: &'static str,
    strength: &'static str,
    effect_size: ScoreEntry,
}

#[derive(Serialize)]
struct QualityEntry<'a> {
    completeness: f64,
    observed_periods: usize,
    expected_periods: usize,
    warnings: &'a [String],
}

#[derive(Serialize)]
struct SummaryEntry<'a> {
    change: &'a str,
    drivers: &'a str,
}

impl From<EffectSize> for ScoreEntry {
    fn from(score: EffectSize) -> Self {
        let unbounded = match score {
            EffectSize::Finite(_) => None,
            EffectSize::Unbounded { positive: true } => Some("positive"),
            EffectSize::Unbounded { positive: false } => Some("negative"),
        };
        Self {
            value: score.value(),
            unbounded,
        }
    }
}

impl From<&Window> for WindowEntry {
    fn from(window: &Window) -> Self {
        Self {
            start: window.start().to_string(),
            end: window.end().to_string(),
            periods: window.len(),
        }
    }
}

impl<'a> From<&'a DriverEntry> for DriverRow<'a> {
    fn from(entry: &'a DriverEntry) -> Self {
        Self {
            dimension: &entry.dimension,
            category: &entry.category,
            impact_pct: entry.impact_pct,
            abs_contribution: entry.abs_contribution,
            direction: entry.direction.as_str(),
            strength: entry.strength.as_str(),
            previous_agg: entry.previous_agg,
            current_agg: entry.current_agg,
            volume_share: entry.volume_share,
            effect_size: entry.effect_size.into(),
        }
    }
}

impl<'a> From<&'a CategoryChange> for CategoryRow<'a> {
    fn from(change: &'a CategoryChange) -> Self {
        Self {
            category: &change.category,
            previous_agg: change.previous_agg,
            current_agg: change.current_agg,
            delta: change.delta,
            volume_share: change.volume_share,
            direction: change.direction.as_str(),
            strength: change.strength.as_str(),
            effect_size: change.effect_size.into(),
        }
    }
}

impl<'a> From<&'a DimensionBreakdown> for BreakdownEntry<'a> {
    fn from(breakdown: &'a DimensionBreakdown) -> Self {
        Self {
            dimension: &breakdown.dimension,
            delta_sum: breakdown.delta_sum,
            residual: breakdown.residual,
            categories: breakdown.categories.iter().map(CategoryRow::from).collect(),
        }
    }
}

impl<'a> From<&'a Analysis> for AnalysisEntry<'a> {
    fn from(analysis: &'a Analysis) -> Self {
        let m = &analysis.metrics;
        let drivers = &analysis.drivers;
        Self {
            metric: &analysis.metric_name,
            granularity: analysis.granularity.as_str(),
            aggregation: analysis.mode.as_str(),
            window_length: analysis.windows.window_length(),
            windows: WindowsEntry {
                previous: (&analysis.windows.previous).into(),
                current: (&analysis.windows.current).into(),
            },
            period_comparison: ComparisonEntry {
                previous_mean: m.previous_mean,
                current_mean: m.current_mean,
                abs_delta: m.abs_delta,
                rel_delta: m.rel_delta,
                direction: m.direction.as_str(),
            },
            change_strength: StrengthEntry {
                level_score: m.level_score.into(),
                trend_score: m.trend_score.into(),
                level_label: m.level_label.as_str(),
                trend_label: m.trend_label.as_str(),
                previous_slope: m.previous_slope,
                current_slope: m.current_slope,
                slope_delta: m.slope_delta,
                slope_direction_changed: m.slope_direction_changed,
            },
            reliability: ReliabilityEntry {
                trustworthy: m.trustworthy,
                current_cv: m.current_cv,
                note: &m.reliability_note,
            },
            any_change_detected: m.any_change_detected,
            notes: &m.notes,
            drivers: DriversEntry {
                top_k: drivers.top_k(),
                top: drivers.top().iter().map(DriverRow::from).collect(),
                entries: drivers.entries().iter().map(DriverRow::from).collect(),
                excluded_dimensions: drivers.excluded_dimensions(),
                breakdowns: drivers.breakdowns().iter().map(BreakdownEntry::from).collect(),
                notes: drivers.notes(),
            },
            binned_dimensions: analysis.binned_dimensions.iter().map(BinnedEntry::from).collect(),
            data_quality: QualityEntry {
                completeness: analysis.quality.completeness,
                observed_periods: analysis.quality.observed_periods,
                expected_periods: analysis.quality.expected_periods,
                warnings: &analysis.quality.warnings,
            },
            summary: SummaryEntry {
                change: &analysis.summary.change,
                drivers: &analysis.summary.drivers,
            },
        }
    }
}
