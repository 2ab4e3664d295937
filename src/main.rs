use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use kpiscope_drivers::DriverConfig;
use kpiscope_io::{ExperimentName, NormalizeOptions, ResultWriter, TableReader, normalize};
use kpiscope_report::{Analysis, AnalysisConfig, AnalysisError, AnalysisRequest, analyze_batch};
use kpiscope_score::{LabelThresholds, ScoreConfig};
use kpiscope_series::{AggregationMode, BinningConfig, Granularity};

#[derive(Parser)]
#[command(name = "kpiscope")]
#[command(about = "Explain KPI changes: level and trend scoring with segment attribution")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Scoring and attribution constants.
#[derive(Args, Debug, Clone)]
struct TuningArgs {
    /// Relative change below which the direction is reported as flat
    #[arg(long, default_value_t = 0.01)]
    flat_threshold: f64,

    /// Effect size at which a change becomes "minor"
    #[arg(long, default_value_t = 0.2)]
    minor: f64,

    /// Effect size at which a change becomes "moderate"
    #[arg(long, default_value_t = 0.5)]
    moderate: f64,

    /// Effect size at which a change becomes "strong"
    #[arg(long, default_value_t = 0.8)]
    strong: f64,

    /// Coefficient of variation above which the current window is volatile
    #[arg(long, default_value_t = 0.5)]
    volatility_ceiling: f64,

    /// Minimum share of a dimension's volume for a segment to be ranked
    #[arg(long, default_value_t = 0.01)]
    min_volume_share: f64,

    /// Number of top drivers to report
    #[arg(long, default_value_t = 10)]
    top_k: usize,

    /// Replace continuous numeric dimensions with quantile bins
    #[arg(long)]
    bin_continuous: bool,

    /// Number of quantile bins per continuous dimension
    #[arg(long, default_value_t = 10)]
    bins: usize,

    /// Distinct numeric values above which a dimension counts as continuous
    #[arg(long, default_value_t = 20)]
    max_categories: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Compare the latest window of each metric with the one before it
    Analyze {
        /// Path to the input CSV file (wide or long layout)
        #[arg(long)]
        data: PathBuf,

        /// Metric to analyze (repeat for several metrics)
        #[arg(long = "metric", required = true)]
        metrics: Vec<String>,

        /// Period size: day, week or month
        #[arg(long)]
        granularity: Granularity,

        /// Number of periods per comparison window
        #[arg(long)]
        window: usize,

        /// How rows combine within a period: sum (flows) or mean (rates)
        #[arg(long)]
        mode: AggregationMode,

        /// Dimension column (repeat for several; default: inferred from the table)
        #[arg(long = "dimension")]
        dimensions: Vec<String>,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        tuning: TuningArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct AnalyzeOutput {
    experiment: String,
    output: PathBuf,
    analyses: Vec<MetricOutput>,
}

#[derive(Serialize)]
struct MetricOutput {
    metric: String,
    direction: &'static str,
    previous_mean: f64,
    current_mean: f64,
    abs_delta: f64,
    rel_delta: Option<f64>,
    level_label: &'static str,
    trend_label: &'static str,
    trustworthy: bool,
    completeness: f64,
    change_summary: String,
    driver_summary: String,
    top_drivers: Vec<DriverOutput>,
    binned_dimensions: Vec<String>,
}

#[derive(Serialize)]
struct DriverOutput {
    dimension: String,
    category: String,
    impact_pct: f64,
    abs_contribution: f64,
}

impl From<&Analysis> for MetricOutput {
    fn from(analysis: &Analysis) -> Self {
        let m = &analysis.metrics;
        Self {
            metric: analysis.metric_name.clone(),
            direction: m.direction.as_str(),
            previous_mean: m.previous_mean,
            current_mean: m.current_mean,
            abs_delta: m.abs_delta,
            rel_delta: m.rel_delta,
            level_label: m.level_label.as_str(),
            trend_label: m.trend_label.as_str(),
            trustworthy: m.trustworthy,
            completeness: analysis.quality.completeness,
            change_summary: analysis.summary.change.clone(),
            driver_summary: analysis.summary.drivers.clone(),
            top_drivers: analysis
                .drivers
                .top()
                .iter()
                .map(|d| DriverOutput {
                    dimension: d.dimension.clone(),
                    category: d.category.clone(),
                    impact_pct: d.impact_pct,
                    abs_contribution: d.abs_contribution,
                })
                .collect(),
            binned_dimensions: analysis
                .binned_dimensions
                .iter()
                .map(|b| b.dimension().to_string())
                .collect(),
        }
    }
}

fn build_config(
    metric: &str,
    granularity: Granularity,
    window: usize,
    mode: AggregationMode,
    tuning: &TuningArgs,
) -> Result<AnalysisConfig, AnalysisError> {
    let thresholds = LabelThresholds::new(tuning.minor, tuning.moderate, tuning.strong)?;
    let score = ScoreConfig::new()
        .with_flat_threshold(tuning.flat_threshold)?
        .with_thresholds(thresholds)
        .with_volatility_ceiling(tuning.volatility_ceiling)?;
    let drivers = DriverConfig::new()
        .with_min_volume_share(tuning.min_volume_share)?
        .with_top_k(tuning.top_k)?;
    let mut config = AnalysisConfig::new(granularity, window, mode)?
        .with_metric_name(metric)
        .with_score_config(score)
        .with_driver_config(drivers);
    if tuning.bin_continuous {
        let binning = BinningConfig::new()
            .with_n_bins(tuning.bins)?
            .with_max_categories(tuning.max_categories);
        config = config.with_binning(binning);
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Analyze {
            data,
            metrics,
            granularity,
            window,
            mode,
            dimensions,
            experiment,
            output_dir,
            tuning,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            let table = TableReader::new(&data)
                .read()
                .context("failed to read input CSV")?;

            let mut inputs = Vec::with_capacity(metrics.len());
            for metric in &metrics {
                let mut options = NormalizeOptions::new(metric.as_str());
                if !dimensions.is_empty() {
                    options = options.with_dimensions(dimensions.clone());
                }
                let rows = normalize(&table, &options)
                    .with_context(|| format!("failed to prepare rows for metric \"{metric}\""))?;
                let config = build_config(metric, granularity, window, mode, &tuning)
                    .context("invalid analysis configuration")?;
                inputs.push((config, rows));
            }

            let requests: Vec<AnalysisRequest<'_>> = inputs
                .iter()
                .map(|(config, rows)| AnalysisRequest { config, rows })
                .collect();
            let analyses = analyze_batch(&requests)
                .into_iter()
                .zip(&metrics)
                .map(|(result, metric)| {
                    result.with_context(|| format!("analysis of metric \"{metric}\" failed"))
                })
                .collect::<Result<Vec<Analysis>>>()?;

            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            let output_path = writer.write_analyses(&analyses)?;

            let output = AnalyzeOutput {
                experiment,
                output: output_path,
                analyses: analyses.iter().map(MetricOutput::from).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
