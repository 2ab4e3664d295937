//! Quantile binning of continuous numeric dimensions.

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::error::SeriesError;
use crate::row::NormalizedRow;

/// Configuration for replacing continuous dimensions with quantile bins.
///
/// Construct via [`BinningConfig::new`], then chain `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter        | Default |
/// |------------------|---------|
/// | `max_categories` | 20      |
/// | `n_bins`         | 10      |
///
/// A dimension is continuous when every non-empty label in the binned date
/// range parses as a finite number and it has more than `max_categories`
/// distinct values. Bin edges are the `n_bins` quantiles of those values,
/// with repeated edges collapsed, so heavily tied data gets fewer bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinningConfig {
    max_categories: usize,
    n_bins: usize,
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A dimension whose numeric labels were replaced by quantile bins.
#[derive(Debug, Clone, PartialEq)]
pub struct BinnedDimension {
    dimension: String,
    edges: Vec<f64>,
}

impl BinnedDimension {
    /// Return the dimension name.
    #[must_use]
    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    /// Return the strictly increasing bin edges.
    ///
    /// Bin `i` covers `(edges[i], edges[i + 1]]`; bin 0 also holds `edges[0]`.
    #[must_use]
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Return the number of bins.
    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    /// Return the label `{dimension}_bin_{i}` of the bin holding `value`.
    ///
    /// Values beyond the outer edges fall into the first or last bin.
    #[must_use]
    pub fn label(&self, value: f64) -> String {
        let upper = self.edges.get(1..).unwrap_or_default();
        let index = upper
            .partition_point(|&edge| edge < value)
            .min(self.n_bins().saturating_sub(1));
        format!("{}_bin_{index}", self.dimension)
    }
}

/// Output of [`BinningConfig::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct BinnedRows {
    /// Input rows with binned labels substituted.
    pub rows: Vec<NormalizedRow>,
    /// The dimensions that were binned, in name order.
    pub dimensions: Vec<BinnedDimension>,
}

impl BinningConfig {
    /// Create a binning config with default constants.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_categories: 20,
            n_bins: 10,
        }
    }

    /// Set how many distinct values a numeric dimension may have before it is binned.
    #[must_use]
    pub fn with_max_categories(mut self, max_categories: usize) -> Self {
        self.max_categories = max_categories;
        self
    }

    /// Set the number of quantile bins.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SeriesError::InvalidBinning`] | `n_bins` is zero |
    pub fn with_n_bins(mut self, n_bins: usize) -> Result<Self, SeriesError> {
        if n_bins == 0 {
            return Err(SeriesError::InvalidBinning { parameter: "n_bins" });
        }
        self.n_bins = n_bins;
        Ok(self)
    }

    /// Return the distinct-value limit.
    #[must_use]
    pub fn max_categories(&self) -> usize {
        self.max_categories
    }

    /// Return the number of quantile bins.
    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Bin every continuous dimension of `rows`.
    ///
    /// Continuity and bin edges are decided from the rows dated in
    /// `[from, until)`, typically the two comparison windows, so both windows
    /// share the same edges. Every row is relabelled with those edges. Empty
    /// labels are left as they are.
    #[instrument(skip_all, fields(n_rows = rows.len(), %from, %until))]
    pub fn apply(&self, rows: &[NormalizedRow], from: NaiveDate, until: NaiveDate) -> BinnedRows {
        let in_range: Vec<&NormalizedRow> = rows
            .iter()
            .filter(|row| (from..until).contains(&row.date()))
            .collect();
        let dimensions: Vec<BinnedDimension> = rows
            .first()
            .map(|first| {
                first
                    .dimensions()
                    .keys()
                    .filter_map(|dimension| self.bin_dimension(dimension, &in_range))
                    .collect()
            })
            .unwrap_or_default();

        if dimensions.is_empty() {
            return BinnedRows {
                rows: rows.to_vec(),
                dimensions,
            };
        }

        let binned = rows
            .iter()
            .map(|row| {
                dimensions.iter().fold(row.clone(), |row, binned| {
                    match row.category(binned.dimension()).and_then(parse_numeric) {
                        Some(value) => {
                            let label = binned.label(value);
                            row.with_dimension(binned.dimension(), &label)
                        }
                        None => row,
                    }
                })
            })
            .collect();

        info!(n_binned = dimensions.len(), "continuous dimensions binned");
        BinnedRows {
            rows: binned,
            dimensions,
        }
    }

    fn bin_dimension(&self, dimension: &str, rows: &[&NormalizedRow]) -> Option<BinnedDimension> {
        let mut values = Vec::with_capacity(rows.len());
        for row in rows {
            match row.category(dimension) {
                None | Some("") => {}
                Some(label) => values.push(parse_numeric(label)?),
            }
        }
        values.sort_by(f64::total_cmp);

        let mut distinct = values.clone();
        distinct.dedup();
        if distinct.len() <= self.max_categories {
            return None;
        }

        let mut edges: Vec<f64> = (0..=self.n_bins)
            .map(|k| quantile(&values, k as f64 / self.n_bins as f64))
            .collect();
        edges.dedup();
        if edges.len() < 2 {
            return None;
        }

        debug!(dimension, n_distinct = distinct.len(), n_bins = edges.len() - 1, "dimension binned");
        Some(BinnedDimension {
            dimension: dimension.to_string(),
            edges,
        })
    }
}

/// Linearly interpolated quantile of a sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}

fn parse_numeric(label: &str) -> Option<f64> {
    label.parse::<f64>().ok().filter(|v| v.is_finite())
}
