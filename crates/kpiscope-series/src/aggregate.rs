//! Period aggregation: rows into calendar buckets plus a segment side table.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::error::SeriesError;
use crate::granularity::{AggregationMode, Granularity};
use crate::period::{Period, PeriodTable, SegmentCell};
use crate::row::NormalizedRow;

/// Configuration for period aggregation.
///
/// Construct via [`AggregateConfig::new`], then optionally require enough
/// history for a window length with [`AggregateConfig::with_window_length`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateConfig {
    granularity: Granularity,
    mode: AggregationMode,
    window_length: Option<usize>,
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
    volume: f64,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.volume += value.abs();
    }

    /// Finite values can still overflow once summed.
    fn is_finite(&self) -> bool {
        self.sum.is_finite() && self.volume.is_finite()
    }
}

#[derive(Default)]
struct Bucket {
    total: Accumulator,
    segments: BTreeMap<String, BTreeMap<String, Accumulator>>,
}

impl AggregateConfig {
    /// Create an aggregation config for the given bucket width and mode.
    #[must_use]
    pub fn new(granularity: Granularity, mode: AggregationMode) -> Self {
        Self { granularity, mode, window_length: None }
    }

    /// Require at least `2 * window_length` periods of history.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SeriesError::InvalidWindowLength`] | `window_length` is zero |
    pub fn with_window_length(mut self, window_length: usize) -> Result<Self, SeriesError> {
        if window_length == 0 {
            return Err(SeriesError::InvalidWindowLength { window_length });
        }
        self.window_length = Some(window_length);
        Ok(self)
    }

    /// Return the bucket width.
    #[must_use]
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Return the aggregation mode.
    #[must_use]
    pub fn mode(&self) -> AggregationMode {
        self.mode
    }

    /// Bucket `rows` into periods and compute per-period and per-segment aggregates.
    ///
    /// Every row must carry the same dimension columns as the first row so
    /// that the categories of one dimension partition the rows.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SeriesError::EmptyInput`] | `rows` is empty |
    /// | [`SeriesError::NonFiniteValue`] | A row value is NaN or infinite |
    /// | [`SeriesError::InconsistentDimensions`] | A row's dimension names differ from the first row's |
    /// | [`SeriesError::DateOutOfRange`] | A bucket boundary lies outside the representable calendar |
    /// | [`SeriesError::AggregateOverflow`] | A period or segment sum overflows to infinity |
    /// | [`SeriesError::InsufficientData`] | A window length was set and fewer than twice that many periods exist |
    #[instrument(skip_all, fields(n_rows = rows.len(), granularity = %self.granularity, mode = %self.mode))]
    pub fn aggregate(&self, rows: &[NormalizedRow]) -> Result<PeriodTable, SeriesError> {
        let first = rows.first().ok_or(SeriesError::EmptyInput)?;
        let expected: Vec<&String> = first.dimensions().keys().collect();

        let mut buckets: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
        let mut categories: BTreeMap<String, BTreeSet<String>> = expected
            .iter()
            .map(|name| ((*name).clone(), BTreeSet::new()))
            .collect();

        for (row_index, row) in rows.iter().enumerate() {
            // Rows are validated on construction; re-check at the engine boundary.
            if !row.value().is_finite() {
                return Err(SeriesError::NonFiniteValue {
                    date: row.date(),
                    value: row.value(),
                });
            }
            if !row.dimensions().keys().eq(expected.iter().copied()) {
                return Err(SeriesError::InconsistentDimensions {
                    row_index,
                    expected: expected.iter().map(|s| (*s).clone()).collect(),
                    got: row.dimensions().keys().cloned().collect(),
                });
            }

            let start = self.granularity.bucket_start(row.date())?;
            let bucket = buckets.entry(start).or_default();
            bucket.total.push(row.value());

            for (dimension, category) in row.dimensions() {
                bucket
                    .segments
                    .entry(dimension.clone())
                    .or_default()
                    .entry(category.clone())
                    .or_default()
                    .push(row.value());
                if let Some(seen) = categories.get_mut(dimension) {
                    seen.insert(category.clone());
                }
            }
        }

        let mut periods = Vec::with_capacity(buckets.len());
        let mut segments = Vec::with_capacity(buckets.len());
        for (start, bucket) in buckets {
            let overflowed = !bucket.total.is_finite()
                || bucket
                    .segments
                    .values()
                    .flat_map(BTreeMap::values)
                    .any(|acc| !acc.is_finite());
            if overflowed {
                return Err(SeriesError::AggregateOverflow {
                    start,
                    granularity: self.granularity,
                });
            }

            periods.push(Period {
                start,
                end: self.granularity.next_start(start)?,
                aggregate: self.mode.combine(bucket.total.sum, bucket.total.count),
                row_count: bucket.total.count,
            });
            let cells = bucket
                .segments
                .into_iter()
                .map(|(dimension, by_category)| {
                    let cells = by_category
                        .into_iter()
                        .map(|(category, acc)| {
                            let cell = SegmentCell {
                                aggregate: self.mode.combine(acc.sum, acc.count),
                                row_count: acc.count,
                                volume: acc.volume,
                            };
                            (category, cell)
                        })
                        .collect();
                    (dimension, cells)
                })
                .collect();
            segments.push(cells);
        }

        debug!(
            n_periods = periods.len(),
            n_dimensions = categories.len(),
            "rows bucketed"
        );

        if let Some(window_length) = self.window_length {
            let required = 2 * window_length;
            if periods.len() < required {
                return Err(SeriesError::InsufficientData {
                    required,
                    available: periods.len(),
                });
            }
        }

        info!(n_periods = periods.len(), "period table built");
        Ok(PeriodTable::new(
            self.granularity,
            self.mode,
            periods,
            segments,
            categories,
        ))
    }
}
