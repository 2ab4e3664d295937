//! Aggregated periods and the per-segment side table.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::granularity::{AggregationMode, Granularity};
use crate::window::{WindowPair, split_windows};
use crate::SeriesError;

/// One calendar bucket of aggregated metric values, covering `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    /// First day of the bucket.
    pub start: NaiveDate,
    /// First day after the bucket (exclusive).
    pub end: NaiveDate,
    /// Sum or mean of every row in the bucket.
    pub aggregate: f64,
    /// Number of rows that fell into the bucket.
    pub row_count: usize,
}

/// Aggregate of one (dimension, category) segment within one period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentCell {
    /// Sum or mean of the segment's rows in the period.
    pub aggregate: f64,
    /// Number of rows in the segment for the period.
    pub row_count: usize,
    /// Sum of absolute row values in the segment for the period.
    pub volume: f64,
}

type SegmentMap = BTreeMap<String, BTreeMap<String, SegmentCell>>;

/// Ordered periods plus the per-period segment breakdown.
///
/// Produced by [`AggregateConfig::aggregate`](crate::AggregateConfig::aggregate).
/// `periods[i]` and the segment map at position `i` describe the same bucket.
/// Buckets with no rows are absent rather than zero.
#[derive(Debug, Clone)]
pub struct PeriodTable {
    granularity: Granularity,
    mode: AggregationMode,
    periods: Vec<Period>,
    segments: Vec<SegmentMap>,
    categories: BTreeMap<String, BTreeSet<String>>,
}

impl PeriodTable {
    pub(crate) fn new(
        granularity: Granularity,
        mode: AggregationMode,
        periods: Vec<Period>,
        segments: Vec<SegmentMap>,
        categories: BTreeMap<String, BTreeSet<String>>,
    ) -> Self {
        debug_assert_eq!(periods.len(), segments.len());
        Self { granularity, mode, periods, segments, categories }
    }

    /// Return the bucket width the table was built with.
    #[must_use]
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Return the aggregation mode the table was built with.
    #[must_use]
    pub fn mode(&self) -> AggregationMode {
        self.mode
    }

    /// Return the periods ordered by start date.
    #[must_use]
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Return the number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Return true if the table holds no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Return the segment aggregate for `(dimension, category)` in the period
    /// at `period_index`, or `None` when the segment had no rows there.
    #[must_use]
    pub fn segment(&self, period_index: usize, dimension: &str, category: &str) -> Option<&SegmentCell> {
        self.segments
            .get(period_index)?
            .get(dimension)?
            .get(category)
    }

    /// Return the dimension names, sorted.
    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Return every category observed under `dimension` across the whole dataset.
    #[must_use]
    pub fn categories(&self, dimension: &str) -> Option<&BTreeSet<String>> {
        self.categories.get(dimension)
    }

    /// Split the periods into previous and current windows of `window_length`.
    ///
    /// # Errors
    ///
    /// See [`split_windows`].
    pub fn split(&self, window_length: usize) -> Result<WindowPair, SeriesError> {
        split_windows(&self.periods, window_length)
    }
}
