//! Calendar bucketing and per-metric aggregation mode.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::error::SeriesError;

/// Width of a period bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Granularity {
    /// One calendar day.
    Day,
    /// One ISO week, starting on Monday.
    Week,
    /// One calendar month.
    Month,
}

impl Granularity {
    /// Return the first day of the bucket containing `date`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SeriesError::DateOutOfRange`] | The bucket starts before the earliest representable date |
    pub fn bucket_start(self, date: NaiveDate) -> Result<NaiveDate, SeriesError> {
        let start = match self {
            Self::Day => Some(date),
            Self::Week => {
                date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
            }
            Self::Month => date.checked_sub_days(Days::new(u64::from(date.day0()))),
        };
        start.ok_or(SeriesError::DateOutOfRange { date, granularity: self })
    }

    /// Return the start of the bucket following the one that begins at `start`.
    ///
    /// This is the exclusive end of the bucket starting at `start`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SeriesError::DateOutOfRange`] | The next bucket starts after the latest representable date |
    pub fn next_start(self, start: NaiveDate) -> Result<NaiveDate, SeriesError> {
        let next = match self {
            Self::Day => start.checked_add_days(Days::new(1)),
            Self::Week => start.checked_add_days(Days::new(7)),
            Self::Month => start.checked_add_months(Months::new(1)),
        };
        next.ok_or(SeriesError::DateOutOfRange { date: start, granularity: self })
    }

    /// Number of calendar buckets from the bucket starting at `first` to the
    /// bucket starting at `last`, both inclusive. Returns 0 when `last`
    /// precedes `first`.
    #[must_use]
    pub fn bucket_count(self, first: NaiveDate, last: NaiveDate) -> usize {
        if last < first {
            return 0;
        }
        let span = match self {
            Self::Day => (last - first).num_days(),
            Self::Week => (last - first).num_days() / 7,
            Self::Month => {
                let months = |d: NaiveDate| i64::from(d.year()) * 12 + i64::from(d.month0());
                months(last) - months(first)
            }
        };
        usize::try_from(span).map_or(0, |s| s + 1)
    }

    /// Return the lowercase name used on the command line and in output files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(SeriesError::UnknownGranularity { name: s.to_string() }),
        }
    }
}

/// How row values combine within a period.
///
/// Declared by the caller per metric: flow metrics (revenue, orders) sum,
/// ratio and rate metrics average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationMode {
    /// Sum of row values.
    Sum,
    /// Arithmetic mean of row values.
    Mean,
}

impl AggregationMode {
    /// Return the lowercase name used on the command line and in output files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
        }
    }

    /// Combine a running sum and row count into an aggregate.
    pub(crate) fn combine(self, sum: f64, count: usize) -> f64 {
        match self {
            Self::Sum => sum,
            Self::Mean => sum / count as f64,
        }
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationMode {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "mean" => Ok(Self::Mean),
            _ => Err(SeriesError::UnknownAggregationMode { name: s.to_string() }),
        }
    }
}
