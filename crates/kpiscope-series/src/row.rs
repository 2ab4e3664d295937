//! The normalized input row consumed by the engine.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::SeriesError;

/// One observation of a metric: a date, a finite value and its category
/// label under every dimension.
///
/// Rows sharing the same date and labels are allowed; they aggregate by sum
/// within a period and category.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    date: NaiveDate,
    value: f64,
    dimensions: BTreeMap<String, String>,
}

impl NormalizedRow {
    /// Create a row, rejecting non-finite values.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SeriesError::NonFiniteValue`] | `value` is NaN or infinite |
    pub fn new(
        date: NaiveDate,
        value: f64,
        dimensions: BTreeMap<String, String>,
    ) -> Result<Self, SeriesError> {
        if !value.is_finite() {
            return Err(SeriesError::NonFiniteValue { date, value });
        }
        Ok(Self { date, value, dimensions })
    }

    /// Create a row with no dimension columns.
    ///
    /// # Errors
    ///
    /// Same as [`NormalizedRow::new`].
    pub fn plain(date: NaiveDate, value: f64) -> Result<Self, SeriesError> {
        Self::new(date, value, BTreeMap::new())
    }

    /// Return a copy of this row with `dimension` set to `category`.
    #[must_use]
    pub fn with_dimension(mut self, dimension: &str, category: &str) -> Self {
        self.dimensions.insert(dimension.to_string(), category.to_string());
        self
    }

    /// Return the observation date.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Return the metric value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Return every dimension name mapped to this row's category label.
    #[must_use]
    pub fn dimensions(&self) -> &BTreeMap<String, String> {
        &self.dimensions
    }

    /// Return this row's category under `dimension`, if the column exists.
    #[must_use]
    pub fn category(&self, dimension: &str) -> Option<&str> {
        self.dimensions.get(dimension).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn rejects_nan() {
        let result = NormalizedRow::plain(date(), f64::NAN);
        assert!(matches!(result, Err(SeriesError::NonFiniteValue { .. })));
    }

    #[test]
    fn rejects_infinity() {
        let result = NormalizedRow::plain(date(), f64::NEG_INFINITY);
        assert!(matches!(result, Err(SeriesError::NonFiniteValue { .. })));
    }

    #[test]
    fn with_dimension_sets_category() {
        let row = NormalizedRow::plain(date(), 3.5)
            .unwrap()
            .with_dimension("region", "north");
        assert_eq!(row.category("region"), Some("north"));
        assert_eq!(row.category("channel"), None);
        assert_eq!(row.value(), 3.5);
    }
}
