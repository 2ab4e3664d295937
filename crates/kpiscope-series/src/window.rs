//! Previous/current comparison windows drawn by position.

use std::ops::Range;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::SeriesError;
use crate::period::Period;

/// An ordered run of consecutive observed periods.
///
/// `start` is the first period's start. `end` is exclusive: for a current
/// window it is the last period's end, for a previous window it is the start
/// of the current window, so the two windows always abut.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    start: NaiveDate,
    end: NaiveDate,
    positions: Range<usize>,
    periods: Vec<Period>,
}

impl Window {
    /// Return the first day covered by the window.
    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Return the exclusive end of the window.
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Return the window's periods in order.
    #[must_use]
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Return the positions of the window's periods in the full period sequence.
    #[must_use]
    pub fn positions(&self) -> Range<usize> {
        self.positions.clone()
    }

    /// Return the per-period aggregates.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.periods.iter().map(|p| p.aggregate).collect()
    }

    /// Return the number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Return true if the window has no periods.
    ///
    /// Windows built by [`split_windows`] always hold at least one period.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

/// The two windows of one analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPair {
    /// The N periods immediately preceding `current`.
    pub previous: Window,
    /// The most recent N periods.
    pub current: Window,
}

impl WindowPair {
    /// Return the number of periods in each window.
    #[must_use]
    pub fn window_length(&self) -> usize {
        self.current.len()
    }
}

/// Carve `periods` into previous and current windows of `window_length` each.
///
/// Windows are drawn strictly by position in the ordered sequence: `current`
/// is the last `window_length` periods present and `previous` the
/// `window_length` periods before them. Calendar gaps are not bridged, so
/// sparse data yields windows of observed periods rather than wall-clock-equal
/// spans.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`SeriesError::InvalidWindowLength`] | `window_length` is zero |
/// | [`SeriesError::InsufficientData`] | Fewer than `2 * window_length` periods |
pub fn split_windows(periods: &[Period], window_length: usize) -> Result<WindowPair, SeriesError> {
    if window_length == 0 {
        return Err(SeriesError::InvalidWindowLength { window_length });
    }
    let required = 2 * window_length;
    let n = periods.len();
    if n < required {
        return Err(SeriesError::InsufficientData { required, available: n });
    }

    let current_positions = n - window_length..n;
    let previous_positions = n - required..n - window_length;

    let current_periods = periods[current_positions.clone()].to_vec();
    let previous_periods = periods[previous_positions.clone()].to_vec();

    let current = Window {
        start: current_periods[0].start,
        end: current_periods[window_length - 1].end,
        positions: current_positions,
        periods: current_periods,
    };
    let previous = Window {
        start: previous_periods[0].start,
        end: current.start,
        positions: previous_positions,
        periods: previous_periods,
    };

    debug!(
        previous_start = %previous.start,
        current_start = %current.start,
        current_end = %current.end,
        window_length,
        "windows split"
    );

    Ok(WindowPair { previous, current })
}

#[cfg(test)]
mod tests {
    use chrono::Days;

    use super::*;

    fn periods(values: &[f64]) -> Vec<Period> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Period {
                start: base + Days::new(i as u64),
                end: base + Days::new(i as u64 + 1),
                aggregate: v,
                row_count: 1,
            })
            .collect()
    }

    #[test]
    fn takes_last_windows_by_position() {
        let ps = periods(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let pair = split_windows(&ps, 3).unwrap();
        assert_eq!(pair.previous.values(), vec![2.0, 3.0, 4.0]);
        assert_eq!(pair.current.values(), vec![5.0, 6.0, 7.0]);
        assert_eq!(pair.previous.positions(), 1..4);
        assert_eq!(pair.current.positions(), 4..7);
        assert_eq!(pair.window_length(), 3);
    }

    #[test]
    fn windows_abut() {
        let ps = periods(&[1.0, 2.0, 3.0, 4.0]);
        let pair = split_windows(&ps, 2).unwrap();
        assert_eq!(pair.previous.end(), pair.current.start());
    }

    #[test]
    fn gap_is_absorbed_by_previous_window() {
        let mut ps = periods(&[1.0, 2.0, 3.0, 4.0]);
        // Move the last two periods ten days later.
        for p in &mut ps[2..] {
            p.start = p.start + Days::new(10);
            p.end = p.end + Days::new(10);
        }
        let pair = split_windows(&ps, 2).unwrap();
        assert_eq!(pair.previous.values(), vec![1.0, 2.0]);
        assert_eq!(pair.previous.end(), pair.current.start());
        assert_eq!(pair.current.start(), NaiveDate::from_ymd_opt(2024, 1, 13).unwrap());
    }

    #[test]
    fn error_insufficient_names_required_periods() {
        let ps = periods(&[1.0, 2.0, 3.0]);
        let result = split_windows(&ps, 5);
        assert!(matches!(
            result,
            Err(SeriesError::InsufficientData { required: 10, available: 3 })
        ));
        let message = result.unwrap_err().to_string();
        assert!(message.contains("10 periods required"), "{message}");
    }

    #[test]
    fn error_zero_window() {
        let ps = periods(&[1.0, 2.0]);
        assert!(matches!(
            split_windows(&ps, 0),
            Err(SeriesError::InvalidWindowLength { .. })
        ));
    }
}
