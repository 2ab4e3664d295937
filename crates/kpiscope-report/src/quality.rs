//! Coverage checks on the aggregated periods.

use kpiscope_series::{PeriodTable, Window, WindowPair};
use tracing::{instrument, warn};

/// Completeness below which a warning is raised.
const LOW_COMPLETENESS: f64 = 0.8;

/// How much of the calendar the observed periods cover.
#[derive(Debug, Clone, PartialEq)]
pub struct DataQuality {
    /// `observed_periods / expected_periods`, in `[0, 1]`.
    pub completeness: f64,
    /// Number of periods with at least one row.
    pub observed_periods: usize,
    /// Number of calendar buckets from the first to the last observed period.
    pub expected_periods: usize,
    /// Human-readable coverage problems, empty when none.
    pub warnings: Vec<String>,
}

/// Assess calendar coverage of `table` and of the two comparison windows.
///
/// Windows are drawn by position, so a window over sparse data can cover
/// more calendar buckets than it has periods; that case is reported here.
#[must_use]
#[instrument(skip_all, fields(n_periods = table.len()))]
pub fn assess(table: &PeriodTable, windows: &WindowPair) -> DataQuality {
    let granularity = table.granularity();
    let periods = table.periods();
    let observed_periods = periods.len();
    let expected_periods = match (periods.first(), periods.last()) {
        (Some(first), Some(last)) => granularity.bucket_count(first.start, last.start),
        _ => 0,
    };
    let completeness = if expected_periods == 0 {
        0.0
    } else {
        observed_periods as f64 / expected_periods as f64
    };

    let mut warnings = Vec::new();
    for (name, window) in [("previous", &windows.previous), ("current", &windows.current)] {
        let span = calendar_span(table, window);
        if span > window.len() {
            warnings.push(format!(
                "the {name} window spans {span} {granularity} buckets but only {} have data",
                window.len()
            ));
        }
    }
    if expected_periods > 0 && completeness < LOW_COMPLETENESS {
        warnings.push(format!(
            "only {observed_periods} of {expected_periods} {granularity} buckets have data ({:.0}% complete)",
            100.0 * completeness
        ));
    }

    for warning in &warnings {
        warn!("{warning}");
    }

    DataQuality {
        completeness,
        observed_periods,
        expected_periods,
        warnings,
    }
}

fn calendar_span(table: &PeriodTable, window: &Window) -> usize {
    match (window.periods().first(), window.periods().last()) {
        (Some(first), Some(last)) => table.granularity().bucket_count(first.start, last.start),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};
    use kpiscope_series::{AggregateConfig, AggregationMode, Granularity, NormalizedRow};

    use super::*;

    fn table(days: &[u64]) -> PeriodTable {
        let base = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let rows: Vec<NormalizedRow> = days
            .iter()
            .map(|&d| NormalizedRow::plain(base + Days::new(d), 1.0).unwrap())
            .collect();
        AggregateConfig::new(Granularity::Day, AggregationMode::Sum)
            .aggregate(&rows)
            .unwrap()
    }

    #[test]
    fn contiguous_data_is_complete() {
        let t = table(&[0, 1, 2, 3, 4, 5]);
        let quality = assess(&t, &t.split(3).unwrap());
        assert_eq!(quality.completeness, 1.0);
        assert_eq!(quality.observed_periods, 6);
        assert_eq!(quality.expected_periods, 6);
        assert!(quality.warnings.is_empty());
    }

    #[test]
    fn gap_inside_a_window_is_flagged() {
        let t = table(&[0, 1, 2, 3, 4, 9]);
        let quality = assess(&t, &t.split(3).unwrap());
        assert_eq!(quality.expected_periods, 10);
        assert!((quality.completeness - 0.6).abs() < 1e-12);
        assert!(quality.warnings.iter().any(|w| w.starts_with("the current window spans 7 day buckets")));
        assert!(quality.warnings.iter().any(|w| w.contains("60% complete")));
        assert!(!quality.warnings.iter().any(|w| w.contains("previous window")));
    }
}
