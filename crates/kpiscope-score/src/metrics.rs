use crate::direction::Direction;
use crate::effect::EffectSize;
use crate::label::StrengthLabel;

/// Result of comparing the current window with the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeMetrics {
    /// Mean of the current window's period aggregates.
    pub current_mean: f64,
    /// Mean of the previous window's period aggregates.
    pub previous_mean: f64,
    /// `current_mean - previous_mean`.
    pub abs_delta: f64,
    /// `abs_delta / previous_mean`; `None` when the previous mean is zero.
    /// A change within rounding error of zero gives `Some(0.0)`.
    pub rel_delta: Option<f64>,
    /// Direction after applying the flat threshold.
    pub direction: Direction,
    /// Mean shift over the pooled standard deviation of both windows.
    pub level_score: EffectSize,
    /// Slope shift over the pooled residual standard deviation.
    pub trend_score: EffectSize,
    /// Label of `level_score`.
    pub level_label: StrengthLabel,
    /// Label of `trend_score`.
    pub trend_label: StrengthLabel,
    /// OLS slope of the previous window, per period.
    pub previous_slope: f64,
    /// OLS slope of the current window, per period.
    pub current_slope: f64,
    /// `current_slope - previous_slope`.
    pub slope_delta: f64,
    /// True when the two slopes are non-zero with opposite signs.
    pub slope_direction_changed: bool,
    /// Coefficient of variation of the current window; `None` when its mean
    /// is zero but its values vary.
    pub current_cv: Option<f64>,
    /// Whether trend and level agree and volatility is within the ceiling.
    pub trustworthy: bool,
    /// One sentence explaining `trustworthy`.
    pub reliability_note: String,
    /// True when either label is above `None` or the slope flipped sign.
    pub any_change_detected: bool,
    /// Explanations for degraded numeric outputs.
    pub notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};
    use kpiscope_series::{Period, WindowPair, split_windows};

    use crate::{Direction, EffectSize, ScoreConfig, StrengthLabel};

    fn windows(previous: &[f64], current: &[f64]) -> WindowPair {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let periods: Vec<Period> = previous
            .iter()
            .chain(current)
            .enumerate()
            .map(|(i, &v)| Period {
                start: base + Days::new(i as u64),
                end: base + Days::new(i as u64 + 1),
                aggregate: v,
                row_count: 1,
            })
            .collect();
        split_windows(&periods, previous.len()).unwrap()
    }

    #[test]
    fn constant_step_is_strong_and_trustworthy() {
        let m = ScoreConfig::new().score(&windows(&[100.0; 5], &[150.0; 5]));
        assert_eq!(m.abs_delta, 50.0);
        assert_eq!(m.rel_delta, Some(0.5));
        assert_eq!(m.direction, Direction::Up);
        assert_eq!(m.level_score, EffectSize::Unbounded { positive: true });
        assert_eq!(m.level_label, StrengthLabel::Strong);
        assert_eq!(m.trend_label, StrengthLabel::None);
        assert!(m.trustworthy, "{}", m.reliability_note);
        assert!(m.any_change_detected);
    }

    #[test]
    fn zero_baseline_degrades_rel_delta() {
        let m = ScoreConfig::new().score(&windows(&[0.0; 3], &[5.0; 3]));
        assert_eq!(m.rel_delta, None);
        assert_eq!(m.direction, Direction::Up);
        assert!(m.notes.iter().any(|n| n.contains("previous mean is zero")));
    }

    #[test]
    fn identical_windows_have_no_change() {
        let m = ScoreConfig::new().score(&windows(&[3.0, 5.0, 4.0], &[3.0, 5.0, 4.0]));
        assert_eq!(m.abs_delta, 0.0);
        assert_eq!(m.direction, Direction::Flat);
        assert_eq!(m.level_label, StrengthLabel::None);
        assert_eq!(m.trend_label, StrengthLabel::None);
        assert!(!m.any_change_detected);
    }

    #[test]
    fn small_relative_change_is_flat() {
        let m = ScoreConfig::new().score(&windows(&[1000.0, 1002.0], &[1004.0, 1006.0]));
        assert!(m.rel_delta.unwrap() < 0.01);
        assert_eq!(m.direction, Direction::Flat);
    }

    #[test]
    fn level_score_is_standardized_mean_difference() {
        // previous mean 2, current mean 4; SS = 2 + 2, dof = 4, pooled std = 1.
        let m = ScoreConfig::new().score(&windows(&[1.0, 2.0, 3.0], &[3.0, 4.0, 5.0]));
        assert_eq!(m.level_score.value(), Some(2.0));
        assert_eq!(m.level_label, StrengthLabel::Strong);
    }

    #[test]
    fn trend_against_direction_is_untrustworthy() {
        // Level rises but the current window slopes steeply down.
        let m = ScoreConfig::new().score(&windows(
            &[10.0, 10.5, 10.0, 10.5],
            &[20.0, 18.0, 16.0, 14.0],
        ));
        assert_eq!(m.direction, Direction::Up);
        assert_ne!(m.trend_label, StrengthLabel::None);
        assert_eq!(m.trend_score.sign(), -1);
        assert!(!m.trustworthy);
        assert!(m.reliability_note.contains("turning down"), "{}", m.reliability_note);
    }

    #[test]
    fn volatile_current_window_is_untrustworthy() {
        let m = ScoreConfig::new().score(&windows(&[10.0, 10.0, 10.0], &[2.0, 30.0, 1.0]));
        assert!(m.current_cv.unwrap() > 0.5);
        assert!(!m.trustworthy);
        assert!(m.reliability_note.contains("volatile"));
    }

    #[test]
    fn volatility_ceiling_is_configurable() {
        let config = ScoreConfig::new().with_volatility_ceiling(10.0).unwrap();
        let m = config.score(&windows(&[10.0, 10.0, 10.0], &[2.0, 30.0, 1.0]));
        assert!(!m.reliability_note.contains("volatile"));
    }

    #[test]
    fn short_windows_fall_back_to_pooled_std() {
        // N = 2 leaves no residual degrees of freedom, so trend noise is the
        // pooled std: sqrt((0.5 + 0.5) / 2). Slopes go from 1 to -1.
        let m = ScoreConfig::new().score(&windows(&[1.0, 2.0], &[2.0, 1.0]));
        let expected = -2.0 / 0.5f64.sqrt();
        assert!((m.trend_score.value().unwrap() - expected).abs() < 1e-12);
        assert!(m.slope_direction_changed);
    }

    #[test]
    fn single_period_windows() {
        let m = ScoreConfig::new().score(&windows(&[4.0], &[6.0]));
        assert_eq!(m.level_label, StrengthLabel::Strong);
        assert_eq!(m.trend_score.value(), Some(0.0));
        assert!(m.trustworthy);
    }

    #[test]
    fn rounding_noise_is_scored_as_no_change() {
        // 0.1 + 0.2 and 0.15 + 0.15 differ by one ulp.
        let m = ScoreConfig::new().score(&windows(&[0.1 + 0.2], &[0.15 + 0.15]));
        assert_ne!(m.abs_delta, 0.0);
        assert_eq!(m.rel_delta, Some(0.0));
        assert_eq!(m.direction, Direction::Flat);
        assert_eq!(m.level_score, EffectSize::Finite(0.0));
        assert_eq!(m.level_label, StrengthLabel::None);
        assert!(m.notes.iter().any(|n| n.contains("rounding error")));
    }

    #[test]
    fn rejects_invalid_constants() {
        assert!(ScoreConfig::new().with_flat_threshold(-0.1).is_err());
        assert!(ScoreConfig::new().with_volatility_ceiling(f64::NAN).is_err());
    }

    #[test]
    fn scoring_is_deterministic() {
        let w = windows(&[3.0, 7.0, 4.0, 9.0], &[8.0, 6.0, 12.0, 11.0]);
        let config = ScoreConfig::new();
        assert_eq!(config.score(&w), config.score(&w));
    }
}
