//! Scoring configuration and the window comparison entry point.

use kpiscope_series::WindowPair;
use tracing::{debug, instrument};

use crate::direction::Direction;
use crate::effect::EffectSize;
use crate::error::ScoreError;
use crate::label::{LabelThresholds, StrengthLabel};
use crate::metrics::ChangeMetrics;
use crate::stats::{self, LinearFit};

/// Configuration for change scoring.
///
/// Construct via [`ScoreConfig::new`], then chain `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter            | Default                        |
/// |----------------------|--------------------------------|
/// | `flat_threshold`     | 0.01 (1% relative change)      |
/// | `thresholds`         | [`LabelThresholds::default`]   |
/// | `volatility_ceiling` | 0.5 (coefficient of variation) |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreConfig {
    flat_threshold: f64,
    thresholds: LabelThresholds,
    volatility_ceiling: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreConfig {
    /// Create a scoring configuration with default constants.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flat_threshold: 0.01,
            thresholds: LabelThresholds::default(),
            volatility_ceiling: 0.5,
        }
    }

    /// Set the relative change below which a shift counts as flat.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ScoreError::InvalidFlatThreshold`] | Negative or non-finite |
    pub fn with_flat_threshold(mut self, flat_threshold: f64) -> Result<Self, ScoreError> {
        if !flat_threshold.is_finite() || flat_threshold < 0.0 {
            return Err(ScoreError::InvalidFlatThreshold { value: flat_threshold });
        }
        self.flat_threshold = flat_threshold;
        Ok(self)
    }

    /// Set the label cutoffs applied to both level and trend scores.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: LabelThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the maximum coefficient of variation of the current window for a
    /// change to count as trustworthy.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ScoreError::InvalidVolatilityCeiling`] | Negative or non-finite |
    pub fn with_volatility_ceiling(mut self, volatility_ceiling: f64) -> Result<Self, ScoreError> {
        if !volatility_ceiling.is_finite() || volatility_ceiling < 0.0 {
            return Err(ScoreError::InvalidVolatilityCeiling { value: volatility_ceiling });
        }
        self.volatility_ceiling = volatility_ceiling;
        Ok(self)
    }

    /// Return the flat threshold.
    #[must_use]
    pub fn flat_threshold(&self) -> f64 {
        self.flat_threshold
    }

    /// Return the label cutoffs.
    #[must_use]
    pub fn thresholds(&self) -> &LabelThresholds {
        &self.thresholds
    }

    /// Return the volatility ceiling.
    #[must_use]
    pub fn volatility_ceiling(&self) -> f64 {
        self.volatility_ceiling
    }

    /// Score the shift from `windows.previous` to `windows.current`.
    ///
    /// Numeric edge cases never fail: a zero previous mean leaves
    /// `rel_delta` undefined, and zero noise yields an unbounded score. Both
    /// are explained in [`ChangeMetrics::notes`]. A mean shift within
    /// [`stats::RELATIVE_TOLERANCE`] of zero is scored as no change.
    #[instrument(skip_all, fields(window_length = windows.window_length()))]
    pub fn score(&self, windows: &WindowPair) -> ChangeMetrics {
        let previous = windows.previous.values();
        let current = windows.current.values();
        let mut notes = Vec::new();

        let previous_mean = stats::mean(&previous);
        let current_mean = stats::mean(&current);
        let abs_delta = current_mean - previous_mean;
        let level_shift = if stats::is_negligible(abs_delta, previous_mean, current_mean) {
            if abs_delta != 0.0 {
                notes.push("change is within rounding error of zero; scored as no change".to_string());
            }
            0.0
        } else {
            abs_delta
        };
        let rel_delta = stats::relative_change(level_shift, previous_mean);
        if rel_delta.is_none() {
            notes.push("relative change undefined: previous mean is zero".to_string());
        }
        let direction = Direction::classify(level_shift, rel_delta, self.flat_threshold);

        let pooled_std = stats::pooled_std(&previous, &current);
        let level_score = EffectSize::from_ratio(level_shift, pooled_std);
        if level_score.is_unbounded() {
            notes.push("level score unbounded: neither window varies".to_string());
        }

        let previous_fit = LinearFit::fit(&previous);
        let current_fit = LinearFit::fit(&current);
        let slope_delta = current_fit.slope - previous_fit.slope;
        let trend_noise =
            stats::pooled_residual_std(&previous_fit, &current_fit).unwrap_or(pooled_std);
        let trend_score = EffectSize::from_ratio(slope_delta, trend_noise);
        if trend_score.is_unbounded() {
            notes.push("trend score unbounded: both windows fit a line exactly".to_string());
        }

        let level_label = level_score.label(&self.thresholds);
        let trend_label = trend_score.label(&self.thresholds);
        let slope_direction_changed =
            previous_fit.slope * current_fit.slope < 0.0;

        let current_std = stats::sample_std(&current);
        let current_cv = if current_mean == 0.0 {
            (current_std == 0.0).then_some(0.0)
        } else {
            Some(current_std / current_mean.abs())
        };

        let mut problems = Vec::new();
        if trend_label != StrengthLabel::None
            && direction != Direction::Flat
            && trend_score.sign() != direction.sign()
        {
            let trend_way = if trend_score.sign() > 0 { "up" } else { "down" };
            problems.push(format!(
                "the trend is turning {trend_way} while the level moved {direction}"
            ));
        }
        match current_cv {
            Some(cv) if cv > self.volatility_ceiling => problems.push(format!(
                "the current window is volatile (coefficient of variation {cv:.2} exceeds {:.2})",
                self.volatility_ceiling
            )),
            None => problems.push(
                "the current window is volatile (values swing around a zero mean)".to_string(),
            ),
            Some(_) => {}
        }
        let trustworthy = problems.is_empty();
        let reliability_note = if trustworthy {
            "Reliable: the trend agrees with the level change and volatility is within bounds."
                .to_string()
        } else {
            format!("May be unreliable: {}.", problems.join("; "))
        };

        let any_change_detected = level_label != StrengthLabel::None
            || trend_label != StrengthLabel::None
            || slope_direction_changed;

        debug!(
            abs_delta,
            %level_score,
            %trend_score,
            trustworthy,
            "windows scored"
        );

        ChangeMetrics {
            current_mean,
            previous_mean,
            abs_delta,
            rel_delta,
            direction,
            level_score,
            trend_score,
            level_label,
            trend_label,
            previous_slope: previous_fit.slope,
            current_slope: current_fit.slope,
            slope_delta,
            slope_direction_changed,
            current_cv,
            trustworthy,
            reliability_note,
            any_change_detected,
            notes,
        }
    }
}
