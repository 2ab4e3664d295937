use std::fmt;

use crate::label::{LabelThresholds, StrengthLabel};

/// A noise-normalized change magnitude.
///
/// When the noise estimate is exactly zero and the signal is not, the ratio
/// has no finite value; it is kept as an explicit unbounded score instead of
/// leaking `inf` into results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectSize {
    /// Signal divided by a positive noise estimate.
    Finite(f64),
    /// Non-zero signal over zero noise.
    Unbounded {
        /// Sign of the underlying signal.
        positive: bool,
    },
}

impl EffectSize {
    /// Build an effect size from a signal and a non-negative noise estimate.
    #[must_use]
    pub fn from_ratio(signal: f64, noise: f64) -> Self {
        if noise > 0.0 {
            let ratio = signal / noise;
            if ratio.is_finite() {
                return Self::Finite(ratio);
            }
        } else if signal == 0.0 {
            return Self::Finite(0.0);
        }
        Self::Unbounded { positive: signal > 0.0 }
    }

    /// Return the finite score, or `None` when unbounded.
    #[must_use]
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Finite(v) => Some(v),
            Self::Unbounded { .. } => None,
        }
    }

    /// Return true when the noise was zero and the signal was not.
    #[must_use]
    pub fn is_unbounded(self) -> bool {
        matches!(self, Self::Unbounded { .. })
    }

    /// Return -1, 0 or 1 according to the sign of the score.
    #[must_use]
    pub fn sign(self) -> i8 {
        match self {
            Self::Finite(v) if v > 0.0 => 1,
            Self::Finite(v) if v < 0.0 => -1,
            Self::Finite(_) => 0,
            Self::Unbounded { positive: true } => 1,
            Self::Unbounded { positive: false } => -1,
        }
    }

    /// Map the score's magnitude onto the label scale.
    #[must_use]
    pub fn label(self, thresholds: &LabelThresholds) -> StrengthLabel {
        match self {
            Self::Finite(v) => thresholds.classify(v),
            Self::Unbounded { .. } => StrengthLabel::Strong,
        }
    }
}

impl fmt::Display for EffectSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(v) => write!(f, "{v:.3}"),
            Self::Unbounded { positive: true } => f.write_str("+unbounded"),
            Self::Unbounded { positive: false } => f.write_str("-unbounded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_noise_nonzero_signal_is_unbounded() {
        let e = EffectSize::from_ratio(-3.0, 0.0);
        assert_eq!(e, EffectSize::Unbounded { positive: false });
        assert_eq!(e.sign(), -1);
        assert_eq!(e.value(), None);
        assert_eq!(e.label(&LabelThresholds::default()), StrengthLabel::Strong);
    }

    #[test]
    fn zero_noise_zero_signal_is_zero() {
        let e = EffectSize::from_ratio(0.0, 0.0);
        assert_eq!(e.value(), Some(0.0));
        assert_eq!(e.sign(), 0);
        assert_eq!(e.label(&LabelThresholds::default()), StrengthLabel::None);
    }

    #[test]
    fn finite_ratio() {
        let e = EffectSize::from_ratio(1.0, 2.0);
        assert_eq!(e.value(), Some(0.5));
        assert_eq!(e.label(&LabelThresholds::default()), StrengthLabel::Moderate);
        assert_eq!(format!("{e}"), "0.500");
    }

    #[test]
    fn overflowing_ratio_is_unbounded() {
        let e = EffectSize::from_ratio(1e300, 1e-300);
        assert!(e.is_unbounded());
    }
}
