use std::fmt;

use crate::error::ScoreError;

/// Ordered strength of a change: `None < Minor < Moderate < Strong`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StrengthLabel {
    /// Within normal noise.
    None,
    /// Small but noticeable.
    Minor,
    /// Clearly noticeable.
    Moderate,
    /// Large relative to noise.
    Strong,
}

impl StrengthLabel {
    /// Return the lowercase label name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        }
    }
}

impl fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Magnitude cutoffs mapping an absolute effect size to a [`StrengthLabel`].
///
/// `|score| < minor` is `None`, `[minor, moderate)` is `Minor`,
/// `[moderate, strong)` is `Moderate` and `>= strong` is `Strong`.
///
/// # Defaults
///
/// | Cutoff     | Default |
/// |------------|---------|
/// | `minor`    | 0.2     |
/// | `moderate` | 0.5     |
/// | `strong`   | 0.8     |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelThresholds {
    minor: f64,
    moderate: f64,
    strong: f64,
}

impl LabelThresholds {
    /// Create custom cutoffs.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ScoreError::InvalidThresholds`] | A cutoff is negative or non-finite, or `minor <= moderate <= strong` does not hold |
    pub fn new(minor: f64, moderate: f64, strong: f64) -> Result<Self, ScoreError> {
        let valid = [minor, moderate, strong]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
            && minor <= moderate
            && moderate <= strong;
        if !valid {
            return Err(ScoreError::InvalidThresholds { minor, moderate, strong });
        }
        Ok(Self { minor, moderate, strong })
    }

    /// Return the minor cutoff.
    #[must_use]
    pub fn minor(&self) -> f64 {
        self.minor
    }

    /// Return the moderate cutoff.
    #[must_use]
    pub fn moderate(&self) -> f64 {
        self.moderate
    }

    /// Return the strong cutoff.
    #[must_use]
    pub fn strong(&self) -> f64 {
        self.strong
    }

    /// Map an absolute magnitude onto the label scale. Infinity is `Strong`.
    #[must_use]
    pub fn classify(&self, magnitude: f64) -> StrengthLabel {
        let m = magnitude.abs();
        if m >= self.strong {
            StrengthLabel::Strong
        } else if m >= self.moderate {
            StrengthLabel::Moderate
        } else if m >= self.minor {
            StrengthLabel::Minor
        } else {
            StrengthLabel::None
        }
    }
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self { minor: 0.2, moderate: 0.5, strong: 0.8 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_inclusive_below() {
        let t = LabelThresholds::default();
        assert_eq!(t.classify(0.0), StrengthLabel::None);
        assert_eq!(t.classify(0.199), StrengthLabel::None);
        assert_eq!(t.classify(0.2), StrengthLabel::Minor);
        assert_eq!(t.classify(0.5), StrengthLabel::Moderate);
        assert_eq!(t.classify(0.8), StrengthLabel::Strong);
        assert_eq!(t.classify(-0.8), StrengthLabel::Strong);
        assert_eq!(t.classify(f64::INFINITY), StrengthLabel::Strong);
    }

    #[test]
    fn ordering() {
        assert!(StrengthLabel::None < StrengthLabel::Minor);
        assert!(StrengthLabel::Minor < StrengthLabel::Moderate);
        assert!(StrengthLabel::Moderate < StrengthLabel::Strong);
    }

    #[test]
    fn rejects_out_of_order() {
        let result = LabelThresholds::new(0.5, 0.2, 0.8);
        assert!(matches!(result, Err(ScoreError::InvalidThresholds { .. })));
    }

    #[test]
    fn rejects_negative_and_nan() {
        assert!(LabelThresholds::new(-0.1, 0.5, 0.8).is_err());
        assert!(LabelThresholds::new(0.2, f64::NAN, 0.8).is_err());
    }

    #[test]
    fn custom_cutoffs() {
        let t = LabelThresholds::new(1.0, 2.0, 3.0).unwrap();
        assert_eq!(t.classify(0.9), StrengthLabel::None);
        assert_eq!(t.classify(2.5), StrengthLabel::Moderate);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", StrengthLabel::Moderate), "moderate");
    }
}
