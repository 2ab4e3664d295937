use std::fmt;

/// Direction of a change after applying the flat threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The value increased.
    Up,
    /// The value decreased.
    Down,
    /// The relative change is below the flat threshold.
    Flat,
}

impl Direction {
    /// Classify a change.
    ///
    /// `Flat` when `|relative| < flat_threshold`; otherwise the sign of
    /// `delta` decides. Without a defined relative change (zero baseline) the
    /// sign of `delta` decides directly and only an exact zero is `Flat`.
    #[must_use]
    pub fn classify(delta: f64, relative: Option<f64>, flat_threshold: f64) -> Self {
        if let Some(rel) = relative
            && rel.abs() < flat_threshold
        {
            return Self::Flat;
        }
        if delta > 0.0 {
            Self::Up
        } else if delta < 0.0 {
            Self::Down
        } else {
            Self::Flat
        }
    }

    /// Return 1 for `Up`, -1 for `Down`, 0 for `Flat`.
    #[must_use]
    pub fn sign(self) -> i8 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
            Self::Flat => 0,
        }
    }

    /// Return the lowercase direction name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Flat => "flat",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
