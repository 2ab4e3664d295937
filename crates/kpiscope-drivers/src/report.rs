use crate::entry::{DimensionBreakdown, DriverEntry};

/// Ranked and filtered drivers plus the unfiltered per-dimension view.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverReport {
    pub(crate) entries: Vec<DriverEntry>,
    pub(crate) breakdowns: Vec<DimensionBreakdown>,
    pub(crate) excluded_dimensions: Vec<String>,
    pub(crate) top_k: usize,
    pub(crate) notes: Vec<String>,
}

impl DriverReport {
    /// Return every entry that survived filtering, ranked by `|impact_pct|`.
    #[must_use]
    pub fn entries(&self) -> &[DriverEntry] {
        &self.entries
    }

    /// Return the first `top_k` ranked entries.
    #[must_use]
    pub fn top(&self) -> &[DriverEntry] {
        &self.entries[..self.top_k.min(self.entries.len())]
    }

    /// Return up to `n` ranked entries that pushed the metric up.
    #[must_use]
    pub fn top_positive(&self, n: usize) -> Vec<&DriverEntry> {
        self.entries
            .iter()
            .filter(|e| e.abs_contribution > 0.0)
            .take(n)
            .collect()
    }

    /// Return up to `n` ranked entries that pushed the metric down.
    #[must_use]
    pub fn top_negative(&self, n: usize) -> Vec<&DriverEntry> {
        self.entries
            .iter()
            .filter(|e| e.abs_contribution < 0.0)
            .take(n)
            .collect()
    }

    /// Return the unfiltered breakdown of every non-constant dimension.
    #[must_use]
    pub fn breakdowns(&self) -> &[DimensionBreakdown] {
        &self.breakdowns
    }

    /// Return the unfiltered breakdown of `dimension`.
    #[must_use]
    pub fn breakdown(&self, dimension: &str) -> Option<&DimensionBreakdown> {
        self.breakdowns.iter().find(|b| b.dimension == dimension)
    }

    /// Return dimensions dropped for having a single category.
    #[must_use]
    pub fn excluded_dimensions(&self) -> &[String] {
        &self.excluded_dimensions
    }

    /// Return the presentation cutoff.
    #[must_use]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Return explanations for degraded outputs.
    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}
