//! Small descriptive statistics shared by the scorer and the attributor.

/// Arithmetic mean. Returns 0 for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sum of squared deviations from the mean.
fn squared_deviations(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|&v| (v - m).powi(2)).sum()
}

/// Sample standard deviation (divides by n - 1). Returns 0 for fewer than two values.
#[must_use]
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    (squared_deviations(values) / (values.len() - 1) as f64).sqrt()
}

/// Pooled sample standard deviation of two groups.
///
/// `sqrt((SS_a + SS_b) / (n_a + n_b - 2))`. Returns 0 when there are no
/// degrees of freedom.
#[must_use]
pub fn pooled_std(a: &[f64], b: &[f64]) -> f64 {
    let dof = (a.len() + b.len()).saturating_sub(2);
    if dof == 0 {
        return 0.0;
    }
    ((squared_deviations(a) + squared_deviations(b)) / dof as f64).sqrt()
}

/// Relative tolerance under which a change is floating-point noise.
pub const RELATIVE_TOLERANCE: f64 = 1e-9;

/// Return true when `delta`, the difference `current - previous`, is within
/// [`RELATIVE_TOLERANCE`] of zero relative to `max(|previous|, |current|, 1)`.
#[must_use]
pub fn is_negligible(delta: f64, previous: f64, current: f64) -> bool {
    delta.abs() <= RELATIVE_TOLERANCE * previous.abs().max(current.abs()).max(1.0)
}

/// Relative change `delta / baseline`, or `None` when the baseline is zero.
#[must_use]
pub fn relative_change(delta: f64, baseline: f64) -> Option<f64> {
    if baseline == 0.0 {
        None
    } else {
        Some(delta / baseline)
    }
}

/// Ordinary least squares line fitted against the index `0..n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Change in value per period.
    pub slope: f64,
    /// Fitted value at index 0.
    pub intercept: f64,
    /// Sum of squared residuals.
    pub residual_ss: f64,
    /// Number of points fitted.
    pub n: usize,
}

impl LinearFit {
    /// Fit a line to `values` against their positions.
    ///
    /// Fewer than two points yield a flat line through the mean.
    #[must_use]
    pub fn fit(values: &[f64]) -> Self {
        let n = values.len();
        let y_mean = mean(values);
        if n < 2 {
            return Self { slope: 0.0, intercept: y_mean, residual_ss: 0.0, n };
        }
        let x_mean = (n - 1) as f64 / 2.0;
        let (sxy, sxx) = values
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(sxy, sxx), (i, &y)| {
                let dx = i as f64 - x_mean;
                (sxy + dx * (y - y_mean), sxx + dx * dx)
            });
        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;
        let residual_ss = values
            .iter()
            .enumerate()
            .map(|(i, &y)| (y - (intercept + slope * i as f64)).powi(2))
            .sum();
        Self { slope, intercept, residual_ss, n }
    }
}

/// Pooled residual standard deviation of two line fits.
///
/// `sqrt((SSR_a + SSR_b) / (n_a + n_b - 4))`. Returns `None` when either fit
/// has two or fewer points, since its residuals carry no information.
#[must_use]
pub fn pooled_residual_std(a: &LinearFit, b: &LinearFit) -> Option<f64> {
    if a.n <= 2 || b.n <= 2 {
        return None;
    }
    let dof = (a.n + b.n - 4) as f64;
    Some(((a.residual_ss + b.residual_ss) / dof).sqrt())
}
