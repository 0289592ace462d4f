use crate::descriptive::DescriptiveStats;

/// Standardized mean difference between a treatment and a control sample.
///
/// `SMD = (x̄_t − x̄_c) / √((s_t² + s_c²) / 2)`, using sample variances.
///
/// Returns `None` when either sample has fewer than two values or the pooled
/// variance is zero, since the ratio is undefined then.
///
/// # Examples
///
/// ```
/// use distcomp_stats::smd::standardized_mean_difference;
///
/// let treatment = [2.0, 3.0, 4.0];
/// let control = [1.0, 2.0, 3.0];
/// assert_eq!(standardized_mean_difference(&treatment, &control), Some(1.0));
/// ```
#[must_use]
pub fn standardized_mean_difference(treatment: &[f64], control: &[f64]) -> Option<f64> {
    let treatment = DescriptiveStats::new(treatment.iter().copied())?;
    let control = DescriptiveStats::new(control.iter().copied())?;
    let pooled = f64::midpoint(treatment.variance, control.variance);
    if !pooled.is_finite() || pooled <= 0.0 {
        return None;
    }
    Some((treatment.mean - control.mean) / pooled.sqrt())
}
