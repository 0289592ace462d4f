/// Computes the `q`-quantile of unsorted values.
///
/// Non-finite values are not filtered; callers drop missing values first.
///
/// # Returns
///
/// The quantile value, or `None` if `values` is empty or `q` is outside `[0, 1]`.
///
/// # Examples
///
/// ```
/// use distcomp_stats::quantile::quantile;
///
/// let values = vec![5.0, 1.0, 3.0, 2.0, 4.0];
/// assert_eq!(quantile(&values, 0.5), Some(3.0));
/// assert_eq!(quantile(&values, 0.0), Some(1.0));
/// assert_eq!(quantile(&values, 1.0), Some(5.0));
/// ```
#[must_use]
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, q)
}

/// Computes a single quantile from sorted data.
///
/// This function interpolates linearly between the two closest ranks: for `n`
/// values the quantile sits at position `q * (n - 1)`, and a fractional
/// position blends the neighbouring values.
///
/// # Panics
///
/// Panics if `sorted_values` is not sorted in ascending order.
///
/// # Examples
///
/// ```
/// use distcomp_stats::quantile::quantile_sorted;
///
/// let values: Vec<f64> = (1..=100).map(f64::from).collect();
/// let lower = quantile_sorted(&values, 0.05).unwrap();
/// let upper = quantile_sorted(&values, 0.95).unwrap();
/// assert!((lower - 5.95).abs() < 1e-9);
/// assert!((upper - 95.05).abs() < 1e-9);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn quantile_sorted(sorted_values: &[f64], q: f64) -> Option<f64> {
    assert!(
        sorted_values.is_sorted_by(|a, b| a <= b),
        "values must be sorted in ascending order"
    );
    if sorted_values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }

    let position = q * (sorted_values.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - position.floor();
    let (low, high) = (sorted_values[lower], sorted_values[upper]);
    Some(low + (high - low) * fraction)
}
