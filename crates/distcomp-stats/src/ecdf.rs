//! Empirical cumulative distribution function (ECDF)
//!
//! For a sample of `n` values, `ECDF(x) = (number of values <= x) / n`.
//! The ECDF is a step function that jumps at each distinct sample value.

/// Empirical cumulative distribution function of a sample.
///
/// # Examples
///
/// ```
/// use distcomp_stats::ecdf::Ecdf;
///
/// let ecdf = Ecdf::new([3.0, 1.0, 2.0, 2.0]);
/// assert_eq!(ecdf.evaluate(0.5), 0.0);
/// assert_eq!(ecdf.evaluate(2.0), 0.75);
/// assert_eq!(ecdf.evaluate(10.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Ecdf {
    sorted: Vec<f64>,
}

impl Ecdf {
    /// Builds an ECDF from unsorted values. Non-finite values are ignored.
    #[must_use]
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values
            .into_iter()
            .filter(|v| v.is_finite())
            .collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        Self { sorted }
    }

    /// Number of values in the sample.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// The sample values in ascending order.
    #[must_use]
    pub fn sorted_values(&self) -> &[f64] {
        &self.sorted
    }

    /// Proportion of sample values less than or equal to `x`.
    ///
    /// Returns `0.0` for an empty sample.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        if self.sorted.is_empty() {
            return 0.0;
        }
        let at_or_below = self.sorted.partition_point(|v| *v <= x);
        at_or_below as f64 / self.sorted.len() as f64
    }

    /// The corners of the step function: one `(value, proportion)` pair per
    /// distinct value, where `proportion` is the ECDF at that value.
    ///
    /// # Examples
    ///
    /// ```
    /// use distcomp_stats::ecdf::Ecdf;
    ///
    /// let ecdf = Ecdf::new([1.0, 2.0, 2.0, 4.0]);
    /// assert_eq!(ecdf.steps(), vec![(1.0, 0.25), (2.0, 0.75), (4.0, 1.0)]);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn steps(&self) -> Vec<(f64, f64)> {
        let n = self.sorted.len() as f64;
        let mut steps: Vec<(f64, f64)> = vec![];
        for (idx, &value) in self.sorted.iter().enumerate() {
            let proportion = (idx + 1) as f64 / n;
            match steps.last_mut() {
                Some(last) if last.0 == value => last.1 = proportion,
                _ => steps.push((value, proportion)),
            }
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sample() {
        let ecdf = Ecdf::new([]);
        assert!(ecdf.is_empty());
        assert_eq!(ecdf.evaluate(1.0), 0.0);
        assert!(ecdf.steps().is_empty());
    }

    #[test]
    fn test_ignores_non_finite() {
        let ecdf = Ecdf::new([1.0, f64::NAN, 2.0, f64::INFINITY]);
        assert_eq!(ecdf.len(), 2);
        assert_eq!(ecdf.evaluate(1.5), 0.5);
    }

    #[test]
    fn test_monotone_steps() {
        let ecdf = Ecdf::new([5.0, 3.0, 3.0, 1.0, 9.0, 7.0]);
        let steps = ecdf.steps();
        assert!(steps.windows(2).all(|w| w[0].0 < w[1].0 && w[0].1 < w[1].1));
        assert_eq!(steps.last().map(|s| s.1), Some(1.0));
    }
}
