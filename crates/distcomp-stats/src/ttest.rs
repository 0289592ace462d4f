use serde::Serialize;
use statrs::distribution::{ContinuousCDF as _, StudentsT};

use crate::{StatsError, descriptive::DescriptiveStats, ensure_finite};

/// Outcome of Welch's two-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WelchResult {
    /// The t statistic; positive when the first sample has the larger mean.
    pub statistic: f64,
    /// Welch–Satterthwaite degrees of freedom.
    pub df: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Welch's unequal-variance t-test of `H₀: μ₁ = μ₂`.
///
/// `t = (x̄₁ − x̄₂) / √(s₁²/n₁ + s₂²/n₂)` with Welch–Satterthwaite degrees of
/// freedom; the two-sided p-value comes from the Student t distribution.
///
/// # Errors
///
/// - [`StatsError::InsufficientSamples`] if a sample has fewer than 2 values
/// - [`StatsError::NonFinite`] if a sample contains `NaN` or infinity
/// - [`StatsError::ZeroVariance`] if both samples are constant
///
/// # Examples
///
/// ```
/// use distcomp_stats::ttest::welch_t_test;
///
/// let a = [5.1, 4.9, 5.2, 5.0, 4.8];
/// let b = [7.1, 6.9, 7.2, 7.0, 6.8];
/// let result = welch_t_test(&a, &b).unwrap();
/// assert!(result.statistic < 0.0);
/// assert!(result.p_value < 0.01);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn welch_t_test(sample1: &[f64], sample2: &[f64]) -> Result<WelchResult, StatsError> {
    let stats1 = sample_stats(sample1, "first")?;
    let stats2 = sample_stats(sample2, "second")?;

    let v1 = stats1.variance / stats1.count as f64;
    let v2 = stats2.variance / stats2.count as f64;
    let standard_error_sq = v1 + v2;
    if standard_error_sq <= 0.0 {
        return Err(StatsError::ZeroVariance);
    }

    let statistic = (stats1.mean - stats2.mean) / standard_error_sq.sqrt();
    let df = standard_error_sq.powi(2)
        / (v1.powi(2) / (stats1.count - 1) as f64 + v2.powi(2) / (stats2.count - 1) as f64);

    let distribution = StudentsT::new(0.0, 1.0, df).map_err(|e| StatsError::Distribution {
        message: e.to_string(),
    })?;
    let p_value = (2.0 * distribution.sf(statistic.abs())).min(1.0);

    Ok(WelchResult {
        statistic,
        df,
        p_value,
    })
}

fn sample_stats(sample: &[f64], name: &'static str) -> Result<DescriptiveStats, StatsError> {
    ensure_finite(sample)?;
    match DescriptiveStats::new(sample.iter().copied()) {
        Some(stats) if stats.count >= 2 => Ok(stats),
        _ => Err(StatsError::InsufficientSamples {
            sample: name,
            required: 2,
            actual: sample.len(),
        }),
    }
}
