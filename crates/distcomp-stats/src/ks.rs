//! Two-sample Kolmogorov–Smirnov test
//!
//! The test compares the empirical distribution functions `F1` and `F2` of two
//! samples. Its statistic is the largest gap between them, in the direction
//! selected by [`KsAlternative`]:
//!
//! | Alternative | Statistic |
//! |---|---|
//! | `two-sided` | `max |F1(x) − F2(x)|` |
//! | `greater` | `max (F1(x) − F2(x))` |
//! | `less` | `max (F2(x) − F1(x))` |
//!
//! # P-values
//!
//! - **Exact**: probability that a uniformly random monotone lattice path from
//!   `(0, 0)` to `(n, m)` leaves the band of paths whose gap stays below the
//!   observed statistic. Computed by dynamic programming in `O(n·m)` time and
//!   `O(m)` memory. Ties are not corrected for.
//! - **Asymptotic**: the Kolmogorov limiting distribution for the two-sided
//!   case and `exp(−2·en·D²)` for the one-sided cases, where
//!   `en = n·m / (n + m)`.

use serde::{Deserialize, Serialize};

use crate::{StatsError, ensure_finite};

/// Sample size up to which [`KsMode::Auto`] computes exact p-values.
pub const MAX_AUTO_EXACT_N: usize = 10_000;

/// Largest `n·m` for which [`KsMode::Exact`] runs the lattice-path DP.
///
/// Larger pairs of samples fall back to the asymptotic p-value.
pub const MAX_EXACT_CELLS: usize = MAX_AUTO_EXACT_N * MAX_AUTO_EXACT_N;

/// The alternative hypothesis of the test.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum KsAlternative {
    #[default]
    #[display("two-sided")]
    TwoSided,
    #[display("less")]
    Less,
    #[display("greater")]
    Greater,
}

/// How the p-value is computed.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum KsMode {
    /// Exact for samples up to [`MAX_AUTO_EXACT_N`] values, asymptotic otherwise.
    #[default]
    #[display("auto")]
    Auto,
    /// Exact while `n·m` is at most [`MAX_EXACT_CELLS`], asymptotic otherwise.
    #[display("exact")]
    Exact,
    #[display("asymp")]
    Asymp,
}

/// Outcome of a two-sample Kolmogorov–Smirnov test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KsResult {
    /// The KS statistic, in `[0, 1]`.
    pub statistic: f64,
    /// The p-value, in `[0, 1]`.
    pub p_value: f64,
    /// The method actually used for the p-value (never [`KsMode::Auto`]).
    pub mode: KsMode,
}

/// Runs the two-sample Kolmogorov–Smirnov test on `sample1` and `sample2`.
///
/// # Errors
///
/// Returns [`StatsError::EmptySample`] if either sample is empty and
/// [`StatsError::NonFinite`] if a sample contains `NaN` or infinity.
///
/// # Examples
///
/// ```
/// use distcomp_stats::ks::{KsAlternative, KsMode, ks_2samp};
///
/// let a = [1.0, 2.0, 3.0, 4.0];
/// let result = ks_2samp(&a, &a, KsAlternative::TwoSided, KsMode::Exact).unwrap();
/// assert_eq!(result.statistic, 0.0);
/// assert_eq!(result.p_value, 1.0);
/// ```
pub fn ks_2samp(
    sample1: &[f64],
    sample2: &[f64],
    alternative: KsAlternative,
    mode: KsMode,
) -> Result<KsResult, StatsError> {
    if sample1.is_empty() {
        return Err(StatsError::EmptySample { sample: "first" });
    }
    if sample2.is_empty() {
        return Err(StatsError::EmptySample { sample: "second" });
    }
    ensure_finite(sample1)?;
    ensure_finite(sample2)?;

    let mut sorted1 = sample1.to_vec();
    sorted1.sort_by(f64::total_cmp);
    let mut sorted2 = sample2.to_vec();
    sorted2.sort_by(f64::total_cmp);

    let (n, m) = (sorted1.len(), sorted2.len());
    let (max_gap_up, max_gap_down) = max_gaps(&sorted1, &sorted2);
    let statistic = match alternative {
        KsAlternative::TwoSided => max_gap_up.max(max_gap_down),
        KsAlternative::Greater => max_gap_up,
        KsAlternative::Less => max_gap_down,
    };

    let mode = resolve_mode(mode, n, m);
    let p_value = match mode {
        KsMode::Exact => exact_p_value(n, m, statistic, alternative),
        _ => asymptotic_p_value(n, m, statistic, alternative),
    };

    Ok(KsResult {
        statistic,
        p_value: p_value.clamp(0.0, 1.0),
        mode,
    })
}

/// The p-value method used for samples of sizes `n` and `m`.
fn resolve_mode(mode: KsMode, n: usize, m: usize) -> KsMode {
    let exact_fits = n.checked_mul(m).is_some_and(|cells| cells <= MAX_EXACT_CELLS);
    match mode {
        KsMode::Auto if n.max(m) <= MAX_AUTO_EXACT_N => KsMode::Exact,
        KsMode::Exact if exact_fits => KsMode::Exact,
        KsMode::Auto | KsMode::Exact | KsMode::Asymp => KsMode::Asymp,
    }
}

/// Largest `F1 − F2` and largest `F2 − F1` over all sample values, both
/// clamped at zero.
#[expect(clippy::cast_precision_loss)]
fn max_gaps(sorted1: &[f64], sorted2: &[f64]) -> (f64, f64) {
    let (n, m) = (sorted1.len() as f64, sorted2.len() as f64);
    let mut up = 0.0_f64;
    let mut down = 0.0_f64;
    for &value in sorted1.iter().chain(sorted2) {
        let cdf1 = sorted1.partition_point(|v| *v <= value) as f64 / n;
        let cdf2 = sorted2.partition_point(|v| *v <= value) as f64 / m;
        up = up.max(cdf1 - cdf2);
        down = down.max(cdf2 - cdf1);
    }
    (up, down)
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]
fn exact_p_value(n: usize, m: usize, statistic: f64, alternative: KsAlternative) -> f64 {
    // Every gap on the lattice is an integer multiple of 1 / (n·m), so the
    // band test can be carried out exactly in integers.
    let (n_i, m_i) = (n as i64, m as i64);
    let threshold = (statistic * (n * m) as f64).round() as i64;
    if threshold <= 0 {
        return 1.0;
    }
    let inside = |i: usize, j: usize| {
        let gap = i as i64 * m_i - j as i64 * n_i;
        match alternative {
            KsAlternative::TwoSided => gap.abs() < threshold,
            KsAlternative::Greater => gap < threshold,
            KsAlternative::Less => -gap < threshold,
        }
    };

    // row[j] holds the probability of reaching (i, j) without leaving the band
    let mut row = vec![0.0_f64; m + 1];
    for i in 0..=n {
        for j in 0..=m {
            let mut probability = if i == 0 && j == 0 { 1.0 } else { 0.0 };
            if i > 0 {
                let (left1, left2) = (n - (i - 1), m - j);
                probability += row[j] * left1 as f64 / (left1 + left2) as f64;
            }
            if j > 0 {
                let (left1, left2) = (n - i, m - (j - 1));
                probability += row[j - 1] * left2 as f64 / (left1 + left2) as f64;
            }
            row[j] = if inside(i, j) { probability } else { 0.0 };
        }
    }
    1.0 - row[m]
}

#[expect(clippy::cast_precision_loss)]
fn asymptotic_p_value(n: usize, m: usize, statistic: f64, alternative: KsAlternative) -> f64 {
    let en = (n * m) as f64 / (n + m) as f64;
    match alternative {
        KsAlternative::TwoSided => {
            let sqrt_en = en.sqrt();
            kolmogorov_sf((sqrt_en + 0.12 + 0.11 / sqrt_en) * statistic)
        }
        KsAlternative::Greater | KsAlternative::Less => (-2.0 * en * statistic.powi(2)).exp(),
    }
}

/// Survival function of the Kolmogorov distribution,
/// `Q(λ) = 2 Σ (−1)^(k−1) exp(−2 k² λ²)`.
fn kolmogorov_sf(lambda: f64) -> f64 {
    const EPS_TERM: f64 = 1e-10;
    const EPS_SUM: f64 = 1e-16;

    // The series converges too slowly to be useful here, and Q is 1 to
    // double precision anyway.
    if lambda < 0.2 {
        return 1.0;
    }
    let a2 = -2.0 * lambda * lambda;
    let mut sign = 2.0;
    let mut sum = 0.0;
    let mut previous_term = 0.0_f64;
    for k in 1..=100_i32 {
        let term = sign * (a2 * f64::from(k * k)).exp();
        sum += term;
        if term.abs() <= EPS_TERM * previous_term.abs() || term.abs() <= EPS_SUM * sum {
            return sum;
        }
        sign = -sign;
        previous_term = term;
    }
    1.0
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_distr::StandardNormal;
    use rand_pcg::Pcg32;

    use super::*;

    fn normal_sample(rng: &mut Pcg32, n: usize, shift: f64) -> Vec<f64> {
        (0..n)
            .map(|_| rng.sample::<f64, _>(StandardNormal) + shift)
            .collect()
    }

    #[test]
    fn test_empty_sample_is_rejected() {
        let err = ks_2samp(&[], &[1.0], KsAlternative::TwoSided, KsMode::Auto).unwrap_err();
        assert_eq!(err, StatsError::EmptySample { sample: "first" });
        let err = ks_2samp(&[1.0], &[], KsAlternative::TwoSided, KsMode::Auto).unwrap_err();
        assert_eq!(err, StatsError::EmptySample { sample: "second" });
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let err =
            ks_2samp(&[1.0, f64::NAN], &[1.0], KsAlternative::TwoSided, KsMode::Auto).unwrap_err();
        assert!(matches!(err, StatsError::NonFinite { .. }));
    }

    #[test]
    fn test_fully_separated_small_samples() {
        // Only 2 of the C(6, 3) = 20 orderings put one sample entirely
        // before the other.
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        let result = ks_2samp(&a, &b, KsAlternative::TwoSided, KsMode::Exact).unwrap();
        assert_eq!(result.statistic, 1.0);
        assert!((result.p_value - 0.1).abs() < 1e-12);

        let less = ks_2samp(&a, &b, KsAlternative::Less, KsMode::Exact).unwrap();
        assert_eq!(less.statistic, 0.0);
        assert_eq!(less.p_value, 1.0);

        let greater = ks_2samp(&a, &b, KsAlternative::Greater, KsMode::Exact).unwrap();
        assert_eq!(greater.statistic, 1.0);
        assert!((greater.p_value - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_statistic_with_ties() {
        let a = [1.0, 2.0, 2.0, 3.0];
        let b = [2.0, 2.0, 3.0, 4.0];
        let result = ks_2samp(&a, &b, KsAlternative::TwoSided, KsMode::Asymp).unwrap();
        assert!((result.statistic - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_auto_mode_resolution() {
        let a = [1.0, 2.0, 3.0];
        let result = ks_2samp(&a, &a, KsAlternative::TwoSided, KsMode::Auto).unwrap();
        assert_eq!(result.mode, KsMode::Exact);
    }

    #[test]
    fn test_exact_mode_falls_back_on_large_samples() {
        assert_eq!(resolve_mode(KsMode::Exact, 10, 20), KsMode::Exact);
        assert_eq!(
            resolve_mode(KsMode::Exact, 50, 1_000_000),
            KsMode::Exact,
            "unbalanced samples within the cell budget stay exact"
        );
        assert_eq!(resolve_mode(KsMode::Exact, 20_000, 20_000), KsMode::Asymp);
        assert_eq!(resolve_mode(KsMode::Exact, usize::MAX, 2), KsMode::Asymp);
        assert_eq!(resolve_mode(KsMode::Auto, 20_000, 10), KsMode::Asymp);
        assert_eq!(resolve_mode(KsMode::Asymp, 3, 3), KsMode::Asymp);
    }

    #[test]
    fn test_same_distribution_has_high_p_value() {
        let mut rng = Pcg32::seed_from_u64(7);
        let a = normal_sample(&mut rng, 400, 0.0);
        let b = normal_sample(&mut rng, 400, 0.0);
        for mode in [KsMode::Exact, KsMode::Asymp] {
            let result = ks_2samp(&a, &b, KsAlternative::TwoSided, mode).unwrap();
            assert!(result.p_value > 0.01, "{mode}: {result:?}");
        }
    }

    #[test]
    fn test_shifted_distribution_has_low_p_value() {
        let mut rng = Pcg32::seed_from_u64(11);
        let a = normal_sample(&mut rng, 300, 0.0);
        let b = normal_sample(&mut rng, 300, 1.0);
        for mode in [KsMode::Exact, KsMode::Asymp] {
            let result = ks_2samp(&a, &b, KsAlternative::TwoSided, mode).unwrap();
            assert!(result.p_value < 1e-6, "{mode}: {result:?}");
        }
        // b is shifted up, so F1 lies above F2
        let greater = ks_2samp(&a, &b, KsAlternative::Greater, KsMode::Asymp).unwrap();
        assert!(greater.p_value < 1e-6);
        let less = ks_2samp(&a, &b, KsAlternative::Less, KsMode::Asymp).unwrap();
        assert!(less.p_value > 0.05);
    }

    #[test]
    fn test_exact_and_asymptotic_agree_roughly() {
        let mut rng = Pcg32::seed_from_u64(3);
        let a = normal_sample(&mut rng, 200, 0.0);
        let b = normal_sample(&mut rng, 250, 0.15);
        let exact = ks_2samp(&a, &b, KsAlternative::TwoSided, KsMode::Exact).unwrap();
        let asymp = ks_2samp(&a, &b, KsAlternative::TwoSided, KsMode::Asymp).unwrap();
        assert!((exact.p_value - asymp.p_value).abs() < 0.05);
    }

    #[test]
    fn test_kolmogorov_sf_reference_values() {
        assert_eq!(kolmogorov_sf(0.1), 1.0);
        // Q(1.0) ≈ 0.2700, Q(1.36) ≈ 0.0494
        assert!((kolmogorov_sf(1.0) - 0.270_0).abs() < 1e-3);
        assert!((kolmogorov_sf(1.36) - 0.049_4).abs() < 1e-3);
    }
}
