//! Statistical primitives for comparing numeric distributions.
//!
//! This crate provides the building blocks used by the `distcomp` comparator:
//!
//! - **Descriptive statistics**: mean, median, sample variance and standard deviation
//! - **Quantiles**: linear-interpolation quantiles of a dataset
//! - **ECDF**: empirical cumulative distribution functions
//! - **Histograms**: equal-width binning with several normalization modes
//! - **Kolmogorov–Smirnov test**: two-sample test with exact and asymptotic p-values
//! - **Welch's t-test**: two-sample test of means without assuming equal variances
//! - **Standardized mean difference**: scale-free balance measure between two groups
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`quantile`]: Quantile computation
//! - [`ecdf`]: Empirical cumulative distribution function
//! - [`histogram`]: Histogram construction and normalization
//! - [`ks`]: Two-sample Kolmogorov–Smirnov test
//! - [`ttest`]: Welch's unequal-variance t-test
//! - [`smd`]: Standardized mean difference
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use distcomp_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.variance, 2.5);
//! ```
//!
//! ## Computing quantiles
//!
//! ```
//! use distcomp_stats::quantile::quantile;
//!
//! let values = [1.0, 2.0, 3.0, 4.0];
//! assert_eq!(quantile(&values, 0.5), Some(2.5));
//! ```
//!
//! ## Comparing two samples
//!
//! ```
//! use distcomp_stats::ks::{KsAlternative, KsMode, ks_2samp};
//!
//! let a = [0.1, 0.4, 0.7, 1.0, 1.3];
//! let b = [5.1, 5.4, 5.7, 6.0, 6.3];
//! let result = ks_2samp(&a, &b, KsAlternative::TwoSided, KsMode::Auto).unwrap();
//! assert_eq!(result.statistic, 1.0);
//! assert!(result.p_value < 0.05);
//! ```

pub mod descriptive;
pub mod ecdf;
pub mod histogram;
pub mod ks;
pub mod quantile;
pub mod smd;
pub mod ttest;

/// Failure of a statistical routine.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum StatsError {
    #[display("{sample} sample is empty")]
    EmptySample { sample: &'static str },
    #[display("{sample} sample needs at least {required} values, got {actual}")]
    InsufficientSamples {
        sample: &'static str,
        required: usize,
        actual: usize,
    },
    #[display("both samples have zero variance")]
    ZeroVariance,
    #[display("sample contains a non-finite value: {value}")]
    NonFinite { value: f64 },
    #[display("invalid distribution parameters: {message}")]
    Distribution { message: String },
}

pub(crate) fn ensure_finite(values: &[f64]) -> Result<(), StatsError> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(StatsError::NonFinite { value }),
        None => Ok(()),
    }
}
