use std::ops::{Range, RangeInclusive};

use serde::{Deserialize, Serialize};

/// How bin counts are scaled when a histogram is displayed.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum HistNorm {
    /// Raw number of values in each bin.
    #[display("count")]
    Count,
    /// Share of all values in each bin, in percent.
    #[default]
    #[display("percent")]
    Percent,
    /// Share of all values in each bin, as a fraction.
    #[display("probability")]
    Probability,
    /// Count divided by bin width.
    #[display("density")]
    Density,
    /// Share of all values divided by bin width; the bar areas sum to one.
    #[display("probability density")]
    ProbabilityDensity,
}

/// An equal-width histogram of a dataset.
///
/// Every bin covers `[start, end)` except the last one, which also contains
/// the upper end of the histogram range.
#[derive(Debug, Clone)]
pub struct Histogram {
    /// The bins comprising the histogram, in ascending order.
    pub bins: Vec<HistogramBin>,
    /// The nominal width shared by all bins.
    pub bin_width: f64,
}

/// A single bin in a histogram.
#[derive(Debug, Clone)]
pub struct HistogramBin {
    /// The range of values covered by this bin (inclusive start, exclusive end).
    pub range: Range<f64>,
    /// The number of values that fall within this bin's range.
    pub count: u64,
}

impl Histogram {
    /// Creates a histogram with `num_bins` equal-width bins spanning `range`.
    ///
    /// Values outside `range` and non-finite values are not counted. A range
    /// of zero width is widened by `0.5` on both sides.
    ///
    /// Using the same `range` for several datasets keeps their bins aligned,
    /// which is what overlaid histograms need.
    ///
    /// # Examples
    ///
    /// ```
    /// # use distcomp_stats::histogram::Histogram;
    /// let values = [1.0, 2.0, 2.5, 3.0, 4.0];
    /// let histogram = Histogram::new(values, 3, 1.0..=4.0);
    /// let counts: Vec<u64> = histogram.bins.iter().map(|b| b.count).collect();
    /// assert_eq!(counts, vec![1, 2, 2]);
    /// ```
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    #[must_use]
    pub fn new<I>(values: I, num_bins: usize, range: RangeInclusive<f64>) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        if num_bins == 0 {
            return Self {
                bins: vec![],
                bin_width: 0.0,
            };
        }

        let (mut min, mut max) = range.into_inner();
        if max - min < f64::EPSILON {
            min -= 0.5;
            max += 0.5;
        }
        let width = (max - min) / num_bins as f64;

        let mut bins = (0..num_bins)
            .map(|idx| {
                // Recompute each boundary from `min` to avoid accumulating rounding error
                let start = min + width * idx as f64;
                let end = if idx == num_bins - 1 {
                    max.next_up()
                } else {
                    min + width * (idx + 1) as f64
                };
                HistogramBin {
                    range: start..end,
                    count: 0,
                }
            })
            .collect::<Vec<_>>();

        for value in values {
            if !value.is_finite() || value < min || value > max {
                continue;
            }
            let idx = (((value - min) / width).floor() as usize).min(num_bins - 1);
            bins[idx].count += 1;
        }

        Self {
            bins,
            bin_width: width,
        }
    }

    /// Total number of counted values.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).sum()
    }

    /// Bin heights scaled according to `norm`, one per bin.
    ///
    /// An empty histogram yields all zeros for the relative modes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use distcomp_stats::histogram::{HistNorm, Histogram};
    /// let histogram = Histogram::new([0.0, 0.0, 1.0, 2.0], 2, 0.0..=2.0);
    /// assert_eq!(histogram.normalized(HistNorm::Count), vec![2.0, 2.0]);
    /// assert_eq!(histogram.normalized(HistNorm::Percent), vec![50.0, 50.0]);
    /// assert_eq!(histogram.normalized(HistNorm::ProbabilityDensity), vec![0.5, 0.5]);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn normalized(&self, norm: HistNorm) -> Vec<f64> {
        let total = self.total() as f64;
        let share = |count: u64| {
            if total > 0.0 {
                count as f64 / total
            } else {
                0.0
            }
        };
        self.bins
            .iter()
            .map(|bin| match norm {
                HistNorm::Count => bin.count as f64,
                HistNorm::Percent => share(bin.count) * 100.0,
                HistNorm::Probability => share(bin.count),
                HistNorm::Density => bin.count as f64 / self.bin_width,
                HistNorm::ProbabilityDensity => share(bin.count) / self.bin_width,
            })
            .collect()
    }
}

/// Number of bins suggested by Sturges' rule, `ceil(log2(n)) + 1`.
///
/// # Examples
///
/// ```
/// # use distcomp_stats::histogram::sturges_bin_count;
/// assert_eq!(sturges_bin_count(0), 1);
/// assert_eq!(sturges_bin_count(1000), 11);
/// ```
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation
)]
#[must_use]
pub fn sturges_bin_count(n: usize) -> usize {
    if n < 2 {
        return 1;
    }
    (n as f64).log2().ceil() as usize + 1
}

/// Smallest and largest finite value, or `None` if there is none.
#[must_use]
pub fn value_range<I>(values: I) -> Option<RangeInclusive<f64>>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((min, max)) => Some((f64::min(min, v), f64::max(max, v))),
        })
        .map(|(min, max)| min..=max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_bins() {
        let histogram = Histogram::new([1.0, 2.0], 0, 1.0..=2.0);
        assert!(histogram.bins.is_empty());
    }

    #[test]
    fn test_max_value_lands_in_last_bin() {
        let histogram = Histogram::new([0.0, 10.0], 5, 0.0..=10.0);
        assert_eq!(histogram.bins[0].count, 1);
        assert_eq!(histogram.bins[4].count, 1);
        assert!(histogram.bins[4].range.contains(&10.0));
    }

    #[test]
    fn test_degenerate_range() {
        let histogram = Histogram::new([3.0, 3.0, 3.0], 4, 3.0..=3.0);
        assert_eq!(histogram.total(), 3);
        assert_eq!(histogram.bins.len(), 4);
    }

    #[test]
    fn test_values_outside_range_are_ignored() {
        let histogram = Histogram::new([-1.0, 0.5, 2.0, f64::NAN], 2, 0.0..=1.0);
        assert_eq!(histogram.total(), 1);
    }

    #[test]
    fn test_density_integrates_to_one() {
        let values = (0..100).map(f64::from);
        let histogram = Histogram::new(values, 7, 0.0..=99.0);
        let area: f64 = histogram
            .normalized(HistNorm::ProbabilityDensity)
            .iter()
            .map(|height| height * histogram.bin_width)
            .sum();
        assert!((area - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_value_range() {
        assert_eq!(value_range([]), None);
        assert_eq!(value_range([2.0, f64::NAN, -1.0, 5.0]), Some(-1.0..=5.0));
    }
}
