use serde::Serialize;

/// Conclusion drawn from a p-value at a significance threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    SameDistribution,
    DifferentDistribution,
}

impl Verdict {
    /// `DifferentDistribution` when `p_value <= threshold`.
    ///
    /// # Examples
    ///
    /// ```
    /// use distcomp::verdict::Verdict;
    ///
    /// assert_eq!(Verdict::from_p_value(0.1, 0.1), Verdict::DifferentDistribution);
    /// assert_eq!(Verdict::from_p_value(0.3, 0.1), Verdict::SameDistribution);
    /// ```
    #[must_use]
    pub fn from_p_value(p_value: f64, threshold: f64) -> Self {
        if p_value <= threshold {
            Self::DifferentDistribution
        } else {
            Self::SameDistribution
        }
    }
}
