//! How prepared data is split into the samples an analysis compares
//!
//! The shape of the configuration decides the [`ComparisonMode`]: grouped by
//! treatment (one comparison per feature) or pairwise between the features
//! themselves. Grouped operations all go through
//! [`TreatmentGroups::require_pair`], so every operation applies the same
//! exactly-two-groups precondition.

use std::{collections::HashMap, fmt};

use serde::Serialize;

use crate::{
    Error,
    comparator::PreparedData,
    config::ConfigError,
    table::{Table, TableError},
};

/// Which grouping an analysis applies, decided by `(features.len(), has_treatment)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// One feature, compared across the two treatment groups.
    SingleFeatureGrouped,
    /// Several features, each compared across the two treatment groups.
    MultiFeatureGrouped,
    /// No treatment; the features are compared against each other.
    PairwiseFeatures,
}

impl ComparisonMode {
    #[must_use]
    pub fn from_shape(feature_count: usize, has_treatment: bool) -> Self {
        match (feature_count, has_treatment) {
            (_, false) => Self::PairwiseFeatures,
            (1, true) => Self::SingleFeatureGrouped,
            (_, true) => Self::MultiFeatureGrouped,
        }
    }

    #[must_use]
    pub fn is_grouped(self) -> bool {
        !self.is_pairwise_features()
    }
}

/// Distinct values of the treatment column and the group of every row.
#[derive(Debug, Clone, PartialEq)]
pub struct TreatmentGroups {
    column: String,
    labels: Vec<String>,
    row_groups: Vec<Option<usize>>,
    missing_rows: usize,
}

impl TreatmentGroups {
    /// Reads the treatment labels of `table`.
    ///
    /// Labels are kept in order of first appearance. Rows with a missing
    /// treatment value belong to no labelled group, but a missing value still
    /// counts as one more distinct value in [`Self::require_pair`].
    pub fn from_table(table: &Table, column: &str) -> Result<Self, TableError> {
        let data = &table.require(column)?.data;
        let mut index = HashMap::new();
        let mut labels = Vec::new();
        let row_groups = (0..data.len())
            .map(|row| {
                let label = data.label(row)?;
                let group = *index.entry(label.clone()).or_insert_with(|| {
                    labels.push(label);
                    labels.len() - 1
                });
                Some(group)
            })
            .collect::<Vec<_>>();
        let missing_rows = row_groups.iter().filter(|g| g.is_none()).count();
        Ok(Self {
            column: column.to_owned(),
            labels,
            row_groups,
            missing_rows,
        })
    }

    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Index into [`Self::labels`] of the group `row` belongs to.
    #[must_use]
    pub fn group_of(&self, row: usize) -> Option<usize> {
        self.row_groups.get(row).copied().flatten()
    }

    #[must_use]
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Number of rows whose treatment value is missing.
    #[must_use]
    pub fn missing_rows(&self) -> usize {
        self.missing_rows
    }

    /// Number of distinct treatment values, counting missing as one value.
    #[must_use]
    pub fn distinct_count(&self) -> usize {
        self.labels.len() + usize::from(self.missing_rows > 0)
    }

    /// The two group labels, failing unless there are exactly two distinct
    /// treatment values and none of them is missing.
    pub fn require_pair(&self, operation: &'static str) -> Result<[&str; 2], ConfigError> {
        match self.labels.as_slice() {
            [first, second] if self.missing_rows == 0 => Ok([first.as_str(), second.as_str()]),
            _ => Err(ConfigError::TreatmentGroupCount {
                treatment: self.column.clone(),
                operation,
                found: self.distinct_count(),
            }),
        }
    }

    /// Splits a column into one sample per group, dropping missing values.
    #[must_use]
    pub fn split(&self, values: &[Option<f64>]) -> Vec<Vec<f64>> {
        let mut samples = vec![Vec::new(); self.labels.len()];
        for (row, value) in values.iter().enumerate() {
            if let (Some(group), Some(value)) = (self.group_of(row), value) {
                samples[group].push(*value);
            }
        }
        samples
    }
}

/// What one two-sample comparison is about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Comparison {
    /// A feature compared between the two treatment groups.
    Grouped {
        feature: String,
        treatment: String,
        groups: [String; 2],
    },
    /// Two features compared against each other.
    Pairwise { features: [String; 2] },
}

impl Comparison {
    /// Names of the first and second samples.
    #[must_use]
    pub fn sample_names(&self) -> [&str; 2] {
        match self {
            Self::Grouped {
                groups: [first, second],
                ..
            }
            | Self::Pairwise {
                features: [first, second],
            } => [first.as_str(), second.as_str()],
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grouped {
                feature,
                treatment,
                groups: [first, second],
            } => write!(f, "{feature} by {treatment} ({first} vs {second})"),
            Self::Pairwise {
                features: [first, second],
            } => write!(f, "{first} vs {second}"),
        }
    }
}

/// Two samples ready to be passed to a statistical test.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoSamples {
    pub comparison: Comparison,
    pub first: Vec<f64>,
    pub second: Vec<f64>,
}

/// Builds the comparisons a two-sample test runs.
///
/// Grouped modes yield one comparison per feature between the two treatment
/// groups. Pairwise mode compares the first feature against the second and
/// requires exactly two features.
pub(crate) fn two_sample_comparisons(
    prepared: &PreparedData,
    operation: &'static str,
) -> Result<Vec<TwoSamples>, Error> {
    let table = &prepared.table;
    match (&prepared.groups, prepared.mode) {
        (Some(groups), mode) if mode.is_grouped() => {
            let [first_label, second_label] = groups.require_pair(operation)?;
            prepared
                .features
                .iter()
                .map(|feature| -> Result<TwoSamples, Error> {
                    let mut samples = groups.split(table.numeric(feature)?).into_iter();
                    let first = samples.next().unwrap_or_default();
                    let second = samples.next().unwrap_or_default();
                    Ok(TwoSamples {
                        comparison: Comparison::Grouped {
                            feature: feature.clone(),
                            treatment: groups.column().to_owned(),
                            groups: [first_label.to_owned(), second_label.to_owned()],
                        },
                        first,
                        second,
                    })
                })
                .collect()
        }
        _ => {
            let [first, second] = pairwise_features(prepared, operation)?;
            Ok(vec![TwoSamples {
                comparison: Comparison::Pairwise {
                    features: [first.to_owned(), second.to_owned()],
                },
                first: present(table.numeric(first)?),
                second: present(table.numeric(second)?),
            }])
        }
    }
}

fn pairwise_features<'a>(
    prepared: &'a PreparedData,
    operation: &'static str,
) -> Result<[&'a str; 2], ConfigError> {
    match prepared.features.as_slice() {
        [first, second] => Ok([first.as_str(), second.as_str()]),
        features => Err(ConfigError::PairwiseFeatureCount {
            operation,
            found: features.len(),
        }),
    }
}

/// The non-missing values of a column; `NaN` counts as missing.
pub(crate) fn present(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|v| *v)
        .filter(|v| !v.is_nan())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    #[test]
    fn test_mode_from_shape() {
        assert_eq!(
            ComparisonMode::from_shape(1, true),
            ComparisonMode::SingleFeatureGrouped
        );
        assert_eq!(
            ComparisonMode::from_shape(3, true),
            ComparisonMode::MultiFeatureGrouped
        );
        assert_eq!(
            ComparisonMode::from_shape(1, false),
            ComparisonMode::PairwiseFeatures
        );
        assert_eq!(
            ComparisonMode::from_shape(2, false),
            ComparisonMode::PairwiseFeatures
        );
        assert!(!ComparisonMode::PairwiseFeatures.is_grouped());
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let table = Table::new(vec![
            Column::numeric("x", [1.0, 2.0, 3.0, 4.0, f64::NAN]),
            Column::text_opt(
                "grp",
                [
                    Some("test".to_owned()),
                    Some("control".to_owned()),
                    None,
                    Some("test".to_owned()),
                    Some("control".to_owned()),
                ],
            ),
        ])
        .unwrap();
        let groups = TreatmentGroups::from_table(&table, "grp").unwrap();
        assert_eq!(groups.labels(), ["test", "control"]);
        assert_eq!(groups.group_of(2), None);
        assert_eq!(groups.position("control"), Some(1));
        assert_eq!(groups.missing_rows(), 1);

        let samples = groups.split(table.numeric("x").unwrap());
        assert_eq!(samples, [vec![1.0, 4.0], vec![2.0]]);
    }

    #[test]
    fn test_missing_treatment_is_a_distinct_value() {
        let table = Table::new(vec![Column::text_opt(
            "grp",
            [Some("test".to_owned()), Some("control".to_owned()), None],
        )])
        .unwrap();
        let groups = TreatmentGroups::from_table(&table, "grp").unwrap();
        assert_eq!(groups.distinct_count(), 3);
        assert_eq!(
            groups.require_pair("ks_test").unwrap_err(),
            ConfigError::TreatmentGroupCount {
                treatment: "grp".into(),
                operation: "ks_test",
                found: 3,
            }
        );

        let complete = Table::new(vec![Column::text("grp", ["test", "control", "test"])]).unwrap();
        let groups = TreatmentGroups::from_table(&complete, "grp").unwrap();
        assert_eq!(groups.require_pair("ks_test").unwrap(), ["test", "control"]);
    }

    #[test]
    fn test_numeric_treatment_labels() {
        let table = Table::new(vec![Column::numeric("t", [0.0, 1.0, 1.0])]).unwrap();
        let groups = TreatmentGroups::from_table(&table, "t").unwrap();
        assert_eq!(groups.labels(), ["0", "1"]);
    }

    #[test]
    fn test_require_pair_counts_groups() {
        let table = Table::new(vec![Column::text("grp", ["a", "b", "c"])]).unwrap();
        let groups = TreatmentGroups::from_table(&table, "grp").unwrap();
        assert_eq!(
            groups.require_pair("t_test").unwrap_err(),
            ConfigError::TreatmentGroupCount {
                treatment: "grp".into(),
                operation: "t_test",
                found: 3,
            }
        );
    }

    #[test]
    fn test_comparison_display() {
        let grouped = Comparison::Grouped {
            feature: "x".into(),
            treatment: "grp".into(),
            groups: ["test".into(), "control".into()],
        };
        assert_eq!(grouped.to_string(), "x by grp (test vs control)");
        assert_eq!(grouped.sample_names(), ["test", "control"]);

        let pairwise = Comparison::Pairwise {
            features: ["a".into(), "b".into()],
        };
        assert_eq!(pairwise.to_string(), "a vs b");
    }
}
