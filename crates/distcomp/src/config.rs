//! Comparator configuration
//!
//! A [`ComparatorConfig`] names the feature columns to compare, the optional
//! treatment column that splits rows into two groups, the per-feature
//! quantile bounds for outlier trimming and the fraction of rows to sample.
//!
//! Configurations are built in code with the builder methods or loaded from
//! JSON:
//!
//! ```json
//! {
//!   "features": ["x", "y"],
//!   "treatment": "grp",
//!   "outlier_bounds": [0.05, 0.95],
//!   "sample_fraction": 0.5
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::table::Table;

/// Errors in how a comparison was configured or invoked.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("'features' must be a sequence of column names, got {received}")]
    FeaturesNotSequence { received: String },
    #[display("'treatment' must be a column name string, got {received}")]
    TreatmentNotString { received: String },
    #[display("'features' must name at least one column")]
    NoFeatures,
    #[display("'features' lists '{feature}' more than once")]
    DuplicateFeature { feature: String },
    #[display("'{parameter}' refers to unknown column '{column}'")]
    UnknownColumn {
        parameter: &'static str,
        column: String,
    },
    #[display("'treatment' must not be empty")]
    EmptyTreatment,
    #[display("'treatment' column '{treatment}' is also listed in 'features'")]
    TreatmentIsFeature { treatment: String },
    #[display("'outlier_bounds' must satisfy 0 <= lower < upper <= 1, got ({lower}, {upper})")]
    InvalidOutlierBounds { lower: f64, upper: f64 },
    #[display("'sample_fraction' must be in (0, 1], got {value}")]
    InvalidSampleFraction { value: f64 },
    #[display("{operation} requires a 'treatment' column")]
    TreatmentRequired { operation: &'static str },
    #[display(
        "treatment '{treatment}' must contain exactly 2 values for {operation}, found {found}"
    )]
    TreatmentGroupCount {
        treatment: String,
        operation: &'static str,
        found: usize,
    },
    #[display(
        "{operation} without a treatment compares exactly 2 features, got {found} in 'features'"
    )]
    PairwiseFeatureCount {
        operation: &'static str,
        found: usize,
    },
    #[display("no rows of treatment '{treatment}' matched test group '{test_group}'")]
    NoRowsMatchedTestGroup {
        treatment: String,
        test_group: String,
    },
    #[display("every row of treatment '{treatment}' is in test group '{test_group}'")]
    EmptyControlGroup {
        treatment: String,
        test_group: String,
    },
    #[display("malformed configuration: {message}")]
    Malformed { message: String },
}

/// Quantile bounds applied to every feature column independently.
///
/// Values below the `lower` quantile or above the `upper` quantile of a
/// column are marked missing in that column. The default `(0, 1)` keeps
/// everything.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct OutlierBounds {
    pub lower: f64,
    pub upper: f64,
}

impl Default for OutlierBounds {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: 1.0,
        }
    }
}

impl From<(f64, f64)> for OutlierBounds {
    fn from((lower, upper): (f64, f64)) -> Self {
        Self { lower, upper }
    }
}

impl From<OutlierBounds> for (f64, f64) {
    fn from(bounds: OutlierBounds) -> Self {
        (bounds.lower, bounds.upper)
    }
}

impl OutlierBounds {
    /// Whether these bounds remove anything at all.
    #[must_use]
    pub fn trims(&self) -> bool {
        *self != Self::default()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        let Self { lower, upper } = self;
        if (0.0..=1.0).contains(&lower) && (0.0..=1.0).contains(&upper) && lower < upper {
            Ok(self)
        } else {
            Err(ConfigError::InvalidOutlierBounds { lower, upper })
        }
    }
}

const fn default_sample_fraction() -> f64 {
    1.0
}

/// What to compare and how to prepare the data before comparing.
///
/// # Examples
///
/// ```
/// use distcomp::config::ComparatorConfig;
///
/// let config = ComparatorConfig::new(["x", "y"])
///     .with_treatment("grp")
///     .with_outlier_bounds(0.05, 0.95)
///     .with_sample_fraction(0.5);
/// assert!(config.has_treatment());
/// assert_eq!(config.columns(), ["x", "y", "grp"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComparatorConfig {
    /// Feature columns to compare, in order.
    pub features: Vec<String>,
    /// Column whose two distinct values define the comparison groups.
    #[serde(default)]
    pub treatment: Option<String>,
    #[serde(default)]
    pub outlier_bounds: OutlierBounds,
    /// Fraction of rows kept by reproducible random sampling.
    #[serde(default = "default_sample_fraction")]
    pub sample_fraction: f64,
}

impl ComparatorConfig {
    /// A configuration comparing `features` with no treatment, sampling or trimming.
    pub fn new<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            features: features.into_iter().map(Into::into).collect(),
            treatment: None,
            outlier_bounds: OutlierBounds::default(),
            sample_fraction: default_sample_fraction(),
        }
    }

    #[must_use]
    pub fn with_treatment<S>(mut self, treatment: S) -> Self
    where
        S: Into<String>,
    {
        self.treatment = Some(treatment.into());
        self
    }

    #[must_use]
    pub fn with_outlier_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.outlier_bounds = OutlierBounds { lower, upper };
        self
    }

    #[must_use]
    pub fn with_sample_fraction(mut self, sample_fraction: f64) -> Self {
        self.sample_fraction = sample_fraction;
        self
    }

    #[must_use]
    pub fn has_treatment(&self) -> bool {
        self.treatment.is_some()
    }

    /// The columns a prepared table carries: the features, then the treatment.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.features
            .iter()
            .map(String::as_str)
            .chain(self.treatment.as_deref())
            .collect()
    }

    /// Parses a configuration from JSON text. See [`Self::from_json_value`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let value = serde_json::from_str(json).map_err(|e| ConfigError::Malformed {
            message: e.to_string(),
        })?;
        Self::from_json_value(&value)
    }

    /// Builds a configuration from a JSON value.
    ///
    /// The shapes of `features` and `treatment` are checked first so that the
    /// error names the parameter and the JSON type that was received.
    ///
    /// # Examples
    ///
    /// ```
    /// use distcomp::config::{ComparatorConfig, ConfigError};
    ///
    /// let err = ComparatorConfig::from_json_str(r#"{"features": "x"}"#).unwrap_err();
    /// assert_eq!(
    ///     err,
    ///     ConfigError::FeaturesNotSequence {
    ///         received: "string".into()
    ///     }
    /// );
    /// ```
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self, ConfigError> {
        let object = value.as_object().ok_or_else(|| ConfigError::Malformed {
            message: format!("expected an object, got {}", json_type_name(value)),
        })?;

        match object.get("features") {
            Some(serde_json::Value::Array(items)) => {
                if let Some(item) = items.iter().find(|item| !item.is_string()) {
                    return Err(ConfigError::FeaturesNotSequence {
                        received: format!("array containing {}", json_type_name(item)),
                    });
                }
            }
            Some(other) => {
                return Err(ConfigError::FeaturesNotSequence {
                    received: json_type_name(other).to_owned(),
                });
            }
            None => {
                return Err(ConfigError::Malformed {
                    message: "missing field `features`".to_owned(),
                });
            }
        }

        match object.get("treatment") {
            None | Some(serde_json::Value::Null | serde_json::Value::String(_)) => {}
            Some(other) => {
                return Err(ConfigError::TreatmentNotString {
                    received: json_type_name(other).to_owned(),
                });
            }
        }

        Self::deserialize(value).map_err(|e| ConfigError::Malformed {
            message: e.to_string(),
        })
    }

    /// Checks the configuration against the dataset it will be applied to.
    pub fn validate(&self, dataset: &Table) -> Result<(), ConfigError> {
        if self.features.is_empty() {
            return Err(ConfigError::NoFeatures);
        }
        for (idx, feature) in self.features.iter().enumerate() {
            if self.features[..idx].contains(feature) {
                return Err(ConfigError::DuplicateFeature {
                    feature: feature.clone(),
                });
            }
            if !dataset.contains(feature) {
                return Err(ConfigError::UnknownColumn {
                    parameter: "features",
                    column: feature.clone(),
                });
            }
        }

        if let Some(treatment) = &self.treatment {
            if treatment.is_empty() {
                return Err(ConfigError::EmptyTreatment);
            }
            if self.features.contains(treatment) {
                return Err(ConfigError::TreatmentIsFeature {
                    treatment: treatment.clone(),
                });
            }
            if !dataset.contains(treatment) {
                return Err(ConfigError::UnknownColumn {
                    parameter: "treatment",
                    column: treatment.clone(),
                });
            }
        }

        self.outlier_bounds.validate()?;

        if !(self.sample_fraction > 0.0 && self.sample_fraction <= 1.0) {
            return Err(ConfigError::InvalidSampleFraction {
                value: self.sample_fraction,
            });
        }
        Ok(())
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::table::Column;

    fn dataset() -> Table {
        Table::new(vec![
            Column::numeric("x", [1.0, 2.0]),
            Column::numeric("y", [3.0, 4.0]),
            Column::text("grp", ["a", "b"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_json_round_trip_with_defaults() {
        let config = ComparatorConfig::from_json_value(&json!({"features": ["x"]})).unwrap();
        assert_eq!(config, ComparatorConfig::new(["x"]));

        let config = ComparatorConfig::from_json_value(&json!({
            "features": ["x", "y"],
            "treatment": "grp",
            "outlier_bounds": [0.05, 0.95],
            "sample_fraction": 0.5,
        }))
        .unwrap();
        assert_eq!(config.treatment.as_deref(), Some("grp"));
        assert_eq!(config.outlier_bounds, OutlierBounds::from((0.05, 0.95)));
        assert_eq!(config.sample_fraction, 0.5);
    }

    #[test]
    fn test_features_must_be_sequence() {
        let err = ComparatorConfig::from_json_value(&json!({"features": "x"})).unwrap_err();
        assert_eq!(
            err,
            ConfigError::FeaturesNotSequence {
                received: "string".into()
            }
        );

        let err = ComparatorConfig::from_json_value(&json!({"features": ["x", 3]})).unwrap_err();
        assert_eq!(
            err,
            ConfigError::FeaturesNotSequence {
                received: "array containing number".into()
            }
        );
    }

    #[test]
    fn test_treatment_must_be_string() {
        let err = ComparatorConfig::from_json_value(&json!({"features": ["x"], "treatment": 1}))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::TreatmentNotString {
                received: "number".into()
            }
        );
        let config =
            ComparatorConfig::from_json_value(&json!({"features": ["x"], "treatment": null}))
                .unwrap();
        assert!(!config.has_treatment());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err =
            ComparatorConfig::from_json_value(&json!({"features": ["x"], "bins": 3})).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
    }

    #[test]
    fn test_validate() {
        let dataset = dataset();
        assert!(ComparatorConfig::new(["x", "y"]).validate(&dataset).is_ok());
        assert_eq!(
            ComparatorConfig::new(Vec::<String>::new()).validate(&dataset),
            Err(ConfigError::NoFeatures)
        );
        assert_eq!(
            ComparatorConfig::new(["x", "x"]).validate(&dataset),
            Err(ConfigError::DuplicateFeature {
                feature: "x".into()
            })
        );
        assert_eq!(
            ComparatorConfig::new(["z"]).validate(&dataset),
            Err(ConfigError::UnknownColumn {
                parameter: "features",
                column: "z".into()
            })
        );
        assert_eq!(
            ComparatorConfig::new(["x"])
                .with_treatment("")
                .validate(&dataset),
            Err(ConfigError::EmptyTreatment)
        );
        assert_eq!(
            ComparatorConfig::new(["x", "grp"])
                .with_treatment("grp")
                .validate(&dataset),
            Err(ConfigError::TreatmentIsFeature {
                treatment: "grp".into()
            })
        );
        assert_eq!(
            ComparatorConfig::new(["x"])
                .with_outlier_bounds(0.9, 0.1)
                .validate(&dataset),
            Err(ConfigError::InvalidOutlierBounds {
                lower: 0.9,
                upper: 0.1
            })
        );
        assert_eq!(
            ComparatorConfig::new(["x"])
                .with_sample_fraction(0.0)
                .validate(&dataset),
            Err(ConfigError::InvalidSampleFraction { value: 0.0 })
        );
    }

    #[test]
    fn test_trims() {
        assert!(!OutlierBounds::default().trims());
        assert!(OutlierBounds::from((0.0, 0.99)).trims());
    }
}
