//! The comparator and its data preparation pipeline
//!
//! Every analysis starts from [`Comparator::prepare`], which projects the
//! source dataset onto the configured columns, samples rows with a fixed seed
//! and trims outliers per feature. Nothing is cached between calls, and the
//! source dataset is never modified.

use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::{
    Error,
    config::{ComparatorConfig, ConfigError},
    diagnostics::{Diagnostic, DiagnosticSink, LARGE_DATASET_ROWS, TracingSink},
    dispatch::{self, ComparisonMode, TreatmentGroups},
    table::{Table, TableError},
};

/// Seed of the row sampler, so repeated preparations sample the same rows.
pub const SAMPLE_SEED: u64 = 1;

/// The working data every analysis consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedData {
    /// Feature columns followed by the treatment column, if any.
    pub table: Table,
    pub features: Vec<String>,
    pub mode: ComparisonMode,
    /// Treatment groups of the sampled rows; `None` without a treatment.
    pub groups: Option<TreatmentGroups>,
}

impl PreparedData {
    /// The treatment groups, failing when no treatment is configured.
    pub fn require_groups(&self, operation: &'static str) -> Result<&TreatmentGroups, ConfigError> {
        self.groups
            .as_ref()
            .ok_or(ConfigError::TreatmentRequired { operation })
    }
}

/// Compares feature distributions of a dataset.
///
/// # Examples
///
/// ```
/// use distcomp::{
///     comparator::Comparator,
///     config::ComparatorConfig,
///     table::{Column, Table},
/// };
///
/// let dataset = Table::new(vec![
///     Column::numeric("x", [1.0, 2.0, 3.0, 4.0]),
///     Column::text("grp", ["test", "control", "test", "control"]),
/// ])?;
/// let config = ComparatorConfig::new(["x"]).with_treatment("grp");
/// let comparator = Comparator::new(&dataset, config)?;
///
/// let prepared = comparator.prepare()?;
/// assert_eq!(prepared.table.row_count(), 4);
/// assert_eq!(prepared.groups.unwrap().labels(), ["test", "control"]);
/// # Ok::<(), distcomp::Error>(())
/// ```
pub struct Comparator<'a> {
    dataset: &'a Table,
    config: ComparatorConfig,
    sink: Box<dyn DiagnosticSink + 'a>,
}

impl std::fmt::Debug for Comparator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Comparator")
            .field("rows", &self.dataset.row_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> Comparator<'a> {
    /// Creates a comparator that logs advisories through `tracing`.
    pub fn new(dataset: &'a Table, config: ComparatorConfig) -> Result<Self, ConfigError> {
        Self::with_sink(dataset, config, TracingSink)
    }

    /// Creates a comparator that sends advisories to `sink`.
    ///
    /// The configuration is validated against the dataset. A
    /// [`Diagnostic::LargeDataset`] advisory is emitted when the sampled row
    /// count exceeds [`LARGE_DATASET_ROWS`].
    #[expect(clippy::cast_precision_loss)]
    pub fn with_sink<S>(
        dataset: &'a Table,
        config: ComparatorConfig,
        sink: S,
    ) -> Result<Self, ConfigError>
    where
        S: DiagnosticSink + 'a,
    {
        config.validate(dataset)?;
        let rows = dataset.row_count() as f64 * config.sample_fraction;
        if rows > LARGE_DATASET_ROWS {
            sink.emit(&Diagnostic::LargeDataset { rows });
        }
        Ok(Self {
            dataset,
            config,
            sink: Box::new(sink),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ComparatorConfig {
        &self.config
    }

    #[must_use]
    pub fn has_treatment(&self) -> bool {
        self.config.has_treatment()
    }

    #[must_use]
    pub fn mode(&self) -> ComparisonMode {
        ComparisonMode::from_shape(self.config.features.len(), self.has_treatment())
    }

    /// Builds the working table: column selection, sampling, outlier trimming.
    pub fn prepare(&self) -> Result<PreparedData, Error> {
        let mut table = self.dataset.select(&self.config.columns())?;
        table = self.sample(&table);
        self.trim_outliers(&mut table)?;

        let groups = self
            .config
            .treatment
            .as_deref()
            .map(|treatment| TreatmentGroups::from_table(&table, treatment))
            .transpose()?;

        Ok(PreparedData {
            table,
            features: self.config.features.clone(),
            mode: self.mode(),
            groups,
        })
    }

    pub(crate) fn emit(&self, diagnostic: &Diagnostic) {
        self.sink.emit(diagnostic);
    }

    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn sample(&self, table: &Table) -> Table {
        let fraction = self.config.sample_fraction;
        if fraction >= 1.0 {
            return table.clone();
        }
        let total = table.row_count();
        let amount = ((total as f64 * fraction).round() as usize).min(total);
        let mut rng = Pcg32::seed_from_u64(SAMPLE_SEED);
        let mut rows = rand::seq::index::sample(&mut rng, total, amount).into_vec();
        rows.sort_unstable();
        let sampled = table.take_rows(&rows);
        self.emit(&Diagnostic::Sampled {
            fraction,
            rows: sampled.row_count(),
        });
        sampled
    }

    /// Marks feature values outside the configured quantiles as missing.
    ///
    /// Each feature is trimmed on its own quantiles, so trimming one column
    /// never removes values from another.
    #[expect(clippy::cast_precision_loss)]
    fn trim_outliers(&self, table: &mut Table) -> Result<(), TableError> {
        let bounds = self.config.outlier_bounds;
        if !bounds.trims() {
            return Ok(());
        }
        let mut retained = Vec::with_capacity(self.config.features.len());
        for feature in &self.config.features {
            let values = table.numeric_mut(feature)?;
            let mut present = dispatch::present(values.as_slice());
            present.sort_by(f64::total_cmp);
            if let (Some(low), Some(high)) = (
                distcomp_stats::quantile::quantile_sorted(&present, bounds.lower),
                distcomp_stats::quantile::quantile_sorted(&present, bounds.upper),
            ) {
                for value in values.iter_mut() {
                    if value.is_some_and(|v| v.is_nan() || v < low || v > high) {
                        *value = None;
                    }
                }
            }
            retained.push((feature.clone(), values.iter().flatten().count()));
        }
        self.emit(&Diagnostic::OutliersTrimmed {
            lower: bounds.lower,
            upper: bounds.upper,
            estimated_rows: (bounds.upper - bounds.lower) * table.row_count() as f64,
            retained,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{diagnostics::RecordingSink, table::Column};

    fn dataset(rows: u32) -> Table {
        let grp = (0..rows).map(|v| if v % 2 == 0 { "test" } else { "control" });
        Table::new(vec![
            Column::numeric("x", (1..=rows).map(f64::from)),
            Column::text("grp", grp),
            Column::numeric("y", (1..=rows).map(|v| -f64::from(v))),
            Column::numeric("unused", (0..rows).map(|_| 0.0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_prepare_selects_configured_columns() {
        let dataset = dataset(10);
        let sink = RecordingSink::default();
        let config = ComparatorConfig::new(["y", "x"]).with_treatment("grp");
        let comparator = Comparator::with_sink(&dataset, config, sink.clone()).unwrap();
        let prepared = comparator.prepare().unwrap();
        assert_eq!(
            prepared.table.column_names().collect::<Vec<_>>(),
            ["y", "x", "grp"]
        );
        assert_eq!(prepared.table.row_count(), 10);
        assert_eq!(prepared.mode, ComparisonMode::MultiFeatureGrouped);
        assert!(sink.events().is_empty());
        assert_eq!(dataset.columns().len(), 4);
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let dataset = dataset(1000);
        let sink = RecordingSink::default();
        let config = ComparatorConfig::new(["x"]).with_sample_fraction(0.25);
        let comparator = Comparator::with_sink(&dataset, config, sink.clone()).unwrap();

        let first = comparator.prepare().unwrap();
        let second = comparator.prepare().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.table.row_count(), 250);

        let x = first.table.numeric("x").unwrap();
        assert!(x.windows(2).all(|w| w[0] < w[1]), "rows keep source order");

        assert_eq!(
            sink.events(),
            [
                Diagnostic::Sampled {
                    fraction: 0.25,
                    rows: 250
                },
                Diagnostic::Sampled {
                    fraction: 0.25,
                    rows: 250
                },
            ]
        );
    }

    #[test]
    fn test_trimming_is_per_column() {
        let dataset = Table::new(vec![
            Column::numeric("a", (1..=100).map(f64::from)),
            Column::numeric("b", (1..=100).rev().map(f64::from)),
        ])
        .unwrap();
        let sink = RecordingSink::default();
        let config = ComparatorConfig::new(["a", "b"]).with_outlier_bounds(0.05, 0.95);
        let comparator = Comparator::with_sink(&dataset, config, sink.clone()).unwrap();
        let prepared = comparator.prepare().unwrap();

        let a = prepared.table.numeric("a").unwrap();
        let kept = a.iter().flatten().copied().collect::<Vec<_>>();
        assert_eq!(kept, (6..=95).map(f64::from).collect::<Vec<_>>());
        assert_eq!(a[0], None);
        // b is reversed, so its first row holds 100 and is trimmed too
        let b = prepared.table.numeric("b").unwrap();
        assert_eq!(b[0], None);
        assert_eq!(b[5], Some(95.0));

        let events = sink.events();
        let [Diagnostic::OutliersTrimmed {
            estimated_rows,
            retained,
            ..
        }] = events.as_slice()
        else {
            panic!("unexpected diagnostics: {events:?}");
        };
        assert!((estimated_rows - 90.0).abs() < 1e-9);
        assert_eq!(retained, &[("a".to_owned(), 90), ("b".to_owned(), 90)]);
    }

    #[test]
    fn test_trimming_treats_nan_as_missing() {
        let dataset = Table::new(vec![
            Column::numeric_opt("x", [Some(1.0), Some(f64::NAN), Some(3.0), Some(4.0)]),
            Column::text("grp", ["test", "control", "test", "control"]),
        ])
        .unwrap();
        let config = ComparatorConfig::new(["x"])
            .with_treatment("grp")
            .with_outlier_bounds(0.1, 0.9);
        let sink = RecordingSink::default();
        let comparator = Comparator::with_sink(&dataset, config, sink.clone()).unwrap();
        let prepared = comparator.prepare().unwrap();
        // quantiles of [1, 3, 4] are 1.4 and 3.8
        assert_eq!(
            prepared.table.numeric("x").unwrap(),
            [None, None, Some(3.0), None].as_slice()
        );
        assert!(matches!(
            sink.events().as_slice(),
            [Diagnostic::OutliersTrimmed { retained, .. }] if retained == &[("x".to_owned(), 1)]
        ));
    }

    #[test]
    fn test_trimming_rejects_text_feature() {
        let dataset = Table::new(vec![Column::text("a", ["x", "y"])]).unwrap();
        let config = ComparatorConfig::new(["a"]).with_outlier_bounds(0.1, 0.9);
        let comparator =
            Comparator::with_sink(&dataset, config, RecordingSink::default()).unwrap();
        assert!(matches!(
            comparator.prepare(),
            Err(Error::Table(TableError::NotNumeric { .. }))
        ));
    }

    #[test]
    fn test_large_dataset_advisory() {
        let dataset = Table::new(vec![Column::numeric(
            "x",
            std::iter::repeat_n(1.0, 200_000),
        )])
        .unwrap();
        let sink = RecordingSink::default();
        Comparator::with_sink(&dataset, ComparatorConfig::new(["x"]), sink.clone()).unwrap();
        assert_eq!(
            sink.events(),
            [Diagnostic::LargeDataset { rows: 200_000.0 }]
        );

        sink.clear();
        let config = ComparatorConfig::new(["x"]).with_sample_fraction(0.5);
        Comparator::with_sink(&dataset, config, sink.clone()).unwrap();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_require_groups() {
        let dataset = dataset(4);
        let comparator = Comparator::with_sink(
            &dataset,
            ComparatorConfig::new(["x", "y"]),
            RecordingSink::default(),
        )
        .unwrap();
        let prepared = comparator.prepare().unwrap();
        assert_eq!(prepared.mode, ComparisonMode::PairwiseFeatures);
        assert_eq!(
            prepared.require_groups("t_test").unwrap_err(),
            ConfigError::TreatmentRequired {
                operation: "t_test"
            }
        );
    }
}
