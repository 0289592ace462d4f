//! Covariate balance between the test group and the control group
//!
//! [`create_table_one`] summarizes every feature per group as
//! `mean (std)` and reports the standardized mean difference (SMD) between
//! the groups. [`Comparator::balance_table`] adapts a comparator to it by
//! deriving a binary test-group indicator from the treatment column.

use std::fmt;

use distcomp_stats::{descriptive::DescriptiveStats, smd::standardized_mean_difference};
use serde::Serialize;

use crate::{
    Error,
    comparator::Comparator,
    config::ConfigError,
    table::{Column, Table, TableError},
};

/// Mean and sample standard deviation of a feature within one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupSummary {
    pub mean: f64,
    pub std_dev: f64,
}

impl GroupSummary {
    fn new(sample: &[f64]) -> Option<Self> {
        DescriptiveStats::new(sample.iter().copied().filter(|v| !v.is_nan())).map(|stats| Self {
            mean: stats.mean,
            std_dev: stats.std_dev,
        })
    }
}

impl fmt::Display for GroupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} ({:.2})", self.mean, self.std_dev)
    }
}

/// One feature of a [`BalanceTable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceRow {
    pub variable: String,
    /// `None` when the group has no values for this feature.
    pub control: Option<GroupSummary>,
    pub treatment: Option<GroupSummary>,
    /// SMD rounded to four decimal places; `None` when undefined.
    pub smd: Option<f64>,
}

/// Per-feature balance summary of a treatment and a control group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceTable {
    /// Non-missing values of the first feature in the control group.
    pub n_control: usize,
    /// Non-missing values of the first feature in the treatment group.
    pub n_treatment: usize,
    pub rows: Vec<BalanceRow>,
}

impl fmt::Display for BalanceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = |summary: Option<GroupSummary>| summary.map_or_else(String::new, |s| s.to_string());
        let mut lines = vec![
            [
                "Variable".to_owned(),
                "Control".to_owned(),
                "Treatment".to_owned(),
                "SMD".to_owned(),
            ],
            [
                "n".to_owned(),
                self.n_control.to_string(),
                self.n_treatment.to_string(),
                String::new(),
            ],
        ];
        lines.extend(self.rows.iter().map(|row| {
            [
                row.variable.clone(),
                cell(row.control),
                cell(row.treatment),
                row.smd.map_or_else(String::new, |smd| format!("{smd:.4}")),
            ]
        }));

        let mut widths = [0; 4];
        for line in &lines {
            for (width, text) in widths.iter_mut().zip(line) {
                *width = (*width).max(text.chars().count());
            }
        }
        for (idx, line) in lines.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            let mut text = format!("{:<w$}", line[0], w = widths[0]);
            for (cell, width) in line.iter().zip(widths).skip(1) {
                text.push_str(&format!("  {cell:>width$}"));
            }
            f.write_str(text.trim_end())?;
        }
        Ok(())
    }
}

/// Builds a balance table from a binary `indicator` column.
///
/// Rows where the indicator is `1` form the treatment group, rows where it is
/// `0` the control group; rows with a missing indicator are ignored. Missing
/// (or `NaN`) feature values are dropped per group.
///
/// # Examples
///
/// ```
/// use distcomp::{
///     balance::create_table_one,
///     table::{Column, Table},
/// };
///
/// let data = Table::new(vec![
///     Column::numeric("age", [30.0, 40.0, 35.0, 45.0]),
///     Column::numeric("treated", [0.0, 0.0, 1.0, 1.0]),
/// ])?;
/// let table = create_table_one(&data, "treated", &["age"])?;
/// assert_eq!(table.n_control, 2);
/// assert_eq!(table.rows[0].smd, Some(0.7071));
/// # Ok::<(), distcomp::table::TableError>(())
/// ```
pub fn create_table_one<S>(
    data: &Table,
    indicator: &str,
    features: &[S],
) -> Result<BalanceTable, TableError>
where
    S: AsRef<str>,
{
    let indicator = data.numeric(indicator)?;
    let split = |values: &[Option<f64>]| {
        let mut control = Vec::new();
        let mut treatment = Vec::new();
        for (flag, value) in indicator.iter().zip(values) {
            match (flag, value.filter(|v| !v.is_nan())) {
                (Some(flag), Some(value)) if *flag == 1.0 => treatment.push(value),
                (Some(flag), Some(value)) if *flag == 0.0 => control.push(value),
                _ => {}
            }
        }
        (control, treatment)
    };

    let mut n_control = 0;
    let mut n_treatment = 0;
    let mut rows = Vec::with_capacity(features.len());
    for (idx, feature) in features.iter().enumerate() {
        let feature = feature.as_ref();
        let (control, treatment) = split(data.numeric(feature)?);
        if idx == 0 {
            n_control = control.len();
            n_treatment = treatment.len();
        }
        rows.push(BalanceRow {
            variable: feature.to_owned(),
            control: GroupSummary::new(&control),
            treatment: GroupSummary::new(&treatment),
            smd: standardized_mean_difference(&treatment, &control)
                .map(|smd| (smd * 1e4).round() / 1e4),
        });
    }

    Ok(BalanceTable {
        n_control,
        n_treatment,
        rows,
    })
}

impl Comparator<'_> {
    /// Reports feature balance between the test group and everything else.
    ///
    /// Rows whose treatment equals `test_group` are the treatment group, all
    /// other rows, including those with a missing treatment, the control group.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::TreatmentRequired`] without a treatment
    /// - [`ConfigError::NoRowsMatchedTestGroup`] if no row is in `test_group`
    /// - [`ConfigError::EmptyControlGroup`] if every row is in `test_group`
    pub fn balance_table(&self, test_group: &str) -> Result<BalanceTable, Error> {
        let prepared = self.prepare()?;
        let groups = prepared.require_groups("balance_table")?;
        let test_idx = groups.position(test_group);
        let has_control = groups.distinct_count() > usize::from(test_idx.is_some());
        let group_error = |test_matched: bool| {
            let treatment = groups.column().to_owned();
            let test_group = test_group.to_owned();
            if test_matched {
                ConfigError::EmptyControlGroup {
                    treatment,
                    test_group,
                }
            } else {
                ConfigError::NoRowsMatchedTestGroup {
                    treatment,
                    test_group,
                }
            }
        };
        let Some(test_idx) = test_idx else {
            return Err(group_error(false).into());
        };
        if !has_control {
            return Err(group_error(true).into());
        }

        let flags = (0..prepared.table.row_count())
            .map(|row| f64::from(u8::from(groups.group_of(row) == Some(test_idx))));
        let name = indicator_name(&prepared.table);
        let table = prepared
            .table
            .clone()
            .with_column(Column::numeric(name.clone(), flags))?;
        Ok(create_table_one(&table, &name, &prepared.features)?)
    }
}

/// A column name not already used by `table`.
fn indicator_name(table: &Table) -> String {
    let mut name = "treatment_col".to_owned();
    while table.contains(&name) {
        name.push('_');
    }
    name
}
