use std::path::PathBuf;

use clap::{Parser, Subcommand};
use distcomp::{config::ComparatorConfig, table::Table};

use crate::util;

use self::{
    ecdf::EcdfArg, hist::HistArg, ks_test::KsTestArg, t_test::TTestArg, table_one::TableOneArg,
};

mod ecdf;
mod hist;
mod ks_test;
mod t_test;
mod table_one;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Analysis to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Two-sample Kolmogorov-Smirnov test
    KsTest(#[clap(flatten)] KsTestArg),
    /// Welch's t-test of the test group against control
    TTest(#[clap(flatten)] TTestArg),
    /// Balance table with per-group mean (std) and SMD
    TableOne(#[clap(flatten)] TableOneArg),
    /// Plot empirical CDFs as SVG files
    Ecdf(#[clap(flatten)] EcdfArg),
    /// Plot overlaid histograms as SVG files
    Hist(#[clap(flatten)] HistArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::KsTest(arg) => ks_test::run(&arg)?,
        Mode::TTest(arg) => t_test::run(&arg)?,
        Mode::TableOne(arg) => table_one::run(&arg)?,
        Mode::Ecdf(arg) => ecdf::run(&arg)?,
        Mode::Hist(arg) => hist::run(&arg)?,
    }
    Ok(())
}

/// Dataset and comparator configuration shared by every subcommand.
///
/// Flags given together with `--config` override the values from the file.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct DatasetArg {
    /// CSV data file with a header row
    data_file: PathBuf,
    /// JSON comparator configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Feature columns to compare
    #[arg(long, value_delimiter = ',', required_unless_present = "config")]
    features: Vec<String>,
    /// Column splitting rows into two groups
    #[arg(long)]
    treatment: Option<String>,
    /// Lower and upper quantile bounds for outlier trimming
    #[arg(long, value_delimiter = ',', num_args = 2, value_names = ["LOWER", "UPPER"])]
    outlier_bounds: Option<Vec<f64>>,
    /// Fraction of rows kept by reproducible sampling
    #[arg(long)]
    sample_fraction: Option<f64>,
}

impl DatasetArg {
    /// Loads the dataset and resolves the comparator configuration.
    pub(crate) fn load(&self) -> anyhow::Result<(Table, ComparatorConfig)> {
        let config = self.config()?;
        tracing::info!(path = %self.data_file.display(), "loading dataset");
        let table = util::read_csv_file(&self.data_file)?;
        tracing::info!(
            rows = table.row_count(),
            columns = table.columns().len(),
            "dataset loaded"
        );
        Ok((table, config))
    }

    fn config(&self) -> anyhow::Result<ComparatorConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_config_file(path)?,
            None => ComparatorConfig::new(Vec::<String>::new()),
        };
        if !self.features.is_empty() {
            config.features.clone_from(&self.features);
        }
        if let Some(treatment) = &self.treatment {
            config.treatment = Some(treatment.clone());
        }
        if let Some([lower, upper]) = self.outlier_bounds.as_deref() {
            config = config.with_outlier_bounds(*lower, *upper);
        }
        if let Some(sample_fraction) = self.sample_fraction {
            config = config.with_sample_fraction(sample_fraction);
        }
        Ok(config)
    }
}
