//! Comparing numeric distributions in tabular data.
//!
//! A [`Comparator`](comparator::Comparator) holds a dataset and a
//! [`ComparatorConfig`](config::ComparatorConfig) naming the features to
//! compare and, optionally, a treatment column that splits rows into two
//! groups. Every analysis re-runs the preparation pipeline (column
//! selection, reproducible sampling, per-feature outlier trimming) and then
//! compares either the treatment groups of each feature or the features
//! against each other:
//!
//! - [`ks_test`](comparator::Comparator::ks_test): two-sample Kolmogorov–Smirnov test
//! - [`t_test`](comparator::Comparator::t_test): Welch's t-test, test group against control
//! - [`balance_table`](comparator::Comparator::balance_table): per-feature `mean (std)` and SMD
//! - [`plot_ecdf`](comparator::Comparator::plot_ecdf) and
//!   [`plot_histogram`](comparator::Comparator::plot_histogram): plots drawn by a
//!   caller-supplied [`PlotRenderer`](plot::PlotRenderer)
//!
//! Advisories raised during preparation are delivered to a
//! [`DiagnosticSink`](diagnostics::DiagnosticSink) rather than printed.
//!
//! # Examples
//!
//! ```
//! use distcomp::{
//!     comparator::Comparator,
//!     config::ComparatorConfig,
//!     ks_test::KsTestOptions,
//!     table::{Column, Table},
//! };
//!
//! let dataset = Table::new(vec![
//!     Column::numeric("a", [0.1, 0.4, 0.7, 1.0, 1.3]),
//!     Column::numeric("b", [5.1, 5.4, 5.7, 6.0, 6.3]),
//! ])?;
//! let comparator = Comparator::new(&dataset, ComparatorConfig::new(["a", "b"]))?;
//! let reports = comparator.ks_test(&KsTestOptions::default())?;
//! assert!(reports[0].verdict.is_different_distribution());
//! # Ok::<(), distcomp::Error>(())
//! ```

pub mod balance;
pub mod comparator;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod plot;
pub mod table;
pub mod verdict;

pub use distcomp_stats::{
    StatsError,
    histogram::HistNorm,
    ks::{KsAlternative, KsMode},
};

/// Any failure of a comparator operation.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum Error {
    #[display("{_0}")]
    Config(config::ConfigError),
    #[display("{_0}")]
    Table(table::TableError),
    #[display("{_0}")]
    Stats(StatsError),
    #[display("{_0}")]
    Render(plot::RenderError),
}
