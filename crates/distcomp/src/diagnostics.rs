//! Advisory notices raised while preparing data
//!
//! Advisories never fail an operation. They are delivered as typed
//! [`Diagnostic`] values to a [`DiagnosticSink`], so callers decide whether to
//! log, display or collect them.

use std::{cell::RefCell, fmt, rc::Rc};

/// Row count above which plotting is expected to be slow.
pub const LARGE_DATASET_ROWS: f64 = 150_000.0;

/// A single advisory notice.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// The sampled dataset is large enough to make plotting slow.
    LargeDataset { rows: f64 },
    /// Rows were sampled down to `rows`.
    Sampled { fraction: f64, rows: usize },
    /// Feature values outside the outlier quantile bounds were marked missing.
    OutliersTrimmed {
        lower: f64,
        upper: f64,
        /// `(upper - lower) * row_count`, an estimate of the rows kept.
        estimated_rows: f64,
        /// Non-missing values left in each feature after trimming.
        retained: Vec<(String, usize)>,
    },
}

/// Discriminant of a [`Diagnostic`], stable for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DiagnosticKind {
    #[display("large-dataset")]
    LargeDataset,
    #[display("sampled")]
    Sampled,
    #[display("outliers-trimmed")]
    OutliersTrimmed,
}

impl Diagnostic {
    #[must_use]
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::LargeDataset { .. } => DiagnosticKind::LargeDataset,
            Self::Sampled { .. } => DiagnosticKind::Sampled,
            Self::OutliersTrimmed { .. } => DiagnosticKind::OutliersTrimmed,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LargeDataset { rows } => write!(
                f,
                "dataset has {rows:.0} rows after sampling; plotting may be slow, consider a smaller sample_fraction"
            ),
            Self::Sampled { fraction, rows } => {
                write!(f, "sampled {fraction} of rows: {rows} rows remaining")
            }
            Self::OutliersTrimmed {
                lower,
                upper,
                estimated_rows,
                retained,
            } => {
                write!(
                    f,
                    "trimmed values outside quantiles [{lower}, {upper}]: ~{estimated_rows:.0} rows remaining"
                )?;
                for (idx, (feature, count)) in retained.iter().enumerate() {
                    let sep = if idx == 0 { " (" } else { ", " };
                    write!(f, "{sep}{feature}: {count}")?;
                }
                if !retained.is_empty() {
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}

/// Receiver of advisory notices.
pub trait DiagnosticSink {
    fn emit(&self, diagnostic: &Diagnostic);
}

/// Logs every advisory through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        let kind = diagnostic.kind();
        match diagnostic {
            Diagnostic::LargeDataset { rows } => {
                tracing::warn!(%kind, rows, "{diagnostic}");
            }
            Diagnostic::Sampled { fraction, rows } => {
                tracing::info!(%kind, fraction, rows, "{diagnostic}");
            }
            Diagnostic::OutliersTrimmed {
                lower,
                upper,
                estimated_rows,
                ..
            } => {
                tracing::info!(%kind, lower, upper, estimated_rows, "{diagnostic}");
            }
        }
    }
}

/// Collects advisories in memory.
///
/// Clones share the same buffer, so one clone can be handed to a
/// [`Comparator`](crate::comparator::Comparator) and the other inspected.
///
/// # Examples
///
/// ```
/// use distcomp::diagnostics::{Diagnostic, DiagnosticSink as _, RecordingSink};
///
/// let sink = RecordingSink::default();
/// sink.clone().emit(&Diagnostic::Sampled { fraction: 0.5, rows: 10 });
/// assert_eq!(sink.events().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<Diagnostic>>>,
}

impl RecordingSink {
    /// Every advisory received so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        self.events.borrow_mut().push(diagnostic.clone());
    }
}
