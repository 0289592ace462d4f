//! In-memory column-oriented tables
//!
//! A [`Table`] is an ordered set of equally long, uniquely named columns.
//! Cells are either numeric or text, and `None` marks a missing value.
//!
//! Tables are never mutated through a shared reference: projection and row
//! selection copy the data, so a source dataset handed to a
//! [`Comparator`](crate::comparator::Comparator) stays untouched.

use std::collections::HashSet;

/// Errors raised by table construction and column lookup.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TableError {
    #[display("duplicate column '{name}'")]
    DuplicateColumn { name: String },
    #[display("column '{name}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[display("column '{name}' not found")]
    ColumnNotFound { name: String },
    #[display("column '{name}' is not numeric")]
    NotNumeric { name: String },
}

/// Cell storage of a single column.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::Text(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The cell at `row` rendered as a group label.
    ///
    /// Numbers use the shortest `f64` display, so `1.0` becomes `"1"`.
    /// Missing cells have no label.
    #[must_use]
    pub fn label(&self, row: usize) -> Option<String> {
        match self {
            Self::Numeric(values) => values.get(row).copied().flatten().map(|v| v.to_string()),
            Self::Text(values) => values.get(row).cloned().flatten(),
        }
    }

    fn take(&self, rows: &[usize]) -> Self {
        match self {
            Self::Numeric(values) => Self::Numeric(rows.iter().map(|&row| values[row]).collect()),
            Self::Text(values) => Self::Text(rows.iter().map(|&row| values[row].clone()).collect()),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    /// A numeric column where `NaN` marks a missing value.
    pub fn numeric<S, I>(name: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = f64>,
    {
        let values = values
            .into_iter()
            .map(|v| (!v.is_nan()).then_some(v))
            .collect();
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    /// A numeric column with explicit missing values.
    ///
    /// `Some(NaN)` is stored as missing, as in [`Column::numeric`].
    pub fn numeric_opt<S, I>(name: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = Option<f64>>,
    {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values.into_iter().collect()),
        }
        .with_nan_missing()
    }

    /// A text column without missing values.
    pub fn text<S, I, T>(name: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::text_opt(name, values.into_iter().map(|v| Some(v.into())))
    }

    /// A text column with explicit missing values.
    pub fn text_opt<S, I>(name: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = Option<String>>,
    {
        Self {
            name: name.into(),
            data: ColumnData::Text(values.into_iter().collect()),
        }
    }

    fn with_nan_missing(mut self) -> Self {
        if let ColumnData::Numeric(values) = &mut self.data {
            for value in values.iter_mut() {
                if value.is_some_and(f64::is_nan) {
                    *value = None;
                }
            }
        }
        self
    }
}

/// An ordered collection of equally long, uniquely named columns.
///
/// # Examples
///
/// ```
/// use distcomp::table::{Column, Table};
///
/// let table = Table::new(vec![
///     Column::numeric("x", [1.0, 2.0, f64::NAN]),
///     Column::text("grp", ["test", "control", "test"]),
/// ])
/// .unwrap();
/// assert_eq!(table.row_count(), 3);
/// assert_eq!(table.numeric("x").unwrap(), &[Some(1.0), Some(2.0), None]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Builds a table, checking that names are unique and lengths agree.
    ///
    /// `NaN` cells of numeric columns are stored as missing.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let columns = columns
            .into_iter()
            .map(Column::with_nan_missing)
            .collect::<Vec<_>>();
        let row_count = columns.first().map_or(0, |column| column.data.len());
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
            if column.data.len() != row_count {
                return Err(TableError::LengthMismatch {
                    name: column.name.clone(),
                    expected: row_count,
                    actual: column.data.len(),
                });
            }
        }
        Ok(Self { columns, row_count })
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Looks up a column, failing if it is absent.
    pub fn require(&self, name: &str) -> Result<&Column, TableError> {
        self.column(name).ok_or_else(|| TableError::ColumnNotFound {
            name: name.to_owned(),
        })
    }

    /// The cells of a numeric column.
    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>], TableError> {
        match &self.require(name)?.data {
            ColumnData::Numeric(values) => Ok(values),
            ColumnData::Text(_) => Err(TableError::NotNumeric {
                name: name.to_owned(),
            }),
        }
    }

    pub(crate) fn numeric_mut(&mut self, name: &str) -> Result<&mut Vec<Option<f64>>, TableError> {
        let column = self
            .columns
            .iter_mut()
            .find(|column| column.name == name)
            .ok_or_else(|| TableError::ColumnNotFound {
                name: name.to_owned(),
            })?;
        match &mut column.data {
            ColumnData::Numeric(values) => Ok(values),
            ColumnData::Text(_) => Err(TableError::NotNumeric {
                name: name.to_owned(),
            }),
        }
    }

    /// Projects the table onto `names`, in that order.
    pub fn select<S>(&self, names: &[S]) -> Result<Self, TableError>
    where
        S: AsRef<str>,
    {
        let columns = names
            .iter()
            .map(|name| self.require(name.as_ref()).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(columns)
    }

    /// Keeps the rows at `rows`, in that order.
    ///
    /// # Panics
    ///
    /// Panics if a row index is out of bounds.
    #[must_use]
    pub fn take_rows(&self, rows: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|column| Column {
                name: column.name.clone(),
                data: column.data.take(rows),
            })
            .collect();
        Self {
            columns,
            row_count: rows.len(),
        }
    }

    /// Adds `column`, replacing an existing column of the same name.
    pub fn with_column(mut self, column: Column) -> Result<Self, TableError> {
        let column = column.with_nan_missing();
        if !self.columns.is_empty() && column.data.len() != self.row_count {
            return Err(TableError::LengthMismatch {
                name: column.name,
                expected: self.row_count,
                actual: column.data.len(),
            });
        }
        if self.columns.is_empty() {
            self.row_count = column.data.len();
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(self)
    }
}
