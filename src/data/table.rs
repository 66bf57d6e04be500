use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::{FitErr, Result};

/// An ordered, row-aligned collection of named numeric columns.
///
/// Tables are never empty and every column has the same amount of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct RawTable {
    names: Vec<String>,
    columns: Vec<Vec<f32>>,
}

impl TryFrom<RawTable> for Table {
    type Error = FitErr;

    fn try_from(raw: RawTable) -> Result<Self> {
        Self::new(raw.names, raw.columns)
    }
}

impl Table {
    /// Creates a new `Table`.
    ///
    /// # Arguments
    /// * `names` - The name of each column.
    /// * `columns` - The values of each column.
    ///
    /// # Returns
    /// A new table, or an error if it would be empty or its columns are not row-aligned.
    pub fn new(names: Vec<String>, columns: Vec<Vec<f32>>) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(FitErr::ColumnNamesMismatch {
                got: names.len(),
                expected: columns.len(),
            });
        }

        let Some(expected) = columns.first().map(Vec::len) else {
            return Err(FitErr::EmptyTable);
        };

        if expected == 0 {
            return Err(FitErr::EmptyTable);
        }

        for (name, column) in names.iter().zip(&columns) {
            if column.len() != expected {
                return Err(FitErr::ColumnLengthMismatch {
                    column: name.clone(),
                    got: column.len(),
                    expected,
                });
            }
        }

        Ok(Self { names, columns })
    }

    /// Creates a new `Table` from `(name, values)` pairs.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        let (names, columns): (Vec<String>, Vec<Vec<f32>>) = columns
            .into_iter()
            .map(|(name, values)| (name.into(), values))
            .unzip();

        Self::new(names, columns)
    }

    /// Creates a new `Table` from a block laid out with one row per column.
    pub fn from_matrix(names: Vec<String>, matrix: ArrayView2<f32>) -> Result<Self> {
        let columns = matrix.rows().into_iter().map(|row| row.to_vec()).collect();
        Self::new(names, columns)
    }

    pub fn nrows(&self) -> usize {
        self.columns[0].len()
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&[f32]> {
        let i = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[i])
    }

    /// Returns the table as a dense `(ncols, nrows)` block, one row per column.
    pub fn to_matrix(&self) -> Array2<f32> {
        let (ncols, nrows) = (self.ncols(), self.nrows());
        Array2::from_shape_fn((ncols, nrows), |(c, r)| self.columns[c][r])
    }
}
