use ndarray::{Array1, Array2, ArrayView2};
use serde::Serialize;

use super::{Table, TargetBlock};
use crate::{FitErr, Result};

/// The input features of a regression problem.
#[derive(Debug, Clone, PartialEq)]
pub enum Features {
    Table(Table),
    /// A dense block with one row per observation and one column per feature.
    Matrix(Array2<f32>),
}

impl Features {
    pub fn nrows(&self) -> usize {
        match self {
            Features::Table(table) => table.nrows(),
            Features::Matrix(m) => m.nrows(),
        }
    }

    pub fn ncols(&self) -> usize {
        match self {
            Features::Table(table) => table.ncols(),
            Features::Matrix(m) => m.ncols(),
        }
    }

    /// Returns the features as a dense `(ncols, nrows)` block: features as rows, observations
    /// as columns.
    pub fn to_matrix(&self) -> Array2<f32> {
        match self {
            Features::Table(table) => table.to_matrix(),
            Features::Matrix(m) => m.t().as_standard_layout().into_owned(),
        }
    }
}

impl From<Table> for Features {
    fn from(value: Table) -> Self {
        Self::Table(value)
    }
}

impl From<Array2<f32>> for Features {
    fn from(value: Array2<f32>) -> Self {
        Self::Matrix(value)
    }
}

/// The target of a regression problem.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// One scalar per observation.
    Vector(Vec<f32>),
    /// One fixed-size record per observation, without column names.
    Records(Vec<Vec<f32>>),
    /// One named column per target.
    Table(Table),
}

impl Target {
    pub fn nrows(&self) -> usize {
        match self {
            Target::Vector(v) => v.len(),
            Target::Records(r) => r.len(),
            Target::Table(table) => table.nrows(),
        }
    }

    /// Returns the shape metadata needed to reproduce this target's representation when
    /// predicting.
    pub fn shape(&self) -> Result<TargetShape> {
        let shape = match self {
            Target::Vector(_) => TargetShape::Univariate,
            Target::Records(records) => {
                let width = records.first().ok_or(FitErr::EmptyTarget)?.len();
                TargetShape::Multivariate {
                    names: (1..=width).map(|i| format!("y{i}")).collect(),
                }
            }
            Target::Table(table) => TargetShape::Multivariate {
                names: table.names().to_vec(),
            },
        };

        Ok(shape)
    }

    /// Converts the target into a single block spanning every row.
    pub fn to_block(&self) -> Result<TargetBlock> {
        match self {
            Target::Vector(v) => {
                if v.is_empty() {
                    return Err(FitErr::EmptyTarget);
                }

                Ok(TargetBlock::Univariate(Array1::from(v.clone())))
            }
            Target::Records(records) => stack_records(records).map(TargetBlock::Multivariate),
            Target::Table(table) => Ok(TargetBlock::Multivariate(table.to_matrix())),
        }
    }
}

impl From<Vec<f32>> for Target {
    fn from(value: Vec<f32>) -> Self {
        Self::Vector(value)
    }
}

impl From<Table> for Target {
    fn from(value: Table) -> Self {
        Self::Table(value)
    }
}

/// Stacks row-wise records into a `(width, nrows)` block.
fn stack_records(records: &[Vec<f32>]) -> Result<Array2<f32>> {
    let width = records.first().ok_or(FitErr::EmptyTarget)?.len();

    for (row, record) in records.iter().enumerate() {
        if record.len() != width {
            return Err(FitErr::RecordLengthMismatch {
                row,
                got: record.len(),
                expected: width,
            });
        }
    }

    if width == 0 {
        return Err(FitErr::EmptyTarget);
    }

    Ok(Array2::from_shape_fn((width, records.len()), |(c, r)| {
        records[r][c]
    }))
}

/// How the target was represented at training time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetShape {
    Univariate,
    Multivariate { names: Vec<String> },
}

impl TargetShape {
    /// The amount of outputs a chain needs to predict this target.
    pub fn n_outputs(&self) -> usize {
        match self {
            TargetShape::Univariate => 1,
            TargetShape::Multivariate { names } => names.len(),
        }
    }

    /// Reshapes a `(n_outputs, n)` prediction block into this target's representation.
    pub fn reshape(&self, block: ArrayView2<f32>) -> Result<Predictions> {
        match self {
            TargetShape::Univariate => Ok(Predictions::Vector(block.iter().copied().collect())),
            TargetShape::Multivariate { names } => {
                Table::from_matrix(names.clone(), block).map(Predictions::Table)
            }
        }
    }
}

/// Predictions shaped like the target the chain was trained on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Predictions {
    Vector(Vec<f32>),
    Table(Table),
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn matrix_features_are_transposed() {
        let features = Features::Matrix(array![[1., 2.], [3., 4.], [5., 6.]]);

        assert_eq!(features.nrows(), 3);
        assert_eq!(features.ncols(), 2);
        assert_eq!(features.to_matrix(), array![[1., 3., 5.], [2., 4., 6.]]);
    }

    #[test]
    fn records_are_stacked_as_rows_per_target() {
        let target = Target::Records(vec![vec![1., 10.], vec![2., 20.], vec![3., 30.]]);

        assert_eq!(target.nrows(), 3);
        assert_eq!(
            target.to_block().unwrap(),
            TargetBlock::Multivariate(array![[1., 2., 3.], [10., 20., 30.]])
        );
        assert_eq!(
            target.shape().unwrap(),
            TargetShape::Multivariate {
                names: vec!["y1".into(), "y2".into()]
            }
        );
    }

    #[test]
    fn ragged_records_are_rejected() {
        let target = Target::Records(vec![vec![1., 10.], vec![2.]]);

        assert_eq!(
            target.to_block(),
            Err(FitErr::RecordLengthMismatch {
                row: 1,
                got: 1,
                expected: 2,
            })
        );
    }

    #[test]
    fn empty_targets_are_rejected() {
        assert_eq!(Target::Vector(vec![]).to_block(), Err(FitErr::EmptyTarget));
        assert_eq!(Target::Records(vec![]).to_block(), Err(FitErr::EmptyTarget));
    }

    #[test]
    fn reshape_follows_the_target_shape() {
        let block = array![[1., 2.], [3., 4.]];
        let shape = TargetShape::Multivariate {
            names: vec!["a".into(), "b".into()],
        };

        let Predictions::Table(table) = shape.reshape(block.view()).unwrap() else {
            panic!("expected a table");
        };
        assert_eq!(table.column("a"), Some(&[1., 2.][..]));
        assert_eq!(table.column("b"), Some(&[3., 4.][..]));

        let flat = TargetShape::Univariate.reshape(array![[7., 8., 9.]].view());
        assert_eq!(flat, Ok(Predictions::Vector(vec![7., 8., 9.])));
    }
}
