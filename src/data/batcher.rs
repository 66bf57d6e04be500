use std::ops::Range;

use log::debug;
use ndarray::{s, Array1, Array2, ArrayView2, Axis};

use super::{Features, Target};
use crate::{FitErr, Result};

/// A target block, laid out like the features with observations as columns.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetBlock {
    Univariate(Array1<f32>),
    /// One row per target.
    Multivariate(Array2<f32>),
}

impl TargetBlock {
    /// Returns the block as `(n_targets, n)`, a univariate block being a single row.
    pub fn view(&self) -> ArrayView2<'_, f32> {
        match self {
            TargetBlock::Univariate(y) => y.view().insert_axis(Axis(0)),
            TargetBlock::Multivariate(y) => y.view(),
        }
    }

    fn slice(&self, window: Range<usize>) -> Self {
        match self {
            TargetBlock::Univariate(y) => TargetBlock::Univariate(y.slice(s![window]).to_owned()),
            TargetBlock::Multivariate(y) => {
                TargetBlock::Multivariate(y.slice(s![.., window]).to_owned())
            }
        }
    }
}

/// A window of observations: the `(n_features, n)` feature block and its target block.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub x: Array2<f32>,
    pub y: TargetBlock,
}

impl Batch {
    /// The amount of observations in this batch.
    pub fn len(&self) -> usize {
        self.x.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partitions `[0, nrows)` into contiguous windows of `batch_size` rows, in order.
///
/// The last window may be shorter. A `batch_size` of zero, or one covering every row, yields a
/// single window spanning all of them.
pub fn windows(nrows: usize, batch_size: usize) -> Vec<Range<usize>> {
    if batch_size == 0 || batch_size >= nrows {
        return vec![0..nrows];
    }

    (0..nrows)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(nrows))
        .collect()
}

/// Converts the raw features and target into the fixed sequence of batches used for training.
///
/// # Arguments
/// * `features` - The input features.
/// * `target` - The target, aligned row by row with `features`.
/// * `batch_size` - The amount of rows per batch, `0` meaning a single full batch.
///
/// # Returns
/// The batches in row order, or an input-validation error.
pub fn collate(features: &Features, target: &Target, batch_size: usize) -> Result<Vec<Batch>> {
    let nrows = features.nrows();

    if nrows != target.nrows() {
        return Err(FitErr::RowCountMismatch {
            features: nrows,
            target: target.nrows(),
        });
    }

    if nrows == 0 || features.ncols() == 0 {
        return Err(FitErr::EmptyTable);
    }

    let x = features.to_matrix();
    let y = target.to_block()?;

    let batches: Vec<Batch> = windows(nrows, batch_size)
        .into_iter()
        .map(|window| Batch {
            x: x.slice(s![.., window.clone()]).to_owned(),
            y: y.slice(window),
        })
        .collect();

    debug!(rows = nrows, batch_size = batch_size, batches = batches.len(); "collated data");
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::data::Table;

    #[test]
    fn windows_partition_every_row_in_order() {
        for nrows in 1..40 {
            for batch_size in 1..nrows {
                let ws = windows(nrows, batch_size);

                assert_eq!(ws.len(), nrows.div_ceil(batch_size));
                let flat: Vec<usize> = ws.iter().cloned().flatten().collect();
                assert_eq!(flat, (0..nrows).collect::<Vec<_>>());
                assert!(ws.iter().all(|w| w.len() <= batch_size));
            }
        }
    }

    #[test]
    fn zero_or_oversized_batch_size_means_a_single_window() {
        assert_eq!(windows(10, 0), vec![0..10]);
        assert_eq!(windows(10, 10), vec![0..10]);
        assert_eq!(windows(10, 25), vec![0..10]);
    }

    #[test]
    fn univariate_batches_slice_columns() {
        let features = Features::Matrix(array![[1., 2.], [3., 4.], [5., 6.]]);
        let target = Target::Vector(vec![10., 20., 30.]);

        let batches = collate(&features, &target, 2).unwrap();

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].x, array![[1., 3.], [2., 4.]]);
        assert_eq!(batches[0].y, TargetBlock::Univariate(array![10., 20.]));
        assert_eq!(batches[1].x, array![[5.], [6.]]);
        assert_eq!(batches[1].y.view(), array![[30.]]);
    }

    #[test]
    fn multivariate_batches_keep_one_row_per_target() {
        let features = Table::from_columns([("x", vec![1., 2., 3.])]).unwrap();
        let target = Table::from_columns([("a", vec![1., 2., 3.]), ("b", vec![4., 5., 6.])])
            .unwrap();

        let batches = collate(&features.into(), &target.into(), 2).unwrap();

        assert_eq!(batches[0].y.view(), array![[1., 2.], [4., 5.]]);
        assert_eq!(batches[1].y.view(), array![[3.], [6.]]);
    }

    #[test]
    fn mismatched_row_counts_are_rejected() {
        let features = Features::Matrix(Array2::zeros((3, 2)));
        let target = Target::Vector(vec![1., 2.]);

        assert_eq!(
            collate(&features, &target, 1),
            Err(FitErr::RowCountMismatch {
                features: 3,
                target: 2,
            })
        );
    }

    #[test]
    fn empty_features_are_rejected() {
        let features = Features::Matrix(Array2::zeros((0, 2)));
        let target = Target::Vector(vec![]);

        assert_eq!(collate(&features, &target, 1), Err(FitErr::EmptyTable));
    }
}
