use ndarray::{Array2, ArrayView2};

use crate::{Result, arch::loss::LossFn};

/// A trainable, parameterized function.
///
/// A chain owns its parameters as one flat buffer so that optimizers can update them in place.
/// Every array uses the `(dimension, observations)` layout: features as rows, observations as
/// columns.
pub trait Chain: Send + Sync {
    /// Returns the amount of parameters in the chain.
    fn size(&self) -> usize {
        self.params().len()
    }

    /// The amount of features the chain expects per observation.
    fn input_dim(&self) -> usize;

    /// The amount of outputs the chain produces per observation.
    fn output_dim(&self) -> usize;

    fn params(&self) -> &[f32];

    fn params_mut(&mut self) -> &mut [f32];

    /// Evaluates the chain on `x` without touching any training metadata.
    ///
    /// # Arguments
    /// * `x` - The input block, shaped `(input_dim, n)`.
    ///
    /// # Returns
    /// The prediction block, shaped `(output_dim, n)`.
    fn forward(&self, x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Computes the gradient of the loss function with respect to the parameters of the chain
    /// over a single block of data, **adding** it into `grad`. The parameters are not modified.
    ///
    /// # Arguments
    /// * `x` - The input block.
    /// * `y` - The expected outputs, shaped like the chain's predictions.
    /// * `loss_fn` - The loss function.
    /// * `grad` - A buffer of `size()` elements to accumulate the gradient into.
    ///
    /// # Returns
    /// The loss of the block before any update.
    fn backprop<L>(
        &mut self,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        loss_fn: &L,
        grad: &mut [f32],
    ) -> Result<f32>
    where
        L: LossFn;
}
