use ndarray::{linalg, prelude::*};

use crate::{MlErr, Result, arch::activations::ActFn};

/// A fully connected layer computing `act_fn(W x + b)`.
///
/// Inputs are laid out with features as rows and observations as columns, so `x` has shape
/// `(n_in, n)` and the output has shape `(n_out, n)`. The layer's parameters are the row-major
/// `(n_out, n_in)` weights followed by the `n_out` biases.
#[derive(Debug, Clone)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,
    size: usize,

    // Forward metadata
    x: Array2<f32>,
    z: Array2<f32>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The `(n_in, n_out)` dimensions of the layer.
    /// * `act_fn` - The activation function applied to the weighted sums, if any.
    pub fn new(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        let zeros = Array2::zeros((0, 0));

        Self {
            dim,
            size: (dim.0 + 1) * dim.1,
            act_fn,
            x: zeros.clone(),
            z: zeros,
        }
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the `(n_in, n_out)` dimensions of this layer.
    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// Evaluates the layer without keeping any metadata for a later backward pass.
    pub fn forward(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let z = self.weighted_sum(params, x)?;
        Ok(self.activate(z))
    }

    /// Evaluates the layer and keeps its input and weighted sums for `backward`.
    pub fn forward_cached(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let z = self.weighted_sum(params, x)?;
        let a = self.activate(z.clone());

        self.x = x.to_owned();
        self.z = z;
        Ok(a)
    }

    /// Propagates the delta `d` (the derivative of the loss with respect to this layer's output)
    /// backwards, **adding** this layer's gradient into `grad`.
    ///
    /// # Arguments
    /// * `params` - This layer's parameters.
    /// * `grad` - This layer's slice of the gradient buffer.
    /// * `d` - The delta of this layer's output, shaped `(n_out, n)`.
    ///
    /// # Returns
    /// The delta of this layer's input, shaped `(n_in, n)`.
    pub fn backward(
        &self,
        params: &[f32],
        grad: &mut [f32],
        mut d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        if d.dim() != self.z.dim() {
            return Err(MlErr::SizeMismatch {
                what: "dense layer delta",
                got: d.len(),
                expected: self.z.len(),
            });
        }

        if let Some(act_fn) = &self.act_fn {
            d.zip_mut_with(&self.z, |d, &z| *d *= act_fn.df(z));
        }

        let (mut dw, mut db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &d, &self.x.t(), 1.0, &mut dw);
        db += &d.sum_axis(Axis(1));

        let (w, _) = self.view_params(params)?;
        Ok(w.t().dot(&d))
    }

    fn weighted_sum(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if x.nrows() != self.dim.0 {
            return Err(MlErr::SizeMismatch {
                what: "dense layer input rows",
                got: x.nrows(),
                expected: self.dim.0,
            });
        }

        let (w, b) = self.view_params(params)?;
        let mut z = w.dot(&x);
        z += &b.insert_axis(Axis(1));
        Ok(z)
    }

    fn activate(&self, mut z: Array2<f32>) -> Array2<f32> {
        if let Some(act_fn) = &self.act_fn {
            z.mapv_inplace(|z| act_fn.f(z));
        }

        z
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    ///
    /// # Arguments
    /// * `grad` - A gradient slice.
    ///
    /// # Returns
    /// A tuple containing the delta weights and delta biases.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        self.check_len("dense layer gradient", grad.len())?;

        let (n_in, n_out) = self.dim;
        let (dw_raw, db_raw) = grad.split_at_mut(n_in * n_out);
        let dw = ArrayViewMut2::from_shape((n_out, n_in), dw_raw).map_err(|_| self.mismatch())?;
        let db = ArrayViewMut1::from_shape(n_out, db_raw).map_err(|_| self.mismatch())?;
        Ok((dw, db))
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    ///
    /// # Arguments
    /// * `params` - A slice of parameters.
    ///
    /// # Returns
    /// A tuple containing the weights and biases.
    fn view_params<'a>(
        &self,
        params: &'a [f32],
    ) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        self.check_len("dense layer parameters", params.len())?;

        let (n_in, n_out) = self.dim;
        let (w_raw, b_raw) = params.split_at(n_in * n_out);
        let w = ArrayView2::from_shape((n_out, n_in), w_raw).map_err(|_| self.mismatch())?;
        let b = ArrayView1::from_shape(n_out, b_raw).map_err(|_| self.mismatch())?;
        Ok((w, b))
    }

    fn check_len(&self, what: &'static str, got: usize) -> Result<()> {
        if got != self.size {
            return Err(MlErr::SizeMismatch {
                what,
                got,
                expected: self.size,
            });
        }

        Ok(())
    }

    fn mismatch(&self) -> MlErr {
        MlErr::SizeMismatch {
            what: "dense layer shape",
            got: self.size,
            expected: (self.dim.0 + 1) * self.dim.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_lays_out_weights_then_biases() {
        let layer = Dense::new((2, 1), None);
        // w = [[1, 2]], b = [0.5]
        let params = [1., 2., 0.5];
        let x = array![[1., 0., 2.], [1., 3., -1.]];

        let y = layer.forward(&params, x.view()).unwrap();

        assert_eq!(y, array![[3.5, 6.5, 0.5]]);
    }

    #[test]
    fn forward_rejects_wrong_input_rows() {
        let layer = Dense::new((3, 1), None);
        let params = [0.; 4];
        let x = Array2::<f32>::zeros((2, 5));

        let err = layer.forward(&params, x.view()).unwrap_err();
        assert_eq!(
            err,
            MlErr::SizeMismatch {
                what: "dense layer input rows",
                got: 2,
                expected: 3,
            }
        );
    }

    #[test]
    fn backward_accumulates_the_gradient() {
        let mut layer = Dense::new((2, 1), None);
        let params = [1., 2., 0.5];
        let x = array![[1., 2.], [3., 4.]];
        layer.forward_cached(&params, x.view()).unwrap();

        let mut grad = [1., 1., 1.];
        let d = array![[1., -1.]];
        let d_in = layer.backward(&params, &mut grad, d).unwrap();

        // dw = d x^T = [1 - 2, 3 - 4], db = 1 - 1, plus the previous ones.
        assert_eq!(grad, [0., 0., 1.]);
        assert_eq!(d_in, array![[1., -1.], [2., -2.]]);
    }
}
