use ndarray::{Array2, ArrayView2};

use super::{Chain, layers::Dense, loss::LossFn};
use crate::{MlErr, Result};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
#[derive(Debug, Clone)]
pub struct Sequential {
    layers: Vec<Dense>,
    params: Vec<f32>,
}

impl Sequential {
    /// Creates a new `Sequential` with every parameter set to zero.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    ///
    /// # Returns
    /// A new `Sequential` instance.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Dense>,
    {
        let layers: Vec<Dense> = layers.into_iter().collect();
        let size = layers.iter().map(Dense::size).sum();

        Self {
            layers,
            params: vec![0.; size],
        }
    }

    /// Creates a new `Sequential` with the given parameters.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    /// * `params` - The parameters of every layer, in order.
    ///
    /// # Returns
    /// A new `Sequential` instance or an error if `params` doesn't fit the layers.
    pub fn with_params<I>(layers: I, params: Vec<f32>) -> Result<Self>
    where
        I: IntoIterator<Item = Dense>,
    {
        let mut sequential = Self::new(layers);

        if params.len() != sequential.params.len() {
            return Err(MlErr::SizeMismatch {
                what: "sequential parameters",
                got: params.len(),
                expected: sequential.params.len(),
            });
        }

        sequential.params = params;
        Ok(sequential)
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }
}

impl Chain for Sequential {
    fn input_dim(&self) -> usize {
        self.layers.first().map_or(0, |layer| layer.dim().0)
    }

    fn output_dim(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.dim().1)
    }

    fn params(&self) -> &[f32] {
        &self.params
    }

    fn params_mut(&mut self) -> &mut [f32] {
        &mut self.params
    }

    fn forward(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let mut a = x.to_owned();
        let mut offset = 0;

        for layer in &self.layers {
            let size = layer.size();
            a = layer.forward(&self.params[offset..offset + size], a.view())?;
            offset += size;
        }

        Ok(a)
    }

    fn backprop<L>(
        &mut self,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        loss_fn: &L,
        grad: &mut [f32],
    ) -> Result<f32>
    where
        L: LossFn,
    {
        let Self { layers, params } = self;

        if grad.len() != params.len() {
            return Err(MlErr::SizeMismatch {
                what: "gradient",
                got: grad.len(),
                expected: params.len(),
            });
        }

        let mut a = x.to_owned();
        let mut offset = 0;

        for layer in layers.iter_mut() {
            let size = layer.size();
            a = layer.forward_cached(&params[offset..offset + size], a.view())?;
            offset += size;
        }

        if a.dim() != y.dim() {
            return Err(MlErr::SizeMismatch {
                what: "targets",
                got: y.len(),
                expected: a.len(),
            });
        }

        let loss = loss_fn.loss(a.view(), y);
        let mut d = loss_fn.loss_prime(a.view(), y);
        let mut end = params.len();

        for layer in layers.iter().rev() {
            let start = end - layer.size();
            d = layer.backward(&params[start..end], &mut grad[start..end], d)?;
            end = start;
        }

        Ok(loss)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::arch::{activations::ActFn, loss::Mse};

    fn net() -> Sequential {
        let layers = [
            Dense::new((2, 3), Some(ActFn::sigmoid(1.))),
            Dense::new((3, 1), None),
        ];
        let params = (0..13).map(|i| (i as f32 - 6.) / 10.).collect();
        Sequential::with_params(layers, params).unwrap()
    }

    #[test]
    fn dimensions_come_from_the_outer_layers() {
        let net = net();
        assert_eq!(net.size(), 13);
        assert_eq!(net.input_dim(), 2);
        assert_eq!(net.output_dim(), 1);
    }

    #[test]
    fn with_params_rejects_a_wrong_length() {
        let err = Sequential::with_params([Dense::new((2, 2), None)], vec![0.; 5]).unwrap_err();
        assert_eq!(
            err,
            MlErr::SizeMismatch {
                what: "sequential parameters",
                got: 5,
                expected: 6,
            }
        );
    }

    #[test]
    fn backprop_matches_finite_differences() {
        let mut net = net();
        let x = array![[0.5, -1.0, 2.0], [1.5, 0.25, -0.75]];
        let y = array![[1.0, 0.0, -1.0]];

        let mut grad = vec![0.; net.size()];
        let loss = net.backprop(x.view(), y.view(), &Mse, &mut grad).unwrap();
        assert_eq!(loss, Mse.loss(net.forward(x.view()).unwrap().view(), y.view()));

        let h = 1e-2;
        for i in 0..net.size() {
            let mut plus = net.clone();
            plus.params_mut()[i] += h;
            let mut minus = net.clone();
            minus.params_mut()[i] -= h;

            let l_plus = Mse.loss(plus.forward(x.view()).unwrap().view(), y.view());
            let l_minus = Mse.loss(minus.forward(x.view()).unwrap().view(), y.view());
            let numeric = (l_plus - l_minus) / (2. * h);

            assert!(
                (grad[i] - numeric).abs() < 1e-2,
                "param {i}: analytic {} numeric {numeric}",
                grad[i]
            );
        }
    }

    #[test]
    fn backprop_rejects_mismatched_targets() {
        let mut net = net();
        let x = array![[0.5], [1.5]];
        let y = array![[1.0, 2.0]];
        let mut grad = vec![0.; net.size()];

        assert!(net.backprop(x.view(), y.view(), &Mse, &mut grad).is_err());
    }
}
