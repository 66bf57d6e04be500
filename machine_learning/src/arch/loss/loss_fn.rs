use ndarray::{Array2, ArrayView2};

use super::{Mae, Mse};

/// Measures how far a chain's predictions are from the expected targets.
///
/// Both arguments share the `(outputs, observations)` layout.
pub trait LossFn {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32;
    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32>;
}

/// The loss functions selectable from a configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum Loss {
    #[default]
    Mse,
    Mae,
}

impl LossFn for Loss {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        match self {
            Loss::Mse => Mse.loss(y_pred, y),
            Loss::Mae => Mae.loss(y_pred, y),
        }
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Loss::Mse => Mse.loss_prime(y_pred, y),
            Loss::Mae => Mae.loss_prime(y_pred, y),
        }
    }
}
