use ndarray::{Array2, ArrayView2};

use super::LossFn;

/// Mean absolute error loss function.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Mae;

impl Mae {
    /// Returns a new `Mae`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for Mae {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        (&y_pred - &y).mapv(f32::abs).mean().unwrap_or_default()
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        let n = y_pred.len() as f32;

        (&y_pred - &y).mapv(|d| {
            if d > 0. {
                1. / n
            } else if d < 0. {
                -1. / n
            } else {
                0.
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn mae_of_known_values() {
        let y_pred = array![[1., 2.], [3., 4.]];
        let y = array![[1., 0.], [6., 4.]];

        assert_eq!(Mae.loss(y_pred.view(), y.view()), 5. / 4.);
        assert_eq!(
            Mae.loss_prime(y_pred.view(), y.view()),
            array![[0., 0.25], [-0.25, 0.]]
        );
    }
}
