use super::{Optimizer, check_sizes};
use crate::Result;

/// Gradient descent optimization algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientDescent {
    learning_rate: f32,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `update_params`.
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for GradientDescent {
    /// Makes a step in the opposite direction of the gradient, with a length of `learning_rate`.
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        check_sizes(params, grad)?;

        let lr = self.learning_rate;

        for (w, g) in params.iter_mut().zip(grad) {
            *w -= lr * g;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MlErr;

    #[test]
    fn steps_against_the_gradient() {
        let mut optimizer = GradientDescent::new(0.5);
        let mut params = [1., 2., 3.];

        optimizer.update_params(&mut params, &[2., -2., 0.]).unwrap();
        assert_eq!(params, [0., 3., 3.]);
    }

    #[test]
    fn rejects_mismatched_gradients() {
        let mut optimizer = GradientDescent::new(0.5);
        let mut params = [1., 2., 3.];

        assert_eq!(
            optimizer.update_params(&mut params, &[1.]),
            Err(MlErr::SizeMismatch {
                what: "gradient",
                got: 1,
                expected: 3,
            })
        );
    }
}
