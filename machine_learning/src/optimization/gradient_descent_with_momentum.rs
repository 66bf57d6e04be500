use super::{Optimizer, check_sizes, fit_state};
use crate::Result;

#[derive(Debug, Clone)]
pub struct GradientDescentWithMomentum {
    learning_rate: f32,
    momentum: f32,
    velocity: Vec<f32>,
}

impl GradientDescentWithMomentum {
    /// Creates a new `GradientDescentWithMomentum` optimizer.
    ///
    /// # Arguments
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `momentum` - Hyperparameter to the optimization algorithm.
    ///
    /// # Returns
    /// A new `GradientDescentWithMomentum` instance.
    pub fn new(learning_rate: f32, momentum: f32) -> Self {
        Self {
            learning_rate,
            momentum,
            velocity: Vec::new(),
        }
    }
}

impl PartialEq for GradientDescentWithMomentum {
    fn eq(&self, other: &Self) -> bool {
        self.learning_rate == other.learning_rate && self.momentum == other.momentum
    }
}

impl Optimizer for GradientDescentWithMomentum {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        check_sizes(params, grad)?;
        fit_state(&mut self.velocity, params.len());

        let lr = self.learning_rate;
        let mu = self.momentum;

        params
            .iter_mut()
            .zip(grad)
            .zip(self.velocity.iter_mut())
            .for_each(|((p, g), v)| {
                *v = (mu * *v) + g;
                *p -= lr * *v;
            });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_carries_over_between_steps() {
        let mut optimizer = GradientDescentWithMomentum::new(1., 0.5);
        let mut params = [0.];

        optimizer.update_params(&mut params, &[1.]).unwrap();
        assert_eq!(params, [-1.]);

        optimizer.update_params(&mut params, &[1.]).unwrap();
        assert_eq!(params, [-2.5]);
    }

    #[test]
    fn equality_ignores_the_velocity() {
        let fresh = GradientDescentWithMomentum::new(0.1, 0.9);
        let mut used = fresh.clone();
        used.update_params(&mut [1., 2.], &[1., 1.]).unwrap();

        assert_eq!(fresh, used);
        assert_ne!(fresh, GradientDescentWithMomentum::new(0.1, 0.8));
    }
}
