use super::{Adam, GradientDescent, GradientDescentWithMomentum};
use crate::Result;

/// Defines the strategy for updating model parameters based on calculated gradients.
///
/// Optimizers may be stateful; any internal state is sized on the first update, so a freshly
/// constructed (or cloned, never stepped) optimizer always starts from a clean state.
pub trait Optimizer {
    /// Updates the parameters according to the algorithm's learning rule.
    ///
    /// # Arguments
    /// * `params` - The parameters that are going to be modified.
    /// * `grad` - The gradient used for taking the step.
    ///
    /// # Returns
    /// An error if there's a mismatch in the sizes of `grad` and `params`.
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()>;
}

/// The optimizers selectable from a configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum Optim {
    GradientDescent(GradientDescent),
    GradientDescentWithMomentum(GradientDescentWithMomentum),
    Adam(Adam),
}

impl Default for Optim {
    fn default() -> Self {
        Self::GradientDescent(GradientDescent::new(0.1))
    }
}

impl Optimizer for Optim {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        match self {
            Optim::GradientDescent(o) => o.update_params(params, grad),
            Optim::GradientDescentWithMomentum(o) => o.update_params(params, grad),
            Optim::Adam(o) => o.update_params(params, grad),
        }
    }
}
