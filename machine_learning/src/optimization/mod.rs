mod adam;
mod gradient_descent;
mod gradient_descent_with_momentum;
mod optimizer;

pub use adam::Adam;
pub use gradient_descent::GradientDescent;
pub use gradient_descent_with_momentum::GradientDescentWithMomentum;
pub use optimizer::{Optim, Optimizer};

use crate::{MlErr, Result};

fn check_sizes(params: &[f32], grad: &[f32]) -> Result<()> {
    if grad.len() != params.len() {
        return Err(MlErr::SizeMismatch {
            what: "gradient",
            got: grad.len(),
            expected: params.len(),
        });
    }

    Ok(())
}

/// Resizes an optimizer's state buffer to the amount of parameters, zeroing it when it changes.
fn fit_state(state: &mut Vec<f32>, len: usize) -> bool {
    if state.len() == len {
        return false;
    }

    state.clear();
    state.resize(len, 0.);
    true
}
