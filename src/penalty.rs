use machine_learning::arch::loss::LossFn;
use ndarray::ArrayView2;

/// An elastic-net penalty: `lambda * (alpha * L1 + (1 - alpha) * L2)` over every parameter,
/// where `L1` is the sum of absolute values and `L2` the sum of squares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penalty {
    lambda: f32,
    alpha: f32,
}

impl Penalty {
    /// Creates a new `Penalty`.
    ///
    /// # Arguments
    /// * `lambda` - The overall strength of the penalty, non-negative.
    /// * `alpha` - The L1 share of the penalty, in `[0, 1]`.
    pub fn new(lambda: f32, alpha: f32) -> Self {
        Self { lambda, alpha }
    }

    /// Whether the penalty is disabled, in which case the parameters are never read.
    pub fn is_zero(&self) -> bool {
        self.lambda == 0.
    }

    /// Computes the penalty for the given parameters.
    pub fn value(&self, params: &[f32]) -> f32 {
        if self.is_zero() {
            return 0.;
        }

        let (l1, l2) = params
            .iter()
            .fold((0., 0.), |(l1, l2), p| (l1 + p.abs(), l2 + p * p));

        self.lambda * (self.alpha * l1 + (1. - self.alpha) * l2)
    }

    /// Adds the gradient of the penalty with respect to `params` into `grad`.
    ///
    /// The L1 term uses `sign(p)`, with a zero subgradient at `p == 0`.
    pub fn add_grad(&self, params: &[f32], grad: &mut [f32]) {
        if self.is_zero() {
            return;
        }

        let (l1, l2) = (self.lambda * self.alpha, self.lambda * (1. - self.alpha));

        for (g, &p) in grad.iter_mut().zip(params) {
            let sign = if p > 0. {
                1.
            } else if p < 0. {
                -1.
            } else {
                0.
            };

            *g += l1 * sign + 2. * l2 * p;
        }
    }

    /// The base loss of the predictions plus the penalty of the parameters that produced them.
    pub fn penalized_loss<L>(
        &self,
        loss_fn: &L,
        y_pred: ArrayView2<f32>,
        y: ArrayView2<f32>,
        params: &[f32],
    ) -> f32
    where
        L: LossFn,
    {
        loss_fn.loss(y_pred, y) + self.value(params)
    }
}
