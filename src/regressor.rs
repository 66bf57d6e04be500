use log::{info, warn};
use machine_learning::{
    arch::{loss::LossFn, Builder, Chain},
    optimization::Optimizer,
    MlErr,
};
use ndarray::{concatenate, Axis};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    data::{collate, Batch, Features, Predictions, Target, TargetShape},
    penalty::Penalty,
    retrain::{self, Plan},
    training::train,
    FitErr, Result,
};

/// A neural network regressor: the hyperparameters controlling how a chain is built and trained.
#[derive(Debug, Clone, PartialEq)]
pub struct Regressor<B, O, L> {
    pub builder: B,
    pub optimizer: O,
    pub loss: L,
    pub epochs: usize,
    /// The amount of rows per batch, `0` trains on a single full batch.
    pub batch_size: usize,
    pub lambda: f32,
    pub alpha: f32,
    pub optimizer_changes_trigger_retraining: bool,
}

impl<B, O, L> Default for Regressor<B, O, L>
where
    B: Default,
    O: Default,
    L: Default,
{
    fn default() -> Self {
        Self::new(B::default(), O::default(), L::default())
    }
}

/// The trained chain together with the shape of the target it was trained on.
#[derive(Debug, Clone)]
pub struct Fitted<C> {
    chain: C,
    shape: TargetShape,
}

/// The training state carried between a fit and the following updates.
#[derive(Debug, Clone)]
pub struct Cache<B, O, L> {
    model: Regressor<B, O, L>,
    batches: Vec<Batch>,
    history: Vec<f32>,
    n_input: usize,
    n_output: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub training_losses: Vec<f32>,
}

impl<B, O, L> Regressor<B, O, L> {
    /// Creates a new `Regressor` with 10 epochs, a batch size of 1 and no regularization.
    pub fn new(builder: B, optimizer: O, loss: L) -> Self {
        Self {
            builder,
            optimizer,
            loss,
            epochs: 10,
            batch_size: 1,
            lambda: 0.,
            alpha: 0.,
            optimizer_changes_trigger_retraining: false,
        }
    }

    pub fn penalty(&self) -> Penalty {
        Penalty::new(self.lambda, self.alpha)
    }

    /// Resets invalid hyperparameters: a negative `lambda` or an `alpha` outside `[0, 1]` become
    /// zero.
    ///
    /// # Returns
    /// A description of every reset, if any took place.
    pub fn clean(&mut self) -> Option<String> {
        let mut resets = Vec::new();

        if !(self.lambda >= 0.) {
            resets.push(format!("Need lambda >= 0, resetting lambda {} to 0.", self.lambda));
            self.lambda = 0.;
        }

        if !(0. ..=1.).contains(&self.alpha) {
            resets.push(format!(
                "Need alpha in [0, 1], resetting alpha {} to 0.",
                self.alpha
            ));
            self.alpha = 0.;
        }

        for reset in &resets {
            warn!("{reset}");
        }

        (!resets.is_empty()).then(|| resets.join(" "))
    }
}

impl<B, O, L> Regressor<B, O, L>
where
    B: Builder + Clone + PartialEq,
    O: Optimizer + Clone + PartialEq,
    L: LossFn + Clone + PartialEq,
{
    fn cleaned(&self) -> Self {
        let mut model = self.clone();
        model.clean();
        model
    }

    /// Builds a fresh chain and trains it on the given data.
    ///
    /// # Arguments
    /// * `features` - The input features.
    /// * `target` - The target, aligned row by row with `features`.
    ///
    /// # Returns
    /// The trained chain, the cache needed by `update` and the training report.
    pub fn fit(
        &self,
        features: &Features,
        target: &Target,
    ) -> Result<(Fitted<B::Chain>, Cache<B, O, L>, Report)> {
        Self::fit_cleaned(self.cleaned(), features, target)
    }

    /// Fits with hyperparameters that already went through `clean`.
    fn fit_cleaned(
        model: Self,
        features: &Features,
        target: &Target,
    ) -> Result<(Fitted<B::Chain>, Cache<B, O, L>, Report)> {
        let batches = collate(features, target, model.batch_size)?;
        let shape = target.shape()?;
        let (n_input, n_output) = (features.ncols(), shape.n_outputs());

        let chain = model.builder.build(n_input, n_output)?;
        let (chain, history) = train(
            chain,
            model.optimizer.clone(),
            &model.loss,
            model.epochs,
            model.penalty(),
            &batches,
        )?;

        info!(
            epochs = model.epochs,
            batches = batches.len(),
            loss = history.last().copied().unwrap_or_default();
            "fitted a new chain"
        );

        let report = Report {
            training_losses: history.clone(),
        };
        let cache = Cache {
            model,
            batches,
            history,
            n_input,
            n_output,
        };

        Ok((Fitted { chain, shape }, cache, report))
    }

    /// Trains again after the hyperparameters may have changed.
    ///
    /// When only the epoch count grew (and, if `optimizer_changes_trigger_retraining` is set, the
    /// optimizer is the same), the cached chain keeps training on the cached batches for the
    /// additional epochs and the new history is appended to the old one. Otherwise the cache is
    /// discarded and this is equivalent to `fit` on the given data.
    ///
    /// Either way the optimizer is a fresh copy of this regressor's, so any optimizer state from
    /// the previous run is not carried over. `cache` and `fitted` are consumed; clone them first
    /// to keep the previous state if the update fails.
    pub fn update(
        &self,
        cache: Cache<B, O, L>,
        fitted: Fitted<B::Chain>,
        features: &Features,
        target: &Target,
    ) -> Result<(Fitted<B::Chain>, Cache<B, O, L>, Report)> {
        let model = self.cleaned();

        let Plan::Resume { extra_epochs } = retrain::plan(&model, &cache.model) else {
            info!(epochs = model.epochs; "hyperparameters changed, rebuilding the chain");
            return Self::fit_cleaned(model, features, target);
        };

        info!(extra_epochs = extra_epochs; "resuming training of the cached chain");

        let Cache {
            batches,
            history: mut merged,
            n_input,
            n_output,
            ..
        } = cache;
        let Fitted { chain, shape } = fitted;

        let (chain, history) = train(
            chain,
            model.optimizer.clone(),
            &model.loss,
            extra_epochs,
            model.penalty(),
            &batches,
        )?;
        merged.extend(history);

        let report = Report {
            training_losses: merged.clone(),
        };
        let cache = Cache {
            model,
            batches,
            history: merged,
            n_input,
            n_output,
        };

        Ok((Fitted { chain, shape }, cache, report))
    }
}

impl<C: Chain> Fitted<C> {
    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub fn shape(&self) -> &TargetShape {
        &self.shape
    }

    /// Applies the chain to every row of `features`, shaping the output like the training target.
    pub fn predict(&self, features: &Features) -> Result<Predictions> {
        if features.ncols() != self.chain.input_dim() {
            return Err(FitErr::Ml(MlErr::SizeMismatch {
                what: "prediction features",
                got: features.ncols(),
                expected: self.chain.input_dim(),
            }));
        }

        if features.nrows() == 0 {
            return Err(FitErr::EmptyTable);
        }

        let x = features.to_matrix();
        let rows = (0..x.ncols())
            .into_par_iter()
            .map(|j| self.chain.forward(x.column(j).insert_axis(Axis(1))))
            .collect::<std::result::Result<Vec<_>, MlErr>>()?;

        let views: Vec<_> = rows.iter().map(|row| row.view()).collect();
        let block = concatenate(Axis(1), &views).map_err(|_| MlErr::SizeMismatch {
            what: "prediction outputs",
            got: rows.len(),
            expected: x.ncols(),
        })?;

        self.shape.reshape(block.view())
    }
}

impl<B, O, L> Cache<B, O, L> {
    /// The hyperparameters of the last fit or update.
    pub fn model(&self) -> &Regressor<B, O, L> {
        &self.model
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn history(&self) -> &[f32] {
        &self.history
    }

    pub fn n_input(&self) -> usize {
        self.n_input
    }

    pub fn n_output(&self) -> usize {
        self.n_output
    }
}

#[cfg(test)]
mod tests {
    use machine_learning::{
        arch::{loss::Loss, Arch, Linear},
        optimization::Optim,
    };
    use ndarray::array;

    use super::*;

    type Model = Regressor<Arch, Optim, Loss>;

    #[test]
    fn defaults() {
        let model = Model::default();

        assert_eq!(model.epochs, 10);
        assert_eq!(model.batch_size, 1);
        assert_eq!(model.lambda, 0.);
        assert_eq!(model.alpha, 0.);
        assert!(!model.optimizer_changes_trigger_retraining);
    }

    #[test]
    fn clean_resets_invalid_regularization() {
        let mut model = Model {
            lambda: -1.,
            alpha: 1.5,
            ..Model::default()
        };

        let message = model.clean().unwrap();

        assert!(message.contains("lambda"));
        assert!(message.contains("alpha"));
        assert_eq!(model.lambda, 0.);
        assert_eq!(model.alpha, 0.);
    }

    #[test]
    fn clean_keeps_valid_regularization() {
        let mut model = Model {
            lambda: 0.5,
            alpha: 1.,
            ..Model::default()
        };

        assert_eq!(model.clean(), None);
        assert_eq!(model.lambda, 0.5);
        assert_eq!(model.alpha, 1.);
    }

    #[test]
    fn rebuilding_update_keeps_the_cleaned_hyperparameters() {
        let features = Features::Matrix(array![[0.], [1.], [2.], [3.]]);
        let target = Target::Vector(vec![1., 3., 5., 7.]);
        let model = |lambda| Model {
            builder: Arch::Linear(Linear {
                act_fn: None,
                seed: Some(1),
            }),
            epochs: 2,
            lambda,
            ..Model::default()
        };

        let (fitted, cache, _) = model(0.5).fit(&features, &target).unwrap();
        let (_, cache, report) = model(-1.)
            .update(cache, fitted, &features, &target)
            .unwrap();

        assert_eq!(report.training_losses.len(), 3);
        assert_eq!(cache.model().lambda, 0.);
        assert_eq!(cache.model().clone().clean(), None);
    }
}
