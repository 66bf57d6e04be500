use crate::regressor::Regressor;

/// How an update should continue from a previous fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Keep the cached chain and batches and train only the additional epochs.
    Resume { extra_epochs: usize },
    /// Build a new chain, re-batch the data and train for every epoch.
    Rebuild,
}

/// Decides whether the training state of a fit made with `old` can be continued under `new`.
///
/// The existing chain is kept only when the epoch count didn't decrease, every hyperparameter
/// other than the epochs and the optimizer is unchanged and, if
/// `optimizer_changes_trigger_retraining` is set, the optimizer is unchanged as well.
pub fn plan<B, O, L>(new: &Regressor<B, O, L>, old: &Regressor<B, O, L>) -> Plan
where
    B: PartialEq,
    O: PartialEq,
    L: PartialEq,
{
    let optimizer_changed =
        new.optimizer_changes_trigger_retraining && new.optimizer != old.optimizer;

    if !optimizer_changed && new.epochs >= old.epochs && same_except_epochs(new, old) {
        Plan::Resume {
            extra_epochs: new.epochs - old.epochs,
        }
    } else {
        Plan::Rebuild
    }
}

/// Compares every hyperparameter except the epochs and the optimizer.
fn same_except_epochs<B, O, L>(new: &Regressor<B, O, L>, old: &Regressor<B, O, L>) -> bool
where
    B: PartialEq,
    L: PartialEq,
{
    let Regressor {
        builder,
        optimizer: _,
        loss,
        epochs: _,
        batch_size,
        lambda,
        alpha,
        optimizer_changes_trigger_retraining,
    } = new;

    *builder == old.builder
        && *loss == old.loss
        && *batch_size == old.batch_size
        && *lambda == old.lambda
        && *alpha == old.alpha
        && *optimizer_changes_trigger_retraining == old.optimizer_changes_trigger_retraining
}
