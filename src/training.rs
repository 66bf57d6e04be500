use log::debug;
use machine_learning::{
    arch::{loss::LossFn, Chain},
    optimization::Optimizer,
};

use crate::{data::Batch, penalty::Penalty, FitErr, Result};

/// Trains `chain` for `epochs` epochs over `batches`, one optimizer step per batch.
///
/// Batches are visited strictly in order and every step mutates the chain's parameters before
/// the next batch is seen. The penalized loss over every batch is recorded once before training
/// and once after each epoch, so the returned history has `epochs + 1` entries.
///
/// Updates are applied in place and are not transactional: if evaluating the loss or computing a
/// gradient fails mid-epoch, the error is returned and the partially trained chain is dropped.
/// Callers needing the previous parameters must keep a copy before training.
///
/// # Arguments
/// * `chain` - The chain to train.
/// * `optimizer` - The optimizer, owned for the duration of the training.
/// * `loss_fn` - The base loss function.
/// * `epochs` - The amount of passes over the batches.
/// * `penalty` - The elastic-net penalty added to the loss.
/// * `batches` - The fixed sequence of batches.
///
/// # Returns
/// The trained chain and its loss history.
pub fn train<C, O, L>(
    mut chain: C,
    mut optimizer: O,
    loss_fn: &L,
    epochs: usize,
    penalty: Penalty,
    batches: &[Batch],
) -> Result<(C, Vec<f32>)>
where
    C: Chain,
    O: Optimizer,
    L: LossFn,
{
    let mut history = Vec::new();
    history.push(evaluate(&chain, loss_fn, penalty, batches)?);

    let mut grad = vec![0.; chain.size()];

    for epoch in 1..=epochs {
        for batch in batches {
            grad.fill(0.);
            chain.backprop(batch.x.view(), batch.y.view(), loss_fn, &mut grad)?;
            penalty.add_grad(chain.params(), &mut grad);
            optimizer.update_params(chain.params_mut(), &grad)?;
        }

        let loss = evaluate(&chain, loss_fn, penalty, batches)?;
        debug!(epoch = epoch, epochs = epochs, loss = loss; "finished epoch");
        history.push(loss);
    }

    Ok((chain, history))
}

/// Computes the mean penalized loss of `chain` over every batch, without updating it.
pub fn evaluate<C, L>(chain: &C, loss_fn: &L, penalty: Penalty, batches: &[Batch]) -> Result<f32>
where
    C: Chain,
    L: LossFn,
{
    if batches.is_empty() {
        return Err(FitErr::EmptyTable);
    }

    let mut total = 0.;

    for batch in batches {
        let y_pred = chain.forward(batch.x.view())?;
        total += penalty.penalized_loss(loss_fn, y_pred.view(), batch.y.view(), chain.params());
    }

    Ok(total / batches.len() as f32)
}

#[cfg(test)]
mod tests {
    use machine_learning::{
        arch::{layers::Dense, loss::Mse, Sequential},
        optimization::GradientDescent,
        MlErr,
    };
    use ndarray::{array, Array2};

    use super::*;
    use crate::data::{collate, Features, Target};

    fn line() -> (Vec<Batch>, Sequential) {
        let features = Features::Matrix(array![[0.], [1.], [2.], [3.], [4.]]);
        let target = Target::Vector(vec![1., 3., 5., 7., 9.]);
        let batches = collate(&features, &target, 2).unwrap();
        let chain = Sequential::new([Dense::new((1, 1), None)]);
        (batches, chain)
    }

    #[test]
    fn history_has_one_entry_per_epoch_plus_the_baseline() {
        let (batches, chain) = line();
        let baseline = evaluate(&chain, &Mse, Penalty::new(0., 0.), &batches).unwrap();

        for epochs in [0, 1, 7] {
            let (_, history) = train(
                chain.clone(),
                GradientDescent::new(0.01),
                &Mse,
                epochs,
                Penalty::new(0., 0.),
                &batches,
            )
            .unwrap();

            assert_eq!(history.len(), epochs + 1);
            assert_eq!(history[0], baseline);
        }
    }

    #[test]
    fn zero_epochs_leave_the_chain_untouched() {
        let (batches, chain) = line();
        let (trained, _) = train(
            chain.clone(),
            GradientDescent::new(0.1),
            &Mse,
            0,
            Penalty::new(0.5, 0.5),
            &batches,
        )
        .unwrap();

        assert_eq!(trained.params(), chain.params());
    }

    #[test]
    fn training_fits_a_line() {
        let (batches, chain) = line();
        let (trained, history) = train(
            chain,
            GradientDescent::new(0.02),
            &Mse,
            500,
            Penalty::new(0., 0.),
            &batches,
        )
        .unwrap();

        assert!(history.last().unwrap() < &1e-3, "history: {history:?}");
        assert!((trained.params()[0] - 2.).abs() < 0.05);
        assert!((trained.params()[1] - 1.).abs() < 0.1);
    }

    #[test]
    fn penalty_shrinks_the_parameters() {
        let (batches, chain) = line();
        let fit = |lambda| {
            let (trained, _) = train(
                chain.clone(),
                GradientDescent::new(0.02),
                &Mse,
                300,
                Penalty::new(lambda, 0.),
                &batches,
            )
            .unwrap();
            trained.params()[0].abs()
        };

        assert!(fit(5.) < fit(0.));
    }

    #[test]
    fn baseline_includes_the_penalty() {
        let (batches, _) = line();
        let chain = Sequential::with_params([Dense::new((1, 1), None)], vec![1., 1.]).unwrap();

        let plain = evaluate(&chain, &Mse, Penalty::new(0., 0.), &batches).unwrap();
        let penalized = evaluate(&chain, &Mse, Penalty::new(1., 1.), &batches).unwrap();

        assert!((penalized - plain - 2.).abs() < 1e-6);
    }

    #[test]
    fn huge_epoch_counts_fail_on_the_baseline() {
        let features = Features::Matrix(Array2::zeros((4, 2)));
        let target = Target::Vector(vec![0.; 4]);
        let batches = collate(&features, &target, 2).unwrap();
        let chain = Sequential::new([Dense::new((3, 1), None)]);

        let result = train(
            chain,
            GradientDescent::new(0.1),
            &Mse,
            usize::MAX,
            Penalty::new(0., 0.),
            &batches,
        );

        assert!(matches!(result, Err(FitErr::Ml(MlErr::SizeMismatch { .. }))));
    }

    #[test]
    fn batch_failures_abort_the_loop() {
        let features = Features::Matrix(Array2::zeros((4, 2)));
        let target = Target::Vector(vec![0.; 4]);
        let batches = collate(&features, &target, 2).unwrap();
        let chain = Sequential::new([Dense::new((3, 1), None)]);

        let err = train(
            chain,
            GradientDescent::new(0.1),
            &Mse,
            3,
            Penalty::new(0., 0.),
            &batches,
        )
        .unwrap_err();

        assert_eq!(
            err,
            FitErr::Ml(MlErr::SizeMismatch {
                what: "dense layer input rows",
                got: 2,
                expected: 3,
            })
        );
    }
}
