//! Batched training of neural network regressors over tabular data.
//!
//! Raw features and targets are collated into a fixed sequence of batches, a chain is trained on
//! them with an elastic-net penalized loss, and repeated fits decide whether the previous training
//! state can be continued or must be rebuilt.

pub mod config;
pub mod data;
pub mod error;
pub mod penalty;
pub mod regressor;
pub mod retrain;
pub mod training;

pub use error::{FitErr, Result};
pub use regressor::{Cache, Fitted, Regressor, Report};
