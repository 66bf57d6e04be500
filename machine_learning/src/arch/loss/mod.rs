mod loss_fn;
mod mae;
mod mse;

pub use loss_fn::{Loss, LossFn};
pub use mae::Mae;
pub use mse::Mse;
