pub mod activations;
mod builder;
mod chain;
pub mod layers;
pub mod loss;
mod sequential;

pub use builder::{Arch, Builder, Linear, Short};
pub use chain::Chain;
pub use sequential::Sequential;
