mod batcher;
mod source;
mod table;

pub use batcher::{collate, windows, Batch, TargetBlock};
pub use source::{Features, Predictions, Target, TargetShape};
pub use table::Table;
