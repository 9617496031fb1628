mod accumulator;
mod store;

pub use accumulator::{RoundAccumulator, SubmitResult};
pub use store::GlobalModelStore;
