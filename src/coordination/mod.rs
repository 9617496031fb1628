mod coordinator;
mod dispatcher;

pub use coordinator::{AggregationCoordinator, RoundReport};
pub use dispatcher::{AggregationDispatcher, AggregationTrigger};
