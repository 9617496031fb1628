mod averager;
mod error;

pub use averager::average;
pub use error::{AggregationErr, Result};
