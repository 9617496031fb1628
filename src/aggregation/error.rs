use std::{
    error::Error,
    fmt::{self, Display},
};

use crate::model::MismatchKind;

/// The specific result type for the aggregation module.
pub type Result<T> = std::result::Result<T, AggregationErr>;

/// Error returned whenever a batch of client weights can't be averaged.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationErr {
    /// There was nothing to average.
    EmptyInput,
    /// The update at index `update` doesn't share the structure of the first update in the batch.
    ShapeMismatch { update: usize, kind: MismatchKind },
}

impl Display for AggregationErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => f.write_str("aggregation error: no updates to average"),
            Self::ShapeMismatch { update, kind } => {
                write!(f, "aggregation error: update {update} has a {kind}")
            }
        }
    }
}

impl Error for AggregationErr {}
