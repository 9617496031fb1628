use serde::{Deserialize, Serialize};

use super::ModelWeights;

/// A single client's contribution to a round.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientUpdate {
    pub client_id: String,
    pub weights: ModelWeights,
    /// Locally measured false positive rate. Carried for logging, it doesn't weight the average.
    pub local_fpr: f32,
}

impl ClientUpdate {
    pub fn new(client_id: impl Into<String>, weights: ModelWeights, local_fpr: f32) -> Self {
        Self {
            client_id: client_id.into(),
            weights,
            local_fpr,
        }
    }
}

/// The published global model together with the round that produced it.
///
/// Instances are never mutated after construction, a new round replaces the whole state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalModelState {
    pub round: u64,
    pub weights: ModelWeights,
}

impl GlobalModelState {
    pub fn new(round: u64, weights: ModelWeights) -> Self {
        Self { round, weights }
    }
}
