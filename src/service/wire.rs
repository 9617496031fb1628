use serde::{Deserialize, Serialize};

use crate::model::{ClientUpdate, ModelWeights};

/// Body of `POST /api/model/update`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    pub client_id: String,
    pub weights: ModelWeights,
    pub local_fpr: f32,
}

impl From<UpdateRequest> for ClientUpdate {
    fn from(req: UpdateRequest) -> Self {
        ClientUpdate::new(req.client_id, req.weights, req.local_fpr)
    }
}

/// Body answered to an accepted update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub status: String,
    pub pending_aggregations: usize,
}

impl UpdateResponse {
    pub const RECEIVED: &'static str = "Update received";

    pub fn received(pending_aggregations: usize) -> Self {
        Self {
            status: Self::RECEIVED.to_string(),
            pending_aggregations,
        }
    }
}

/// Body of `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub round: u64,
    pub pending: usize,
    pub quorum: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
