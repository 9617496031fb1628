use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use super::{ApiErr, FedAvgServer, StatusResponse, UpdateRequest, UpdateResponse};
use crate::model::GlobalModelState;

type AppState = Arc<FedAvgServer>;

/// Builds the HTTP API on top of `server`.
pub fn router(server: Arc<FedAvgServer>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/model/global", get(global_model))
        .route("/api/model/update", post(submit_update))
        .route("/api/status", get(status))
        .layer(cors)
        .with_state(server)
}

async fn global_model(State(server): State<AppState>) -> Json<Arc<GlobalModelState>> {
    Json(server.global_model())
}

async fn submit_update(
    State(server): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<UpdateResponse>, ApiErr> {
    let res = server.submit(req.into())?;
    Ok(Json(UpdateResponse::received(res.accepted_count)))
}

async fn status(State(server): State<AppState>) -> Json<StatusResponse> {
    Json(server.status())
}
