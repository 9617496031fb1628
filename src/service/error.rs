use std::{
    error::Error,
    fmt::{self, Display},
};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::wire::ErrorResponse;
use crate::model::MismatchKind;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiErr {
    /// The submitted weights don't share the structure of the global model.
    ShapeMismatch { client_id: String, kind: MismatchKind },
    /// The aggregation dispatcher is gone, the server is shutting down.
    Unavailable,
}

impl ApiErr {
    fn status(&self) -> StatusCode {
        match self {
            Self::ShapeMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl Display for ApiErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch { client_id, kind } => {
                write!(f, "update from {client_id} rejected: {kind}")
            }
            Self::Unavailable => f.write_str("server is shutting down"),
        }
    }
}

impl Error for ApiErr {}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}
