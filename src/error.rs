//! Error type shared by every pipeline stage.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Errors surfaced to callers of the map pipeline.
///
/// Caller mistakes map to 400, everything else to 500. The message is
/// always passed through to the response body.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("{0}")]
    Validation(String),

    #[error("location not found: {0}")]
    LocationNotFound(String),

    #[error("geocoder failure: {0}")]
    Geocoder(String),

    #[error("failed to load region dataset: {0}")]
    Dataset(String),

    #[error("failed to render map: {0}")]
    Render(String),

    #[error("failed to publish map: {0}")]
    Publish(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MapError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MapError::Validation(_) | MapError::LocationNotFound(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for MapError {
    fn into_response(self) -> Response {
        if self.status_code().is_server_error() {
            tracing::error!("Map request failed: {}", self);
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

pub type MapResult<T> = Result<T, MapError>;
