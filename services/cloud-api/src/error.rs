//! HTTP mapping of service errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cloud_common::CloudError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Error returned from handlers; renders as `{"error": "...", "status": n}`.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub CloudError);

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self.0, "Rejected request");
        }

        let body = ErrorBody {
            error: self.0.to_string(),
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}
