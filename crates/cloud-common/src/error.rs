//! Error types for the cloud texture service.

use thiserror::Error;

/// Result type alias using CloudError.
pub type CloudResult<T> = Result<T, CloudError>;

/// Primary error type for cloud texture operations.
#[derive(Debug, Error)]
pub enum CloudError {
    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid {param} parameter: {message}")]
    InvalidParameter { param: String, message: String },

    // === Upstream Errors ===
    #[error("Upstream request failed: {0}")]
    UpstreamRequest(String),

    #[error("Server returned non-OK status: {status}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Invalid GRIB2 data: {0}")]
    Grib2Decode(String),

    #[error("No GRIB2 files found")]
    NoGrids,

    // === Infrastructure Errors ===
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Request timeout")]
    Timeout,
}

impl CloudError {
    /// Shorthand for an invalid query parameter.
    pub fn invalid(param: impl Into<String>, message: impl Into<String>) -> Self {
        CloudError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            CloudError::MissingParameter(_) | CloudError::InvalidParameter { .. } => 400,

            CloudError::Timeout => 504,

            _ => 500,
        }
    }

    /// Whether this error originates from the caller's request.
    pub fn is_client_error(&self) -> bool {
        self.http_status_code() < 500
    }
}
