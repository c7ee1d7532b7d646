use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use vc_data_fetcher_core::errors::AnalysisError;
use vc_data_fetcher_developer_platforms::errors::Error as PlatformError;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Server startup errors
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The platform client could not be created
    #[error("Failed to create the GitHub client: {0}")]
    PlatformError(#[from] PlatformError),

    /// The listener could not be bound or served
    #[error("Network error: {0}")]
    NetworkError(#[from] std::io::Error),

    /// The telemetry pipeline could not be set up
    #[error("Telemetry error: {0}")]
    TelemetryError(String),
}

/// An error returned from a request handler.
///
/// The body only ever carries the user facing message. Details stay in the
/// logs.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// The HTTP status reported for an analysis failure.
pub fn status_for(error: &AnalysisError) -> StatusCode {
    match error {
        AnalysisError::InvalidRepoReference(_) => StatusCode::BAD_REQUEST,
        AnalysisError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        AnalysisError::AccessDenied { .. } => StatusCode::FORBIDDEN,
        AnalysisError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        AnalysisError::CollectionFailure { .. }
        | AnalysisError::CredentialStore(_)
        | AnalysisError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
    }
}

impl From<AnalysisError> for ApiError {
    fn from(error: AnalysisError) -> Self {
        Self {
            status: status_for(&error),
            message: error.user_message().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
