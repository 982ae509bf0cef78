use ghlsync_common::{external_service_error, services::ServiceError, GhlSyncError};
use thiserror::Error;

/// GoHighLevel-specific error types.
#[derive(Error, Debug)]
pub enum GhlError {
    /// The request never got a response (connect error, timeout).
    #[error("GHL API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// GHL answered with a non-success status.
    #[error("GHL API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("GHL configuration missing or incomplete: {0}")]
    ConfigError(String),

    #[error("Invalid GHL request: {0}")]
    InvalidInput(String),
}

impl From<GhlError> for ServiceError {
    fn from(err: GhlError) -> Self {
        match err {
            GhlError::ApiError { status_code: 404, message } => {
                ServiceError::NotFound(format!("contact ({})", message))
            }
            GhlError::ConfigError(msg) => ServiceError::NotConfigured(format!("GoHighLevel ({})", msg)),
            GhlError::InvalidInput(msg) => ServiceError::InvalidInput(msg),
            other => ServiceError::api("GoHighLevel", other),
        }
    }
}

impl From<GhlError> for GhlSyncError {
    fn from(err: GhlError) -> Self {
        match err {
            GhlError::RequestError(e) => GhlSyncError::HttpError(format!("GHL request error: {}", e)),
            GhlError::ApiError {
                status_code,
                message,
            } => external_service_error(
                "GoHighLevel",
                format!("Status: {}, Message: {}", status_code, message),
            ),
            GhlError::ConfigError(msg) => GhlSyncError::ConfigError(msg),
            GhlError::InvalidInput(msg) => GhlSyncError::ValidationError(msg),
        }
    }
}
