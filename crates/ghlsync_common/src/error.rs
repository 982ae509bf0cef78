use std::fmt;
use thiserror::Error;

/// The base error type for everything that ends up in an HTTP response.
///
/// Crates with their own error enums implement `From<TheirError> for GhlSyncError`.
#[derive(Error, Debug)]
pub enum GhlSyncError {
    /// Error occurred during an outbound HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Caller is not allowed to use the endpoint
    #[error("Forbidden: {0}")]
    ForbiddenError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for GhlSyncError {
    fn status_code(&self) -> u16 {
        match self {
            GhlSyncError::HttpError(_) => 500,
            GhlSyncError::ParseError(_) => 400,
            GhlSyncError::ConfigError(_) => 500,
            GhlSyncError::ForbiddenError(_) => 403,
            GhlSyncError::ValidationError(_) => 400,
            // The webhook contract reports calendar failures as a plain 500.
            GhlSyncError::ExternalServiceError { .. } => 500,
            GhlSyncError::NotFoundError(_) => 404,
            GhlSyncError::InternalError(_) => 500,
        }
    }
}

impl GhlSyncError {
    /// The message without the category prefix, as shown to webhook callers.
    pub fn message(&self) -> String {
        match self {
            GhlSyncError::HttpError(m)
            | GhlSyncError::ParseError(m)
            | GhlSyncError::ConfigError(m)
            | GhlSyncError::ForbiddenError(m)
            | GhlSyncError::ValidationError(m)
            | GhlSyncError::NotFoundError(m)
            | GhlSyncError::InternalError(m) => m.clone(),
            GhlSyncError::ExternalServiceError { message, .. } => message.clone(),
        }
    }
}

// Common error conversions
impl From<reqwest::Error> for GhlSyncError {
    fn from(err: reqwest::Error) -> Self {
        GhlSyncError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for GhlSyncError {
    fn from(err: serde_json::Error) -> Self {
        GhlSyncError::ParseError(err.to_string())
    }
}

pub fn config_error<T: fmt::Display>(message: T) -> GhlSyncError {
    GhlSyncError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> GhlSyncError {
    GhlSyncError::ValidationError(message.to_string())
}

pub fn forbidden<T: fmt::Display>(message: T) -> GhlSyncError {
    GhlSyncError::ForbiddenError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> GhlSyncError {
    GhlSyncError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
