use ghlsync_common::error::GhlSyncError;
use ghlsync_common::services::ServiceError;
use thiserror::Error;

/// Errors that abort a webhook run.
///
/// CRM write-back failures are deliberately absent: they are logged and counted
/// by the sync service and never reach the caller.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Invalid payload: {0}")]
    Validation(String),

    #[error("Calendar error: {0}")]
    Calendar(#[from] ServiceError),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<SyncError> for GhlSyncError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Validation(msg) => GhlSyncError::ValidationError(msg),
            SyncError::Calendar(e) => GhlSyncError::from(e),
            SyncError::Forbidden(msg) => GhlSyncError::ForbiddenError(msg),
            SyncError::Config(msg) => GhlSyncError::ConfigError(msg),
        }
    }
}
