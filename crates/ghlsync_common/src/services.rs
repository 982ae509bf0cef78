//! Service abstractions for the external systems the sync talks to.
//!
//! The webhook logic only sees these traits, so the Google Calendar and
//! GoHighLevel clients can be swapped for in-memory doubles in tests or when
//! a collaborator is switched off in the configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

use crate::error::{external_service_error, GhlSyncError};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Errors reported by calendar and CRM collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The referenced remote object does not exist (e.g. a deleted calendar event).
    #[error("{0} not found")]
    NotFound(String),

    /// The remote API rejected the call or could not be reached.
    #[error("{service} error: {message}")]
    Api { service: String, message: String },

    /// The collaborator is switched off or lacks configuration.
    #[error("{0} is not configured")]
    NotConfigured(String),

    /// The request could not be built from the given input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ServiceError {
    pub fn api(service: &str, message: impl std::fmt::Display) -> Self {
        ServiceError::Api {
            service: service.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }
}

impl From<ServiceError> for GhlSyncError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Api { service, message } => external_service_error(&service, message),
            ServiceError::NotConfigured(what) => {
                GhlSyncError::ConfigError(format!("{} is not configured", what))
            }
            other => external_service_error("Calendar", other),
        }
    }
}

/// Calendar operations needed to keep one event per CRM contact.
pub trait CalendarService: Send + Sync {
    /// Error type returned by calendar service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create an event and return its id.
    fn create_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error>;

    /// Overwrite the content of an existing event, keeping its id.
    fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error>;

    /// Find an event on `date` whose title matches `title`, ignoring the lead marker and case.
    fn find_event_by_title(
        &self,
        calendar_id: &str,
        title: &str,
        date: NaiveDate,
    ) -> BoxFuture<'_, Option<String>, Self::Error>;

    /// Delete an event. Deleting an event that no longer exists succeeds.
    fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, (), Self::Error>;
}

/// CRM operations: storing the calendar back-reference on a contact.
pub trait CrmService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store `event_id` in the contact's calendar event id custom field.
    fn write_back_event_id(
        &self,
        contact_id: &str,
        event_id: &str,
    ) -> BoxFuture<'_, (), Self::Error>;
}

/// A factory for the collaborators the application needs.
pub trait ServiceFactory: Send + Sync {
    /// The calendar used for event upserts.
    fn calendar_service(&self) -> Arc<dyn CalendarService<Error = ServiceError>>;

    /// The CRM used for back-reference write-back.
    fn crm_service(&self) -> Arc<dyn CrmService<Error = ServiceError>>;

    /// Whether a real Google Calendar (not the in-memory one) is wired in.
    fn calendar_configured(&self) -> bool;

    /// Whether a real GoHighLevel client is wired in.
    fn crm_configured(&self) -> bool;
}

/// A calendar event as sent to a calendar collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarEvent {
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// RFC 3339 with offset
    pub start_time: String,
    /// RFC 3339 with offset
    pub end_time: String,
    /// IANA zone name, e.g. `America/New_York`
    pub time_zone: String,
    /// Google Calendar color id ("1".."11")
    pub color_id: Option<String>,
}

/// Represents the result of a calendar event operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarEventResult {
    pub event_id: String,
    pub status: String,
}

/// Marker appended to titles of opportunities that are not booked yet.
pub const LEAD_MARKER: &str = "(Lead)";

/// Title with the lead marker removed, trimmed and lowercased.
pub fn title_key(title: &str) -> String {
    title.replace(LEAD_MARKER, "").trim().to_lowercase()
}

/// Titles refer to the same opportunity when they match ignoring the lead marker and case.
pub fn titles_match(a: &str, b: &str) -> bool {
    title_key(a) == title_key(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpStatusCode;

    #[test]
    fn test_titles_match_ignores_lead_marker_and_case() {
        assert!(titles_match(
            "Smith Wedding - Photo (Lead)",
            "smith wedding - photo"
        ));
        assert!(titles_match(" Smith Wedding ", "SMITH WEDDING (Lead)"));
        assert!(!titles_match("Smith Wedding - Photo", "Smith Wedding - Video"));
    }

    #[test]
    fn test_service_error_conversion() {
        let err: GhlSyncError = ServiceError::api("Google Calendar", "quota").into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "quota");

        let err: GhlSyncError = ServiceError::NotConfigured("Google Calendar".into()).into();
        assert_eq!(err.status_code(), 500);
        assert!(ServiceError::NotFound("event abc".into()).is_not_found());
    }
}
