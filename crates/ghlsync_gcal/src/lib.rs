pub mod auth;
pub mod service;

pub use service::{mock::MockCalendarService, GcalServiceError, GoogleCalendarService};
