pub mod auth;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod metrics;
pub mod normalize;
#[cfg(test)]
mod normalize_proptest;
#[cfg(test)]
mod normalize_test;
pub mod payload;
pub mod routes;

pub use auth::WebhookGuard;
pub use error::SyncError;
pub use logic::{CalendarSyncService, SyncSettings};
pub use metrics::SyncMetrics;
pub use payload::TriggerPayload;
pub use routes::routes;
