pub mod client;
pub mod error;
pub mod service;

pub use client::{CustomFieldValue, GhlClient};
pub use error::GhlError;
pub use service::{mock::MockCrmService, DisabledCrmService, GhlCrmService};
