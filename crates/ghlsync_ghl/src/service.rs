//! `CrmService` implementations.

use ghlsync_common::services::{BoxFuture, CrmService, ServiceError};
use tracing::info;

use crate::client::GhlClient;

/// Writes calendar back-references to GoHighLevel contacts.
pub struct GhlCrmService {
    client: GhlClient,
}

impl GhlCrmService {
    pub fn new(client: GhlClient) -> Self {
        Self { client }
    }
}

impl CrmService for GhlCrmService {
    type Error = ServiceError;

    fn write_back_event_id(
        &self,
        contact_id: &str,
        event_id: &str,
    ) -> BoxFuture<'_, (), Self::Error> {
        let contact_id = contact_id.to_string();
        let event_id = event_id.to_string();

        Box::pin(async move {
            self.client
                .update_contact_calendar_event_id(&contact_id, &event_id)
                .await?;
            info!(
                "Stored event {} in {} on contact {}",
                event_id,
                self.client.event_id_field_key(),
                contact_id
            );
            Ok(())
        })
    }
}

/// Stand-in used when GoHighLevel is switched off: every write-back fails
/// with `NotConfigured`, which the sync logs and moves past.
#[derive(Default)]
pub struct DisabledCrmService;

impl CrmService for DisabledCrmService {
    type Error = ServiceError;

    fn write_back_event_id(
        &self,
        _contact_id: &str,
        _event_id: &str,
    ) -> BoxFuture<'_, (), Self::Error> {
        Box::pin(async { Err(ServiceError::NotConfigured("GoHighLevel".to_string())) })
    }
}

/// Recording CRM for tests.
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockCrmService {
        writes: Mutex<Vec<(String, String)>>,
        failure: Option<String>,
    }

    impl MockCrmService {
        pub fn new() -> Self {
            Self::default()
        }

        /// A CRM whose write-backs fail with `ServiceError::Api`.
        pub fn failing(message: &str) -> Self {
            Self {
                writes: Mutex::new(Vec::new()),
                failure: Some(message.to_string()),
            }
        }

        /// `(contact_id, event_id)` pairs written so far.
        pub fn writes(&self) -> Vec<(String, String)> {
            self.writes.lock().map(|w| w.clone()).unwrap_or_default()
        }
    }

    impl CrmService for MockCrmService {
        type Error = ServiceError;

        fn write_back_event_id(
            &self,
            contact_id: &str,
            event_id: &str,
        ) -> BoxFuture<'_, (), Self::Error> {
            let contact_id = contact_id.to_string();
            let event_id = event_id.to_string();

            Box::pin(async move {
                if let Some(message) = &self.failure {
                    return Err(ServiceError::api("Mock CRM", message));
                }
                self.writes
                    .lock()
                    .map_err(|_| ServiceError::api("Mock CRM", "write log poisoned"))?
                    .push((contact_id, event_id));
                Ok(())
            })
        }
    }
}
