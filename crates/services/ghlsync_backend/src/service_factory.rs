//! Service factory implementation.
//!
//! Decides at startup which collaborators back the webhook: the real Google
//! Calendar and GoHighLevel clients when their `use_*` flag and section are
//! present, the in-memory calendar and the disabled CRM otherwise.

use chrono_tz::Tz;
use ghlsync_common::services::{CalendarService, CrmService, ServiceError, ServiceFactory};
use ghlsync_common::{is_gcal_enabled, is_ghl_enabled, log_result};
use ghlsync_config::AppConfig;
use ghlsync_gcal::{auth::create_calendar_hub, GoogleCalendarService, MockCalendarService};
use ghlsync_ghl::{DisabledCrmService, GhlClient, GhlCrmService};
use std::sync::Arc;
use tracing::{info, warn};

use crate::StartupError;

pub struct GhlSyncServiceFactory {
    calendar_service: Arc<dyn CalendarService<Error = ServiceError>>,
    crm_service: Arc<dyn CrmService<Error = ServiceError>>,
    calendar_configured: bool,
    crm_configured: bool,
}

impl GhlSyncServiceFactory {
    /// Builds the collaborators from configuration.
    ///
    /// A configured but broken collaborator (unreadable key, missing token) is a
    /// startup error rather than a silent fallback.
    pub async fn new(config: Arc<AppConfig>, time_zone: Tz) -> Result<Self, StartupError> {
        let (calendar_service, calendar_configured): (
            Arc<dyn CalendarService<Error = ServiceError>>,
            bool,
        ) = match config.gcal.as_ref().filter(|_| is_gcal_enabled(&config)) {
            Some(gcal) => {
                info!("Initializing Google Calendar service...");
                let hub = log_result(
                    create_calendar_hub(gcal).await,
                    "Google Calendar service initialized",
                    "Failed to initialize Google Calendar service",
                )?;
                (
                    Arc::new(GoogleCalendarService::new(Arc::new(hub), time_zone)),
                    true,
                )
            }
            None => {
                warn!("Google Calendar disabled, events are kept in memory only");
                (Arc::new(MockCalendarService::new()), false)
            }
        };

        let (crm_service, crm_configured): (Arc<dyn CrmService<Error = ServiceError>>, bool) =
            match config.ghl.as_ref().filter(|_| is_ghl_enabled(&config)) {
                Some(ghl) => {
                    let client = GhlClient::from_config(ghl)?;
                    info!("GoHighLevel write-back enabled.");
                    (Arc::new(GhlCrmService::new(client)), true)
                }
                None => {
                    warn!("GoHighLevel disabled, event ids will not be written back");
                    (Arc::new(DisabledCrmService), false)
                }
            };

        Ok(Self::from_parts(
            calendar_service,
            crm_service,
            calendar_configured,
            crm_configured,
        ))
    }

    /// Wraps already built collaborators.
    pub fn from_parts(
        calendar_service: Arc<dyn CalendarService<Error = ServiceError>>,
        crm_service: Arc<dyn CrmService<Error = ServiceError>>,
        calendar_configured: bool,
        crm_configured: bool,
    ) -> Self {
        Self {
            calendar_service,
            crm_service,
            calendar_configured,
            crm_configured,
        }
    }
}

impl ServiceFactory for GhlSyncServiceFactory {
    fn calendar_service(&self) -> Arc<dyn CalendarService<Error = ServiceError>> {
        self.calendar_service.clone()
    }

    fn crm_service(&self) -> Arc<dyn CrmService<Error = ServiceError>> {
        self.crm_service.clone()
    }

    fn calendar_configured(&self) -> bool {
        self.calendar_configured
    }

    fn crm_configured(&self) -> bool {
        self.crm_configured
    }
}
