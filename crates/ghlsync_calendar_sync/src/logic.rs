//! Webhook processing: pipeline routing, the create-vs-update decision and the
//! CRM write-back.
//!
//! Exactly one calendar write happens per webhook, strictly before the
//! write-back. Only calendar failures abort a run; a failed write-back is
//! logged and counted and the run still succeeds.

use chrono::NaiveDate;
use chrono_tz::Tz;
use ghlsync_common::services::{CalendarEvent, CalendarService, CrmService, ServiceError};
use ghlsync_config::AppConfig;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::SyncError;
use crate::metrics::SyncMetrics;
use crate::normalize::{DatePolicy, NormalizedEvent, Normalizer};
use crate::payload::{BackReference, PipelineRoute, TriggerPayload};

pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_TIME_ZONE: &str = "America/New_York";

/// Knobs taken from `gcal` and `calendar_sync` config sections.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub calendar_id: String,
    pub time_zone: Tz,
    pub date_policy: DatePolicy,
    pub dedupe_by_title: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            time_zone: Tz::America__New_York,
            date_policy: DatePolicy::Lenient,
            dedupe_by_title: true,
        }
    }
}

impl SyncSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, SyncError> {
        let gcal = config.gcal.as_ref();
        let sync = config.calendar_sync.clone().unwrap_or_default();

        let calendar_id = gcal
            .and_then(|g| g.calendar_id.clone())
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string());
        let tz_name = gcal
            .and_then(|g| g.time_zone.as_deref())
            .unwrap_or(DEFAULT_TIME_ZONE);
        let time_zone: Tz = tz_name
            .parse()
            .map_err(|_| SyncError::Config(format!("Unknown time zone '{}'", tz_name)))?;

        Ok(Self {
            calendar_id,
            time_zone,
            date_policy: if sync.strict_dates {
                DatePolicy::Strict
            } else {
                DatePolicy::Lenient
            },
            dedupe_by_title: sync.dedupe_by_title,
        })
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.time_zone, self.calendar_id.clone(), self.date_policy)
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Created,
    Updated,
}

/// What happened to the contact's back-reference field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteBack {
    Written,
    /// The payload already carried the resulting id.
    NotNeeded,
    SkippedNoContact,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub action: SyncAction,
    pub event_id: String,
    pub event: NormalizedEvent,
    pub write_back: WriteBack,
}

#[derive(Debug, Clone)]
pub enum SyncOutcome {
    Upserted(UpsertOutcome),
    Skipped {
        message: String,
    },
    Deleted {
        event_id: Option<String>,
        message: String,
    },
}

/// Runs webhooks against a calendar and a CRM.
pub struct CalendarSyncService {
    calendar: Arc<dyn CalendarService<Error = ServiceError>>,
    crm: Arc<dyn CrmService<Error = ServiceError>>,
    settings: SyncSettings,
    metrics: Arc<SyncMetrics>,
}

impl CalendarSyncService {
    pub fn new(
        calendar: Arc<dyn CalendarService<Error = ServiceError>>,
        crm: Arc<dyn CrmService<Error = ServiceError>>,
        settings: SyncSettings,
        metrics: Arc<SyncMetrics>,
    ) -> Self {
        Self {
            calendar,
            crm,
            settings,
            metrics,
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &Arc<SyncMetrics> {
        &self.metrics
    }

    pub async fn process(&self, payload: &TriggerPayload) -> Result<SyncOutcome, SyncError> {
        let today = self.settings.normalizer().today();
        self.process_at(payload, today).await
    }

    /// Like `process`, with "today" supplied by the caller.
    pub async fn process_at(
        &self,
        payload: &TriggerPayload,
        today: NaiveDate,
    ) -> Result<SyncOutcome, SyncError> {
        match payload.pipeline_route() {
            PipelineRoute::Skip => {
                info!(
                    "Skipping applicant opportunity {:?}",
                    payload.opportunity_name()
                );
                self.metrics.record_skipped();
                Ok(SyncOutcome::Skipped {
                    message: "Applicant pipeline is not synced to the calendar".to_string(),
                })
            }
            PipelineRoute::Remove => Ok(self.remove_archived(payload).await),
            PipelineRoute::Upsert => self.upsert(payload, today).await.map(SyncOutcome::Upserted),
        }
    }

    async fn remove_archived(&self, payload: &TriggerPayload) -> SyncOutcome {
        let Some(reference) = payload.back_reference() else {
            info!("Archived opportunity has no calendar event");
            return SyncOutcome::Deleted {
                event_id: None,
                message: "Archived opportunity has no calendar event".to_string(),
            };
        };

        let calendar_id = &self.settings.calendar_id;
        let message = match self
            .calendar
            .delete_event(calendar_id, reference.as_str())
            .await
        {
            Ok(()) => {
                info!("Deleted event {} for archived opportunity", reference);
                self.metrics.record_deleted();
                format!("Event {} deleted for archived opportunity", reference)
            }
            Err(e) => {
                error!("Failed to delete event {}: {}", reference, e);
                format!("Event {} could not be deleted: {}", reference, e)
            }
        };

        SyncOutcome::Deleted {
            event_id: Some(reference.to_string()),
            message,
        }
    }

    async fn upsert(
        &self,
        payload: &TriggerPayload,
        today: NaiveDate,
    ) -> Result<UpsertOutcome, SyncError> {
        let event = self.settings.normalizer().normalize(payload, today)?;
        let calendar_event = event.to_calendar_event();
        let reference = payload.back_reference();
        debug!("Normalized event: {:?}", event);

        let (action, event_id) = match &reference {
            Some(existing) => {
                match self
                    .calendar
                    .update_event(&event.calendar_id, existing.as_str(), calendar_event.clone())
                    .await
                {
                    Ok(result) => {
                        info!("Updated event {} '{}'", result.event_id, event.title);
                        (SyncAction::Updated, result.event_id)
                    }
                    Err(e) if e.is_not_found() => {
                        warn!(
                            "Stored event {} no longer exists, creating a new one",
                            existing
                        );
                        self.create_or_adopt(&event, calendar_event).await?
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            None => self.create_or_adopt(&event, calendar_event).await?,
        };

        match action {
            SyncAction::Created => self.metrics.record_created(),
            SyncAction::Updated => self.metrics.record_updated(),
        }

        let write_back = self
            .write_back(payload.contact_id(), reference.as_ref(), &event_id)
            .await;

        Ok(UpsertOutcome {
            action,
            event_id,
            event,
            write_back,
        })
    }

    async fn create_or_adopt(
        &self,
        event: &NormalizedEvent,
        calendar_event: CalendarEvent,
    ) -> Result<(SyncAction, String), SyncError> {
        if self.settings.dedupe_by_title {
            match self
                .calendar
                .find_event_by_title(&event.calendar_id, &event.title, event.date)
                .await
            {
                Ok(Some(found)) => {
                    info!(
                        "Found existing event {} for '{}' on {}, updating it",
                        found, event.title, event.date
                    );
                    let result = self
                        .calendar
                        .update_event(&event.calendar_id, &found, calendar_event)
                        .await?;
                    return Ok((SyncAction::Updated, result.event_id));
                }
                Ok(None) => {}
                Err(e) => warn!("Title search failed, creating a new event: {}", e),
            }
        }

        let created = self
            .calendar
            .create_event(&event.calendar_id, calendar_event)
            .await?;
        info!("Created event {} '{}'", created.event_id, event.title);
        Ok((SyncAction::Created, created.event_id))
    }

    async fn write_back(
        &self,
        contact_id: Option<String>,
        previous: Option<&BackReference>,
        event_id: &str,
    ) -> WriteBack {
        if previous.is_some_and(|r| r.as_str() == event_id) {
            return WriteBack::NotNeeded;
        }
        let Some(contact_id) = contact_id else {
            warn!("No contact_id in payload, event id {} not written back", event_id);
            return WriteBack::SkippedNoContact;
        };

        match self.crm.write_back_event_id(&contact_id, event_id).await {
            Ok(()) => {
                info!("Stored event id {} on contact {}", event_id, contact_id);
                WriteBack::Written
            }
            Err(e) => {
                error!(
                    "Failed to store event id {} on contact {}: {}",
                    event_id, contact_id, e
                );
                self.metrics.record_writeback_failure();
                WriteBack::Failed(e.to_string())
            }
        }
    }
}
