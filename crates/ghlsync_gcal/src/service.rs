//! Google Calendar implementation of `CalendarService`.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use ghlsync_common::services::{
    title_key, titles_match, BoxFuture, CalendarEvent, CalendarEventResult, CalendarService,
    ServiceError, LEAD_MARKER,
};
use google_calendar3::api::{Event, EventDateTime};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::HubType;

const SERVICE_NAME: &str = "Google Calendar";

/// Errors that can occur when interacting with Google Calendar.
#[derive(Error, Debug)]
pub enum GcalServiceError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    #[error("Google Calendar authentication failed: {0}")]
    Auth(String),
    #[error("Failed to parse time: {0}")]
    TimeParseError(String),
    #[error("Event {0} not found")]
    NotFound(String),
}

impl From<GcalServiceError> for ServiceError {
    fn from(err: GcalServiceError) -> Self {
        match err {
            GcalServiceError::NotFound(id) => ServiceError::NotFound(format!("event {}", id)),
            GcalServiceError::TimeParseError(msg) => ServiceError::InvalidInput(msg),
            GcalServiceError::Auth(msg) => ServiceError::NotConfigured(format!("{} ({})", SERVICE_NAME, msg)),
            GcalServiceError::ApiError(e) => ServiceError::api(SERVICE_NAME, e),
        }
    }
}

/// Deleted events come back as 404, or 410 once Google has purged them.
fn is_gone(err: &google_calendar3::Error) -> bool {
    match err {
        google_calendar3::Error::BadRequest(value) => matches!(
            value.pointer("/error/code").and_then(|c| c.as_u64()),
            Some(404) | Some(410)
        ),
        google_calendar3::Error::Failure(response) => {
            matches!(response.status().as_u16(), 404 | 410)
        }
        _ => false,
    }
}

fn parse_rfc3339(value: &str, field: &str) -> Result<DateTime<Utc>, GcalServiceError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| GcalServiceError::TimeParseError(format!("Invalid {}: {}", field, e)))
}

fn event_time(at: DateTime<Utc>, time_zone: &str) -> EventDateTime {
    EventDateTime {
        date_time: Some(at),
        time_zone: Some(time_zone.to_string()),
        ..Default::default()
    }
}

/// Copies our fields onto a Google event, leaving attendees, reminders and the like alone.
fn apply_event(target: &mut Event, event: CalendarEvent) -> Result<(), GcalServiceError> {
    let start = parse_rfc3339(&event.start_time, "start_time")?;
    let end = parse_rfc3339(&event.end_time, "end_time")?;
    target.summary = Some(event.summary);
    target.description = event.description;
    target.location = event.location;
    target.color_id = event.color_id;
    target.start = Some(event_time(start, &event.time_zone));
    target.end = Some(event_time(end, &event.time_zone));
    Ok(())
}

/// Google Calendar service implementation.
pub struct GoogleCalendarService {
    calendar_hub: Arc<HubType>,
    /// Zone used to turn a bare date into a search window.
    time_zone: Tz,
}

impl GoogleCalendarService {
    pub fn new(calendar_hub: Arc<HubType>, time_zone: Tz) -> Self {
        Self {
            calendar_hub,
            time_zone,
        }
    }

    fn day_window(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        let start = self
            .time_zone
            .from_local_datetime(&midnight)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight));
        (start, start + Duration::days(1))
    }
}

impl CalendarService for GoogleCalendarService {
    type Error = ServiceError;

    fn create_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let mut new_event = Event::default();
            apply_event(&mut new_event, event)?;

            let (_response, created_event) = calendar_hub
                .events()
                .insert(new_event, &calendar_id)
                .send_updates("all")
                .doit()
                .await
                .map_err(GcalServiceError::from)?;

            let event_id = created_event
                .id
                .ok_or_else(|| ServiceError::api(SERVICE_NAME, "created event has no id"))?;
            info!("Created Google Calendar event {}", event_id);

            Ok(CalendarEventResult {
                event_id,
                status: created_event
                    .status
                    .unwrap_or_else(|| "confirmed".to_string()),
            })
        })
    }

    /// Fetches the stored event, overwrites our fields and writes it back.
    ///
    /// Events that were deleted in Google (gone, or left behind as `cancelled`)
    /// are reported as `ServiceError::NotFound` so the caller can recreate them.
    fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let mut existing = match calendar_hub.events().get(&calendar_id, &event_id).doit().await {
                Ok((_response, existing)) => existing,
                Err(e) if is_gone(&e) => return Err(GcalServiceError::NotFound(event_id).into()),
                Err(e) => return Err(GcalServiceError::ApiError(e).into()),
            };
            if existing.status.as_deref() == Some("cancelled") {
                return Err(GcalServiceError::NotFound(event_id).into());
            }

            apply_event(&mut existing, event)?;

            let (_response, updated) = calendar_hub
                .events()
                .update(existing, &calendar_id, &event_id)
                .send_updates("all")
                .doit()
                .await
                .map_err(|e| {
                    if is_gone(&e) {
                        GcalServiceError::NotFound(event_id.clone())
                    } else {
                        GcalServiceError::ApiError(e)
                    }
                })?;

            info!("Updated Google Calendar event {}", event_id);
            Ok(CalendarEventResult {
                event_id: updated.id.unwrap_or(event_id),
                status: updated.status.unwrap_or_else(|| "confirmed".to_string()),
            })
        })
    }

    fn find_event_by_title(
        &self,
        calendar_id: &str,
        title: &str,
        date: NaiveDate,
    ) -> BoxFuture<'_, Option<String>, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let title = title.to_string();
        let calendar_hub = self.calendar_hub.clone();
        let (time_min, time_max) = self.day_window(date);

        Box::pin(async move {
            // Search on the bare name; the lead marker may or may not be on the stored title.
            let query = title.replace(LEAD_MARKER, "").trim().to_string();
            let (_response, events) = calendar_hub
                .events()
                .list(&calendar_id)
                .time_min(time_min)
                .time_max(time_max)
                .q(&query)
                .single_events(true)
                .max_results(10)
                .doit()
                .await
                .map_err(GcalServiceError::from)?;

            let found = events.items.unwrap_or_default().into_iter().find_map(|item| {
                let summary = item.summary.as_deref().unwrap_or_default();
                if item.status.as_deref() != Some("cancelled") && titles_match(summary, &title) {
                    item.id
                } else {
                    None
                }
            });

            debug!(
                "Title search for '{}' on {}: {:?}",
                title_key(&title),
                date,
                found
            );
            Ok(found)
        })
    }

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, (), Self::Error> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            match calendar_hub
                .events()
                .delete(&calendar_id, &event_id)
                .send_updates("all")
                .doit()
                .await
            {
                Ok(_) => {
                    info!("Deleted Google Calendar event {}", event_id);
                    Ok(())
                }
                Err(e) if is_gone(&e) => {
                    warn!("Event {} was already gone", event_id);
                    Ok(())
                }
                Err(e) => Err(GcalServiceError::ApiError(e).into()),
            }
        })
    }
}

/// In-memory calendar.
///
/// Backs the service when Google Calendar is switched off, and every test that
/// needs a calendar.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    pub struct StoredEvent {
        pub event_id: String,
        pub event: CalendarEvent,
    }

    /// Mock calendar service.
    #[derive(Default)]
    pub struct MockCalendarService {
        events: Mutex<HashMap<String, Vec<StoredEvent>>>,
        failure: Option<String>,
    }

    impl MockCalendarService {
        pub fn new() -> Self {
            Self::default()
        }

        /// A calendar whose every call fails with `ServiceError::Api`.
        pub fn failing(message: &str) -> Self {
            Self {
                events: Mutex::new(HashMap::new()),
                failure: Some(message.to_string()),
            }
        }

        /// Events currently stored for `calendar_id`, in insertion order.
        pub fn events(&self, calendar_id: &str) -> Vec<StoredEvent> {
            self.events
                .lock()
                .map(|events| events.get(calendar_id).cloned().unwrap_or_default())
                .unwrap_or_default()
        }

        /// Stores an event under a fixed id, for seeding scenarios.
        pub fn insert(&self, calendar_id: &str, event_id: &str, event: CalendarEvent) {
            if let Ok(mut events) = self.events.lock() {
                events
                    .entry(calendar_id.to_string())
                    .or_default()
                    .push(StoredEvent {
                        event_id: event_id.to_string(),
                        event,
                    });
            }
        }

        fn check(&self) -> Result<(), ServiceError> {
            match &self.failure {
                Some(message) => Err(ServiceError::api("Mock calendar", message)),
                None => Ok(()),
            }
        }

        fn lock(
            &self,
        ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<StoredEvent>>>, ServiceError>
        {
            self.events
                .lock()
                .map_err(|_| ServiceError::api("Mock calendar", "event store poisoned"))
        }
    }

    impl CalendarService for MockCalendarService {
        type Error = ServiceError;

        fn create_event(
            &self,
            calendar_id: &str,
            event: CalendarEvent,
        ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
            let calendar_id = calendar_id.to_string();

            Box::pin(async move {
                self.check()?;
                parse_rfc3339(&event.start_time, "start_time")?;
                parse_rfc3339(&event.end_time, "end_time")?;

                let event_id = format!("mock-event-{}", uuid::Uuid::new_v4());
                self.lock()?
                    .entry(calendar_id)
                    .or_default()
                    .push(StoredEvent {
                        event_id: event_id.clone(),
                        event,
                    });

                Ok(CalendarEventResult {
                    event_id,
                    status: "confirmed".to_string(),
                })
            })
        }

        fn update_event(
            &self,
            calendar_id: &str,
            event_id: &str,
            event: CalendarEvent,
        ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
            let calendar_id = calendar_id.to_string();
            let event_id = event_id.to_string();

            Box::pin(async move {
                self.check()?;
                let mut events = self.lock()?;
                let stored = events
                    .get_mut(&calendar_id)
                    .and_then(|list| list.iter_mut().find(|s| s.event_id == event_id))
                    .ok_or_else(|| ServiceError::NotFound(format!("event {}", event_id)))?;
                stored.event = event;

                Ok(CalendarEventResult {
                    event_id,
                    status: "confirmed".to_string(),
                })
            })
        }

        fn find_event_by_title(
            &self,
            calendar_id: &str,
            title: &str,
            date: NaiveDate,
        ) -> BoxFuture<'_, Option<String>, Self::Error> {
            let calendar_id = calendar_id.to_string();
            let title = title.to_string();

            Box::pin(async move {
                self.check()?;
                let events = self.lock()?;
                let found = events.get(&calendar_id).and_then(|list| {
                    list.iter()
                        .find(|s| {
                            let same_day = DateTime::parse_from_rfc3339(&s.event.start_time)
                                .map(|start| start.date_naive() == date)
                                .unwrap_or(false);
                            same_day && titles_match(&s.event.summary, &title)
                        })
                        .map(|s| s.event_id.clone())
                });
                Ok(found)
            })
        }

        fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, (), Self::Error> {
            let calendar_id = calendar_id.to_string();
            let event_id = event_id.to_string();

            Box::pin(async move {
                self.check()?;
                if let Some(list) = self.lock()?.get_mut(&calendar_id) {
                    list.retain(|s| s.event_id != event_id);
                }
                Ok(())
            })
        }
    }
}
