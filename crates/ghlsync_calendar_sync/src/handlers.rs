use axum::{body::Bytes, extract::State, response::Json};
use chrono::Utc;
use ghlsync_common::error::GhlSyncError;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::SyncError;
use crate::logic::{CalendarSyncService, SyncAction, SyncOutcome, UpsertOutcome};
use crate::metrics::MetricsSnapshot;
use crate::payload::TriggerPayload;

#[derive(Clone)]
pub struct CalendarSyncState {
    pub sync: Arc<CalendarSyncService>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct EventStart {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct SyncSuccessResponse {
    pub status: String,
    pub action: SyncAction,
    pub event_id: String,
    pub event_title: String,
    pub event_start: EventStart,
    pub is_booked: bool,
}

impl From<UpsertOutcome> for SyncSuccessResponse {
    fn from(outcome: UpsertOutcome) -> Self {
        let event = outcome.event;
        Self {
            status: "success".to_string(),
            action: outcome.action,
            event_id: outcome.event_id,
            event_start: EventStart {
                date_time: event.start.to_rfc3339(),
                time_zone: event.time_zone().name().to_string(),
            },
            event_title: event.title,
            is_booked: event.is_booked,
        }
    }
}

/// Reply for webhooks that were routed away from the upsert.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct SyncNoticeResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WebhookResponse {
    Synced(SyncSuccessResponse),
    Notice(SyncNoticeResponse),
}

impl From<SyncOutcome> for WebhookResponse {
    fn from(outcome: SyncOutcome) -> Self {
        match outcome {
            SyncOutcome::Upserted(upsert) => WebhookResponse::Synced(upsert.into()),
            SyncOutcome::Skipped { message } => WebhookResponse::Notice(SyncNoticeResponse {
                status: "skipped".to_string(),
                message,
                event_id: None,
            }),
            SyncOutcome::Deleted { event_id, message } => {
                WebhookResponse::Notice(SyncNoticeResponse {
                    status: "deleted".to_string(),
                    message,
                    event_id,
                })
            }
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    #[serde(flatten)]
    pub counters: MetricsSnapshot,
    pub timestamp: String,
}

/// An empty body is an empty payload; anything else must be a JSON object.
fn parse_body(body: &[u8]) -> Result<TriggerPayload, SyncError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(TriggerPayload::default());
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| SyncError::Validation(format!("Invalid JSON body: {}", e)))?;
    TriggerPayload::from_value(value)
}

/// GoHighLevel opportunity webhook: creates or updates the matching calendar event.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/webhook/calendar-ghl",
    request_body(content = TriggerPayload, description = "GHL opportunity fields keyed by label"),
    responses(
        (status = 200, description = "Event created, updated, or webhook routed", body = WebhookResponse),
        (status = 400, description = "Body is not a JSON object or the date is invalid"),
        (status = 403, description = "Webhook secret or caller address rejected"),
        (status = 500, description = "Calendar operation failed")
    ),
    tag = "Webhook"
))]
pub async fn calendar_ghl_webhook_handler(
    State(state): State<Arc<CalendarSyncState>>,
    body: Bytes,
) -> Result<Json<WebhookResponse>, GhlSyncError> {
    let metrics = state.sync.metrics().clone();
    metrics.record_request();

    let result = match parse_body(&body) {
        Ok(payload) => {
            info!(
                "Received calendar-ghl webhook for {:?} ({} fields)",
                payload.opportunity_name(),
                payload.len()
            );
            debug!("Webhook payload: {:?}", payload);
            state.sync.process(&payload).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => {
            metrics.record_success();
            Ok(Json(outcome.into()))
        }
        Err(e) => {
            error!("calendar-ghl webhook failed: {}", e);
            metrics.record_error();
            Err(e.into())
        }
    }
}

/// Webhook counters since process start.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "Webhook counters", body = MetricsResponse)
    ),
    tag = "Operations"
))]
pub async fn metrics_handler(State(state): State<Arc<CalendarSyncState>>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        counters: state.sync.metrics().snapshot(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
