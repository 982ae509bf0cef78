#![cfg(feature = "openapi")]

use utoipa::OpenApi;

use crate::handlers::{
    EventStart, MetricsResponse, SyncNoticeResponse, SyncSuccessResponse, WebhookResponse,
};
use crate::logic::SyncAction;
use crate::metrics::MetricsSnapshot;
use crate::payload::TriggerPayload;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::calendar_ghl_webhook_handler,
        crate::handlers::metrics_handler,
    ),
    components(schemas(
        TriggerPayload,
        WebhookResponse,
        SyncSuccessResponse,
        SyncNoticeResponse,
        EventStart,
        SyncAction,
        MetricsResponse,
        MetricsSnapshot,
    )),
    tags(
        (name = "Webhook", description = "GoHighLevel to Google Calendar sync"),
        (name = "Operations", description = "Service counters")
    )
)]
pub struct CalendarSyncApiDoc;
