use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::auth::{webhook_guard_middleware, GuardState, WebhookGuard};
use crate::handlers::{calendar_ghl_webhook_handler, metrics_handler, CalendarSyncState};
use crate::logic::CalendarSyncService;

/// Webhook and metrics routes. Only the webhook sits behind the guard.
pub fn routes(sync: Arc<CalendarSyncService>, guard: WebhookGuard) -> Router {
    let guard_state = Arc::new(GuardState {
        guard,
        metrics: sync.metrics().clone(),
    });
    let state = Arc::new(CalendarSyncState { sync });

    Router::new()
        .route("/webhook/calendar-ghl", post(calendar_ghl_webhook_handler))
        .route_layer(middleware::from_fn_with_state(
            guard_state,
            webhook_guard_middleware,
        ))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
