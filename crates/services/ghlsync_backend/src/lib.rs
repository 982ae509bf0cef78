pub mod app_state;
pub mod service_factory;
pub mod status;

use axum::Router;
use ghlsync_calendar_sync::{CalendarSyncService, SyncError, SyncSettings, WebhookGuard};
use ghlsync_config::ConfigError;
use ghlsync_gcal::GcalServiceError;
use ghlsync_ghl::GhlError;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app_state::AppState;

/// Anything that stops the service from starting.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Google Calendar setup failed: {0}")]
    Calendar(#[from] GcalServiceError),

    #[error("GoHighLevel setup failed: {0}")]
    Ghl(#[from] GhlError),

    #[error("Invalid sync settings: {0}")]
    Sync(#[from] SyncError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Assembles every route of the service around `state`.
pub fn build_app(state: AppState) -> Result<Router, StartupError> {
    let settings = SyncSettings::from_config(&state.config)?;
    let guard = WebhookGuard::from_config(state.config.webhook.as_ref())?;
    if guard.is_open() {
        info!("Webhook guard not configured, accepting all callers");
    }
    info!(
        "Syncing to calendar '{}' in {}",
        settings.calendar_id, settings.time_zone
    );

    let sync = Arc::new(CalendarSyncService::new(
        state.service_factory.calendar_service(),
        state.service_factory.crm_service(),
        settings,
        state.metrics.clone(),
    ));

    #[allow(unused_mut)]
    let mut app = Router::new()
        .merge(ghlsync_common::routes())
        .merge(ghlsync_calendar_sync::routes(sync, guard))
        .merge(status::routes(Arc::new(state)));

    #[cfg(feature = "openapi")]
    {
        use ghlsync_calendar_sync::doc::CalendarSyncApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "GHL Calendar Sync API",
                version = "0.1.0",
                description = "GoHighLevel to Google Calendar webhook bridge"
            ),
            tags((name = "GhlSync", description = "Core service endpoints"))
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(CalendarSyncApiDoc::openapi());
        info!("Adding Swagger UI at /docs");
        app = app.merge(SwaggerUi::new("/docs").url("/docs/openapi.json", openapi_doc));
    }

    Ok(app.layer(TraceLayer::new_for_http()))
}
