use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use ghlsync_common::handlers::SERVICE_NAME;
use serde::Serialize;
use std::sync::Arc;

use crate::app_state::AppState;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub calendar_configured: bool,
    pub crm_configured: bool,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<&'static str>,
}

/// Which collaborators are live and for how long the process has run.
#[axum::debug_handler]
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        service: SERVICE_NAME,
        version: VERSION,
        uptime_seconds: state.metrics.uptime_seconds(),
        calendar_configured: state.service_factory.calendar_configured(),
        crm_configured: state.service_factory.crm_configured(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[axum::debug_handler]
pub async fn index_handler() -> Json<IndexResponse> {
    Json(IndexResponse {
        service: SERVICE_NAME,
        version: VERSION,
        endpoints: vec![
            "POST /webhook/calendar-ghl",
            "GET /health",
            "GET /metrics",
            "GET /status",
        ],
    })
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}
