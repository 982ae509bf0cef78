use axum::Json;
use chrono::Utc;
use serde::Serialize;

/// Name reported by the health endpoint.
pub const SERVICE_NAME: &str = "ghl-calendar-sync";

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
}

/// Liveness probe.
#[axum::debug_handler]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        service: SERVICE_NAME,
    })
}
