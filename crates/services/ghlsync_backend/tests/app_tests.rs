
use axum::{body::Body, http::Request, http::StatusCode};
use fixtures::*;
use ghlsync_backend::{
    app_state::AppState, build_app, service_factory::GhlSyncServiceFactory, StartupError,
};
use ghlsync_common::services::{CrmService, ServiceError, ServiceFactory};
use ghlsync_config::{GcalConfig, WebhookConfig};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_health_endpoint() {
    let backend = backend();
    let (status, body) = call(&backend.app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "ghl-calendar-sync");
}

#[tokio::test]
async fn test_status_and_index() {
    let backend = backend();
    let (status, body) = call(&backend.app, get("/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["calendar_configured"], false);
    assert_eq!(body["crm_configured"], true);
    assert!(body["version"].is_string());

    let (status, body) = call(&backend.app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    let endpoints = body["endpoints"].as_array().unwrap();
    assert!(endpoints.contains(&json!("POST /webhook/calendar-ghl")));
}

#[tokio::test]
async fn test_webhook_end_to_end() {
    let backend = backend();
    let request = Request::builder()
        .method("POST")
        .uri("/webhook/calendar-ghl")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "Opportunity Name": "Lee Corporate Gala",
                "Event Date": "10/04/2025",
                "Videography Hours": 5,
                "stage": "lead",
                "contact_id": "contact-77"
            })
            .to_string(),
        ))
        .unwrap();

    let (status, body) = call(&backend.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "created");
    assert_eq!(body["event_title"], "Lee Corporate Gala - Video (Lead)");
    assert_eq!(body["event_start"]["dateTime"], "2025-10-04T10:00:00-04:00");
    assert_eq!(backend.calendar.events("primary").len(), 1);
    assert_eq!(backend.crm.writes().len(), 1);

    let (_, metrics) = call(&backend.app, get("/metrics")).await;
    assert_eq!(metrics["requests_total"], 1);
    assert_eq!(metrics["events_created"], 1);
}

#[tokio::test]
async fn test_configured_secret_guards_webhook() {
    let mut config = test_config();
    config.webhook = Some(WebhookConfig {
        secret: Some("let-me-in".to_string()),
        allowed_ips: vec![],
    });
    let backend = backend_with(config);

    let request = Request::builder()
        .method("POST")
        .uri("/webhook/calendar-ghl")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = call(&backend.app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], 403);
}

#[tokio::test]
async fn test_invalid_time_zone_fails_startup() {
    let mut config = test_config();
    config.gcal = Some(GcalConfig {
        key_path: None,
        calendar_id: None,
        time_zone: Some("Not/AZone".to_string()),
    });
    let factory = GhlSyncServiceFactory::from_parts(
        Arc::new(ghlsync_gcal::MockCalendarService::new()),
        Arc::new(ghlsync_ghl::MockCrmService::new()),
        false,
        false,
    );
    let state = AppState::with_factory(Arc::new(config), Arc::new(factory));
    assert!(matches!(build_app(state), Err(StartupError::Sync(_))));
}

#[tokio::test]
async fn test_factory_falls_back_when_disabled() {
    let factory = GhlSyncServiceFactory::new(Arc::new(test_config()), chrono_tz::Tz::UTC)
        .await
        .unwrap();
    assert!(!factory.calendar_configured());
    assert!(!factory.crm_configured());

    let err = factory
        .crm_service()
        .write_back_event_id("contact-1", "evt-1")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotConfigured(_)));
}

#[tokio::test]
async fn test_factory_rejects_enabled_but_incomplete_collaborators() {
    let mut config = test_config();
    config.use_ghl = true;
    let result = GhlSyncServiceFactory::new(Arc::new(config), chrono_tz::Tz::UTC).await;
    assert!(matches!(result, Err(StartupError::Ghl(_))));

    let mut config = test_config();
    config.use_gcal = true;
    let result = GhlSyncServiceFactory::new(Arc::new(config), chrono_tz::Tz::UTC).await;
    assert!(matches!(result, Err(StartupError::Calendar(_))));
}
