use ghlsync_backend::{app_state::AppState, build_app, StartupError};
use ghlsync_calendar_sync::SyncSettings;
use ghlsync_common::logging;
use ghlsync_config::load_config;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = Arc::new(load_config()?);

    let level = logging::level_from_str(config.logging.as_ref().and_then(|l| l.level.as_deref()));
    logging::init_with_level(level);

    let settings = SyncSettings::from_config(&config)?;
    let state = AppState::new(config.clone(), settings.time_zone).await?;
    let app = build_app(state)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("Webhook endpoint: POST http://{}/webhook/calendar-ghl", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
