use chrono_tz::Tz;
use ghlsync_calendar_sync::SyncMetrics;
use ghlsync_common::services::ServiceFactory;
use ghlsync_config::AppConfig;
use std::sync::Arc;

use crate::service_factory::GhlSyncServiceFactory;
use crate::StartupError;

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service_factory: Arc<dyn ServiceFactory>,
    pub metrics: Arc<SyncMetrics>,
}

impl AppState {
    /// Builds the state with collaborators chosen from `config`.
    pub async fn new(config: Arc<AppConfig>, time_zone: Tz) -> Result<Self, StartupError> {
        let service_factory = GhlSyncServiceFactory::new(config.clone(), time_zone).await?;
        Ok(Self::with_factory(config, Arc::new(service_factory)))
    }

    pub fn with_factory(config: Arc<AppConfig>, service_factory: Arc<dyn ServiceFactory>) -> Self {
        Self {
            config,
            service_factory,
            metrics: Arc::new(SyncMetrics::new()),
        }
    }
}
