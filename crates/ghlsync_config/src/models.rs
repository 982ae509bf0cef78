use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error. Defaults to info.
    pub level: Option<String>,
}

// --- Inbound webhook guard ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct WebhookConfig {
    /// Expected value of the X-Webhook-Secret header. Loaded via GHLSYNC_SECRET_WEBHOOK_SECRET.
    pub secret: Option<String>,
    /// Peer addresses allowed to call the webhook. Empty means any.
    #[serde(default)]
    pub allowed_ips: Vec<String>,
}

// --- Google Calendar Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GcalConfig {
    pub key_path: Option<String>, // service account json
    pub calendar_id: Option<String>,
    pub time_zone: Option<String>,
}

// --- GoHighLevel Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GhlConfig {
    pub api_token: Option<String>, // Loaded via GHL_API_TOKEN
    pub location_id: Option<String>,
    pub base_url: Option<String>,
    pub api_version: Option<String>,
    /// Custom field key the calendar event id is written to.
    pub event_id_field_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CalendarSyncConfig {
    /// Reject malformed event dates with 400 instead of falling back to today.
    #[serde(default)]
    pub strict_dates: bool,
    /// Look for an existing event with the same title and date before creating one.
    #[serde(default = "default_true")]
    pub dedupe_by_title: bool,
}

impl Default for CalendarSyncConfig {
    fn default() -> Self {
        Self {
            strict_dates: false,
            dedupe_by_title: true,
        }
    }
}

fn default_true() -> bool {
    true
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub use_ghl: bool,

    // --- Optional Sections ---
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub ghl: Option<GhlConfig>,
    #[serde(default)]
    pub calendar_sync: Option<CalendarSyncConfig>,
}
