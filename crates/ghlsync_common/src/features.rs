//! Runtime feature switches.
//!
//! Each collaborator has a `use_*` flag in `AppConfig` plus an optional
//! configuration section. A collaborator is only wired in when both are set;
//! otherwise the backend substitutes its offline stand-in.

use ghlsync_config::AppConfig;
use std::sync::Arc;

/// `true` when the flag is on and the section is present.
pub fn is_feature_enabled<T>(
    _config: &Arc<AppConfig>,
    use_feature: bool,
    feature_config: Option<&T>,
) -> bool {
    use_feature && feature_config.is_some()
}

/// Google Calendar is wired in.
pub fn is_gcal_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_gcal, config.gcal.as_ref())
}

/// GoHighLevel write-back is wired in.
pub fn is_ghl_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_ghl, config.ghl.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghlsync_config::{GhlConfig, ServerConfig};

    fn config(use_ghl: bool, ghl: Option<GhlConfig>) -> Arc<AppConfig> {
        Arc::new(AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            use_gcal: false,
            use_ghl,
            logging: None,
            webhook: None,
            gcal: None,
            ghl,
            calendar_sync: None,
        })
    }

    fn ghl_section() -> GhlConfig {
        GhlConfig {
            api_token: Some("token".to_string()),
            location_id: None,
            base_url: None,
            api_version: None,
            event_id_field_key: None,
            timeout_secs: None,
        }
    }

    #[test]
    fn test_flag_and_section_both_required() {
        assert!(is_ghl_enabled(&config(true, Some(ghl_section()))));
        assert!(!is_ghl_enabled(&config(false, Some(ghl_section()))));
        assert!(!is_ghl_enabled(&config(true, None)));
        assert!(!is_gcal_enabled(&config(true, Some(ghl_section()))));
    }
}
