use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use constant_time_eq::constant_time_eq;
use ghlsync_common::error::GhlSyncError;
use ghlsync_config::WebhookConfig;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::warn;

use crate::error::SyncError;
use crate::metrics::SyncMetrics;

pub const WEBHOOK_SECRET_HEADER: &str = "X-Webhook-Secret";

/// Caller checks for the webhook route: shared secret header and peer allowlist.
#[derive(Debug, Clone, Default)]
pub struct WebhookGuard {
    secret: Option<String>,
    allowed_ips: Vec<IpAddr>,
}

impl WebhookGuard {
    pub fn new(secret: Option<String>, allowed_ips: Vec<IpAddr>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
            allowed_ips,
        }
    }

    pub fn from_config(config: Option<&WebhookConfig>) -> Result<Self, SyncError> {
        let Some(config) = config else {
            return Ok(Self::default());
        };
        let allowed_ips = config
            .allowed_ips
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<IpAddr>().map_err(|_| {
                    SyncError::Config(format!("Invalid address in webhook.allowed_ips: '{}'", s))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(config.secret.clone(), allowed_ips))
    }

    pub fn is_open(&self) -> bool {
        self.secret.is_none() && self.allowed_ips.is_empty()
    }

    /// Allowlist first, then the secret.
    pub fn check(&self, headers: &HeaderMap, peer: Option<IpAddr>) -> Result<(), SyncError> {
        if !self.allowed_ips.is_empty() {
            match peer {
                Some(ip) if self.allowed_ips.contains(&ip) => {}
                Some(ip) => {
                    warn!("Blocked webhook from unlisted address {}", ip);
                    return Err(SyncError::Forbidden(format!("IP {} not allowed", ip)));
                }
                None => {
                    warn!("Blocked webhook with unknown peer address");
                    return Err(SyncError::Forbidden("Peer address unknown".to_string()));
                }
            }
        }

        if let Some(expected) = &self.secret {
            let provided = headers
                .get(WEBHOOK_SECRET_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            if !constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
                warn!("Invalid webhook secret provided");
                return Err(SyncError::Forbidden("Invalid webhook secret".to_string()));
            }
        }

        Ok(())
    }
}

/// Guard plus the counters rejected calls are recorded in.
#[derive(Clone)]
pub struct GuardState {
    pub guard: WebhookGuard,
    pub metrics: Arc<SyncMetrics>,
}

/// Rejects webhook calls that fail the guard with 403.
///
/// Rejected calls still count as failed requests.
pub async fn webhook_guard_middleware(
    State(state): State<Arc<GuardState>>,
    req: Request,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    match state.guard.check(req.headers(), peer) {
        Ok(()) => next.run(req).await,
        Err(e) => {
            state.metrics.record_request();
            state.metrics.record_error();
            GhlSyncError::from(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_secret(secret: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(WEBHOOK_SECRET_HEADER, HeaderValue::from_str(secret).unwrap());
        headers
    }

    #[test]
    fn test_open_guard_allows_everything() {
        let guard = WebhookGuard::default();
        assert!(guard.is_open());
        assert!(guard.check(&HeaderMap::new(), None).is_ok());
    }

    #[test]
    fn test_secret_must_match() {
        let guard = WebhookGuard::new(Some("s3cret".to_string()), vec![]);
        assert!(guard.check(&headers_with_secret("s3cret"), None).is_ok());
        assert!(matches!(
            guard.check(&headers_with_secret("wrong"), None),
            Err(SyncError::Forbidden(_))
        ));
        assert!(guard.check(&HeaderMap::new(), None).is_err());
    }

    #[test]
    fn test_empty_secret_is_unset() {
        let guard = WebhookGuard::new(Some(String::new()), vec![]);
        assert!(guard.is_open());
    }

    #[test]
    fn test_allowlist() {
        let config = WebhookConfig {
            secret: None,
            allowed_ips: vec!["10.0.0.1".to_string(), " ::1 ".to_string(), "".to_string()],
        };
        let guard = WebhookGuard::from_config(Some(&config)).unwrap();
        let headers = HeaderMap::new();
        assert!(guard.check(&headers, Some("10.0.0.1".parse().unwrap())).is_ok());
        assert!(guard.check(&headers, Some("::1".parse().unwrap())).is_ok());
        assert!(guard.check(&headers, Some("10.0.0.2".parse().unwrap())).is_err());
        assert!(guard.check(&headers, None).is_err());
    }

    #[test]
    fn test_invalid_allowlist_entry() {
        let config = WebhookConfig {
            secret: None,
            allowed_ips: vec!["not-an-ip".to_string()],
        };
        assert!(matches!(
            WebhookGuard::from_config(Some(&config)),
            Err(SyncError::Config(_))
        ));
    }
}
