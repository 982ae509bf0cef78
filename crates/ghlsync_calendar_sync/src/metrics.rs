use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Process-wide webhook counters. Reporting only.
#[derive(Debug)]
pub struct SyncMetrics {
    started: Instant,
    requests_total: AtomicU64,
    requests_success: AtomicU64,
    requests_error: AtomicU64,
    events_created: AtomicU64,
    events_updated: AtomicU64,
    events_deleted: AtomicU64,
    webhooks_skipped: AtomicU64,
    crm_writebacks_failed: AtomicU64,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub requests_success: u64,
    pub requests_error: u64,
    pub events_created: u64,
    pub events_updated: u64,
    pub events_deleted: u64,
    pub webhooks_skipped: u64,
    pub crm_writebacks_failed: u64,
    pub uptime_seconds: u64,
}

impl Default for SyncMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            requests_total: AtomicU64::new(0),
            requests_success: AtomicU64::new(0),
            requests_error: AtomicU64::new(0),
            events_created: AtomicU64::new(0),
            events_updated: AtomicU64::new(0),
            events_deleted: AtomicU64::new(0),
            webhooks_skipped: AtomicU64::new(0),
            crm_writebacks_failed: AtomicU64::new(0),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request(&self) {
        Self::bump(&self.requests_total);
    }

    pub fn record_success(&self) {
        Self::bump(&self.requests_success);
    }

    pub fn record_error(&self) {
        Self::bump(&self.requests_error);
    }

    pub fn record_created(&self) {
        Self::bump(&self.events_created);
    }

    pub fn record_updated(&self) {
        Self::bump(&self.events_updated);
    }

    pub fn record_deleted(&self) {
        Self::bump(&self.events_deleted);
    }

    pub fn record_skipped(&self) {
        Self::bump(&self.webhooks_skipped);
    }

    pub fn record_writeback_failure(&self) {
        Self::bump(&self.crm_writebacks_failed);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            requests_total: load(&self.requests_total),
            requests_success: load(&self.requests_success),
            requests_error: load(&self.requests_error),
            events_created: load(&self.events_created),
            events_updated: load(&self.events_updated),
            events_deleted: load(&self.events_deleted),
            webhooks_skipped: load(&self.webhooks_skipped),
            crm_writebacks_failed: load(&self.crm_writebacks_failed),
            uptime_seconds: self.uptime_seconds(),
        }
    }
}
