//! Telemetry seam.
//!
//! The engine reports terminal conditions (session ended remotely, sync
//! abandoned) through this seam; it never computes metrics itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client-event name reported when the server side ends a session.
pub const EVENT_REMOTE_ENDED: &str = "client.call.remote-ended";
/// Client-event name reported when synchronization is abandoned.
pub const EVENT_SYNC_FAILED: &str = "client.locus.sync-failed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReport {
    pub name: String,
    pub detail: String,
    pub code: Option<u16>,
    pub reported_at: DateTime<Utc>,
}

impl TelemetryReport {
    pub fn new(name: &str, detail: impl Into<String>, code: Option<u16>) -> Self {
        Self {
            name: name.to_string(),
            detail: detail.into(),
            code,
            reported_at: Utc::now(),
        }
    }
}

pub trait TelemetrySink: Send + Sync {
    fn report(&self, report: TelemetryReport);
}

/// Discards every report. Default for callers that do not wire telemetry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn report(&self, _report: TelemetryReport) {}
}
