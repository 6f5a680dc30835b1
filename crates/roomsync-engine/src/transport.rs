//! Inbound push events and the record-fetch seam.

use async_trait::async_trait;
use roomsync_core::{Result, SessionRecord};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// The fixed enumeration of push-channel event kinds. Everything except
/// [`Difference`](PushEventKind::Difference) carries a full record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PushEventKind {
    ParticipantJoined,
    ParticipantLeft,
    ParticipantDeclined,
    ParticipantUpdated,
    ParticipantControlsUpdated,
    SelfChanged,
    ControlsUpdated,
    FloorGranted,
    FloorReleased,
    RecordUpdated,
    /// Delta record; routed through the sequencer
    Difference,
}

impl PushEventKind {
    pub fn is_delta(self) -> bool {
        self == PushEventKind::Difference
    }
}

/// One push-channel notification: an event kind plus the record it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushEvent {
    #[serde(rename = "eventType")]
    pub kind: PushEventKind,
    pub record: SessionRecord,
}

/// Pull seam toward the record service, used only for resynchronization.
#[async_trait]
pub trait RecordFetcher: Send + Sync {
    /// Fetches the current full record.
    async fn fetch_full(&self, url: &str) -> Result<SessionRecord>;

    /// Fetches the deltas missed since the working copy's sync position.
    /// `Ok(None)` means the service reports the client as already current.
    async fn fetch_delta_catch_up(&self, sync_url: &str) -> Result<Option<SessionRecord>>;
}
