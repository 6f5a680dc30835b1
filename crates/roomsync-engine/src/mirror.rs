//! Outbound seam toward the owning session object.
//!
//! The orchestrator never mutates the caller's session directly; it hands
//! over parsed sub-trees one at a time, only for the fields that actually
//! changed.

use roomsync_core::parse::controls::ParsedControls;
use roomsync_core::parse::embedded_apps::ParsedEmbeddedApp;
use roomsync_core::parse::full_state::ParsedFullState;
use roomsync_core::parse::host::ParsedHost;
use roomsync_core::parse::info::ParsedInfo;
use roomsync_core::parse::media_shares::ParsedMediaShares;
use roomsync_core::parse::self_state::ParsedSelf;
use roomsync_core::record::{RawParticipant, ServiceLink};
use std::collections::BTreeMap;

/// One changed sub-tree of the canonical mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum MirrorUpdate {
    Controls(ParsedControls),
    FullState(ParsedFullState),
    Info(ParsedInfo),
    SelfState(ParsedSelf),
    Host(Option<ParsedHost>),
    MediaShares(ParsedMediaShares),
    /// Full replacement roster, already merged
    Participants(Vec<RawParticipant>),
    EmbeddedApps(Vec<ParsedEmbeddedApp>),
    Services(BTreeMap<String, ServiceLink>),
    Url(String),
}

/// Receives mirror updates. Implementations must not block.
pub trait MirrorSink: Send + Sync {
    fn apply(&self, update: MirrorUpdate);
}
