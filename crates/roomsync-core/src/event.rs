//! Change events published while the canonical mirror is updated.
//!
//! One closed enum, one variant per named change. Consumers subscribe by
//! matching on the variant; payloads carry only the parsed fields that
//! changed, never the raw record.

use crate::parse::controls::{
    EntryExitToneState, ReactionsState, RecordingInfo, RecordingState, TranscribeState,
};
use crate::parse::full_state::ParsedFullState;
use crate::parse::host::ParsedHost;
use crate::parse::info::ParsedInfo;
use crate::parse::media_shares::ParsedMediaShares;
use crate::parse::self_state::{MediaStatus, ParsedSelf};
use crate::parse::embedded_apps::ParsedEmbeddedApp;
use crate::participant::DeltaParticipant;
use crate::record::{
    BreakoutControl, InterpretationControl, RawBreakoutAssignment,
    RawInterpretationAssignment, ServiceLink,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::Display;

/// Why a session mirror is being torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RemovalReason {
    /// A 1:1 call went inactive on the server
    CallInactive,
    /// The remote party of a 1:1 call left
    PartnerLeft,
    /// The local user left the call
    SelfLeft,
    /// A meeting moved to INACTIVE or TERMINATING
    MeetingInactiveTerminating,
    /// The server removed the whole session record
    FullStateRemoved,
    /// The local user was removed from the session
    SelfRemoved,
    /// Delta catch-up and full refetch both failed
    SyncFailed,
}

/// One named change to the session mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChangeEvent {
    // controls
    RecordingUpdated {
        state: RecordingState,
        recording: RecordingInfo,
    },
    MeetingContainerUpdated {
        url: Option<String>,
    },
    TranscribeUpdated {
        transcribe: TranscribeState,
    },
    ManualCaptionUpdated {
        enabled: bool,
    },
    EntryExitToneUpdated {
        tone: EntryExitToneState,
    },
    MuteOnEntryUpdated {
        enabled: bool,
    },
    ShareControlUpdated {
        mode: Option<String>,
    },
    DisallowUnmuteUpdated {
        enabled: bool,
    },
    ReactionsUpdated {
        reactions: ReactionsState,
    },
    ReactionDisplayNamesUpdated {
        enabled: bool,
    },
    ViewParticipantListUpdated {
        enabled: bool,
    },
    RaiseHandUpdated {
        enabled: bool,
    },
    VideoControlUpdated {
        enabled: bool,
    },
    VideoEnabledUpdated {
        enabled: Option<bool>,
    },
    BreakoutControlUpdated {
        breakout: Option<BreakoutControl>,
    },
    InterpretationControlUpdated {
        interpretation: Option<InterpretationControl>,
    },

    // full state
    SessionTypeUpdated {
        state: ParsedFullState,
    },
    SessionStateUpdated {
        state: ParsedFullState,
    },
    /// The session moved to INACTIVE after having been live
    SessionEnded,
    /// The session began terminating while still live
    SessionTerminating,

    // info
    SessionLocked,
    SessionUnlocked,
    InfoUpdated {
        info: ParsedInfo,
    },

    // self
    SelfUnadmitted {
        current: ParsedSelf,
    },
    SelfAdmitted {
        current: ParsedSelf,
    },
    ModeratorUpdated {
        moderator: Option<bool>,
    },
    RolesUpdated {
        roles: Vec<String>,
    },
    MutedByOthers {
        muted: bool,
        unmute_allowed: bool,
    },
    VideoMutedByOthers {
        muted: bool,
    },
    LocalUnmuteRequired,
    LocalUnmuteRequested,
    LayoutUpdated {
        layout: Option<String>,
    },
    SelfBreakoutUpdated {
        breakout: Option<RawBreakoutAssignment>,
    },
    SelfInterpretationUpdated {
        interpretation: Option<RawInterpretationAssignment>,
    },
    ObservingUpdated {
        observing: bool,
    },
    CannotViewParticipantListUpdated {
        blocked: bool,
    },
    SharingBlockedUpdated {
        blocked: bool,
    },
    MediaStatusUpdated {
        status: MediaStatus,
    },
    /// The server released the local user's media for inactivity
    DisconnectDueToInactivity,

    // shares, roster, host
    MediaSharesUpdated {
        shares: ParsedMediaShares,
    },
    ParticipantsUpdated {
        deltas: Vec<DeltaParticipant>,
        /// The roster must be replaced, not merged (session identity changed)
        replace: bool,
    },
    HostUpdated {
        host: Option<ParsedHost>,
    },
    /// Whether the local user may assign the host role changed
    CanAssignHostUpdated {
        can_assign: bool,
    },

    // 1:1 call signalling
    RemoteAnswered,
    RemoteDeclined,

    // session surfaces
    EmbeddedAppsUpdated {
        apps: Vec<ParsedEmbeddedApp>,
    },
    ServicesUpdated {
        services: BTreeMap<String, ServiceLink>,
    },
    SessionUrlUpdated {
        url: String,
    },

    /// Terminal event; the owning session should be destroyed
    DestroySession {
        reason: RemovalReason,
        /// The client should actively leave before destroying local state
        should_leave: bool,
    },
}

/// Outbound seam for change events. Implementations must not block.
pub trait ChangeNotifier: Send + Sync {
    fn publish(&self, event: ChangeEvent);
}
