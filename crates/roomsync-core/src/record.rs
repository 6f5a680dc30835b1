//! Raw session record types.
//!
//! These are the wire shapes pushed by the meeting service, either as a full
//! snapshot (every field populated) or as a delta record (only changed fields
//! populated, always carrying `sequence` and `baseSequence`). They are decoded
//! once at the transport boundary; everything past that point works on these
//! closed structs, never on untyped JSON trees.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::Display;

/// Lifecycle state of a session, as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Initializing,
    Active,
    Inactive,
    Terminating,
    #[serde(other)]
    #[default]
    Unknown,
}

impl SessionState {
    /// States in which the session is considered live on the server.
    pub fn is_live(self) -> bool {
        matches!(
            self,
            SessionState::Active | SessionState::Initializing | SessionState::Terminating
        )
    }
}

/// The kind of session described by a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    Call,
    Meeting,
    SipBridge,
    #[serde(other)]
    #[default]
    Unknown,
}

/// Participation state of a person (including the local user).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantState {
    Idle,
    Notified,
    Joined,
    Left,
    Declined,
    #[serde(other)]
    #[default]
    Unknown,
}

/// Server-side reason attached to a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionReason {
    /// The device was moved to a sub-session; emitted transiently on the
    /// record of the session that was just departed
    Moved,
    Inactive,
    MediaReleased,
    #[serde(other)]
    Other,
}

/// What a device intends to do in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentKind {
    Wait,
    MoveMedia,
    Observe,
    #[serde(other)]
    Other,
}

/// Ownership state of a shared media channel floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FloorDisposition {
    Granted,
    Released,
    #[serde(other)]
    Other,
}

/// One session record, full or delta.
///
/// A delta record is recognized by `base_sequence` being present; a full
/// record carries `sequence` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionRecord {
    pub url: Option<String>,
    pub sequence: Option<u64>,
    pub base_sequence: Option<u64>,
    /// Pointer for fetching only the deltas missing since this record
    pub sync_url: Option<String>,
    pub participants: Option<Vec<RawParticipant>>,
    #[serde(rename = "self")]
    pub self_participant: Option<RawSelf>,
    pub host: Option<RawHost>,
    pub controls: Option<RawControls>,
    pub media_shares: Option<Vec<RawMediaShare>>,
    pub full_state: Option<RawFullState>,
    pub info: Option<RawInfo>,
    pub embedded_apps: Option<Vec<RawEmbeddedApp>>,
    pub created: Option<String>,
    pub membership: Option<RawMembership>,
    pub identities: Option<Vec<String>>,
    pub replaces: Option<Vec<ReplacedSession>>,
    pub acl_url: Option<String>,
    pub participants_url: Option<String>,
    pub conversation_url: Option<String>,
    pub links: Option<RawLinks>,
}

impl SessionRecord {
    /// Whether this record is a delta (partial) record.
    pub fn is_delta(&self) -> bool {
        self.base_sequence.is_some()
    }
}

/// Session-level links pushed alongside the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLinks {
    pub services: Option<BTreeMap<String, ServiceLink>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceLink {
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMembership {
    pub id: Option<String>,
    pub space_url: Option<String>,
}

/// Reference to a session this one replaces (session migration).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplacedSession {
    pub url: Option<String>,
    pub last_active: Option<String>,
}

/// A person as referenced by participants and the local self entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPerson {
    pub id: Option<String>,
    pub name: Option<String>,
    pub sip_url: Option<String>,
}

/// Per-participant media status flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawParticipantStatus {
    pub audio_status: Option<String>,
    pub video_status: Option<String>,
    pub video_slides_status: Option<String>,
}

/// One remote participant in the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawParticipant {
    pub id: Option<String>,
    pub identity: Option<String>,
    pub person: Option<RawPerson>,
    #[serde(rename = "type")]
    pub participant_type: Option<String>,
    pub state: Option<ParticipantState>,
    pub removed: Option<bool>,
    pub guest: Option<bool>,
    pub status: Option<RawParticipantStatus>,
}

/// Participant type constant for ordinary users.
pub const PARTICIPANT_TYPE_USER: &str = "USER";

/// Device type constant for dial-in (PSTN) devices.
pub const DEVICE_TYPE_PROVISIONAL: &str = "PROVISIONAL";

/// A media session advertised by one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMediaSession {
    pub media_type: Option<String>,
    pub media_content: Option<String>,
    pub state: Option<String>,
    pub direction: Option<String>,
}

/// Media type / content constants used inside `RawMediaSession`.
pub const MEDIA_TYPE_AUDIO: &str = "AUDIO";
pub const MEDIA_TYPE_VIDEO: &str = "VIDEO";
pub const MEDIA_CONTENT_MAIN: &str = "MAIN";
pub const MEDIA_CONTENT_SLIDES: &str = "SLIDES";
pub const MEDIA_STATE_INACTIVE: &str = "INACTIVE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawIntent {
    #[serde(rename = "type")]
    pub kind: Option<IntentKind>,
}

/// One device the local user is (or was) present with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDevice {
    pub url: Option<String>,
    pub device_type: Option<String>,
    pub state: Option<ParticipantState>,
    pub reason: Option<TransitionReason>,
    pub intent: Option<RawIntent>,
    pub media_sessions: Option<Vec<RawMediaSession>>,
}

/// Modification metadata attached to server-side controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ControlMeta {
    pub last_modified: Option<String>,
    pub modified_by: Option<String>,
}

/// The server-enforced audio control on the local user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAudioControl {
    pub muted: Option<bool>,
    pub disallow_unmute: Option<bool>,
    /// The server asks (but does not force) the client to unmute locally
    pub requested_to_unmute: Option<bool>,
    /// The server requires a local unmute before audio can flow again
    pub local_audio_unmute_required: Option<bool>,
    pub meta: Option<ControlMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawVideoControl {
    pub muted: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLayout {
    #[serde(rename = "type")]
    pub layout_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRole {
    #[serde(rename = "type")]
    pub role_type: Option<String>,
    pub has_role: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRoleControl {
    pub roles: Option<Vec<RawRole>>,
}

/// Breakout assignment carried on the local user's controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBreakoutAssignment {
    pub session_id: Option<String>,
    pub group_id: Option<String>,
    pub name: Option<String>,
    pub state: Option<String>,
    pub url: Option<String>,
}

/// Interpretation assignment carried on the local user's controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawInterpretationAssignment {
    pub source_language: Option<String>,
    pub target_language: Option<String>,
    pub order: Option<u32>,
}

/// Controls scoped to the local user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSelfControls {
    pub audio: Option<RawAudioControl>,
    pub video: Option<RawVideoControl>,
    pub layouts: Option<Vec<RawLayout>>,
    pub role: Option<RawRoleControl>,
    pub breakout_session: Option<RawBreakoutAssignment>,
    pub interpretation: Option<RawInterpretationAssignment>,
}

/// The local user's view of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSelf {
    pub id: Option<String>,
    pub url: Option<String>,
    pub person: Option<RawPerson>,
    pub state: Option<ParticipantState>,
    pub reason: Option<TransitionReason>,
    pub removed: Option<bool>,
    pub guest: Option<bool>,
    pub moderator: Option<bool>,
    pub is_creator: Option<bool>,
    pub devices: Option<Vec<RawDevice>>,
    pub controls: Option<RawSelfControls>,
    pub status: Option<RawParticipantStatus>,
    pub can_not_view_the_participant_list: Option<bool>,
    pub is_sharing_blocked: Option<bool>,
}

/// The current host of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawHost {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Simple on/off control knob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ToggleControl {
    pub enabled: Option<bool>,
    pub meta: Option<ControlMeta>,
}

/// Server recording state for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordControl {
    pub recording: Option<bool>,
    pub paused: Option<bool>,
    pub meta: Option<ControlMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MeetingContainerControl {
    pub meeting_container_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscribeControl {
    pub transcribing: Option<bool>,
    pub caption: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryExitToneControl {
    pub enabled: Option<bool>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ShareControl {
    pub control: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ReactionsControl {
    pub enabled: Option<bool>,
    pub show_display_name_with_reactions: Option<bool>,
}

/// Breakout control on the session record; identifies which (sub-)session
/// this record belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BreakoutControl {
    pub session_type: Option<String>,
    pub group_id: Option<String>,
    pub session_id: Option<String>,
    pub url: Option<String>,
    pub name: Option<String>,
}

/// Session type constant carried on [`BreakoutControl`].
pub const BREAKOUT_SESSION_TYPE_MAIN: &str = "MAIN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct InterpretationControl {
    pub enabled: Option<bool>,
    pub support_languages: Option<Vec<String>>,
}

/// Session-wide controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawControls {
    pub record: Option<RecordControl>,
    pub meeting_container: Option<MeetingContainerControl>,
    pub transcribe: Option<TranscribeControl>,
    pub manual_caption_control: Option<ToggleControl>,
    pub entry_exit_tone: Option<EntryExitToneControl>,
    pub mute_on_entry: Option<ToggleControl>,
    pub share_control: Option<ShareControl>,
    pub disallow_unmute: Option<ToggleControl>,
    pub reactions: Option<ReactionsControl>,
    pub view_the_participant_list: Option<ToggleControl>,
    pub raise_hand: Option<ToggleControl>,
    pub video: Option<ToggleControl>,
    pub breakout: Option<BreakoutControl>,
    pub interpretation: Option<InterpretationControl>,
    pub lock: Option<ToggleControl>,
}

/// Overall session state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFullState {
    pub active: Option<bool>,
    pub count: Option<u32>,
    pub locked: Option<bool>,
    pub removed: Option<bool>,
    pub state: Option<SessionState>,
    #[serde(rename = "type")]
    pub session_type: Option<SessionType>,
    pub last_active: Option<String>,
}

/// Display hints the server derives from policy and role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDisplayHints {
    pub joined: Option<Vec<String>>,
    pub moderator: Option<Vec<String>>,
}

/// Display hint constants relevant to the lock state.
pub const HINT_LOCK_STATUS_LOCKED: &str = "LOCK_STATUS_LOCKED";
pub const HINT_LOCK_STATUS_UNLOCKED: &str = "LOCK_STATUS_UNLOCKED";

/// Session info and policy-derived display hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawInfo {
    pub web_ex_id: Option<String>,
    pub sip_uri: Option<String>,
    pub conversation_url: Option<String>,
    pub owner: Option<String>,
    pub locked: Option<bool>,
    pub display_hints: Option<RawDisplayHints>,
}

/// Floor assignment for a shared media channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFloor {
    pub disposition: Option<FloorDisposition>,
    pub beneficiary: Option<RawParticipant>,
    pub granted: Option<String>,
    pub released: Option<String>,
}

/// One shared media channel (content share or whiteboard).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMediaShare {
    pub name: Option<String>,
    pub url: Option<String>,
    pub floor: Option<RawFloor>,
}

/// Channel name constants used inside [`RawMediaShare`].
pub const MEDIA_SHARE_CONTENT: &str = "content";
pub const MEDIA_SHARE_WHITEBOARD: &str = "whiteboard";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAppInstance {
    pub app_instance_url: Option<String>,
    pub external_app_instance_url: Option<String>,
    pub title: Option<String>,
}

/// One embedded application running in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEmbeddedApp {
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub app_type: Option<String>,
    pub state: Option<String>,
    pub instance_info: Option<RawAppInstance>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_record_is_recognized_by_base_sequence() {
        let full = SessionRecord {
            sequence: Some(10),
            ..Default::default()
        };
        let delta = SessionRecord {
            sequence: Some(11),
            base_sequence: Some(10),
            ..Default::default()
        };

        assert!(!full.is_delta());
        assert!(delta.is_delta());
    }

    #[test]
    fn test_record_decodes_from_camel_case_json() {
        let json = r#"{
            "url": "https://locus.example.com/session/1",
            "sequence": 42,
            "baseSequence": 41,
            "syncUrl": "https://locus.example.com/session/1/sync",
            "fullState": {"state": "ACTIVE", "type": "MEETING"},
            "self": {"state": "JOINED", "person": {"id": "p1"}},
            "controls": {"record": {"recording": true, "paused": false}}
        }"#;

        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.sequence, Some(42));
        assert_eq!(record.base_sequence, Some(41));
        let full_state = record.full_state.unwrap();
        assert_eq!(full_state.state, Some(SessionState::Active));
        assert_eq!(full_state.session_type, Some(SessionType::Meeting));
        assert_eq!(
            record.self_participant.unwrap().state,
            Some(ParticipantState::Joined)
        );
        assert_eq!(
            record.controls.unwrap().record.unwrap().recording,
            Some(true)
        );
    }

    #[test]
    fn test_unknown_state_values_fall_back_to_unknown() {
        let json = r#"{"fullState": {"state": "SOMETHING_NEW", "type": "HOLOGRAM"}}"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        let full_state = record.full_state.unwrap();
        assert_eq!(full_state.state, Some(SessionState::Unknown));
        assert_eq!(full_state.session_type, Some(SessionType::Unknown));
    }
}
