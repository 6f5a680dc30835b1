//! Parser for the `self` sub-tree (the local user's view of the session).
//!
//! This sub-tree drives the widest event fan-out: admission, server-side
//! mutes, unmute requests, roles, layout, breakout and interpretation
//! assignments, and device media status all live here. Every rule is named
//! and computed against the previously parsed snapshot.

use super::FieldDiff;
use crate::record::{
    IntentKind, ParticipantState, RawBreakoutAssignment, RawInterpretationAssignment, RawSelf,
    TransitionReason, DEVICE_TYPE_PROVISIONAL,
};
use serde::{Deserialize, Serialize};

/// Media status strings for the local user, one per channel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MediaStatus {
    pub audio: Option<String>,
    pub video: Option<String>,
    pub share: Option<String>,
}

/// Canonical snapshot of the local user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedSelf {
    pub id: Option<String>,
    /// Person identity (stable across devices), distinct from the
    /// per-session participant id
    pub identity: Option<String>,
    pub url: Option<String>,
    pub state: ParticipantState,
    pub reason: Option<TransitionReason>,
    pub removed: bool,
    pub guest: bool,
    pub moderator: Option<bool>,
    pub creator: Option<bool>,
    pub joined: bool,
    /// Guest waiting for admission (idle with a wait intent)
    pub in_lobby: bool,
    pub remote_muted: Option<bool>,
    pub unmute_allowed: bool,
    pub local_audio_unmute_requested: bool,
    pub local_audio_unmute_required: bool,
    pub remote_video_muted: Option<bool>,
    pub last_modified: Option<String>,
    pub modified_by: Option<String>,
    pub layout: Option<String>,
    pub roles: Vec<String>,
    pub breakout: Option<RawBreakoutAssignment>,
    pub interpretation: Option<RawInterpretationAssignment>,
    pub can_not_view_the_participant_list: bool,
    pub is_sharing_blocked: bool,
    /// Some device of the local user is observing (paired, media elsewhere)
    pub observing: bool,
    /// Dial-in devices attached to the local user
    pub pstn_device_urls: Vec<String>,
    pub media_status: MediaStatus,
}

/// Named change flags for the self sub-tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelfUpdates {
    /// Entered the lobby as an unadmitted guest
    pub is_unadmitted: bool,
    /// Admitted from the lobby into the session
    pub is_admitted: bool,
    pub moderator_changed: bool,
    pub roles_changed: bool,
    pub muted_by_others_changed: bool,
    pub video_muted_by_others_changed: bool,
    /// Server requires a local unmute before audio flows again
    pub local_unmute_required: bool,
    /// Server asks (does not force) the client to unmute
    pub local_unmute_requested: bool,
    pub layout_changed: bool,
    pub breakouts_changed: bool,
    pub interpretation_changed: bool,
    /// Server released this user's media for inactivity
    pub media_inactive_or_released: bool,
    pub observing_changed: bool,
    pub media_status_changed: bool,
    pub can_not_view_participant_list_changed: bool,
    pub is_sharing_blocked_changed: bool,
    pub state_changed: bool,
}

pub fn parse(raw: &RawSelf) -> ParsedSelf {
    let state = raw.state.unwrap_or_default();
    let controls = raw.controls.as_ref();
    let audio = controls.and_then(|c| c.audio.as_ref());
    let video = controls.and_then(|c| c.video.as_ref());
    let meta = audio.and_then(|a| a.meta.as_ref());

    let devices = raw.devices.as_deref().unwrap_or(&[]);
    let has_wait_intent = devices.iter().any(|d| {
        d.intent
            .as_ref()
            .and_then(|i| i.kind)
            .is_some_and(|k| k == IntentKind::Wait)
    });
    let observing = devices.iter().any(|d| {
        d.intent
            .as_ref()
            .and_then(|i| i.kind)
            .is_some_and(|k| k == IntentKind::Observe)
    });
    let pstn_device_urls = devices
        .iter()
        .filter(|d| d.device_type.as_deref() == Some(DEVICE_TYPE_PROVISIONAL))
        .filter_map(|d| d.url.clone())
        .collect();

    let status = raw.status.as_ref();

    ParsedSelf {
        id: raw.id.clone(),
        identity: raw.person.as_ref().and_then(|p| p.id.clone()),
        url: raw.url.clone(),
        state,
        reason: raw.reason,
        removed: raw.removed.unwrap_or(false),
        guest: raw.guest.unwrap_or(false),
        moderator: raw.moderator,
        creator: raw.is_creator,
        joined: state == ParticipantState::Joined,
        in_lobby: state == ParticipantState::Idle && has_wait_intent,
        remote_muted: audio.and_then(|a| a.muted),
        unmute_allowed: !audio.and_then(|a| a.disallow_unmute).unwrap_or(false),
        local_audio_unmute_requested: audio.and_then(|a| a.requested_to_unmute).unwrap_or(false),
        local_audio_unmute_required: audio
            .and_then(|a| a.local_audio_unmute_required)
            .unwrap_or(false),
        remote_video_muted: video.and_then(|v| v.muted),
        last_modified: meta.and_then(|m| m.last_modified.clone()),
        modified_by: meta.and_then(|m| m.modified_by.clone()),
        layout: controls
            .and_then(|c| c.layouts.as_ref())
            .and_then(|l| l.first())
            .and_then(|l| l.layout_type.clone()),
        roles: controls
            .and_then(|c| c.role.as_ref())
            .and_then(|r| r.roles.as_ref())
            .map(|roles| {
                roles
                    .iter()
                    .filter(|r| r.has_role.unwrap_or(false))
                    .filter_map(|r| r.role_type.clone())
                    .collect()
            })
            .unwrap_or_default(),
        breakout: controls.and_then(|c| c.breakout_session.clone()),
        interpretation: controls.and_then(|c| c.interpretation.clone()),
        can_not_view_the_participant_list: raw
            .can_not_view_the_participant_list
            .unwrap_or(false),
        is_sharing_blocked: raw.is_sharing_blocked.unwrap_or(false),
        observing,
        pstn_device_urls,
        media_status: MediaStatus {
            audio: status.and_then(|s| s.audio_status.clone()),
            video: status.and_then(|s| s.video_status.clone()),
            share: status.and_then(|s| s.video_slides_status.clone()),
        },
    }
}

/// Remote audio mute rule. On first sight only an actual mute fires (a
/// join-time "you are unmuted" must stay silent); afterwards a flip of the
/// muted flag fires, and so does an unmute-permission change while muted.
fn muted_by_others_changed(old: Option<&ParsedSelf>, new: &ParsedSelf) -> bool {
    match old {
        None => new.remote_muted == Some(true),
        Some(old) => {
            old.remote_muted != new.remote_muted
                || (new.remote_muted == Some(true) && old.unmute_allowed != new.unmute_allowed)
        }
    }
}

fn video_muted_by_others_changed(old: Option<&ParsedSelf>, new: &ParsedSelf) -> bool {
    match old {
        None => new.remote_video_muted == Some(true),
        Some(old) => old.remote_video_muted != new.remote_video_muted,
    }
}

fn media_inactive_or_released(old: Option<&ParsedSelf>, new: &ParsedSelf) -> bool {
    let was_joined = old.is_some_and(|o| o.joined);
    was_joined
        && new.state == ParticipantState::Left
        && matches!(
            new.reason,
            Some(TransitionReason::Inactive) | Some(TransitionReason::MediaReleased)
        )
}

pub fn diff(old: Option<&RawSelf>, new: &RawSelf) -> FieldDiff<ParsedSelf, SelfUpdates> {
    let previous = old.map(parse);
    let current = parse(new);
    let prev = previous.as_ref();

    let was_in_lobby = prev.is_some_and(|p| p.in_lobby);
    let was_required = prev.is_some_and(|p| p.local_audio_unmute_required);
    let was_requested = prev.is_some_and(|p| p.local_audio_unmute_requested);

    let updates = SelfUpdates {
        is_unadmitted: current.in_lobby && !was_in_lobby,
        is_admitted: was_in_lobby && current.joined,
        moderator_changed: prev.map(|p| p.moderator) != Some(current.moderator),
        roles_changed: prev.map(|p| &p.roles) != Some(&current.roles),
        muted_by_others_changed: muted_by_others_changed(prev, &current),
        video_muted_by_others_changed: video_muted_by_others_changed(prev, &current),
        local_unmute_required: current.local_audio_unmute_required
            && !was_required
            && current.remote_muted != Some(true),
        local_unmute_requested: current.local_audio_unmute_requested && !was_requested,
        layout_changed: current.layout.is_some()
            && prev.map(|p| &p.layout) != Some(&current.layout),
        breakouts_changed: prev.map(|p| &p.breakout) != Some(&current.breakout),
        interpretation_changed: prev.map(|p| &p.interpretation) != Some(&current.interpretation),
        media_inactive_or_released: media_inactive_or_released(prev, &current),
        observing_changed: prev.map(|p| p.observing) != Some(current.observing),
        media_status_changed: prev.map(|p| &p.media_status) != Some(&current.media_status),
        can_not_view_participant_list_changed: prev
            .map(|p| p.can_not_view_the_participant_list)
            != Some(current.can_not_view_the_participant_list),
        is_sharing_blocked_changed: prev.map(|p| p.is_sharing_blocked)
            != Some(current.is_sharing_blocked),
        state_changed: prev.map(|p| p.state) != Some(current.state),
    };

    FieldDiff {
        previous,
        current,
        updates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RawAudioControl, RawDevice, RawIntent, RawSelfControls};

    fn joined_self() -> RawSelf {
        RawSelf {
            state: Some(ParticipantState::Joined),
            ..Default::default()
        }
    }

    fn with_audio(audio: RawAudioControl) -> RawSelf {
        RawSelf {
            state: Some(ParticipantState::Joined),
            controls: Some(RawSelfControls {
                audio: Some(audio),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn lobby_self() -> RawSelf {
        RawSelf {
            state: Some(ParticipantState::Idle),
            guest: Some(true),
            devices: Some(vec![RawDevice {
                intent: Some(RawIntent {
                    kind: Some(IntentKind::Wait),
                }),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn test_admission_flow_from_lobby_to_joined() {
        let lobby = lobby_self();
        let result = diff(None, &lobby);
        assert!(result.updates.is_unadmitted);
        assert!(!result.updates.is_admitted);

        let mut joined = lobby_self();
        joined.state = Some(ParticipantState::Joined);
        let result = diff(Some(&lobby), &joined);
        assert!(result.updates.is_admitted);
        assert!(!result.updates.is_unadmitted);
    }

    #[test]
    fn test_mute_on_entry_fires_but_join_time_unmute_does_not() {
        let muted = with_audio(RawAudioControl {
            muted: Some(true),
            ..Default::default()
        });
        assert!(diff(None, &muted).updates.muted_by_others_changed);

        let unmuted = with_audio(RawAudioControl {
            muted: Some(false),
            ..Default::default()
        });
        assert!(!diff(None, &unmuted).updates.muted_by_others_changed);
    }

    #[test]
    fn test_unmute_permission_change_only_matters_while_muted() {
        let muted = with_audio(RawAudioControl {
            muted: Some(true),
            disallow_unmute: Some(false),
            ..Default::default()
        });
        let muted_hard = with_audio(RawAudioControl {
            muted: Some(true),
            disallow_unmute: Some(true),
            ..Default::default()
        });
        assert!(diff(Some(&muted), &muted_hard).updates.muted_by_others_changed);

        let unmuted = with_audio(RawAudioControl {
            muted: Some(false),
            disallow_unmute: Some(false),
            ..Default::default()
        });
        let unmuted_hard = with_audio(RawAudioControl {
            muted: Some(false),
            disallow_unmute: Some(true),
            ..Default::default()
        });
        assert!(
            !diff(Some(&unmuted), &unmuted_hard)
                .updates
                .muted_by_others_changed
        );
    }

    #[test]
    fn test_unmute_required_and_requested_are_distinct() {
        let base = joined_self();

        let required = with_audio(RawAudioControl {
            local_audio_unmute_required: Some(true),
            ..Default::default()
        });
        let result = diff(Some(&base), &required);
        assert!(result.updates.local_unmute_required);
        assert!(!result.updates.local_unmute_requested);

        let requested = with_audio(RawAudioControl {
            requested_to_unmute: Some(true),
            ..Default::default()
        });
        let result = diff(Some(&base), &requested);
        assert!(result.updates.local_unmute_requested);
        assert!(!result.updates.local_unmute_required);

        // a remote-muted user cannot be required to unmute locally
        let muted_and_required = with_audio(RawAudioControl {
            muted: Some(true),
            local_audio_unmute_required: Some(true),
            ..Default::default()
        });
        let result = diff(Some(&base), &muted_and_required);
        assert!(!result.updates.local_unmute_required);
    }

    #[test]
    fn test_media_release_requires_joined_to_left_with_reason() {
        let mut left = RawSelf {
            state: Some(ParticipantState::Left),
            reason: Some(TransitionReason::MediaReleased),
            ..Default::default()
        };
        assert!(
            diff(Some(&joined_self()), &left)
                .updates
                .media_inactive_or_released
        );

        left.reason = Some(TransitionReason::Other);
        assert!(
            !diff(Some(&joined_self()), &left)
                .updates
                .media_inactive_or_released
        );
    }

    #[test]
    fn test_roles_keep_only_granted_entries() {
        use crate::record::{RawRole, RawRoleControl};
        let raw = RawSelf {
            controls: Some(RawSelfControls {
                role: Some(RawRoleControl {
                    roles: Some(vec![
                        RawRole {
                            role_type: Some("MODERATOR".into()),
                            has_role: Some(true),
                        },
                        RawRole {
                            role_type: Some("COHOST".into()),
                            has_role: Some(false),
                        },
                    ]),
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(parse(&raw).roles, vec!["MODERATOR".to_string()]);
    }

    #[test]
    fn test_layout_change_needs_a_current_layout() {
        use crate::record::RawLayout;
        let with_layout = |name: &str| RawSelf {
            controls: Some(RawSelfControls {
                layouts: Some(vec![RawLayout {
                    layout_type: Some(name.into()),
                }]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let grid = with_layout("GRID");
        let stack = with_layout("STACK");
        assert!(diff(Some(&grid), &stack).updates.layout_changed);

        // dropping the layout entirely is not a layout change
        assert!(!diff(Some(&grid), &joined_self()).updates.layout_changed);
    }
}
