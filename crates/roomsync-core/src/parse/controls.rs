//! Parser for the session-wide `controls` sub-tree.

use super::FieldDiff;
use crate::record::{
    BREAKOUT_SESSION_TYPE_MAIN, BreakoutControl, InterpretationControl, RawControls,
    SessionRecord,
};
use serde::{Deserialize, Serialize};

/// Canonical recording state, resolved from the recording/paused flag pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    Recording,
    Paused,
    Resumed,
    Idle,
}

/// Canonical view of the recording control.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordingInfo {
    pub recording: bool,
    pub paused: bool,
    pub last_modified: Option<String>,
    pub modified_by: Option<String>,
}

/// Canonical view of the transcription control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TranscribeState {
    pub transcribing: bool,
    pub caption: bool,
}

/// Canonical view of the reactions control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReactionsState {
    pub enabled: bool,
    pub show_display_names: bool,
}

/// Canonical view of the entry/exit tone control.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryExitToneState {
    pub enabled: bool,
    pub mode: Option<String>,
}

/// Canonical controls shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedControls {
    pub recording: RecordingInfo,
    pub meeting_container_url: Option<String>,
    pub transcribe: TranscribeState,
    pub manual_caption_enabled: bool,
    pub entry_exit_tone: EntryExitToneState,
    pub mute_on_entry: bool,
    pub share_control_mode: Option<String>,
    pub disallow_unmute: bool,
    pub reactions: ReactionsState,
    pub view_participant_list: bool,
    pub raise_hand: bool,
    pub video_enabled: Option<bool>,
    pub breakout: Option<BreakoutControl>,
    pub interpretation: Option<InterpretationControl>,
}

/// Named change flags for the controls sub-tree, one per comparison rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlsUpdates {
    pub has_recording_changed: bool,
    /// Pause toggles are distinguished from recording on/off; a pause flag is
    /// only meaningful while a recording is active
    pub has_recording_paused_changed: bool,
    pub has_meeting_container_changed: bool,
    pub has_transcribe_changed: bool,
    pub has_manual_caption_changed: bool,
    pub has_entry_exit_tone_changed: bool,
    pub has_mute_on_entry_changed: bool,
    pub has_share_control_changed: bool,
    pub has_disallow_unmute_changed: bool,
    pub has_reactions_changed: bool,
    pub has_reaction_display_names_changed: bool,
    pub has_view_participant_list_changed: bool,
    pub has_raise_hand_changed: bool,
    pub has_video_changed: bool,
    pub has_video_enabled_changed: bool,
    pub has_breakout_changed: bool,
    pub has_interpretation_changed: bool,
}

/// Normalizes the raw controls sub-tree. Total over well-formed input;
/// absent knobs map to their defaults.
pub fn parse(raw: &RawControls) -> ParsedControls {
    let enabled = |t: &Option<crate::record::ToggleControl>| {
        t.as_ref().and_then(|t| t.enabled).unwrap_or(false)
    };

    ParsedControls {
        recording: raw
            .record
            .as_ref()
            .map(|r| RecordingInfo {
                recording: r.recording.unwrap_or(false),
                paused: r.paused.unwrap_or(false),
                last_modified: r.meta.as_ref().and_then(|m| m.last_modified.clone()),
                modified_by: r.meta.as_ref().and_then(|m| m.modified_by.clone()),
            })
            .unwrap_or_default(),
        meeting_container_url: raw
            .meeting_container
            .as_ref()
            .and_then(|c| c.meeting_container_url.clone()),
        transcribe: raw
            .transcribe
            .as_ref()
            .map(|t| TranscribeState {
                transcribing: t.transcribing.unwrap_or(false),
                caption: t.caption.unwrap_or(false),
            })
            .unwrap_or_default(),
        manual_caption_enabled: enabled(&raw.manual_caption_control),
        entry_exit_tone: raw
            .entry_exit_tone
            .as_ref()
            .map(|t| EntryExitToneState {
                enabled: t.enabled.unwrap_or(false),
                mode: t.mode.clone(),
            })
            .unwrap_or_default(),
        mute_on_entry: enabled(&raw.mute_on_entry),
        share_control_mode: raw.share_control.as_ref().and_then(|s| s.control.clone()),
        disallow_unmute: enabled(&raw.disallow_unmute),
        reactions: raw
            .reactions
            .as_ref()
            .map(|r| ReactionsState {
                enabled: r.enabled.unwrap_or(false),
                show_display_names: r.show_display_name_with_reactions.unwrap_or(false),
            })
            .unwrap_or_default(),
        view_participant_list: enabled(&raw.view_the_participant_list),
        raise_hand: enabled(&raw.raise_hand),
        video_enabled: raw.video.as_ref().and_then(|v| v.enabled),
        breakout: raw.breakout.clone(),
        interpretation: raw.interpretation.clone(),
    }
}

/// Diffs two raw controls sub-trees via the named comparison rules.
pub fn diff(old: Option<&RawControls>, new: &RawControls) -> FieldDiff<ParsedControls, ControlsUpdates> {
    let previous = old.map(parse);
    let current = parse(new);
    let prev = previous.clone().unwrap_or_default();

    let updates = ControlsUpdates {
        has_recording_changed: prev.recording.recording != current.recording.recording,
        has_recording_paused_changed: prev.recording.paused != current.recording.paused,
        has_meeting_container_changed: prev.meeting_container_url
            != current.meeting_container_url,
        has_transcribe_changed: prev.transcribe != current.transcribe,
        has_manual_caption_changed: prev.manual_caption_enabled
            != current.manual_caption_enabled,
        has_entry_exit_tone_changed: prev.entry_exit_tone != current.entry_exit_tone,
        has_mute_on_entry_changed: prev.mute_on_entry != current.mute_on_entry,
        has_share_control_changed: prev.share_control_mode != current.share_control_mode,
        has_disallow_unmute_changed: prev.disallow_unmute != current.disallow_unmute,
        has_reactions_changed: prev.reactions.enabled != current.reactions.enabled,
        has_reaction_display_names_changed: prev.reactions.show_display_names
            != current.reactions.show_display_names,
        has_view_participant_list_changed: prev.view_participant_list
            != current.view_participant_list,
        has_raise_hand_changed: prev.raise_hand != current.raise_hand,
        has_video_changed: prev.video_enabled.unwrap_or(false)
            != current.video_enabled.unwrap_or(false),
        has_video_enabled_changed: prev.video_enabled != current.video_enabled,
        has_breakout_changed: prev.breakout != current.breakout,
        has_interpretation_changed: prev.interpretation != current.interpretation,
    };

    FieldDiff {
        previous,
        current,
        updates,
    }
}

/// Resolves the canonical [`RecordingState`] for a recording change.
///
/// A pause toggle while the recording is inactive still resolves to `Idle`;
/// `Resumed` requires an active recording.
pub fn resolve_recording_state(
    updates: &ControlsUpdates,
    current: &ParsedControls,
) -> Option<RecordingState> {
    if updates.has_recording_paused_changed {
        if current.recording.paused {
            Some(RecordingState::Paused)
        } else if current.recording.recording {
            Some(RecordingState::Resumed)
        } else {
            Some(RecordingState::Idle)
        }
    } else if updates.has_recording_changed {
        if current.recording.recording {
            Some(RecordingState::Recording)
        } else {
            Some(RecordingState::Idle)
        }
    } else {
        None
    }
}

/// Whether a record belongs to the main session (no breakout control, or a
/// breakout control explicitly marked MAIN).
pub fn is_main_session(record: &SessionRecord) -> bool {
    match record.controls.as_ref().and_then(|c| c.breakout.as_ref()) {
        Some(breakout) => {
            breakout.session_type.as_deref() == Some(BREAKOUT_SESSION_TYPE_MAIN)
                || breakout.session_type.is_none()
        }
        None => true,
    }
}

fn controls_are_main(controls: Option<&RawControls>) -> bool {
    match controls.and_then(|c| c.breakout.as_ref()) {
        Some(breakout) => {
            breakout.session_type.as_deref() == Some(BREAKOUT_SESSION_TYPE_MAIN)
                || breakout.session_type.is_none()
        }
        None => true,
    }
}

/// Direction of a session switch between the main session and a sub-session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSwitchStatus {
    pub is_return_to_main: bool,
    pub is_enter_breakout: bool,
}

/// Compares the breakout identity of two controls sub-trees to detect a
/// switch into or out of a sub-session.
pub fn session_switch_status(
    old: Option<&RawControls>,
    new: Option<&RawControls>,
) -> SessionSwitchStatus {
    let old_main = controls_are_main(old);
    let new_main = controls_are_main(new);

    SessionSwitchStatus {
        is_return_to_main: !old_main && new_main,
        is_enter_breakout: old_main && !new_main,
    }
}

/// Whether the participant roster must be replaced wholesale because the
/// session identity pair (breakout group, breakout session) changed.
pub fn needs_member_refresh(old: Option<&RawControls>, new: Option<&RawControls>) -> bool {
    let identity = |controls: Option<&RawControls>| {
        controls
            .and_then(|c| c.breakout.as_ref())
            .map(|b| (b.group_id.clone(), b.session_id.clone()))
    };

    // a delta may simply omit the breakout control; only a present-on-both
    // identity change forces a roster replace
    match (identity(old), identity(new)) {
        (Some(old_identity), Some(new_identity)) => old_identity != new_identity,
        _ => false,
    }
}
