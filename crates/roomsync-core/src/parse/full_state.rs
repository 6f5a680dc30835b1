//! Parser for the `fullState` sub-tree (session type and lifecycle state).

use super::FieldDiff;
use crate::record::{RawFullState, SessionState, SessionType};
use serde::{Deserialize, Serialize};

/// Canonical session state snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedFullState {
    pub session_type: SessionType,
    pub state: SessionState,
    pub active: bool,
    pub removed: bool,
    pub count: Option<u32>,
}

/// Named change flags for the full-state sub-tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FullStateUpdates {
    pub type_changed: bool,
    pub state_changed: bool,
    /// State moved to INACTIVE after previously being live
    pub ended: bool,
    /// State moved to TERMINATING while previously active or initializing
    pub terminating: bool,
}

pub fn parse(raw: &RawFullState) -> ParsedFullState {
    ParsedFullState {
        session_type: raw.session_type.unwrap_or_default(),
        state: raw.state.unwrap_or_default(),
        active: raw.active.unwrap_or(false),
        removed: raw.removed.unwrap_or(false),
        count: raw.count,
    }
}

pub fn diff(old: Option<&RawFullState>, new: &RawFullState) -> FieldDiff<ParsedFullState, FullStateUpdates> {
    let previous = old.map(parse);
    let current = parse(new);

    let prev_state = previous.as_ref().map(|p| p.state);
    let prev_type = previous.as_ref().map(|p| p.session_type);

    let updates = FullStateUpdates {
        type_changed: prev_type != Some(current.session_type),
        state_changed: prev_state != Some(current.state),
        ended: current.state == SessionState::Inactive
            && prev_state.is_some_and(SessionState::is_live),
        terminating: current.state == SessionState::Terminating
            && matches!(
                prev_state,
                Some(SessionState::Active) | Some(SessionState::Initializing)
            ),
    };

    FieldDiff {
        previous,
        current,
        updates,
    }
}
