//! Parser for the `info` sub-tree (session metadata and display hints).

use super::FieldDiff;
use crate::record::{RawInfo, HINT_LOCK_STATUS_LOCKED, HINT_LOCK_STATUS_UNLOCKED};
use serde::{Deserialize, Serialize};

/// Canonical session info snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedInfo {
    pub web_ex_id: Option<String>,
    pub sip_uri: Option<String>,
    pub owner: Option<String>,
    pub conversation_url: Option<String>,
    pub locked: bool,
    /// Joined and moderator display hints, merged in arrival order
    pub display_hints: Vec<String>,
}

/// Named change flags for the info sub-tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InfoUpdates {
    pub changed: bool,
    /// Lock transitioned from unlocked to locked (edge, fires once)
    pub locked: bool,
    /// Lock transitioned from locked to unlocked (edge, fires once)
    pub unlocked: bool,
}

pub fn parse(raw: &RawInfo) -> ParsedInfo {
    let mut display_hints = Vec::new();
    if let Some(hints) = &raw.display_hints {
        if let Some(joined) = &hints.joined {
            display_hints.extend(joined.iter().cloned());
        }
        if let Some(moderator) = &hints.moderator {
            display_hints.extend(moderator.iter().cloned());
        }
    }

    // the hint pair is authoritative when present; the raw boolean is the
    // fallback for services that do not emit lock hints
    let locked = if display_hints.iter().any(|h| h == HINT_LOCK_STATUS_LOCKED) {
        true
    } else if display_hints.iter().any(|h| h == HINT_LOCK_STATUS_UNLOCKED) {
        false
    } else {
        raw.locked.unwrap_or(false)
    };

    ParsedInfo {
        web_ex_id: raw.web_ex_id.clone(),
        sip_uri: raw.sip_uri.clone(),
        owner: raw.owner.clone(),
        conversation_url: raw.conversation_url.clone(),
        locked,
        display_hints,
    }
}

pub fn diff(old: Option<&RawInfo>, new: &RawInfo) -> FieldDiff<ParsedInfo, InfoUpdates> {
    let previous = old.map(parse);
    let current = parse(new);

    let was_locked = previous.as_ref().is_some_and(|p| p.locked);

    let updates = InfoUpdates {
        changed: previous.as_ref() != Some(&current),
        locked: current.locked && !was_locked,
        unlocked: !current.locked && was_locked,
    };

    FieldDiff {
        previous,
        current,
        updates,
    }
}
