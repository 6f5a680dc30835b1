//! Main-session record cache.
//!
//! While the local user is in a sub-session (breakout), the main session's
//! last known record is kept here so that returning to the main session can
//! start from it instead of an empty mirror. Merging is explicit: every
//! field is replaced wholesale by the incoming side except the participant
//! roster, which is merged by participant id with order preserved.

use roomsync_core::parse::controls::{is_main_session, session_switch_status};
use roomsync_core::record::RawParticipant;
use roomsync_core::{SessionRecord, SessionState};

/// Merges `incoming` on top of `cached`. Fields absent from `incoming` keep
/// their cached value; the roster is merged entry-by-entry.
pub fn merge_records(cached: &SessionRecord, incoming: &SessionRecord) -> SessionRecord {
    let mut merged = cached.clone();

    let incoming = incoming.clone();
    merged.url = incoming.url.or(merged.url);
    merged.sequence = incoming.sequence.or(merged.sequence);
    merged.base_sequence = incoming.base_sequence;
    merged.sync_url = incoming.sync_url.or(merged.sync_url);
    merged.self_participant = incoming.self_participant.or(merged.self_participant);
    merged.host = incoming.host.or(merged.host);
    merged.controls = incoming.controls.or(merged.controls);
    merged.media_shares = incoming.media_shares.or(merged.media_shares);
    merged.full_state = incoming.full_state.or(merged.full_state);
    merged.info = incoming.info.or(merged.info);
    merged.embedded_apps = incoming.embedded_apps.or(merged.embedded_apps);
    merged.created = incoming.created.or(merged.created);
    merged.membership = incoming.membership.or(merged.membership);
    merged.identities = incoming.identities.or(merged.identities);
    merged.replaces = incoming.replaces.or(merged.replaces);
    merged.acl_url = incoming.acl_url.or(merged.acl_url);
    merged.participants_url = incoming.participants_url.or(merged.participants_url);
    merged.conversation_url = incoming.conversation_url.or(merged.conversation_url);
    merged.links = incoming.links.or(merged.links);

    merged.participants = match (merged.participants.take(), incoming.participants) {
        (Some(cached), Some(incoming)) => Some(merge_participants(cached, incoming)),
        (cached, incoming) => incoming.or(cached),
    };

    merged
}

/// Replaces same-id entries in place (order preserved) and appends
/// participants the cache has not seen.
fn merge_participants(
    cached: Vec<RawParticipant>,
    incoming: Vec<RawParticipant>,
) -> Vec<RawParticipant> {
    let mut merged = cached;
    for participant in incoming {
        let position = participant
            .id
            .as_ref()
            .and_then(|id| merged.iter().position(|p| p.id.as_ref() == Some(id)));
        match position {
            Some(index) => merged[index] = participant,
            None => merged.push(participant),
        }
    }
    merged
}

/// The cached main-session record, maintained across sub-session switches.
#[derive(Debug, Default)]
pub struct MainSessionCache {
    cached: Option<SessionRecord>,
}

impl MainSessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self) -> Option<&SessionRecord> {
        self.cached.as_ref()
    }

    /// Folds an applied record into the cache. Only main-session records are
    /// cached; a main session that has ended, or one the local user was
    /// removed from, invalidates the cache instead.
    pub fn update(&mut self, applied: &SessionRecord) {
        if !is_main_session(applied) {
            return;
        }

        let state_live = applied
            .full_state
            .as_ref()
            .and_then(|f| f.state)
            .is_none_or(SessionState::is_live);
        let self_removed = applied
            .self_participant
            .as_ref()
            .and_then(|s| s.removed)
            .unwrap_or(false);

        if !state_live || self_removed {
            if self.cached.take().is_some() {
                tracing::debug!("Main-session cache invalidated");
            }
            return;
        }

        self.cached = Some(match self.cached.take() {
            Some(cached) => merge_records(&cached, applied),
            None => applied.clone(),
        });
    }

    /// Chooses the record the orchestrator should apply. On a return to the
    /// main session the cached record is merged under the incoming one so
    /// the mirror starts from the last known main-session state.
    pub fn record_to_apply(
        &mut self,
        incoming: SessionRecord,
        previous: Option<&SessionRecord>,
    ) -> SessionRecord {
        let switch = session_switch_status(
            previous.and_then(|p| p.controls.as_ref()),
            incoming.controls.as_ref(),
        );
        if switch.is_return_to_main {
            if let Some(cached) = &self.cached {
                tracing::debug!("Returning to main session from cached record");
                return merge_records(cached, &incoming);
            }
        }
        incoming
    }

    pub fn clear(&mut self) {
        self.cached = None;
    }
}
