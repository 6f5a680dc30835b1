//! Roster delta computation and 1:1 partner lookup.

use crate::record::{RawParticipant, RawSelf, PARTICIPANT_TYPE_USER};
use serde::{Deserialize, Serialize};

/// Per-participant change computed between two roster snapshots.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeltaParticipant {
    pub participant: RawParticipant,
    pub is_added: bool,
    pub state_changed: bool,
    pub audio_status_changed: bool,
    pub video_status_changed: bool,
    pub share_status_changed: bool,
    pub is_removed: bool,
}

impl DeltaParticipant {
    pub fn has_changes(&self) -> bool {
        self.is_added
            || self.state_changed
            || self.audio_status_changed
            || self.video_status_changed
            || self.share_status_changed
            || self.is_removed
    }
}

/// Compute the per-participant deltas between the previous roster and the
/// incoming one. Participants present only in the old roster do not appear;
/// removal is signalled by the server through the `removed` flag instead.
pub fn compute_participant_deltas(
    old: Option<&[RawParticipant]>,
    new: &[RawParticipant],
) -> Vec<DeltaParticipant> {
    let old = old.unwrap_or(&[]);
    new.iter()
        .map(|incoming| {
            let previous = incoming
                .id
                .as_ref()
                .and_then(|id| old.iter().find(|p| p.id.as_ref() == Some(id)));

            let status = |p: &RawParticipant| p.status.clone().unwrap_or_default();
            let (prev_status, prev_state, prev_removed) = match previous {
                Some(p) => (Some(status(p)), p.state, p.removed.unwrap_or(false)),
                None => (None, None, false),
            };
            let current_status = status(incoming);
            let removed = incoming.removed.unwrap_or(false);

            DeltaParticipant {
                is_added: previous.is_none(),
                state_changed: previous.is_some() && prev_state != incoming.state,
                audio_status_changed: prev_status
                    .as_ref()
                    .is_none_or(|s| s.audio_status != current_status.audio_status),
                video_status_changed: prev_status
                    .as_ref()
                    .is_none_or(|s| s.video_status != current_status.video_status),
                share_status_changed: prev_status
                    .as_ref()
                    .is_none_or(|s| s.video_slides_status != current_status.video_slides_status),
                is_removed: removed && !prev_removed,
                participant: incoming.clone(),
            }
        })
        .collect()
}

/// The remote party of a 1:1 call: the first user participant that is not
/// the local user.
pub fn find_partner<'a>(
    participants: &'a [RawParticipant],
    self_participant: Option<&RawSelf>,
) -> Option<&'a RawParticipant> {
    let self_identity = self_participant
        .and_then(|s| s.person.as_ref())
        .and_then(|p| p.id.as_deref());
    participants.iter().find(|p| {
        p.participant_type.as_deref() == Some(PARTICIPANT_TYPE_USER)
            && p.person.as_ref().and_then(|person| person.id.as_deref()) != self_identity
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ParticipantState, RawParticipantStatus, RawPerson};

    fn participant(id: &str, state: ParticipantState) -> RawParticipant {
        RawParticipant {
            id: Some(id.into()),
            participant_type: Some(PARTICIPANT_TYPE_USER.into()),
            person: Some(RawPerson {
                id: Some(format!("person-{id}")),
                ..Default::default()
            }),
            state: Some(state),
            ..Default::default()
        }
    }

    #[test]
    fn test_roster_deltas_distinguish_added_and_changed() {
        let old = [participant("a", ParticipantState::Joined)];
        let new = [
            participant("a", ParticipantState::Left),
            participant("b", ParticipantState::Joined),
        ];

        let deltas = compute_participant_deltas(Some(&old), &new);
        assert_eq!(deltas.len(), 2);
        assert!(!deltas[0].is_added);
        assert!(deltas[0].state_changed);
        assert!(deltas[1].is_added);
        assert!(!deltas[1].state_changed);
    }

    #[test]
    fn test_audio_status_change_is_per_participant() {
        let mut old = participant("a", ParticipantState::Joined);
        old.status = Some(RawParticipantStatus {
            audio_status: Some("SENDRECV".into()),
            ..Default::default()
        });
        let mut new = old.clone();
        new.status = Some(RawParticipantStatus {
            audio_status: Some("RECVONLY".into()),
            ..Default::default()
        });

        let deltas = compute_participant_deltas(Some(std::slice::from_ref(&old)), &[new]);
        assert!(deltas[0].audio_status_changed);
        assert!(!deltas[0].video_status_changed);
        assert!(!deltas[0].state_changed);
    }

    #[test]
    fn test_partner_skips_the_local_user() {
        let roster = [
            participant("me", ParticipantState::Joined),
            participant("them", ParticipantState::Joined),
        ];
        let local = RawSelf {
            person: Some(RawPerson {
                id: Some("person-me".into()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let partner = find_partner(&roster, Some(&local)).unwrap();
        assert_eq!(partner.id.as_deref(), Some("them"));
        assert_eq!(partner.state, Some(ParticipantState::Joined));
    }
}
