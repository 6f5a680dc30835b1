//! Parser for the `mediaShares` sub-tree (content share and whiteboard
//! floors).

use super::FieldDiff;
use crate::record::{
    FloorDisposition, RawMediaShare, MEDIA_SHARE_CONTENT, MEDIA_SHARE_WHITEBOARD,
};
use serde::{Deserialize, Serialize};

/// Floor state of one shared channel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelFloor {
    pub disposition: Option<FloorDisposition>,
    /// Participant id currently holding the floor
    pub beneficiary_id: Option<String>,
    pub granted: Option<String>,
    pub released: Option<String>,
    pub url: Option<String>,
}

impl ChannelFloor {
    pub fn is_granted(&self) -> bool {
        self.disposition == Some(FloorDisposition::Granted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedMediaShares {
    pub content: Option<ChannelFloor>,
    pub whiteboard: Option<ChannelFloor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaShareUpdates {
    pub content_floor_changed: bool,
    pub whiteboard_floor_changed: bool,
}

fn floor_of(shares: &[RawMediaShare], name: &str) -> Option<ChannelFloor> {
    let share = shares.iter().find(|s| s.name.as_deref() == Some(name))?;
    let floor = share.floor.as_ref();
    Some(ChannelFloor {
        disposition: floor.and_then(|f| f.disposition),
        beneficiary_id: floor
            .and_then(|f| f.beneficiary.as_ref())
            .and_then(|b| b.id.clone()),
        granted: floor.and_then(|f| f.granted.clone()),
        released: floor.and_then(|f| f.released.clone()),
        url: share.url.clone(),
    })
}

pub fn parse(raw: &[RawMediaShare]) -> ParsedMediaShares {
    ParsedMediaShares {
        content: floor_of(raw, MEDIA_SHARE_CONTENT),
        whiteboard: floor_of(raw, MEDIA_SHARE_WHITEBOARD),
    }
}

pub fn diff(
    old: Option<&[RawMediaShare]>,
    new: &[RawMediaShare],
) -> FieldDiff<ParsedMediaShares, MediaShareUpdates> {
    let previous = old.map(parse);
    let current = parse(new);

    let prev = previous.clone().unwrap_or_default();
    let updates = MediaShareUpdates {
        content_floor_changed: prev.content != current.content,
        whiteboard_floor_changed: prev.whiteboard != current.whiteboard,
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
    use crate::record::{RawFloor, RawParticipant};

    fn content_share(disposition: FloorDisposition, beneficiary: &str) -> RawMediaShare {
        RawMediaShare {
            name: Some(MEDIA_SHARE_CONTENT.into()),
            floor: Some(RawFloor {
                disposition: Some(disposition),
                beneficiary: Some(RawParticipant {
                    id: Some(beneficiary.into()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_content_floor_grant_and_handover() {
        let granted = [content_share(FloorDisposition::Granted, "p1")];
        let result = diff(None, &granted);
        assert!(result.updates.content_floor_changed);
        assert!(result.current.content.as_ref().unwrap().is_granted());

        // same holder pushed again: no change
        let result = diff(Some(&granted), &granted);
        assert!(!result.updates.content_floor_changed);

        // handover to another participant
        let handed_over = [content_share(FloorDisposition::Granted, "p2")];
        let result = diff(Some(&granted), &handed_over);
        assert!(result.updates.content_floor_changed);
        assert!(!result.updates.whiteboard_floor_changed);
    }

    #[test]
    fn test_channels_are_tracked_independently() {
        let whiteboard = [RawMediaShare {
            name: Some(MEDIA_SHARE_WHITEBOARD.into()),
            floor: Some(RawFloor {
                disposition: Some(FloorDisposition::Granted),
                ..Default::default()
            }),
            ..Default::default()
        }];
        let result = diff(Some(&[] as &[RawMediaShare]), &whiteboard);
        assert!(result.updates.whiteboard_floor_changed);
        assert!(!result.updates.content_floor_changed);
    }
}
