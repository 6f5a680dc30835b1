//! Parser for the `host` sub-tree.

use super::FieldDiff;
use crate::record::RawHost;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedHost {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostUpdates {
    /// Host identity changed (including gaining or losing a host)
    pub is_new_host: bool,
}

pub fn parse(raw: &RawHost) -> ParsedHost {
    ParsedHost {
        id: raw.id.clone(),
        name: raw.name.clone(),
        email: raw.email.clone(),
    }
}

pub fn diff(old: Option<&RawHost>, new: &RawHost) -> FieldDiff<ParsedHost, HostUpdates> {
    let previous = old.map(parse);
    let current = parse(new);

    let updates = HostUpdates {
        is_new_host: previous.as_ref().map(|p| &p.id) != Some(&current.id),
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

    fn host(id: &str) -> RawHost {
        RawHost {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_host_on_id_change_only() {
        assert!(diff(Some(&host("a")), &host("b")).updates.is_new_host);
        assert!(!diff(Some(&host("a")), &host("a")).updates.is_new_host);
        // first sight counts as a new host
        assert!(diff(None, &host("a")).updates.is_new_host);
    }

    #[test]
    fn test_name_change_alone_is_not_a_new_host() {
        let mut renamed = host("a");
        renamed.name = Some("Someone".into());
        assert!(!diff(Some(&host("a")), &renamed).updates.is_new_host);
    }
}
