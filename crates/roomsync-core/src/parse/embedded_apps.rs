//! Parser for the `embeddedApps` sub-tree.

use super::FieldDiff;
use crate::record::RawEmbeddedApp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedEmbeddedApp {
    pub url: Option<String>,
    pub app_type: Option<String>,
    pub state: Option<String>,
    pub instance_url: Option<String>,
    pub external_instance_url: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmbeddedAppsUpdates {
    pub apps_changed: bool,
}

pub fn parse(raw: &[RawEmbeddedApp]) -> Vec<ParsedEmbeddedApp> {
    raw.iter()
        .map(|app| {
            let instance = app.instance_info.as_ref();
            ParsedEmbeddedApp {
                url: app.url.clone(),
                app_type: app.app_type.clone(),
                state: app.state.clone(),
                instance_url: instance.and_then(|i| i.app_instance_url.clone()),
                external_instance_url: instance.and_then(|i| i.external_app_instance_url.clone()),
                title: instance.and_then(|i| i.title.clone()),
            }
        })
        .collect()
}

/// Compare two app lists ignoring volatile per-app `state`, so that pushes
/// that only churn app state do not notify.
pub fn are_similar(old: &[ParsedEmbeddedApp], new: &[ParsedEmbeddedApp]) -> bool {
    if old.len() != new.len() {
        return false;
    }
    old.iter().zip(new).all(|(a, b)| {
        a.url == b.url
            && a.app_type == b.app_type
            && a.instance_url == b.instance_url
            && a.external_instance_url == b.external_instance_url
            && a.title == b.title
    })
}

pub fn diff(
    old: Option<&[RawEmbeddedApp]>,
    new: &[RawEmbeddedApp],
) -> FieldDiff<Vec<ParsedEmbeddedApp>, EmbeddedAppsUpdates> {
    let previous = old.map(parse);
    let current = parse(new);

    let updates = EmbeddedAppsUpdates {
        apps_changed: match &previous {
            Some(prev) => !are_similar(prev, &current),
            None => !current.is_empty(),
        },
    };

    FieldDiff {
        previous,
        current,
        updates,
    }
}
