use serde::{Deserialize, Serialize};

/// Most-recently-opened list never grows past this many entries.
pub const RECENT_CAP: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFile {
    pub name: String,
    pub path: String,
    pub last_opened: String,
}

/// Record `entry` as the most recent file: de-duplicated by path, newest
/// first, capped.
pub fn remember(list: &mut Vec<RecentFile>, entry: RecentFile) {
    list.retain(|r| r.path != entry.path);
    list.insert(0, entry);
    list.truncate(RECENT_CAP);
}
