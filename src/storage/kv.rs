use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Fixed key for the bounded most-recently-opened file list.
pub const RECENT_FILES_KEY: &str = "recent_files";
/// Fixed key for the persisted execution history.
pub const HISTORY_KEY: &str = "request_history";

/// Plain-JSON key-value store: one `<key>.json` blob per key, rewritten
/// wholesale on every change. Missing or corrupt entries read as absent;
/// write failures are for the caller to log, never to propagate as fatal.
#[derive(Debug, Clone)]
pub struct KvStore {
    root: PathBuf,
}

impl KvStore {
    /// Store rooted in the platform data directory.
    pub fn open_default() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self { root: base.join("kobi") }
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let content = std::fs::read_to_string(self.path_for(key)).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn store<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let content = serde_json::to_string_pretty(value)?;
        std::fs::write(self.path_for(key), content)?;
        Ok(())
    }
}
