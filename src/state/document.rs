use serde::{Deserialize, Serialize};

use crate::ident::{new_id, now_iso};
use crate::state::environment::EnvironmentDef;
use crate::state::request::RequestDef;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSettings {
    #[serde(rename = "timeout")]
    pub timeout_ms: u64,
    #[serde(rename = "followRedirects")]
    pub follow_redirects: bool,
    #[serde(rename = "validateSSL")]
    pub validate_ssl: bool,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            follow_redirects: true,
            validate_ssl: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderDef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub collapsed: bool,
}

impl FolderDef {
    pub fn new(name: impl Into<String>, parent_id: Option<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            parent_id,
            collapsed: false,
        }
    }

    pub fn apply(&mut self, update: FolderUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(parent_id) = update.parent_id {
            self.parent_id = parent_id;
        }
        if let Some(collapsed) = update.collapsed {
            self.collapsed = collapsed;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FolderUpdate {
    pub name: Option<String>,
    pub parent_id: Option<Option<String>>,
    pub collapsed: Option<bool>,
}

/// The saved unit: everything a `*.kobi.json` file holds.
///
/// `requests` and `environments` carry no serde default on purpose — a file
/// without those arrays is not a workspace document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceDocument {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    pub requests: Vec<RequestDef>,
    #[serde(default)]
    pub folders: Vec<FolderDef>,
    pub environments: Vec<EnvironmentDef>,
    #[serde(default)]
    pub active_environment_id: Option<String>,
    #[serde(default)]
    pub settings: WorkspaceSettings,
    pub created_at: String,
    pub updated_at: String,
}

impl WorkspaceDocument {
    /// Fresh document: one default environment, empty requests and folders.
    pub fn new(name: impl Into<String>) -> Self {
        let default_env = EnvironmentDef::default_environment();
        let active_environment_id = Some(default_env.id.clone());
        let now = now_iso();
        Self {
            id: new_id(),
            name: name.into(),
            version: String::from("1.0.0"),
            description: String::new(),
            requests: Vec::new(),
            folders: Vec::new(),
            environments: vec![default_env],
            active_environment_id,
            settings: WorkspaceSettings::default(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_iso();
    }

    pub fn request(&self, id: &str) -> Option<&RequestDef> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn request_mut(&mut self, id: &str) -> Option<&mut RequestDef> {
        self.requests.iter_mut().find(|r| r.id == id)
    }

    pub fn folder(&self, id: &str) -> Option<&FolderDef> {
        self.folders.iter().find(|f| f.id == id)
    }

    pub fn folder_mut(&mut self, id: &str) -> Option<&mut FolderDef> {
        self.folders.iter_mut().find(|f| f.id == id)
    }

    pub fn environment(&self, id: &str) -> Option<&EnvironmentDef> {
        self.environments.iter().find(|e| e.id == id)
    }

    pub fn environment_mut(&mut self, id: &str) -> Option<&mut EnvironmentDef> {
        self.environments.iter_mut().find(|e| e.id == id)
    }

    pub fn active_environment(&self) -> Option<&EnvironmentDef> {
        self.active_environment_id
            .as_deref()
            .and_then(|id| self.environment(id))
    }

    /// The default visible view: archived requests are excluded, order kept.
    pub fn visible_requests(&self) -> impl Iterator<Item = &RequestDef> {
        self.requests.iter().filter(|r| !r.is_archived)
    }

    pub fn archived_requests(&self) -> impl Iterator<Item = &RequestDef> {
        self.requests.iter().filter(|r| r.is_archived)
    }
}
