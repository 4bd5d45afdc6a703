use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::document::{FolderDef, WorkspaceDocument};
use crate::state::request::{
    AuthConfig, BodyKind, HttpMethod, KeyValue, RequestBody, RequestDef,
};
use crate::storage::document::slug;

pub const POSTMAN_SCHEMA: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

// Wire types for the Postman Collection v2.1 format. Defaults are applied
// liberally so real-world exports with extra or missing fields still parse.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanCollection {
    pub info: PostmanInfo,
    #[serde(default)]
    pub item: Vec<PostmanItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

/// A node with nested `item` is a folder; a node with `request` is a leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanItem {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<PostmanItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<PostmanRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanRequest {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub url: PostmanUrl,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub header: Vec<PostmanHeader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<PostmanBody>,
}

/// Postman writes URLs either as a bare string or as a structured object.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum PostmanUrl {
    #[default]
    Empty,
    Simple(String),
    Structured(PostmanUrlParts),
}

impl PostmanUrl {
    pub fn raw(&self) -> String {
        match self {
            PostmanUrl::Empty => String::new(),
            PostmanUrl::Simple(s) => s.clone(),
            PostmanUrl::Structured(parts) => parts.raw.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PostmanUrlParts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanHeader {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanBody {
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ImportedCollection {
    pub requests: Vec<RequestDef>,
    pub folders: Vec<FolderDef>,
}

/// Import a Postman Collection v2.1. Every imported entity gets a fresh id;
/// folder parentage is threaded through the recursion. Auth is not imported.
pub fn import_collection(raw: &str) -> Result<ImportedCollection, AppError> {
    let collection: PostmanCollection = serde_json::from_str(raw)
        .map_err(|e| AppError::InvalidFormat(e.to_string()))?;

    let mut imported = ImportedCollection::default();
    walk_items(&collection.item, None, &mut imported);
    Ok(imported)
}

fn walk_items(items: &[PostmanItem], parent: Option<&str>, out: &mut ImportedCollection) {
    for item in items {
        if let Some(children) = &item.item {
            let folder = FolderDef::new(&item.name, parent.map(str::to_string));
            let folder_id = folder.id.clone();
            out.folders.push(folder);
            walk_items(children, Some(&folder_id), out);
        } else if let Some(request) = &item.request {
            out.requests
                .push(request_from_postman(&item.name, request, parent));
        }
    }
}

fn request_from_postman(
    name: &str,
    request: &PostmanRequest,
    folder: Option<&str>,
) -> RequestDef {
    let mut def = RequestDef::new(folder.map(str::to_string));
    def.name = name.to_string();
    def.method = HttpMethod::parse(&request.method);
    def.url = request.url.raw();
    def.headers = request
        .header
        .iter()
        .map(|h| {
            let mut pair = KeyValue::new(&h.key, &h.value);
            pair.description = h.description.clone();
            pair.enabled = !h.disabled;
            pair
        })
        .collect();
    def.body = match &request.body {
        Some(body) if body.mode == "raw" => {
            RequestBody::json(body.raw.clone().unwrap_or_default())
        }
        _ => RequestBody::default(),
    };
    def.auth = AuthConfig::None;
    def
}

/// Export as a flat Postman v2.1 collection. Archived requests are skipped
/// and folder structure is not represented — a known asymmetry with import.
pub fn export_collection(doc: &WorkspaceDocument) -> PostmanCollection {
    PostmanCollection {
        info: PostmanInfo {
            name: doc.name.clone(),
            schema: Some(POSTMAN_SCHEMA.to_string()),
        },
        item: doc.visible_requests().map(item_from_request).collect(),
    }
}

pub fn export_collection_json(doc: &WorkspaceDocument) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(&export_collection(doc))?)
}

/// Download name for an exported collection.
pub fn export_file_name(name: &str) -> String {
    format!("{}.postman_collection.json", slug(name))
}

fn item_from_request(request: &RequestDef) -> PostmanItem {
    let body = (request.body.kind != BodyKind::None).then(|| PostmanBody {
        mode: String::from("raw"),
        raw: Some(request.body.content.clone()),
    });

    PostmanItem {
        name: request.name.clone(),
        item: None,
        request: Some(PostmanRequest {
            method: request.method.as_str().to_string(),
            url: PostmanUrl::Structured(PostmanUrlParts {
                raw: Some(request.url.clone()),
                host: vec![request.url.clone()],
            }),
            header: request
                .headers
                .iter()
                .filter(|h| h.enabled)
                .map(|h| PostmanHeader {
                    key: h.key.clone(),
                    value: h.value.clone(),
                    description: h.description.clone(),
                    disabled: false,
                })
                .collect(),
            body,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_folder_with_request() {
        let raw = r#"{
            "info": {"name": "Sample"},
            "item": [{
                "name": "Users",
                "item": [{
                    "name": "List users",
                    "request": {
                        "method": "GET",
                        "url": "https://api.test/users",
                        "header": [
                            {"key": "Accept", "value": "application/json"},
                            {"key": "X-Off", "value": "1", "disabled": true}
                        ]
                    }
                }]
            }]
        }"#;

        let imported = import_collection(raw).unwrap();
        assert_eq!(imported.folders.len(), 1);
        assert_eq!(imported.requests.len(), 1);

        let folder = &imported.folders[0];
        assert_eq!(folder.name, "Users");
        assert_eq!(folder.parent_id, None);

        let request = &imported.requests[0];
        assert_eq!(request.folder_id.as_deref(), Some(folder.id.as_str()));
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "https://api.test/users");
        assert_eq!(request.headers.len(), 2);
        assert!(request.headers[0].enabled);
        assert!(!request.headers[1].enabled);
        assert_eq!(request.auth, AuthConfig::None);
    }

    #[test]
    fn test_import_structured_url_and_raw_body() {
        let raw = r#"{
            "info": {"name": "Sample"},
            "item": [{
                "name": "Create",
                "request": {
                    "method": "POST",
                    "url": {"raw": "https://api.test/users", "host": ["api", "test"]},
                    "body": {"mode": "raw", "raw": "{\"a\":1}"}
                }
            }]
        }"#;

        let imported = import_collection(raw).unwrap();
        let request = &imported.requests[0];
        assert_eq!(request.url, "https://api.test/users");
        assert_eq!(request.body.kind, BodyKind::Json);
        assert_eq!(request.body.content, "{\"a\":1}");
    }

    #[test]
    fn test_import_nested_folders() {
        let raw = r#"{
            "info": {"name": "Sample"},
            "item": [{
                "name": "Outer",
                "item": [{
                    "name": "Inner",
                    "item": [{
                        "name": "Leaf",
                        "request": {"method": "GET", "url": "https://api.test/x"}
                    }]
                }]
            }]
        }"#;

        let imported = import_collection(raw).unwrap();
        assert_eq!(imported.folders.len(), 2);
        let outer = &imported.folders[0];
        let inner = &imported.folders[1];
        assert_eq!(inner.parent_id.as_deref(), Some(outer.id.as_str()));
        assert_eq!(
            imported.requests[0].folder_id.as_deref(),
            Some(inner.id.as_str())
        );
    }

    #[test]
    fn test_malformed_input_is_invalid_format() {
        assert!(matches!(
            import_collection("{nope"),
            Err(AppError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_export_flat_skips_archived_and_folders() {
        let mut doc = WorkspaceDocument::new("My Api");
        doc.folders.push(FolderDef::new("Users", None));
        let mut visible = RequestDef::new(None);
        visible.name = "alive".into();
        visible.url = "https://api.test/x".into();
        let mut hidden = RequestDef::new(None);
        hidden.is_archived = true;
        doc.requests.push(visible);
        doc.requests.push(hidden);

        let collection = export_collection(&doc);
        assert_eq!(collection.info.schema.as_deref(), Some(POSTMAN_SCHEMA));
        assert_eq!(collection.item.len(), 1);
        let item = &collection.item[0];
        assert_eq!(item.name, "alive");
        assert!(item.item.is_none());
        let request = item.request.as_ref().unwrap();
        assert_eq!(request.url.raw(), "https://api.test/x");
        // Default new-request body is none; export omits it entirely.
        let json = serde_json::to_value(&collection).unwrap();
        assert!(json["item"][0]["request"].get("body").is_none());
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name("My API Collection"),
            "my-api-collection.postman_collection.json"
        );
    }
}
