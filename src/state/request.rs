use serde::{Deserialize, Serialize};

use crate::ident::{new_id, now_iso};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Lenient parse for imported collections. Unknown methods fall back to GET.
    pub fn parse(s: &str) -> HttpMethod {
        match s.to_ascii_uppercase().as_str() {
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            "HEAD" => HttpMethod::Head,
            "OPTIONS" => HttpMethod::Options,
            _ => HttpMethod::Get,
        }
    }
}

/// One row of a headers or query-params table. Rows keep their identity (`id`)
/// so edits address a row even when keys repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub id: String,
    pub key: String,
    pub value: String,
    pub description: String,
    pub enabled: bool,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            key: key.into(),
            value: value.into(),
            description: String::new(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BodyKind {
    #[default]
    None,
    Json,
    FormData,
    Raw,
    Binary,
    Graphql,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RequestBody {
    #[serde(rename = "type")]
    pub kind: BodyKind,
    #[serde(default)]
    pub content: String,
}

impl RequestBody {
    pub fn json(content: impl Into<String>) -> Self {
        Self { kind: BodyKind::Json, content: content.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AuthConfig {
    #[default]
    None,
    Bearer {
        #[serde(default)]
        token: String,
    },
    Basic {
        #[serde(default)]
        username: String,
        #[serde(default)]
        password: String,
    },
    ApiKey {
        #[serde(default, rename = "apiKey")]
        api_key: String,
        #[serde(default, rename = "apiKeyHeader")]
        api_key_header: String,
    },
    /// Token acquisition is out of scope; the variant is carried so documents
    /// round-trip and the executor's match stays exhaustive.
    Oauth2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDef {
    pub id: String,
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    pub headers: Vec<KeyValue>,
    pub params: Vec<KeyValue>,
    pub body: RequestBody,
    pub auth: AuthConfig,
    /// Opaque script text. Stored and round-tripped, never executed here.
    #[serde(default)]
    pub pre_request_script: String,
    #[serde(default)]
    pub test_script: String,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl RequestDef {
    pub fn new(folder_id: Option<String>) -> Self {
        let now = now_iso();
        Self {
            id: new_id(),
            name: String::from("New Request"),
            method: HttpMethod::Get,
            url: String::new(),
            folder_id,
            headers: vec![KeyValue::new("Content-Type", "application/json")],
            params: Vec::new(),
            body: RequestBody::default(),
            auth: AuthConfig::None,
            pre_request_script: String::new(),
            test_script: String::new(),
            is_archived: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Duplication always mints a new id; the original is untouched.
    pub fn duplicated(&self) -> Self {
        let now = now_iso();
        Self {
            id: new_id(),
            name: format!("{} (Copy)", self.name),
            created_at: now.clone(),
            updated_at: now,
            ..self.clone()
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_iso();
    }

    /// Merge a partial update and re-stamp `updated_at`.
    pub fn apply(&mut self, update: RequestUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(method) = update.method {
            self.method = method;
        }
        if let Some(url) = update.url {
            self.url = url;
        }
        if let Some(folder_id) = update.folder_id {
            self.folder_id = folder_id;
        }
        if let Some(headers) = update.headers {
            self.headers = headers;
        }
        if let Some(params) = update.params {
            self.params = params;
        }
        if let Some(body) = update.body {
            self.body = body;
        }
        if let Some(auth) = update.auth {
            self.auth = auth;
        }
        if let Some(script) = update.pre_request_script {
            self.pre_request_script = script;
        }
        if let Some(script) = update.test_script {
            self.test_script = script;
        }
        if let Some(is_archived) = update.is_archived {
            self.is_archived = is_archived;
        }
        self.touch();
    }
}

/// Field-wise patch for [`RequestDef`]. Absent fields are left alone;
/// `folder_id: Some(None)` clears the folder.
#[derive(Debug, Clone, Default)]
pub struct RequestUpdate {
    pub name: Option<String>,
    pub method: Option<HttpMethod>,
    pub url: Option<String>,
    pub folder_id: Option<Option<String>>,
    pub headers: Option<Vec<KeyValue>>,
    pub params: Option<Vec<KeyValue>>,
    pub body: Option<RequestBody>,
    pub auth: Option<AuthConfig>,
    pub pre_request_script: Option<String>,
    pub test_script: Option<String>,
    pub is_archived: Option<bool>,
}

impl RequestUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Default::default() }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self { url: Some(url.into()), ..Default::default() }
    }

    pub fn method(method: HttpMethod) -> Self {
        Self { method: Some(method), ..Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&HttpMethod::Get).unwrap(), "\"GET\"");
        assert_eq!(HttpMethod::parse("delete"), HttpMethod::Delete);
        assert_eq!(HttpMethod::parse("bogus"), HttpMethod::Get);
    }

    #[test]
    fn test_body_kind_tagging() {
        let body = RequestBody { kind: BodyKind::FormData, content: "a=1".into() };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["type"], "form-data");
        assert_eq!(json["content"], "a=1");
    }

    #[test]
    fn test_auth_tagged_union_wire_shape() {
        let auth = AuthConfig::ApiKey {
            api_key: "k".into(),
            api_key_header: "X-Custom".into(),
        };
        let json = serde_json::to_value(&auth).unwrap();
        assert_eq!(json["type"], "api-key");
        assert_eq!(json["apiKey"], "k");
        assert_eq!(json["apiKeyHeader"], "X-Custom");

        let back: AuthConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, auth);
    }

    #[test]
    fn test_duplicated_mints_new_id() {
        let original = RequestDef::new(None);
        let copy = original.duplicated();
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, "New Request (Copy)");
        assert_eq!(copy.method, original.method);
    }

    #[test]
    fn test_apply_merges_and_restamps() {
        let mut request = RequestDef::new(None);
        let before = request.updated_at.clone();
        request.apply(RequestUpdate {
            url: Some("https://api.test/x".into()),
            folder_id: Some(None),
            ..Default::default()
        });
        assert_eq!(request.url, "https://api.test/x");
        assert_eq!(request.folder_id, None);
        assert_eq!(request.name, "New Request");
        assert!(request.updated_at >= before);
    }
}
