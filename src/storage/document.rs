use std::path::Path;

use crate::error::AppError;
use crate::state::document::WorkspaceDocument;

/// Parse the native `*.kobi.json` format. A document must at least carry
/// array-typed `requests` and `environments`; anything else is
/// `InvalidFormat`, and the caller's in-memory state stays untouched.
pub fn parse_document(raw: &str) -> Result<WorkspaceDocument, AppError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| AppError::InvalidFormat(format!("not valid JSON: {e}")))?;

    let has_shape = value.get("requests").is_some_and(serde_json::Value::is_array)
        && value.get("environments").is_some_and(serde_json::Value::is_array);
    if !has_shape {
        return Err(AppError::InvalidFormat(
            "missing requests/environments arrays".into(),
        ));
    }

    serde_json::from_value(value).map_err(|e| AppError::InvalidFormat(e.to_string()))
}

/// Serialize for saving: pretty-printed JSON. Stamping `updatedAt` is the
/// caller's job so serialization itself stays pure.
pub fn serialize_document(doc: &WorkspaceDocument) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Download name for a saved document: lowercased, whitespace collapsed to
/// dashes, `.kobi.json` suffix.
pub fn suggested_file_name(name: &str) -> String {
    format!("{}.kobi.json", slug(name))
}

pub(crate) fn slug(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

/// Async file read for open/import; the caller only touches workspace state
/// once the read resolves, so no lock is held across it.
pub async fn read_document_file(path: &Path) -> Result<String, AppError> {
    Ok(tokio::fs::read_to_string(path).await?)
}
