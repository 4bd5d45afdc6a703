use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Normalized result of one execution, as displayed and recorded in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    pub status: u16,
    pub status_text: String,
    pub time: u64,
    pub size: String,
    pub size_bytes: u64,
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub cookies: HashMap<String, String>,
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_body: Option<String>,
}

impl ResponseData {
    /// Success here means HTTP 2xx. It only picks the console log tone:
    /// an error status is still a completed execution.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Synthetic response for transport-level failures (network, timeout).
    pub fn transport_failure(message: &str, time: u64) -> Self {
        Self {
            status: 0,
            status_text: String::from("Error"),
            time,
            size: String::from("0 B"),
            size_bytes: 0,
            headers: HashMap::new(),
            cookies: HashMap::new(),
            data: json!({ "error": message }),
            raw_body: None,
        }
    }
}
