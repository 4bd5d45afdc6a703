use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// What the core hands to the proxy collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxyRequest {
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Timeout hint in milliseconds, taken from the document settings.
    pub timeout: u64,
}

/// What the proxy collaborator hands back. Every field defaults so a sparse
/// relay payload still deserializes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyResponse {
    #[serde(default)]
    pub status: u16,
    #[serde(default, rename = "statusText")]
    pub status_text: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub cookies: HashMap<String, String>,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub time: u64,
    #[serde(default)]
    pub size: String,
    #[serde(default, rename = "sizeBytes")]
    pub size_bytes: u64,
    #[serde(default, rename = "rawBody")]
    pub raw_body: Option<String>,
}

/// Boundary to the external HTTP relay. Object-safe so the controller holds
/// an `Arc<dyn ProxyDispatch>` and tests can script responses.
pub trait ProxyDispatch: Send + Sync {
    fn dispatch(
        &self,
        request: ProxyRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ProxyResponse, AppError>> + Send + '_>>;
}

/// The default relay: performs the fetch itself with a shared reqwest client
/// and normalizes the result into the proxy wire shape.
pub struct ReqwestRelay {
    client: Client,
}

impl ReqwestRelay {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder().use_rustls_tls().build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl ProxyDispatch for ReqwestRelay {
    fn dispatch(
        &self,
        request: ProxyRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ProxyResponse, AppError>> + Send + '_>> {
        Box::pin(async move {
            let method =
                Method::from_bytes(request.method.as_bytes()).unwrap_or(Method::GET);

            let mut builder = self
                .client
                .request(method.clone(), &request.url)
                .timeout(Duration::from_millis(request.timeout.max(1)));

            for (key, value) in &request.headers {
                builder = builder.header(key, value);
            }

            // GET/HEAD never carry a body, even if one is configured.
            if method != Method::GET && method != Method::HEAD {
                if let Some(body) = request.body {
                    builder = builder.body(body);
                }
            }

            let start = Instant::now();
            let response = builder.send().await?;
            let time = start.elapsed().as_millis() as u64;

            let status = response.status();
            let status_code = status.as_u16();
            let status_text = status.canonical_reason().unwrap_or("Unknown").to_string();

            let headers: HashMap<String, String> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
                .collect();

            let content_type = headers
                .get("content-type")
                .cloned()
                .unwrap_or_default();

            let bytes = response.bytes().await?;
            let size_bytes = bytes.len() as u64;
            let raw_body = String::from_utf8_lossy(&bytes).into_owned();

            let data = if content_type.contains("application/json") {
                serde_json::from_slice::<serde_json::Value>(&bytes)
                    .unwrap_or_else(|_| serde_json::Value::String(raw_body.clone()))
            } else {
                serde_json::Value::String(raw_body.clone())
            };

            Ok(ProxyResponse {
                status: status_code,
                status_text,
                headers,
                cookies: HashMap::new(),
                data,
                time,
                size: format!("{:.2} KB", size_bytes as f64 / 1024.0),
                size_bytes,
                raw_body: Some(raw_body),
            })
        })
    }
}
