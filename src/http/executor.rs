use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use url::form_urlencoded;

use crate::env::resolver::VariableResolver;
use crate::error::AppError;
use crate::event::Event;
use crate::http::proxy::{ProxyDispatch, ProxyRequest, ProxyResponse};
use crate::state::request::{AuthConfig, BodyKind, RequestDef};
use crate::state::response::ResponseData;

/// Header used for api-key auth when the request does not name one.
const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";

/// Pure effective-request construction: resolved URL plus encoded enabled
/// params, enabled headers with resolved values, auth-derived headers, and
/// the resolved body when one is configured.
pub fn build_effective_request(
    request: &RequestDef,
    resolver: &VariableResolver,
    timeout_ms: u64,
) -> ProxyRequest {
    let mut url = resolver.resolve(&request.url);

    let enabled_params: Vec<_> = request
        .params
        .iter()
        .filter(|p| p.enabled && !p.key.is_empty())
        .collect();
    if !enabled_params.is_empty() {
        let mut query = form_urlencoded::Serializer::new(String::new());
        for param in &enabled_params {
            query.append_pair(&param.key, &resolver.resolve(&param.value));
        }
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&query.finish());
    }

    let mut headers = HashMap::new();
    for header in request.headers.iter().filter(|h| h.enabled && !h.key.is_empty()) {
        headers.insert(header.key.clone(), resolver.resolve(&header.value));
    }

    match &request.auth {
        AuthConfig::None | AuthConfig::Oauth2 => {}
        AuthConfig::Bearer { token } => {
            if !token.is_empty() {
                headers.insert("Authorization".into(), format!("Bearer {token}"));
            }
        }
        AuthConfig::Basic { username, password } => {
            if !username.is_empty() {
                let encoded = BASE64.encode(format!("{username}:{password}"));
                headers.insert("Authorization".into(), format!("Basic {encoded}"));
            }
        }
        AuthConfig::ApiKey { api_key, api_key_header } => {
            if !api_key.is_empty() {
                let name = if api_key_header.is_empty() {
                    DEFAULT_API_KEY_HEADER
                } else {
                    api_key_header.as_str()
                };
                headers.insert(name.to_string(), api_key.clone());
            }
        }
    }

    let body = if request.body.kind == BodyKind::None {
        None
    } else {
        Some(resolver.resolve(&request.body.content))
    };

    ProxyRequest {
        url,
        method: request.method.as_str().to_string(),
        headers,
        body,
        timeout: timeout_ms,
    }
}

/// Normalize a relay payload into the displayed/recorded shape. Falls back to
/// the measured wall time when the relay reports none.
pub fn normalize(raw: ProxyResponse, fallback_ms: u64) -> ResponseData {
    ResponseData {
        status: raw.status,
        status_text: raw.status_text,
        time: if raw.time > 0 { raw.time } else { fallback_ms },
        size: if raw.size.is_empty() { String::from("0 B") } else { raw.size },
        size_bytes: raw.size_bytes,
        headers: raw.headers,
        cookies: raw.cookies,
        data: raw.data,
        raw_body: raw.raw_body,
    }
}

/// Dispatch through the relay, racing the cancellation token. Exactly one
/// `Event::Response` is posted per call; a fired token wins the race and
/// surfaces as `AppError::Cancelled` even if the transport later resolves.
pub async fn execute(
    relay: Arc<dyn ProxyDispatch>,
    send_id: u64,
    request_id: String,
    proxy_request: ProxyRequest,
    tx: UnboundedSender<Event>,
    cancel: CancellationToken,
) {
    let start = Instant::now();
    let result = tokio::select! {
        res = relay.dispatch(proxy_request) => res,
        _ = cancel.cancelled() => Err(AppError::Cancelled),
    };
    let duration_ms = start.elapsed().as_millis() as u64;
    let result = result.map(|raw| normalize(raw, duration_ms));
    let _ = tx.send(Event::Response { send_id, request_id, duration_ms, result });
}
