//! Shared HTTP client, header builders, and response handling.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use crate::error::FoundryError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

const CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";

/// Get (or create) the shared reqwest client.
///
/// No overall request timeout is set: agent run streams stay open for
/// as long as the run produces events.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

fn base_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string()) {
        headers.insert(CLIENT_REQUEST_ID, val);
    }
    headers
}

/// Headers for a Bearer-token API.
pub fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = base_headers();
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {token}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Headers for key-authenticated services (inference, search).
pub fn api_key_headers(key: &str) -> HeaderMap {
    let mut headers = base_headers();
    if let Ok(val) = HeaderValue::from_str(key) {
        headers.insert("api-key", val);
    }
    headers
}

/// Map a non-success status code to an error.
pub fn status_to_error(status: u16, body: &str) -> FoundryError {
    let message = extract_error_message(body).unwrap_or_else(|| body.to_string());
    match status {
        401 | 403 => FoundryError::Authentication(message),
        _ => FoundryError::api(status, message),
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
}

/// Check the status, then decode the body as JSON.
pub async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, FoundryError> {
    let status = resp.status().as_u16();
    let body = resp.text().await?;
    if !(200..300).contains(&status) {
        return Err(status_to_error(status, &body));
    }
    Ok(serde_json::from_str(&body)?)
}
