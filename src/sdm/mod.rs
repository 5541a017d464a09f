//! SDM Client
//!
//! Google Smart Device Management (SDM) integration.
//!
//! ## Responsibilities
//!
//! - HTTPS URL construction with percent-encoded query parameters
//! - OAuth token refresh (refresh_token -> access_token, single attempt)
//! - Device info lookup
//! - RTSP live stream URL generation via executeCommand

pub mod types;

use crate::config::Credentials;
use crate::error::{Error, Result};
use crate::run::StreamSource;
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub use types::*;

/// Cap on provider response bodies quoted in error messages.
const ERROR_BODY_LIMIT: usize = 200;

/// Build an HTTPS URL from host, path, and query parameters.
///
/// Query parameters are percent-encoded; the URL carries no fragment.
pub fn build_url(host: &str, path: &str, params: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(&format!("https://{}", host))
        .map_err(|e| Error::Internal(format!("invalid URL host {}: {}", host, e)))?;
    url.set_path(path);
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

/// SDM API client
///
/// One instance per run; holds the immutable credentials and a reqwest
/// client with a fixed timeout.
pub struct SdmClient {
    client: reqwest::Client,
    credentials: Credentials,
}

impl SdmClient {
    /// Create a new SDM client with the given HTTP timeout.
    pub fn new(credentials: Credentials, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            credentials,
        }
    }

    /// Exchange the refresh token for a short-lived access token.
    ///
    /// Exactly one attempt: a failed refresh aborts the entire run, the
    /// surrounding scheduler is responsible for re-invocation.
    pub async fn refresh_access_token(&self) -> Result<AccessToken> {
        let url = build_url(
            TOKEN_HOST,
            TOKEN_PATH,
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ],
        )?;

        let resp = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|e| Error::Auth(format!("token endpoint unreachable: {}", e)))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            // Prefer Google's structured error over a raw body dump.
            let detail = match serde_json::from_str::<TokenError>(&body) {
                Ok(err) => err.error_description.unwrap_or(err.error),
                Err(_) => truncate(&body, ERROR_BODY_LIMIT).to_string(),
            };
            return Err(Error::Auth(format!(
                "token refresh failed: HTTP {}: {}",
                status, detail
            )));
        }

        parse_token_response(&body)
    }

    /// Fetch raw device info (traits JSON) for a device.
    pub async fn device_info(&self, token: &AccessToken, device_id: &str) -> Result<Value> {
        let path = format!(
            "/v1/enterprises/{}/devices/{}",
            self.credentials.project_id, device_id
        );
        let url = build_url(SDM_API_HOST, &path, &[])?;

        let resp = self
            .client
            .get(url)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        json_body(resp).await
    }

    /// Request generation of a fresh RTSP live stream URL for a device.
    ///
    /// The returned URL is ephemeral and used at most once per invocation.
    pub async fn generate_rtsp_stream(
        &self,
        token: &AccessToken,
        device_id: &str,
    ) -> Result<String> {
        let path = format!(
            "/v1/enterprises/{}/devices/{}:executeCommand",
            self.credentials.project_id, device_id
        );
        let url = build_url(SDM_API_HOST, &path, &[])?;

        let body = serde_json::json!({
            "command": GENERATE_RTSP_COMMAND,
            "params": {},
        });

        let resp = self
            .client
            .post(url)
            .bearer_auth(token.as_str())
            .json(&body)
            .send()
            .await?;

        let value = json_body(resp).await?;
        extract_rtsp_url(&value)
    }
}

impl StreamSource for SdmClient {
    async fn refresh_access_token(&self) -> Result<AccessToken> {
        SdmClient::refresh_access_token(self).await
    }

    async fn rtsp_stream_url(&self, token: &AccessToken, device_id: &str) -> Result<String> {
        self.generate_rtsp_stream(token, device_id).await
    }
}

/// Read a response body, mapping non-success statuses to a RequestError
/// with a truncated body for diagnostics.
async fn json_body(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(Error::Request {
            status: status.as_u16(),
            body: truncate(&body, ERROR_BODY_LIMIT).to_string(),
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| Error::Stream(format!("malformed response body: {}", e)))
}

/// Extract the access token from a token endpoint response body.
fn parse_token_response(body: &str) -> Result<AccessToken> {
    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|e| Error::Auth(format!("malformed token response: {}", e)))?;

    match parsed.access_token {
        Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
        _ => Err(Error::Auth(
            "token response missing access_token".to_string(),
        )),
    }
}

/// Walk `results.streamUrls.rtspUrl` in an executeCommand response.
///
/// Malformed provider responses are the most plausible break in the
/// pipeline, so the error names the dotted path that was missing.
fn extract_rtsp_url(value: &Value) -> Result<String> {
    let mut current = value;
    let mut walked: Vec<&str> = Vec::new();

    for segment in ["results", "streamUrls", "rtspUrl"] {
        walked.push(segment);
        current = current.get(segment).ok_or_else(|| {
            Error::Stream(format!(
                "stream response missing field: {}",
                walked.join(".")
            ))
        })?;
    }

    current
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            Error::Stream("stream response field results.streamUrls.rtspUrl is not a string".to_string())
        })
}

/// Truncate to at most `max` bytes without splitting a char.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
