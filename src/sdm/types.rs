//! SDM Types
//!
//! Type definitions and provider constants for the Google Smart Device
//! Management (SDM) API.

use serde::Deserialize;
use std::fmt;

/// Google OAuth token host
pub const TOKEN_HOST: &str = "www.googleapis.com";

/// Google OAuth token path
pub const TOKEN_PATH: &str = "/oauth2/v4/token";

/// SDM API host
pub const SDM_API_HOST: &str = "smartdevicemanagement.googleapis.com";

/// Command name for RTSP live stream generation
pub const GENERATE_RTSP_COMMAND: &str =
    "sdm.devices.commands.CameraLiveStream.GenerateRtspStream";

/// Short-lived bearer credential obtained from the refresh exchange.
///
/// Valid only for the current process invocation; never persisted.
/// `Debug` output is masked so the token never leaks into logs.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***MASKED***)")
    }
}

/// Google OAuth token response (internal use)
///
/// `access_token` is optional here so an absent field surfaces as an
/// AuthError with a useful message rather than a serde error.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Google OAuth error response
#[derive(Debug, Deserialize)]
pub struct TokenError {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_debug_masked() {
        let token = AccessToken::new("tok-abc".to_string());
        let rendered = format!("{:?}", token);
        assert!(!rendered.contains("tok-abc"));
        assert_eq!(token.as_str(), "tok-abc");
    }
}
