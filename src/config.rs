//! Settings - Credentials and Camera Registry from the secrets file
//!
//! ## Responsibilities
//!
//! - Parse the INI secrets file (`[secrets]` + `[cameras]` sections)
//! - Validate that every credential field is present and non-empty
//! - Build the camera registry (label -> device id)
//!
//! Settings are loaded once at startup and immutable for the process
//! lifetime; every component receives them by reference.

use crate::error::{Error, Result};
use crate::registry::CameraRegistry;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// OAuth client credentials and the Device Access project id.
///
/// `client_secret` and `refresh_token` are masked in `Debug` output so
/// they never leak into logs.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// OAuth 2.0 Client ID
    #[serde(rename = "CLIENT_ID")]
    pub client_id: String,
    /// OAuth 2.0 Client Secret
    #[serde(rename = "CLIENT_SECRET")]
    pub client_secret: String,
    /// OAuth 2.0 Refresh Token (long-lived, exchanged per run)
    #[serde(rename = "REFRESH_TOKEN")]
    pub refresh_token: String,
    /// Device Access project ID (enterprise path segment)
    #[serde(rename = "PROJECT_ID")]
    pub project_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***MASKED***")
            .field("refresh_token", &"***MASKED***")
            .field("project_id", &self.project_id)
            .finish()
    }
}

/// Raw INI layout: `[secrets]` section plus a `[cameras]` section mapping
/// label -> provider device identifier.
#[derive(Deserialize)]
struct RawSettings {
    secrets: Credentials,
    #[serde(default)]
    cameras: BTreeMap<String, String>,
}

/// Validated process settings.
#[derive(Debug)]
pub struct Settings {
    pub credentials: Credentials,
    pub cameras: CameraRegistry,
}

impl Settings {
    /// Load and validate settings from an INI file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::parse(&contents)
    }

    /// Parse and validate settings from INI text.
    pub fn parse(contents: &str) -> Result<Self> {
        let raw: RawSettings = serde_ini::from_str(contents)
            .map_err(|e| Error::Config(format!("malformed secrets file: {}", e)))?;

        for (field, value) in [
            ("CLIENT_ID", &raw.secrets.client_id),
            ("CLIENT_SECRET", &raw.secrets.client_secret),
            ("REFRESH_TOKEN", &raw.secrets.refresh_token),
            ("PROJECT_ID", &raw.secrets.project_id),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", field)));
            }
        }

        if raw.cameras.is_empty() {
            return Err(Error::Config(
                "no cameras configured in [cameras] section".to_string(),
            ));
        }

        let cameras = CameraRegistry::new(raw.cameras)?;

        Ok(Self {
            credentials: raw.secrets,
            cameras,
        })
    }
}
