//! Error handling for nestsnap

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
///
/// Fatal vs. recoverable is a property of the kind, not the call site:
/// `Config` and `Auth` abort the whole run, everything else is reported
/// per-camera and processing continues.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing/malformed config, unknown camera label
    #[error("Config error: {0}")]
    Config(String),

    /// Token refresh failure
    #[error("Auth error: {0}")]
    Auth(String),

    /// Non-success HTTP response from the provider
    #[error("Request error: HTTP {status}: {body}")]
    Request { status: u16, body: String },

    /// Malformed provider response body
    #[error("Stream error: {0}")]
    Stream(String),

    /// External tool failure during frame extraction
    #[error("Capture error: {0}")]
    Capture(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error aborts the run immediately.
    ///
    /// No partial processing is possible without credentials or a token,
    /// so those two kinds are fatal. Per-camera request/stream/capture
    /// failures leave the remaining cameras processable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Auth(_))
    }
}
