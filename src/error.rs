//! Custom error types for geosync

use thiserror::Error;

/// Main error type for geosync operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An upstream API call failed (transport error or non-2xx status).
    /// `message` carries the upstream error body when one was returned.
    #[error("Upstream fetch failed for {url}: {message}")]
    UpstreamFetch { url: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn upstream(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::UpstreamFetch {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for geosync
pub type Result<T> = std::result::Result<T, Error>;
