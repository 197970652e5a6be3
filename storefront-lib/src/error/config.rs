//! Configuration error types

use std::path::PathBuf;

/// Errors that can occur while loading configuration or building a client.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration is not valid JSON or has the wrong shape.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The base URL could not be parsed.
    #[error("invalid base URL {url}: {source}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Parse error.
        source: url::ParseError,
    },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
