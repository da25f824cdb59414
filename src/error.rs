//! Typed errors for fetching, parsing and writing.
//!
//! `FetchError` keeps "page does not exist" apart from failures that may go
//! away on a retry; the pipeline stops on both but reports which one it saw.

use reqwest::StatusCode;
use thiserror::Error;

/// Outcome of a failed page fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP 404: the page index is past the end of the directory
    #[error("page not found: {url}")]
    NotFound { url: String },

    /// Any other non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: StatusCode },

    /// DNS, connect, timeout or body read failure
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::NotFound { .. } => false,
            FetchError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            FetchError::Transport { .. } => true,
        }
    }
}

/// Setup and output errors. These abort the run instead of ending pagination.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("invalid base URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
