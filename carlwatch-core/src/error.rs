use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain the remote catalog
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode catalog from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Whether another attempt could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request { .. } | FetchError::Body { .. } => true,
            FetchError::Status { status, .. } => status.is_server_error(),
            FetchError::Decode { .. } => false,
        }
    }
}

/// Failure to deliver a single notification
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The request URL is stripped from the source error since it embeds the bot token
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("messaging API returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl DeliveryError {
    pub fn is_transient(&self) -> bool {
        match self {
            DeliveryError::Request(_) => true,
            DeliveryError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Environment variables 'bot_token' and 'chat_id' must be set to send notifications (missing: {})",
        .0.join(", ")
    )]
    MissingEnv(Vec<&'static str>),

    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
