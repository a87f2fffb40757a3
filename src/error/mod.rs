//! Error types for mcp-probe.

use thiserror::Error;

use crate::classify::Category;

/// Which side of the network exchange gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportFailureKind {
    /// Endpoint unreachable: refused, DNS failure, or timed out.
    ConnectionFailed,
    /// Anything else: encode/decode failures, unexpected HTTP replies.
    Other,
}

/// A network exchange that did not produce a decodable envelope.
///
/// This is a value, not a crash: the transport hands it to the classifier
/// so the suite can keep going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    Other(String),
}

impl TransportFailure {
    pub fn connection(detail: impl Into<String>) -> Self {
        Self::ConnectionFailed(detail.into())
    }

    pub fn other(detail: impl Into<String>) -> Self {
        Self::Other(detail.into())
    }

    pub fn kind(&self) -> TransportFailureKind {
        match self {
            Self::ConnectionFailed(_) => TransportFailureKind::ConnectionFailed,
            Self::Other(_) => TransportFailureKind::Other,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::ConnectionFailed(detail) | Self::Other(detail) => detail,
        }
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::connection(err.to_string())
        } else {
            Self::other(err.to_string())
        }
    }
}

/// Primary error type for all mcp-probe operations.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportFailure),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// The exchange layer this error belongs to, if it belongs to one.
    pub fn category(&self) -> Option<Category> {
        match self {
            Self::Transport(_) | Self::Http(_) => Some(Category::TransportError),
            Self::InvalidRequest(_) | Self::Serialization(_) => Some(Category::ProtocolError),
            _ => None,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ProbeError>;
