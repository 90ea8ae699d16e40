//! Error types for scheduling and diagnostics

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RoutepilotError>;

#[derive(Debug, Error)]
pub enum RoutepilotError {
    #[error("Failed to load config from {path}: {source}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("No proxy route configured for policy: {policy}")]
    RouteNotFound { policy: String },

    #[error("Host rejected selection of {node} in group {group}: {reason}")]
    Apply {
        group: String,
        node: String,
        reason: String,
    },
}

/// Why a single provider query failed. Contained per provider: the failed
/// provider's report fields fall back to sentinels while the others proceed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("network error")]
    Network,

    #[error("provider exceeded its deadline")]
    Timeout,

    #[error("malformed response body")]
    Decode,
}

/// Transport-level failure from the HTTP fetch seam.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status: {0}")]
    Status(u16),

    #[error("no proxy route configured for policy: {0}")]
    RouteNotFound(String),
}
