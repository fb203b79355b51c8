use std::path::PathBuf;

use crate::exchange::ExchangeKind;

/// Errors related to configuration loading and parsing.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config at {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid config value for `{key}`: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Errors surfaced by a single prompt/response exchange.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("Response file not found: {}", path.display())]
    MissingResponse { path: PathBuf },

    #[error("Response at {} is not valid JSON: {source}", path.display())]
    MalformedResponse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Operator confirmation failed: {0}")]
    Confirmation(#[source] std::io::Error),

    #[error("Invalid {kind} request: {message}")]
    InvalidRequest { kind: ExchangeKind, message: String },

    #[error("{kind} response violates its schema: {message}")]
    SchemaViolation { kind: ExchangeKind, message: String },
}

impl ExchangeError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn schema(kind: ExchangeKind, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            kind,
            message: message.into(),
        }
    }
}
