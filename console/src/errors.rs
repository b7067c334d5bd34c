//! Error types for the MAA console

use thiserror::Error;

/// Main error type for the MAA console
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Operator input rejected before any request was sent
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The backend could not be reached at all
    #[error("Transport error: {0}")]
    TransportError(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("Request failed ({status}): {message}")]
    RequestError { status: u16, message: String },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConsoleError {
    /// Human-readable message for the operator.
    ///
    /// `fallback` names the failed operation and is used whenever the error
    /// carries no message of its own.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ConsoleError::ValidationError(msg) if !msg.is_empty() => msg.clone(),
            ConsoleError::RequestError { message, .. } if !message.is_empty() => message.clone(),
            ConsoleError::TransportError(_) => format!("{}: backend unreachable", fallback),
            _ => fallback.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ConsoleError::ValidationError(_))
    }
}
