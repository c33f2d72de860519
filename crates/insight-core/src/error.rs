//! Error types for insight-core

use thiserror::Error;

/// Result type alias using insight-core's Error
pub type Result<T> = std::result::Result<T, Error>;

const NETWORK_ERROR_MESSAGE: &str = "Network error, please try again.";

/// Errors that can occur in insight-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Client-side validation failure; never reaches the network
    #[error("Validation error: {0}")]
    Validation(String),

    /// No response was received (connectivity, DNS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Http {
        status: u16,
        body: serde_json::Value,
    },

    /// Superseded by a newer request to the same endpoint
    #[error("Request cancelled")]
    Cancelled,

    /// Microphone access was denied
    #[error("Microphone permission denied: {0}")]
    Permission(String),

    /// Speech recognition engine failure
    #[error("Speech recognition error: {0}")]
    Recognition(String),

    /// Durable storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl Error {
    /// Superseded requests are expected and must stay silent.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Human-readable message suitable for a transient notification.
    ///
    /// HTTP errors prefer the server's `message` (then `error`) field.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { status, body } => body_message(body)
                .unwrap_or_else(|| format!("Request failed with status {status}")),
            Self::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            Self::Validation(message)
            | Self::Permission(message)
            | Self::Recognition(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Extract `message` or `error` from a JSON error payload.
pub(crate) fn body_message(body: &serde_json::Value) -> Option<String> {
    ["message", "error"].iter().find_map(|field| {
        body.get(field)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string)
    })
}
