use thiserror::Error;

use crate::gateway::GatewayError;

/// Error surfaced to callers of store operations.
///
/// The `Display` form is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backend was reached and refused or failed the call.
    #[error("{message}")]
    Remote { message: String, status: Option<u16> },

    /// The backend could not be reached.
    #[error("{message}")]
    Transport { message: String },

    /// The request failed local validation and was never sent.
    #[error("{message}")]
    Invalid { message: String },
}

impl StoreError {
    /// Translate a gateway failure, substituting `fallback` when the
    /// backend supplied no message.
    pub fn from_gateway(err: GatewayError, fallback: &str) -> Self {
        match err {
            GatewayError::Remote { status, message } => StoreError::Remote {
                message: message.unwrap_or_else(|| fallback.to_string()),
                status: Some(status),
            },
            GatewayError::Decode { .. } => StoreError::Remote {
                message: fallback.to_string(),
                status: None,
            },
            GatewayError::Transport { .. } => StoreError::Transport {
                message: fallback.to_string(),
            },
        }
    }

    pub fn message(&self) -> &str {
        match self {
            StoreError::Remote { message, .. }
            | StoreError::Transport { message }
            | StoreError::Invalid { message } => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Remote { status, .. } => *status,
            _ => None,
        }
    }
}
