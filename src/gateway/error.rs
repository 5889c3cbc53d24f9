//! Errors produced by backend calls.

use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The backend answered with a non-2xx status.
    #[error("Backend returned status {status}")]
    Remote {
        status: u16,
        /// `message` field of the error body, when the backend gave one.
        message: Option<String>,
    },

    /// The backend could not be reached.
    #[error("Backend unreachable: {message}")]
    Transport { message: String },

    /// The backend answered 2xx but the body did not match the expected shape.
    #[error("Unexpected response body: {message}")]
    Decode { message: String },
}

impl GatewayError {
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        GatewayError::Remote {
            status,
            message: Some(message.into()),
        }
    }

    /// HTTP status, for remote failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode {
                message: err.to_string(),
            }
        } else {
            GatewayError::Transport {
                message: err.to_string(),
            }
        }
    }
}
