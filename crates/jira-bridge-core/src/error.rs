//! Error types for jira-bridge.

use thiserror::Error;

/// Main error type for jira-bridge operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response was received
    #[error("HTTP error: {0}")]
    Http(String),

    /// Jira returned a non-2xx response
    #[error("Jira API error ({status}) at {endpoint}: {message}")]
    Api {
        status: u16,
        endpoint: String,
        message: String,
    },

    /// Response body could not be decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Protocol stream I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tool arguments were rejected
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Build an API error from a failed response.
    pub fn api(status: u16, endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// HTTP status code, if the error came from a Jira response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 4xx responses.
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// True for 5xx responses.
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s >= 500)
    }
}

/// Result type alias for jira-bridge operations.
pub type Result<T> = std::result::Result<T, Error>;
