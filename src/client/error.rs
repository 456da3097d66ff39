//! API client error types
//!
//! Failures talking to the remote scoring/data API.

use thiserror::Error;

/// Errors that can occur when calling the credit risk API
#[derive(Error, Debug)]
pub enum ClientError {
    /// Could not connect to the API host
    #[error("Credit risk API unavailable")]
    Unavailable,

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Other transport failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// Body was not the JSON we expected
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Body decoded but violates the response contract
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Client could not be constructed
    #[error("Client configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Classify a reqwest transport error
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Unavailable
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Request(err)
        }
    }

    /// Message suitable for an inline alert
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Unavailable | ClientError::Timeout => {
                "The credit risk API is not reachable. Please try again.".to_string()
            }
            ClientError::Status { status, .. } => {
                format!("The credit risk API returned an error (HTTP {}).", status)
            }
            ClientError::Decode(_) | ClientError::Malformed(_) => {
                "The credit risk API returned an unexpected response.".to_string()
            }
            ClientError::Request(_) | ClientError::Config(_) => {
                "Request to the credit risk API failed. Please try again.".to_string()
            }
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Result type for API client operations
pub type ClientResult<T> = Result<T, ClientError>;
