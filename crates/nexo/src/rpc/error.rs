//! RPC error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("{function} returned HTTP {status}: {body}")]
    Http {
        function: String,
        status: u16,
        body: String,
    },
    #[error("Unexpected response from {function}: {message}")]
    Decode { function: String, message: String },
    /// The call completed but the service reported failure.
    #[error("{0}")]
    Rejected(String),
}

impl RpcError {
    pub(crate) fn decode(function: &str, message: impl ToString) -> Self {
        Self::Decode {
            function: function.to_string(),
            message: message.to_string(),
        }
    }
}
