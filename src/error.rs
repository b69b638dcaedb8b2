// Error types returned by the API client. Every failure reaches the caller
// as a value; the CLI decides how to print it.

use thiserror::Error;

/// Errors produced by `ApiClient` operations and the transport beneath it.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Building the request, talking to the network or reading the body failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// A response body was not valid JSON for the shape we expected.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The API answered with a non-zero error code in its envelope.
    /// Displays as `<code>: <message>` so existing scripts keep matching.
    #[error("{code}: {message}")]
    Api { code: i64, message: String },

    /// An authenticated operation was called without a username/token pair.
    #[error("Client without auth only supports account creation and status")]
    AuthRequired,
}

impl ClientError {
    /// Numeric API error code, if this error came from the API envelope.
    pub fn code(&self) -> Option<i64> {
        match self {
            ClientError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
