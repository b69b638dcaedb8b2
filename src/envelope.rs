// Error translation for API responses.
//
// The API uses the same body channel for success payloads and errors, so
// every body is first read as an error envelope. Only when the envelope
// carries no error (code 0 or no `error` field) is the same body decoded as
// the payload the caller asked for.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ClientError;

/// Wire shape shared by every response: `{"error": {"code": .., "message": ..}}`.
#[derive(Debug, Default, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl ResponseEnvelope {
    /// Returns the API error carried by this envelope, if any.
    pub fn into_client_error(self) -> Option<ClientError> {
        match self.error {
            Some(body) if body.code != 0 => Some(ClientError::Api {
                code: body.code,
                message: body.message,
            }),
            _ => None,
        }
    }
}

/// Decode `bytes` as `T`, unless the body is an API error.
///
/// A body that is not even a valid envelope is a `Decode` error; the
/// payload decode is never attempted in that case.
pub fn translate<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ClientError> {
    let envelope: ResponseEnvelope = serde_json::from_slice(bytes)?;
    if let Some(err) = envelope.into_client_error() {
        return Err(err);
    }
    Ok(serde_json::from_slice(bytes)?)
}
