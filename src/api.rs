// API client module: typed operations against the game API. Each operation
// builds a URL, sends it through the injected transport and runs the body
// through the error translator before decoding the payload.

use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::envelope::translate;
use crate::error::ClientError;
use crate::logging::Logger;
use crate::models::{CreatedUser, FetchedUser, GameStatus};
use crate::transport::{Headers, HttpMethod, Transport};

/// Production API host.
pub const BASE_URL: &str = "https://api.spacetraders.io";

/// The local player's identity. Either both fields are set or both are
/// empty; the empty value means "no identity".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub token: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Credential {
            username: username.into(),
            token: token.into(),
        }
    }

    /// True when both username and token are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.token.is_empty()
    }
}

/// Client for the game API. Holds the current credential, which can be
/// replaced at any time with `set_auth` (e.g. right after creating an
/// account).
pub struct ApiClient<T> {
    base_url: String,
    credential: Credential,
    transport: T,
    logger: Arc<dyn Logger>,
}

impl<T: Transport> ApiClient<T> {
    /// Create a client. Pass `Credential::default()` for an anonymous client.
    pub fn new(base_url: &str, credential: Credential, transport: T, logger: Arc<dyn Logger>) -> Self {
        ApiClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            credential,
            transport,
            logger,
        }
    }

    /// Replace the whole credential.
    pub fn set_auth(&mut self, username: &str, token: &str) {
        self.credential = Credential::new(username, token);
    }

    /// Returns whether both username and token are set.
    pub fn has_auth(&self) -> bool {
        self.credential.is_complete()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch the game status. Unauthenticated.
    pub fn fetch_status(&self) -> Result<GameStatus, ClientError> {
        self.logger.info("Fetching game Status...");

        // Status goes through the same translator as every other call, so an
        // error envelope here shows up as `ClientError::Api`.
        let url = format!("{}/game/status", self.base_url);
        match self.request::<GameStatus>(HttpMethod::Get, &url, &Headers::new()) {
            Ok(status) => {
                self.logger
                    .infof(format_args!("Game status fetched: {}", status.status));
                Ok(status)
            }
            Err(e) => {
                self.logger.error(&format!("Fetching failed: {}", e));
                Err(e)
            }
        }
    }

    /// Create an account and return its token. The user object in the
    /// response is dropped; use `fetch_account` for account details.
    pub fn create_account(&self, username: &str) -> Result<String, ClientError> {
        self.logger
            .infof(format_args!("Creating an account with username {}...", username));

        // The username is a path segment, not a query parameter.
        let url = format!("{}/users/{}/token", self.base_url, username);
        match self.request::<CreatedUser>(HttpMethod::Post, &url, &Headers::new()) {
            Ok(created) => Ok(created.token),
            Err(e) => {
                self.logger.error(&format!("Creating account failed: {}", e));
                Err(e)
            }
        }
    }

    /// Fetch the account of the current credential.
    ///
    /// Fails with `AuthRequired` before any request is made when the client
    /// has no complete credential.
    pub fn fetch_account(&self) -> Result<FetchedUser, ClientError> {
        // Checked before building the request so no anonymous call ever
        // reaches the network.
        if !self.has_auth() {
            return Err(ClientError::AuthRequired);
        }

        self.logger.infof(format_args!(
            "Fetching the account with username {}...",
            self.credential.username
        ));

        let url = format!("{}/users/{}", self.base_url, self.credential.username);
        let headers = auth_headers(&self.credential.token);
        self.request::<FetchedUser>(HttpMethod::Get, &url, &headers)
            .map_err(|e| {
                self.logger.error(&format!("Fetching user failed: {}", e));
                e
            })
    }

    fn request<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &Headers,
    ) -> Result<R, ClientError> {
        // None of the operations send a body; the transport still accepts one.
        let body = self.transport.execute(method, url, None, headers)?;
        translate(&body)
    }
}

/// Authorization header for bearer-token calls.
fn auth_headers(token: &str) -> Headers {
    let mut headers = Headers::new();
    headers.insert("Authorization".to_string(), format!("Bearer {}", token));
    headers
}
