// HTTP transport: the one place that performs network I/O. API operations
// hand it a method, URL, optional body and headers, and get back the whole
// response body as bytes. Status codes are not interpreted here; the body
// alone tells the caller whether the API reported an error.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ClientError;
use crate::logging::Logger;

/// Every request gets the same timeout; there is no per-operation override.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Header name to value mapping. Empty for unauthenticated calls.
pub type Headers = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A blocking request/response primitive. Implementations must not retry.
pub trait Transport {
    fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<Vec<u8>>,
        headers: &Headers,
    ) -> Result<Vec<u8>, ClientError>;
}

/// `Transport` over a reqwest blocking client.
pub struct HttpTransport {
    client: Client,
    logger: Arc<dyn Logger>,
}

impl HttpTransport {
    /// Build a transport with the standard 60 second timeout.
    pub fn new(logger: Arc<dyn Logger>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, logger))
    }

    /// Wrap an already configured client.
    pub fn with_client(client: Client, logger: Arc<dyn Logger>) -> Self {
        HttpTransport { client, logger }
    }
}

impl Transport for HttpTransport {
    fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<Vec<u8>>,
        headers: &Headers,
    ) -> Result<Vec<u8>, ClientError> {
        self.logger
            .infof(format_args!("Making a {} request to url: {}", method, url));

        let header_map = to_header_map(headers)?;
        let mut req = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        }
        .headers(header_map);
        if let Some(bytes) = body {
            req = req.body(bytes);
        }

        let request = req
            .build()
            .map_err(|e| ClientError::Transport(format!("invalid request: {}", e)))?;
        let res = self
            .client
            .execute(request)
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        // `bytes()` consumes the response, so the connection is released on
        // every path and there is no separate close step that could fail.
        let buf = res
            .bytes()
            .map_err(|e| ClientError::Transport(format!("reading response body: {}", e)))?;
        Ok(buf.to_vec())
    }
}

/// Convert the plain string mapping into reqwest headers, rejecting names
/// or values that cannot appear in an HTTP request.
fn to_header_map(headers: &Headers) -> Result<HeaderMap, ClientError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, val) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| ClientError::Transport(format!("invalid header name {:?}: {}", key, e)))?;
        let value = HeaderValue::from_str(val)
            .map_err(|e| ClientError::Transport(format!("invalid value for header {}: {}", key, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}
