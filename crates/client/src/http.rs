//! Remote actions reached over HTTP.
//!
//! [`HttpAction`] POSTs the JSON-encoded input to a wrapped route and decodes
//! the envelope it answers with. The body is authoritative; the status code
//! is only used for diagnostics. Nothing is retried.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use vergestack_core::{Action, ApiResponse};

/// HTTP request timeout for a single call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Failures reaching a remote route. Callers of [`HttpAction`] only see
/// them as an error envelope; they are logged here.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote answered with something that is not an envelope.
    #[error("Response with HTTP {status} is not a valid envelope: {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// HttpAction
// ---------------------------------------------------------------------------

/// An [`Action`] backed by a wrapped route at `url`.
pub struct HttpAction<I, O> {
    client: reqwest::Client,
    url: String,
    _marker: PhantomData<fn(I) -> O>,
}

impl<I, O> HttpAction<I, O> {
    /// Create an action with a pre-configured HTTP client.
    pub fn new(url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, url))
    }

    /// Create an action sharing an existing client.
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            _marker: PhantomData,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<I, O> HttpAction<I, O>
where
    I: Serialize,
    O: DeserializeOwned,
{
    /// Execute a single POST request and decode the envelope.
    async fn send(&self, input: I) -> Result<ApiResponse<O>, ClientError> {
        let request = self.client.post(&self.url).json(&input);
        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode { status, source })
    }
}

#[async_trait]
impl<I, O> Action for HttpAction<I, O>
where
    I: Serialize + Send + 'static,
    O: DeserializeOwned + Send + 'static,
{
    type Input = I;
    type Output = O;

    async fn call(&self, input: I) -> ApiResponse<O> {
        match self.send(input).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(url = %self.url, error = %err, "Remote action failed");
                ApiResponse::internal_error()
            }
        }
    }
}

impl<I, O> Clone for HttpAction<I, O> {
    fn clone(&self) -> Self {
        Self::with_client(self.client.clone(), self.url.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
