//! Transport abstraction layer

pub mod http;
#[cfg(test)]
pub(crate) mod mock;

use std::{
    collections::HashMap,
    fmt,
    pin::Pin,
    task::{Context, Poll},
};

pub use http::HttpTransport;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, TryStreamExt};
use url::Url;

use crate::protocol::error::AgentError;

/// A streamed response body
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, AgentError>> + Send>>;

/// Protocol-agnostic transport request
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// The endpoint path relative to the base URL (may be empty)
    pub endpoint: String,

    /// HTTP method (e.g., "POST", "GET")
    pub method: String,

    /// Headers for the request
    pub headers: HashMap<String, String>,

    /// Request body as bytes
    pub body: Bytes,
}

impl TransportRequest {
    /// Create a new transport request
    pub fn new(endpoint: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: method.into(),
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    /// Add a header to the request
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request body
    pub fn body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }
}

/// Protocol-agnostic transport response
#[derive(Debug)]
pub struct TransportResponse {
    /// Status code (e.g., HTTP status code)
    pub status: u16,

    /// Response headers, keyed by lowercase name
    pub headers: HashMap<String, String>,

    /// Response body as bytes
    pub body: Bytes,
}

impl TransportResponse {
    /// Create a new transport response
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    /// Add a header to the response
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the response body
    pub fn body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    /// Check if the response indicates success (2xx status code)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A response whose body is still arriving
pub struct StreamingTransportResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: ByteStream,
}

impl StreamingTransportResponse {
    /// Check if the response indicates success (2xx status code)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Read the remaining body into memory
    ///
    /// Used for error responses, which are small JSON documents.
    pub async fn into_buffered(self) -> Result<TransportResponse, AgentError> {
        let body = self
            .body
            .try_fold(BytesMut::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok::<_, AgentError>(acc)
            })
            .await?;

        Ok(TransportResponse {
            status: self.status,
            headers: self.headers,
            body: body.freeze(),
        })
    }
}

impl fmt::Debug for StreamingTransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingTransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Core transport trait for executing protocol-agnostic requests
///
/// Endpoints are resolved against [`Transport::base_url`], which is the
/// gateway load balancer, the agents root, or an agent's invocation URL.
#[async_trait]
pub trait Transport: Clone + Send + Sync + 'static {
    /// Check if the transport is ready to accept requests
    ///
    /// This is used by Tower's Service trait to implement backpressure
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), AgentError>>;

    /// Execute a transport request and buffer the full response
    ///
    /// # Arguments
    ///
    /// * `request` - The protocol-agnostic request to execute
    ///
    /// # Returns
    ///
    /// A protocol-agnostic response or an error
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, AgentError>;

    /// Execute a transport request and hand back the body as it arrives
    ///
    /// Transports without streaming support return an error.
    async fn execute_streaming(
        &self,
        request: TransportRequest,
    ) -> Result<StreamingTransportResponse, AgentError> {
        let _ = request;
        Err(AgentError::Transport(
            "Streaming is not supported by this transport".into(),
        ))
    }

    /// Get the base URL for this transport
    fn base_url(&self) -> &Url;

    /// Absolute URL for an endpoint, used in logs and error reports
    fn url_for(&self, endpoint: &str) -> String {
        let base = self.base_url().as_str().trim_end_matches('/');
        format!("{}{}", base, endpoint)
    }
}
