use std::{
    sync::Arc,
    task::{Context, Poll},
};

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::{
    protocol::error::AgentError,
    transport::{StreamingTransportResponse, Transport, TransportRequest, TransportResponse},
};

/// Mock transport for internal testing
///
/// Answers every request through a handler closure. Streaming requests get
/// the handler's body split into the given chunk size, so SSE parsing is
/// exercised across chunk boundaries.
#[derive(Clone)]
pub(crate) struct MockTransport {
    handler: Arc<dyn Fn(TransportRequest) -> TransportResponse + Send + Sync>,
    base_url: Url,
    chunk_size: usize,
}

impl MockTransport {
    /// Create a new mock transport with a custom request handler
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(TransportRequest) -> TransportResponse + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            base_url: Url::parse("mock://gateway/agents").unwrap(),
            chunk_size: 16,
        }
    }

    /// Create a mock transport that always returns 200 OK
    pub fn ok() -> Self {
        Self::new(|_| TransportResponse::new(200))
    }

    /// Create a mock transport that always returns the given JSON
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self::new(move |_| {
            TransportResponse::new(status).body(Bytes::from(serde_json::to_vec(&value).unwrap()))
        })
    }

    /// Create a mock transport that streams the given SSE body
    pub fn sse(body: impl Into<String>) -> Self {
        let body = body.into();
        Self::new(move |_| {
            TransportResponse::new(200)
                .header("content-type", "text/event-stream")
                .body(Bytes::from(body.clone()))
        })
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), AgentError>> {
        Poll::Ready(Ok(()))
    }

    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, AgentError> {
        Ok((self.handler)(request))
    }

    async fn execute_streaming(
        &self,
        request: TransportRequest,
    ) -> Result<StreamingTransportResponse, AgentError> {
        let response = (self.handler)(request);
        let chunks: Vec<Result<Bytes, AgentError>> = response
            .body
            .chunks(self.chunk_size)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();

        Ok(StreamingTransportResponse {
            status: response.status,
            headers: response.headers,
            body: Box::pin(futures::stream::iter(chunks)),
        })
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("base_url", &self.base_url)
            .finish()
    }
}
