//! Core gateway protocol service implementation

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use serde_json::Value;
use tower_service::Service;

use crate::{
    codec::{Codec, SseCodec},
    protocol::{chat::THREAD_ID_HEADER, error::AgentError, operation::AgentOperation},
    service::{AgentRequest, AgentResponse, StreamingResponse},
    transport::{Transport, TransportRequest, TransportResponse},
};

/// Core protocol service that wraps a transport
///
/// This service implements the Tower `Service` trait and executes gateway
/// operations over any transport. The codec picks the binding: JSON-RPC for
/// A2A agents, plain JSON for chat completions and discovery documents.
pub struct AgentProtocolService<T> {
    transport: T,
    codec: Arc<dyn Codec>,
}

impl<T> AgentProtocolService<T>
where
    T: Transport,
{
    /// Create a new protocol service
    ///
    /// # Arguments
    ///
    /// * `transport` - The underlying transport implementation
    /// * `codec` - The codec for serialization/deserialization
    pub fn new(transport: T, codec: Arc<dyn Codec>) -> Self {
        Self { transport, codec }
    }

    /// Build a transport request from an operation
    fn build_transport_request(
        req: &AgentRequest,
        codec: &dyn Codec,
    ) -> Result<TransportRequest, AgentError> {
        let operation = &req.operation;
        let mut transport_req = TransportRequest::new(operation.endpoint(), operation.method());

        let body = codec.encode_request(operation)?;
        if !body.is_empty() {
            transport_req = transport_req
                .header("Content-Type", codec.content_type())
                .body(body);
        }

        let accept = if operation.is_streaming() {
            "text/event-stream"
        } else {
            "application/json"
        };
        transport_req = transport_req.header("Accept", accept);

        if let Some(auth) = &req.context.auth {
            let (header, value) = auth.to_header();
            transport_req = transport_req.header(header, value);
        }

        for (key, value) in &req.context.metadata {
            transport_req = transport_req.header(key.clone(), value.clone());
        }

        Ok(transport_req)
    }

    /// Parse a buffered transport response
    fn parse_transport_response(
        transport_resp: TransportResponse,
        codec: &dyn Codec,
        operation: &AgentOperation,
        url: &str,
    ) -> Result<AgentResponse, AgentError> {
        if !transport_resp.is_success() {
            return Err(Self::handle_error_response(&transport_resp, url));
        }

        let response = codec.decode_response(&transport_resp.body, operation)?;

        Ok(match response {
            AgentResponse::ChatCompletion(mut completion) => {
                completion.thread_id = transport_resp.headers.get(THREAD_ID_HEADER).cloned();
                AgentResponse::ChatCompletion(completion)
            }
            other => other,
        })
    }

    /// Map a non-2xx response to an error
    ///
    /// The gateway reports errors as `{"error": {"message", "code"}}`,
    /// `{"error": "..."}` or `{"message": "..."}`.
    fn handle_error_response(transport_resp: &TransportResponse, url: &str) -> AgentError {
        let json = serde_json::from_slice::<Value>(&transport_resp.body).ok();

        let message = json
            .as_ref()
            .and_then(|json| {
                json.pointer("/error/message")
                    .or_else(|| json.get("error").filter(|e| e.is_string()))
                    .or_else(|| json.get("message"))
            })
            .and_then(Value::as_str)
            .map(str::to_string);

        let code = json
            .as_ref()
            .and_then(|json| json.pointer("/error/code"))
            .and_then(Value::as_i64);

        let status = transport_resp.status;
        match (status, code, message) {
            (401 | 403, _, message) => {
                AgentError::Auth(message.unwrap_or_else(|| format!("HTTP {}", status)))
            }
            (404, _, _) => AgentError::AgentNotFound {
                url: url.to_string(),
            },
            (429, _, _) => AgentError::RateLimitExceeded,
            (_, Some(code), Some(message)) => AgentError::JsonRpc { code, message },
            (_, _, Some(message)) => AgentError::Transport(format!("HTTP {}: {}", status, message)),
            (_, _, None) => AgentError::Transport(format!("HTTP error: {}", status)),
        }
    }

    async fn execute(
        transport: T,
        codec: Arc<dyn Codec>,
        req: AgentRequest,
    ) -> Result<AgentResponse, AgentError> {
        let transport_req = Self::build_transport_request(&req, codec.as_ref())?;
        let url = transport.url_for(&transport_req.endpoint);

        tracing::debug!(operation = req.operation.name(), %url, "executing operation");

        if !req.operation.is_streaming() {
            let transport_resp = transport.execute(transport_req).await?;
            return Self::parse_transport_response(
                transport_resp,
                codec.as_ref(),
                &req.operation,
                &url,
            );
        }

        let transport_resp = transport.execute_streaming(transport_req).await?;
        if !transport_resp.is_success() {
            let buffered = transport_resp.into_buffered().await?;
            return Err(Self::handle_error_response(&buffered, &url));
        }

        let thread_id = transport_resp.headers.get(THREAD_ID_HEADER).cloned();
        let events = SseCodec::new().parse_stream(transport_resp.body, codec);

        Ok(AgentResponse::Stream(
            StreamingResponse::new(events).with_thread_id(thread_id),
        ))
    }
}

impl<T> Service<AgentRequest> for AgentProtocolService<T>
where
    T: Transport + Clone,
{
    type Response = AgentResponse;
    type Error = AgentError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.transport.poll_ready(cx)
    }

    fn call(&mut self, req: AgentRequest) -> Self::Future {
        let transport = self.transport.clone();
        let codec = self.codec.clone();

        Box::pin(Self::execute(transport, codec, req))
    }
}

impl<T> Clone for AgentProtocolService<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            codec: self.codec.clone(),
        }
    }
}
