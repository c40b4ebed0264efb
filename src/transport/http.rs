//! HTTP transport implementation

use std::{
    collections::HashMap,
    task::{Context, Poll},
    time::Duration,
};

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::HeaderMap;
use url::Url;

use crate::protocol::error::AgentError;

use super::{StreamingTransportResponse, Transport, TransportRequest, TransportResponse};

/// HTTP transport implementation using reqwest
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a new HTTP transport
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL endpoints are resolved against
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create a transport whose connect and per-read waits are bounded
    ///
    /// The bound applies to each read, not to the whole body, so long
    /// streams stay open while chunks keep arriving.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()?;
        Ok(Self { client, base_url })
    }

    fn request_builder(
        &self,
        request: TransportRequest,
    ) -> Result<reqwest::RequestBuilder, AgentError> {
        let url = self.url_for(&request.endpoint);

        let mut req_builder = match request.method.as_str() {
            "POST" => self.client.post(&url),
            "GET" => self.client.get(&url),
            "PUT" => self.client.put(&url),
            "DELETE" => self.client.delete(&url),
            _ => {
                return Err(AgentError::Transport(format!(
                    "Unsupported HTTP method: {}",
                    request.method
                )))
            }
        };

        for (key, value) in request.headers {
            req_builder = req_builder.header(key, value);
        }

        if !request.body.is_empty() {
            req_builder = req_builder.body(request.body);
        }

        Ok(req_builder)
    }
}

fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
        .collect()
}

#[async_trait]
impl Transport for HttpTransport {
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), AgentError>> {
        // HTTP client is always ready
        Poll::Ready(Ok(()))
    }

    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, AgentError> {
        tracing::debug!(method = %request.method, url = %self.url_for(&request.endpoint), "sending request");

        let response = self.request_builder(request)?.send().await?;

        let status = response.status().as_u16();
        let headers = header_map(response.headers());
        let body = response.bytes().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }

    async fn execute_streaming(
        &self,
        request: TransportRequest,
    ) -> Result<StreamingTransportResponse, AgentError> {
        tracing::debug!(method = %request.method, url = %self.url_for(&request.endpoint), "opening stream");

        let response = self.request_builder(request)?.send().await?;

        let status = response.status().as_u16();
        let headers = header_map(response.headers());
        let body = response.bytes_stream().map_err(AgentError::from);

        Ok(StreamingTransportResponse {
            status,
            headers,
            body: Box::pin(body),
        })
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }
}
