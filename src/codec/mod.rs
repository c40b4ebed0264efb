//! Serialization codecs for the gateway's protocol bindings

pub mod chat;
pub mod json;
pub mod jsonrpc;
pub mod sse;

pub use chat::ChatCompletionCodec;
pub use json::JsonCodec;
pub use jsonrpc::JsonRpcCodec;
pub use sse::{EventStream, SseCodec};

use crate::{
    protocol::{error::AgentError, event::StreamEvent, operation::AgentOperation},
    service::response::AgentResponse,
};
use bytes::Bytes;

/// Outcome of decoding a single server-sent event
#[derive(Debug)]
pub enum DecodedEvent {
    /// An event to hand to the caller
    Event(StreamEvent),

    /// The last event of the stream
    Final(StreamEvent),

    /// A frame that carries nothing for the caller
    Skip,

    /// End-of-stream sentinel
    Done,
}

/// Codec trait for encoding operations and decoding responses
///
/// Different codecs implement different protocol bindings (JSON-RPC for A2A
/// agents, plain JSON for chat completions and discovery documents).
pub trait Codec: Send + Sync {
    /// Serialize an operation to bytes for transport
    ///
    /// # Arguments
    ///
    /// * `operation` - The operation to encode
    ///
    /// # Returns
    ///
    /// The serialized bytes or an error
    fn encode_request(&self, operation: &AgentOperation) -> Result<Bytes, AgentError>;

    /// Deserialize transport response bytes to a response
    ///
    /// # Arguments
    ///
    /// * `body` - The response body bytes
    /// * `operation` - The original operation (for context)
    ///
    /// # Returns
    ///
    /// The deserialized response or an error
    fn decode_response(
        &self,
        body: &[u8],
        operation: &AgentOperation,
    ) -> Result<AgentResponse, AgentError>;

    /// Decode the `data` field of one server-sent event
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid for this binding or if it
    /// carries a protocol-level error
    fn decode_event(&self, data: &str) -> Result<DecodedEvent, AgentError> {
        let _ = data;
        Err(AgentError::Protocol(
            "This codec does not support streaming".into(),
        ))
    }

    /// Get the content type for this codec
    fn content_type(&self) -> &str;
}
