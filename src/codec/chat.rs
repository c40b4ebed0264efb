//! Codec for OpenAI-compatible chat completions

use bytes::Bytes;

use crate::{
    codec::{Codec, DecodedEvent},
    protocol::{
        chat::{ChatCompletion, ChatCompletionChunk},
        error::AgentError,
        event::StreamEvent,
        operation::AgentOperation,
    },
    service::response::AgentResponse,
};

/// Codec for the gateway's load-balancer chat completion endpoint
#[derive(Debug, Clone, Default)]
pub struct ChatCompletionCodec;

impl ChatCompletionCodec {
    /// Create a new chat completion codec
    pub fn new() -> Self {
        Self
    }
}

impl Codec for ChatCompletionCodec {
    fn encode_request(&self, operation: &AgentOperation) -> Result<Bytes, AgentError> {
        match operation {
            AgentOperation::ChatCompletion { request, .. } => {
                Ok(Bytes::from(serde_json::to_vec(request)?))
            }
            other => Err(AgentError::Protocol(format!(
                "Chat completion codec cannot encode '{}'",
                other.name()
            ))),
        }
    }

    fn decode_response(
        &self,
        body: &[u8],
        operation: &AgentOperation,
    ) -> Result<AgentResponse, AgentError> {
        match operation {
            AgentOperation::ChatCompletion { .. } => {
                if body.is_empty() {
                    return Err(AgentError::EmptyResponse);
                }
                let completion: ChatCompletion = serde_json::from_slice(body)?;
                Ok(AgentResponse::ChatCompletion(Box::new(completion)))
            }
            other => Err(AgentError::Protocol(format!(
                "Chat completion codec cannot decode '{}'",
                other.name()
            ))),
        }
    }

    fn decode_event(&self, data: &str) -> Result<DecodedEvent, AgentError> {
        if data.trim() == "[DONE]" {
            return Ok(DecodedEvent::Done);
        }

        let chunk: ChatCompletionChunk = serde_json::from_str(data)?;
        Ok(DecodedEvent::Event(StreamEvent::ChatChunk(chunk)))
    }

    fn content_type(&self) -> &str {
        "application/json"
    }
}
