//! JSON-RPC 2.0 codec for A2A agents
//!
//! Wraps `message/send` and `message/stream` calls in JSON-RPC 2.0 envelopes
//! and unwraps results and streamed events. Discovery documents are plain
//! JSON and are delegated to [`JsonCodec`].

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    codec::{Codec, DecodedEvent},
    protocol::{
        error::AgentError,
        event::{SendMessageResult, StreamEvent},
        message::Message,
        operation::AgentOperation,
    },
    service::response::AgentResponse,
};

use super::json::JsonCodec;

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: String,
    method: &'static str,
    params: MessageSendParams<'a>,
}

#[derive(Debug, Serialize)]
struct MessageSendParams<'a> {
    message: &'a Message,
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl From<JsonRpcError> for AgentError {
    fn from(error: JsonRpcError) -> Self {
        AgentError::JsonRpc {
            code: error.code,
            message: error.message,
        }
    }
}

/// JSON-RPC 2.0 codec for the A2A protocol binding
#[derive(Debug, Clone)]
pub struct JsonRpcCodec {
    /// Inner JSON codec for discovery documents
    inner: JsonCodec,
}

impl JsonRpcCodec {
    /// Create a new JSON-RPC codec
    pub fn new() -> Self {
        Self {
            inner: JsonCodec::new(),
        }
    }

    fn unwrap_envelope(body: &[u8]) -> Result<Value, AgentError> {
        let response: JsonRpcResponse = serde_json::from_slice(body)
            .map_err(|e| {
                AgentError::Protocol(format!("Failed to parse JSON-RPC response: {}", e))
            })?;

        if let Some(error) = response.error {
            return Err(error.into());
        }

        response.result.ok_or_else(|| {
            AgentError::Protocol("JSON-RPC response missing 'result' field".to_string())
        })
    }
}

impl Default for JsonRpcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for JsonRpcCodec {
    fn encode_request(&self, operation: &AgentOperation) -> Result<Bytes, AgentError> {
        match operation {
            AgentOperation::SendMessage { message, .. } => {
                let request = JsonRpcRequest {
                    jsonrpc: "2.0",
                    id: Uuid::now_v7().to_string(),
                    method: operation.name(),
                    params: MessageSendParams { message },
                };
                Ok(Bytes::from(serde_json::to_vec(&request)?))
            }
            AgentOperation::GetAgentCard { .. } | AgentOperation::ListAgents => {
                self.inner.encode_request(operation)
            }
            AgentOperation::ChatCompletion { .. } => Err(AgentError::Protocol(
                "Chat completions are not part of the A2A binding".into(),
            )),
        }
    }

    fn decode_response(
        &self,
        body: &[u8],
        operation: &AgentOperation,
    ) -> Result<AgentResponse, AgentError> {
        match operation {
            AgentOperation::SendMessage { .. } => {
                if body.is_empty() {
                    return Err(AgentError::EmptyResponse);
                }
                let result = Self::unwrap_envelope(body)?;
                Ok(match SendMessageResult::from_value(result)? {
                    SendMessageResult::Task(task) => AgentResponse::Task(task),
                    SendMessageResult::Message(message) => AgentResponse::Message(message),
                })
            }
            _ => self.inner.decode_response(body, operation),
        }
    }

    fn decode_event(&self, data: &str) -> Result<DecodedEvent, AgentError> {
        if data.trim() == "[DONE]" {
            return Ok(DecodedEvent::Done);
        }

        let result = Self::unwrap_envelope(data.as_bytes())?;
        let event = match StreamEvent::from_value(result) {
            Ok(event) => event,
            Err(AgentError::Protocol(reason)) => {
                tracing::warn!(%reason, "skipping unrecognised stream event");
                return Ok(DecodedEvent::Skip);
            }
            Err(e) => return Err(e),
        };

        if event.is_final() {
            Ok(DecodedEvent::Final(event))
        } else {
            Ok(DecodedEvent::Event(event))
        }
    }

    fn content_type(&self) -> &str {
        "application/json"
    }
}

#[cfg(test)]
mod tests {
    use crate::protocol::{chat::ChatCompletionRequest, task::TaskState};

    use super::*;

    fn send(stream: bool) -> AgentOperation {
        AgentOperation::SendMessage {
            message: Message::user("Tell me a joke about rain").with_message_id("test1234"),
            stream,
        }
    }

    #[test]
    fn test_encode_send_message() {
        let codec = JsonRpcCodec::new();
        let bytes = codec.encode_request(&send(false)).unwrap();

        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "message/send");
        assert!(json["id"].is_string());
        assert_eq!(json["params"]["message"]["messageId"], "test1234");
        assert_eq!(json["params"]["message"]["role"], "user");
        assert_eq!(
            json["params"]["message"]["parts"][0]["text"],
            "Tell me a joke about rain"
        );
    }

    #[test]
    fn test_encode_streaming_message() {
        let codec = JsonRpcCodec::new();
        let bytes = codec.encode_request(&send(true)).unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["method"], "message/stream");
    }

    #[test]
    fn test_encode_chat_completion_is_rejected() {
        let codec = JsonRpcCodec::new();
        let operation = AgentOperation::ChatCompletion {
            deployment: "ai-gk-chatbot".into(),
            api_version: None,
            request: ChatCompletionRequest::default(),
        };
        assert!(codec.encode_request(&operation).is_err());
    }

    #[test]
    fn test_decode_completed_task() {
        let codec = JsonRpcCodec::new();
        let json = r#"{
            "jsonrpc": "2.0",
            "id": "req-123",
            "result": {
                "kind": "task",
                "id": "task-123",
                "contextId": "",
                "status": {"state": "completed", "timestamp": "2025-01-01T00:00:00.000Z"},
                "artifacts": [{
                    "kind": "artifact",
                    "artifactId": "art-1",
                    "name": "LLM Response",
                    "parts": [{"kind": "text", "text": "Why did the cloud cry?"}]
                }]
            }
        }"#;

        let response = codec.decode_response(json.as_bytes(), &send(false));
        match response.unwrap() {
            AgentResponse::Task(task) => {
                assert_eq!(task.id, "task-123");
                assert_eq!(task.status.state, TaskState::Completed);
                assert_eq!(task.artifact_text(), "Why did the cloud cry?");
            }
            _ => panic!("Expected Task response"),
        }
    }

    #[test]
    fn test_decode_direct_message() {
        let codec = JsonRpcCodec::new();
        let json = r#"{
            "jsonrpc": "2.0",
            "id": "req-123",
            "result": {"kind": "message", "messageId": "m-1", "role": "agent",
                       "parts": [{"kind": "text", "text": "Hi"}]}
        }"#;

        let response = codec.decode_response(json.as_bytes(), &send(false));
        match response.unwrap() {
            AgentResponse::Message(message) => assert_eq!(message.text(), "Hi"),
            _ => panic!("Expected Message response"),
        }
    }

    #[test]
    fn test_decode_error_response() {
        let codec = JsonRpcCodec::new();
        let json = r#"{
            "jsonrpc": "2.0",
            "error": {"code": -32602, "message": "Invalid params"},
            "id": "req-123"
        }"#;

        match codec.decode_response(json.as_bytes(), &send(false)) {
            Err(AgentError::JsonRpc { code, message }) => {
                assert_eq!(code, -32602);
                assert_eq!(message, "Invalid params");
            }
            _ => panic!("Expected JsonRpc error"),
        }
    }

    #[test]
    fn test_decode_missing_result() {
        let codec = JsonRpcCodec::new();
        let json = r#"{"jsonrpc": "2.0", "id": "req-123"}"#;

        match codec.decode_response(json.as_bytes(), &send(false)) {
            Err(AgentError::Protocol(msg)) => assert!(msg.contains("missing 'result' field")),
            _ => panic!("Expected Protocol error"),
        }
    }

    #[test]
    fn test_decode_empty_body() {
        let codec = JsonRpcCodec::new();
        assert!(matches!(
            codec.decode_response(b"", &send(false)),
            Err(AgentError::EmptyResponse)
        ));
    }

    #[test]
    fn test_decode_event_kinds() {
        let codec = JsonRpcCodec::new();

        let working = r#"{"jsonrpc":"2.0","id":"1","result":{"kind":"status-update","taskId":"t","status":{"state":"working"},"final":false}}"#;
        assert!(matches!(
            codec.decode_event(working).unwrap(),
            DecodedEvent::Event(StreamEvent::StatusUpdate(_))
        ));

        let completed = r#"{"jsonrpc":"2.0","id":"1","result":{"kind":"status-update","taskId":"t","status":{"state":"completed"},"final":true}}"#;
        assert!(matches!(
            codec.decode_event(completed).unwrap(),
            DecodedEvent::Final(_)
        ));

        assert!(matches!(
            codec.decode_event("[DONE]").unwrap(),
            DecodedEvent::Done
        ));
    }

    #[test]
    fn test_cached_task_event_is_final() {
        let codec = JsonRpcCodec::new();
        let cached = r#"{"jsonrpc":"2.0","id":"1","result":{"kind":"task","id":"t","status":{"state":"completed"},"artifacts":[{"artifactId":"a","parts":[{"kind":"text","text":"cached"}]}],"metadata":{"cached":true}}}"#;

        match codec.decode_event(cached).unwrap() {
            DecodedEvent::Final(event) => assert_eq!(event.text().as_deref(), Some("cached")),
            _ => panic!("Expected Final event"),
        }
    }

    #[test]
    fn test_unrecognised_event_is_skipped() {
        let codec = JsonRpcCodec::new();
        let unknown = r#"{"jsonrpc":"2.0","id":"1","result":{"kind":"push-notification","taskId":"t"}}"#;

        assert!(matches!(
            codec.decode_event(unknown).unwrap(),
            DecodedEvent::Skip
        ));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(JsonRpcCodec::new().content_type(), "application/json");
    }
}
