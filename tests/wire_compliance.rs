//! Gateway wire format compliance tests
//!
//! These tests drive the public client API over a recording transport and
//! check the requests against what the gateway's A2A and chat completion
//! endpoints accept, and the responses against what they send back.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use serde_json::{json, Value};
use tower_chat_agent::{
    client::AgentClientBuilder,
    codec::ChatCompletionCodec,
    protocol::{
        chat::{ChatCompletionMessage, ChatCompletionRequest},
        AgentError, ChatMessage, Message, StreamEvent, TaskState,
    },
    transport::{StreamingTransportResponse, Transport, TransportRequest, TransportResponse},
};
use url::Url;

const INVOKE_URL: &str = "http://localhost:8080/api/v1/dev/aigateway/agents/ai-gk-chatbot/invoke";

/// Answers every request with a canned response and keeps the requests
#[derive(Clone)]
struct RecordingTransport {
    base_url: Url,
    status: u16,
    headers: HashMap<String, String>,
    body: Bytes,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl RecordingTransport {
    fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            base_url: Url::parse(INVOKE_URL).unwrap(),
            status,
            headers: HashMap::new(),
            body: body.into(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn json(status: u16, value: Value) -> Self {
        Self::new(status, value.to_string())
    }

    fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Url::parse(base_url).unwrap();
        self
    }

    fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    fn last_request(&self) -> TransportRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }

    fn last_body(&self) -> Value {
        serde_json::from_slice(&self.last_request().body).unwrap()
    }

    fn respond(&self, request: TransportRequest) -> TransportResponse {
        self.requests.lock().unwrap().push(request);
        TransportResponse {
            status: self.status,
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), AgentError>> {
        Poll::Ready(Ok(()))
    }

    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, AgentError> {
        Ok(self.respond(request))
    }

    async fn execute_streaming(
        &self,
        request: TransportRequest,
    ) -> Result<StreamingTransportResponse, AgentError> {
        let response = self.respond(request);
        let chunks: Vec<Result<Bytes, AgentError>> = response
            .body
            .chunks(7)
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

fn completed_task() -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": "1",
        "result": {
            "kind": "task",
            "id": "0199e7a4-task",
            "contextId": "0199e7a4-ctx",
            "status": {"state": "completed", "timestamp": "2025-10-14T10:00:00.000Z"},
            "artifacts": [{
                "artifactId": "a-1",
                "name": "LLM Response",
                "parts": [{"kind": "text", "text": "Why did the raindrop feel lonely?"}],
                "metadata": {"usage": {"prompt_tokens": 12, "completion_tokens": 9, "total_tokens": 21}}
            }]
        }
    })
}

#[tokio::test]
async fn test_message_send_envelope() {
    let transport = RecordingTransport::json(200, completed_task());
    let mut client = AgentClientBuilder::new(transport.base_url.clone())
        .with_transport(transport.clone())
        .build()
        .unwrap();

    let message = Message::user("Tell me a joke about rain").with_message_id("test1234");
    client.send_message(message).await.unwrap();

    let request = transport.last_request();
    assert_eq!(request.method, "POST");
    assert_eq!(request.endpoint, "");
    assert_eq!(
        request.headers.get("Content-Type").map(String::as_str),
        Some("application/json")
    );

    let body = transport.last_body();
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["method"], "message/send");
    assert!(body["id"].is_string());

    let message = &body["params"]["message"];
    assert_eq!(message["kind"], "message");
    assert_eq!(message["role"], "user");
    assert_eq!(message["messageId"], "test1234");
    assert_eq!(message["parts"][0]["kind"], "text");
    assert_eq!(message["parts"][0]["text"], "Tell me a joke about rain");

    // Unset optional fields stay off the wire
    assert!(message.get("contextId").is_none());
    assert!(message.get("taskId").is_none());
}

#[tokio::test]
async fn test_completed_task_result() {
    let transport = RecordingTransport::json(200, completed_task());
    let mut client = AgentClientBuilder::new(transport.base_url.clone())
        .with_transport(transport)
        .build()
        .unwrap();

    let result = client
        .send_message(Message::user("Tell me a joke about rain"))
        .await
        .unwrap();

    assert_eq!(result.text(), "Why did the raindrop feel lonely?");
    assert_eq!(result.context_id(), Some("0199e7a4-ctx"));
    assert_eq!(result.usage().map(|u| u.total_tokens), Some(21));
}

#[tokio::test]
async fn test_message_stream_sequence() {
    let frames = [
        json!({"kind": "task", "id": "t-1", "contextId": "c-1", "status": {"state": "submitted"}}),
        json!({"kind": "status-update", "taskId": "t-1", "contextId": "c-1", "final": false,
               "status": {"state": "working", "message": {"kind": "message", "role": "agent", "messageId": "m-1",
                          "parts": [{"kind": "text", "text": "Processing request..."}]}}}),
        json!({"kind": "artifact-update", "taskId": "t-1", "contextId": "c-1", "append": false,
               "artifact": {"artifactId": "a-1", "name": "LLM Response Chunk 1", "parts": [{"kind": "text", "text": "The boat"}]}}),
        json!({"kind": "artifact-update", "taskId": "t-1", "contextId": "c-1", "append": true,
               "artifact": {"artifactId": "a-1", "name": "LLM Response Chunk 2", "parts": [{"kind": "text", "text": " sailed on."}]}}),
        json!({"kind": "status-update", "taskId": "t-1", "contextId": "c-1", "final": true,
               "status": {"state": "completed"}}),
    ];
    let body: String = frames
        .iter()
        .map(|result| json!({"jsonrpc": "2.0", "id": "1", "result": result}))
        .map(|frame| format!("data: {}\n\n", frame))
        .collect();

    let transport =
        RecordingTransport::new(200, body).with_header("content-type", "text/event-stream");
    let mut client = AgentClientBuilder::new(transport.base_url.clone())
        .with_transport(transport.clone())
        .build()
        .unwrap();

    let response = client
        .send_message_streaming(Message::user("Tell me a story about boats"))
        .await
        .unwrap();
    let events: Vec<StreamEvent> = response.events.map(|event| event.unwrap()).collect().await;

    let sent = transport.last_request();
    assert_eq!(transport.last_body()["method"], "message/stream");
    assert_eq!(
        sent.headers.get("Accept").map(String::as_str),
        Some("text/event-stream")
    );

    let kinds: Vec<&str> = events.iter().map(StreamEvent::kind).collect();
    assert_eq!(
        kinds.join(" "),
        "task status-update artifact-update artifact-update status-update"
    );

    let text: String = events.iter().filter_map(StreamEvent::text).collect();
    assert_eq!(text, "The boat sailed on.");
    assert_eq!(
        events.last().and_then(StreamEvent::state),
        Some(TaskState::Completed)
    );
}

#[tokio::test]
async fn test_chat_completion_request() {
    let transport = RecordingTransport::json(
        200,
        json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Arr!"}, "finish_reason": "stop"}]
        }),
    )
    .with_base_url("http://localhost:8080/api/v1/dev/aigateway/lb")
    .with_header("x-thread-id", "thread-1");

    let mut client = AgentClientBuilder::new(transport.base_url.clone())
        .with_transport(transport.clone())
        .with_codec(Arc::new(ChatCompletionCodec::new()))
        .with_api_key_auth("secret", "api-key")
        .build()
        .unwrap();

    let message = ChatMessage::user("Tell me a joke about a pirate.");
    let mut request = ChatCompletionRequest::new(vec![ChatCompletionMessage::from(&message)]);
    request.max_tokens = Some(200);

    let completion = client
        .chat_completion("ai-gk-chatbot", Some("2024-10-21".into()), request, None)
        .await
        .unwrap();

    let sent = transport.last_request();
    assert_eq!(
        sent.endpoint,
        "/deployments/ai-gk-chatbot/chat/completions?api-version=2024-10-21"
    );
    assert_eq!(
        sent.headers.get("api-key").map(String::as_str),
        Some("secret")
    );
    assert!(!sent.headers.contains_key("x-thread-id"));

    let body = transport.last_body();
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["max_tokens"], 200);
    assert!(body.get("stream").is_none());

    assert_eq!(completion.text(), Some("Arr!"));
    assert_eq!(completion.thread_id.as_deref(), Some("thread-1"));
}

#[tokio::test]
async fn test_chat_completion_stream_request() {
    let body = concat!(
        "data: {\"id\":\"c\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"\"}}]}\n\n",
        "data: {\"id\":\"c\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Beep\"}}]}\n\n",
        "data: {\"id\":\"c\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        "data: {\"id\":\"c\",\"choices\":[],\"usage\":{\"prompt_tokens\":5,\"completion_tokens\":1,\"total_tokens\":6}}\n\n",
        "data: [DONE]\n\n",
    );
    let transport = RecordingTransport::new(200, body)
        .with_base_url("http://localhost:8080/api/v1/dev/aigateway/lb");

    let mut client = AgentClientBuilder::new(transport.base_url.clone())
        .with_transport(transport.clone())
        .with_codec(Arc::new(ChatCompletionCodec::new()))
        .build()
        .unwrap();

    let message = ChatMessage::user("Tell me a short story about a robot");
    let request = ChatCompletionRequest::new(vec![ChatCompletionMessage::from(&message)]);
    let response = client
        .chat_completion_stream("ai-gk-chatbot", None, request, Some("thread-1"))
        .await
        .unwrap();
    let events: Vec<StreamEvent> = response.events.map(|e| e.unwrap()).collect().await;

    let sent = transport.last_request();
    assert_eq!(
        sent.headers.get("x-thread-id").map(String::as_str),
        Some("thread-1")
    );

    let body = transport.last_body();
    assert_eq!(body["stream"], true);
    assert_eq!(body["stream_options"]["include_usage"], true);

    assert_eq!(events.len(), 4);
    let text: String = events.iter().filter_map(StreamEvent::text).collect();
    assert_eq!(text, "Beep");
    assert_eq!(events[3].usage().map(|u| u.total_tokens), Some(6));
}

#[tokio::test]
async fn test_gateway_error_bodies() {
    let cases = [
        (
            400,
            json!({"json": "2.0", "error": {"message": "Request is missing 'message'", "code": -32602}}),
        ),
        (401, json!({"error": "Unauthorized"})),
        (
            404,
            json!({"json": "2.0", "error": {"message": "Agent not found", "code": -32602}}),
        ),
        (429, json!({"error": {"message": "Too many requests"}})),
        (500, json!({"message": "Internal error"})),
    ];

    for (status, body) in cases {
        let transport = RecordingTransport::json(status, body);
        let mut client = AgentClientBuilder::new(transport.base_url.clone())
            .with_transport(transport)
            .build()
            .unwrap();

        let result = client.send_message(Message::user("Hello")).await;
        match (status, result.unwrap_err()) {
            (400, AgentError::JsonRpc { code, message }) => {
                assert_eq!(code, -32602);
                assert_eq!(message, "Request is missing 'message'");
            }
            (401, AgentError::Auth(message)) => assert_eq!(message, "Unauthorized"),
            (404, AgentError::AgentNotFound { url }) => {
                assert!(url.ends_with("/agents/ai-gk-chatbot/invoke"))
            }
            (429, AgentError::RateLimitExceeded) => {}
            (500, AgentError::Transport(message)) => {
                assert_eq!(message, "HTTP 500: Internal error")
            }
            (status, error) => panic!("Unexpected error for HTTP {}: {:?}", status, error),
        }
    }
}

#[tokio::test]
async fn test_streaming_error_status() {
    let transport = RecordingTransport::json(
        404,
        json!({"json": "2.0", "error": {"message": "Agent not found", "code": -32602}}),
    );
    let mut client = AgentClientBuilder::new(transport.base_url.clone())
        .with_transport(transport)
        .build()
        .unwrap();

    assert!(matches!(
        client.send_message_streaming(Message::user("Hello")).await,
        Err(AgentError::AgentNotFound { .. })
    ));
}
