//! Connecting to agents through a local gateway
//!
//! A small axum server stands in for the gateway: it serves the public
//! card, the authenticated extended card and the JSON-RPC invocation
//! endpoints the cards point at.

use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_chat_agent::prelude::*;

const GATEWAY_TOKEN: &str = "gateway-token";

const CARD_ROUTE: &str = "/agents/.well-known/ai-gk-chatbot.json";
const EXTENDED_CARD_ROUTE: &str = "/agents/agent/authenticatedExtendedCard";
const INVOKE_ROUTE: &str = "/agents/ai-gk-chatbot/invoke";
const EXTENDED_INVOKE_ROUTE: &str = "/agents/ai-gk-chatbot/extended/invoke";

#[derive(Clone)]
struct Gateway {
    base: String,
    serves_extended_card: bool,
    hits: Arc<Mutex<Vec<&'static str>>>,
}

impl Gateway {
    fn hit(&self, route: &'static str) {
        self.hits.lock().unwrap().push(route);
    }

    fn card(&self, name: &str, invoke_path: &str) -> Value {
        json!({
            "protocolVersion": "0.3.0",
            "name": name,
            "description": "General chatbot",
            "url": format!("{}{}", self.base, invoke_path),
            "preferredTransport": "JSONRPC",
            "capabilities": {"streaming": true},
            "defaultInputModes": ["text"],
            "defaultOutputModes": ["text"],
            "skills": [],
            "supportsAuthenticatedExtendedCard": true
        })
    }
}

/// A running gateway and the routes it has served so far
struct LocalGateway {
    agents_url: String,
    hits: Arc<Mutex<Vec<&'static str>>>,
}

impl LocalGateway {
    async fn start(serves_extended_card: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(Mutex::new(Vec::new()));

        let gateway = Gateway {
            base: base.clone(),
            serves_extended_card,
            hits: hits.clone(),
        };
        let app = Router::new()
            .route(CARD_ROUTE, get(public_card))
            .route(EXTENDED_CARD_ROUTE, get(extended_card))
            .route(INVOKE_ROUTE, post(invoke))
            .route(EXTENDED_INVOKE_ROUTE, post(invoke_extended))
            .with_state(gateway);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            agents_url: format!("{}/agents", base),
            hits,
        }
    }

    fn hits(&self) -> Vec<&'static str> {
        self.hits.lock().unwrap().clone()
    }
}

async fn public_card(State(gateway): State<Gateway>) -> Json<Value> {
    gateway.hit("card");
    Json(gateway.card("ai-gk-chatbot", INVOKE_ROUTE))
}

async fn extended_card(State(gateway): State<Gateway>, headers: HeaderMap) -> Response {
    gateway.hit("extended-card");
    if !gateway.serves_extended_card {
        return StatusCode::NOT_FOUND.into_response();
    }

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == format!("Bearer {}", GATEWAY_TOKEN))
        .unwrap_or(false);
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let card = gateway.card("ai-gk-chatbot-extended", EXTENDED_INVOKE_ROUTE);
    Json(card).into_response()
}

async fn invoke(State(gateway): State<Gateway>, Json(request): Json<Value>) -> Response {
    gateway.hit("invoke");
    reply(&request, &["Once", " upon", " a time"])
}

async fn invoke_extended(State(gateway): State<Gateway>, Json(request): Json<Value>) -> Response {
    gateway.hit("extended-invoke");
    reply(&request, &["Once", " upon", " a tide"])
}

/// Answers `message/stream` with SSE frames and `message/send` with a task
fn reply(request: &Value, chunks: &[&str]) -> Response {
    let id = request["id"].clone();

    if request["method"] == "message/send" {
        let task = json!({
            "kind": "task",
            "id": "t-1",
            "contextId": "c-1",
            "status": {"state": "completed"},
            "artifacts": [{
                "artifactId": "a-1",
                "parts": [{"kind": "text", "text": chunks.concat()}]
            }]
        });
        return Json(json!({"jsonrpc": "2.0", "id": id, "result": task})).into_response();
    }

    let mut events = vec![
        json!({"kind": "task", "id": "t-1", "contextId": "c-1", "status": {"state": "submitted"}}),
        json!({"kind": "status-update", "taskId": "t-1", "contextId": "c-1", "final": false,
               "status": {"state": "working"}}),
    ];
    for (index, chunk) in chunks.iter().enumerate() {
        events.push(json!({
            "kind": "artifact-update",
            "taskId": "t-1",
            "contextId": "c-1",
            "append": index > 0,
            "artifact": {"artifactId": "a-1", "parts": [{"kind": "text", "text": chunk}]}
        }));
    }
    events.push(json!({"kind": "status-update", "taskId": "t-1", "contextId": "c-1", "final": true,
                       "status": {"state": "completed"}}));

    let body: String = events
        .iter()
        .map(|event| json!({"jsonrpc": "2.0", "id": id, "result": event}))
        .map(|frame| format!("data: {}\n\n", frame))
        .collect();

    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

async fn discover_and_stream(config: DiscoveryConfig) -> Result<String, AgentError> {
    let mut renderer = Renderer::new(Vec::new());

    Invocation::streaming()
        .with_echo(true)
        .with_label("Agent Response:")
        .invoke(
            AgentSource::Discovered(config),
            ChatMessage::new("test1234", ChatRole::User, "Tell me a story about boats"),
            &mut renderer,
        )
        .await?;

    Ok(String::from_utf8(renderer.into_inner()).unwrap())
}

#[tokio::test]
async fn test_discovered_stream_with_public_card() {
    let gateway = LocalGateway::start(true).await;
    let config = DiscoveryConfig::new(&gateway.agents_url)
        .unwrap()
        .with_extended_card(false);

    let printed = discover_and_stream(config).await.unwrap();

    assert_eq!(
        printed,
        "User message:  Tell me a story about boats\nAgent Response: Once upon a time\n"
    );
    assert_eq!(gateway.hits(), ["card", "invoke"]);
}

#[tokio::test]
async fn test_discovered_stream_falls_back_to_public_card() {
    let gateway = LocalGateway::start(false).await;
    let config = DiscoveryConfig::new(&gateway.agents_url)
        .unwrap()
        .with_extended_card(true);

    let printed = discover_and_stream(config).await.unwrap();

    assert_eq!(
        printed,
        "User message:  Tell me a story about boats\nAgent Response: Once upon a time\n"
    );
    assert_eq!(gateway.hits(), ["card", "extended-card", "invoke"]);
}

#[tokio::test]
async fn test_discovered_stream_with_extended_card() {
    let gateway = LocalGateway::start(true).await;
    let config = DiscoveryConfig::new(&gateway.agents_url)
        .unwrap()
        .with_extended_card(true)
        .with_credential(CredentialConfig::Bearer(GATEWAY_TOKEN.into()));

    let printed = discover_and_stream(config).await.unwrap();

    assert_eq!(
        printed,
        "User message:  Tell me a story about boats\nAgent Response: Once upon a tide\n"
    );
    assert_eq!(gateway.hits(), ["card", "extended-card", "extended-invoke"]);
}

#[tokio::test]
async fn test_remote_agent_complete_response() {
    let gateway = LocalGateway::start(false).await;
    let url = format!("{}/ai-gk-chatbot/invoke", gateway.agents_url);
    let config = RemoteAgentConfig::new("test-agent", &url).unwrap();
    let mut renderer = Renderer::new(Vec::new());

    let text = Invocation::complete()
        .with_echo(true)
        .with_label("Agent Response:")
        .invoke(
            AgentSource::Remote(config),
            ChatMessage::new("test1234", ChatRole::User, "Tell me a joke about rain"),
            &mut renderer,
        )
        .await
        .unwrap();

    assert_eq!(text, "Once upon a time");
    assert_eq!(
        String::from_utf8(renderer.into_inner()).unwrap(),
        "User message:  Tell me a joke about rain\nAgent Response:\nOnce upon a time\n"
    );
    assert_eq!(gateway.hits(), ["invoke"]);
}
