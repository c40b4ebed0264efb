//! Operations a client can perform against the gateway

use super::{chat::ChatCompletionRequest, message::Message};

/// Well-known path of the gateway's agent registry
pub const AGENT_REGISTRY_PATH: &str = "/.well-known/agents.json";

/// Gateway operations
///
/// Each operation is binding-independent: the codec decides how it is
/// encoded, the transport decides where the endpoint lives.
#[derive(Debug, Clone)]
pub enum AgentOperation {
    /// Send a message to an A2A agent (`message/send` or `message/stream`)
    SendMessage {
        /// The message to send
        message: Message,

        /// Whether to stream the response
        stream: bool,
    },

    /// Fetch an agent card from a path relative to the transport's base URL
    GetAgentCard {
        /// Relative card path, e.g. `/.well-known/ai-gk-chatbot.json`
        path: String,
    },

    /// Fetch the gateway's agent registry
    ListAgents,

    /// Run a chat completion against a model deployment
    ChatCompletion {
        deployment: String,
        api_version: Option<String>,
        request: ChatCompletionRequest,
    },
}

impl AgentOperation {
    /// Get the endpoint path for this operation
    ///
    /// A2A messages are posted to the invocation URL itself, so their
    /// endpoint is empty.
    pub fn endpoint(&self) -> String {
        match self {
            AgentOperation::SendMessage { .. } => String::new(),
            AgentOperation::GetAgentCard { path } => {
                if path.starts_with('/') {
                    path.clone()
                } else {
                    format!("/{}", path)
                }
            }
            AgentOperation::ListAgents => AGENT_REGISTRY_PATH.to_string(),
            AgentOperation::ChatCompletion {
                deployment,
                api_version,
                ..
            } => match api_version {
                Some(version) => format!(
                    "/deployments/{}/chat/completions?api-version={}",
                    deployment, version
                ),
                None => format!("/deployments/{}/chat/completions", deployment),
            },
        }
    }

    /// Get the HTTP method for this operation
    pub fn method(&self) -> &'static str {
        match self {
            AgentOperation::SendMessage { .. } | AgentOperation::ChatCompletion { .. } => "POST",
            AgentOperation::GetAgentCard { .. } | AgentOperation::ListAgents => "GET",
        }
    }

    /// Check if this operation expects a streaming response
    pub fn is_streaming(&self) -> bool {
        match self {
            AgentOperation::SendMessage { stream, .. } => *stream,
            AgentOperation::ChatCompletion { request, .. } => request.is_streaming(),
            _ => false,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            AgentOperation::SendMessage { stream: true, .. } => "message/stream",
            AgentOperation::SendMessage { stream: false, .. } => "message/send",
            AgentOperation::GetAgentCard { .. } => "agent-card",
            AgentOperation::ListAgents => "agent-registry",
            AgentOperation::ChatCompletion { .. } => "chat/completions",
        }
    }
}
