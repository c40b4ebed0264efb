//! # Tower Chat Agent
//!
//! Tower-based clients for chat agents hosted behind an AI application gateway.
//!
//! The gateway exposes agents two ways: model deployments behind an
//! OpenAI-compatible chat completions endpoint, and Agent2Agent (A2A)
//! agents reachable over JSON-RPC with agent cards under `/.well-known/`.
//! Both are reached through the same composable stack of Tower services
//! and layers, and both stream responses over server-sent events.
//!
//! ## Features
//!
//! - **Three agent sources**: a local chat agent over a deployment, a remote
//!   A2A agent at a fixed URL, or a remote agent resolved from its card
//! - **Complete or streamed responses**, rendered as they arrive
//! - **Composable middleware**: credentials, validation and timeouts as Tower layers
//! - **Pluggable credentials**: API keys, bearer tokens or the Azure CLI
//!
//! ## Example
//!
//! ```rust,no_run
//! use tower_chat_agent::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AgentError> {
//!     let config = RemoteAgentConfig::new(
//!         "test-agent",
//!         "http://localhost:8080/api/v1/dev/aigateway/agents/ai-gk-chatbot/invoke",
//!     )?;
//!
//!     let mut renderer = Renderer::stdout();
//!     Invocation::complete()
//!         .with_echo(true)
//!         .with_label("Agent Response:")
//!         .invoke(
//!             AgentSource::Remote(config),
//!             ChatMessage::user("Tell me a joke about rain"),
//!             &mut renderer,
//!         )
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod client;
pub mod codec;
pub mod config;
pub mod credential;
pub mod invoke;
pub mod layer;
pub mod protocol;
pub mod render;
pub mod service;
pub mod transport;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        agent::{
            Agent, AgentOptions, AgentRunResponse, ChatAgent, ChatClient, RemoteAgent,
            ResponseStream, ResponseUpdate,
        },
        client::{AgentClient, AgentClientBuilder, CardResolver},
        config::{
            CredentialConfig, DiscoveryConfig, GatewayConfig, GenerationParams, RemoteAgentConfig,
        },
        invoke::{AgentSource, Invocation, ResponseMode},
        protocol::error::AgentError,
        protocol::{AgentCard, ChatMessage, ChatRole, Message, Role, Task, TaskState},
        render::Renderer,
    };
}
