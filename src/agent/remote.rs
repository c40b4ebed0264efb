//! Proxies for A2A agents exposed by the gateway

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use url::Url;

use crate::{
    agent::{Agent, AgentRunResponse, ResponseStream, ResponseUpdate},
    client::{AgentClient, AgentClientBuilder, AgentService},
    config::{GenerationParams, RemoteAgentConfig},
    protocol::{
        agent::AgentCard,
        error::AgentError,
        message::{ChatMessage, Message},
    },
    transport::{HttpTransport, Transport},
};

/// Metadata key the gateway reads generation parameters from
const MODEL_PARAMS_KEY: &str = "modelParams";

/// A local handle to an A2A agent
///
/// Messages are sent as JSON-RPC `message/send` or `message/stream` to the
/// agent's invocation URL. The context id of the last response is attached
/// to the next message so the agent keeps the conversation.
pub struct RemoteAgent {
    client: AgentClient<AgentService>,
    name: String,
    description: Option<String>,
    url: Url,
    params: GenerationParams,
    context_id: Arc<Mutex<Option<String>>>,
}

impl RemoteAgent {
    /// Create a proxy for the configured invocation URL
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: RemoteAgentConfig) -> Result<Self, AgentError> {
        let transport = HttpTransport::with_timeout(config.url.clone(), config.timeout)?;
        Self::with_transport(config, transport)
    }

    /// Create a proxy for the agent a card describes
    pub fn from_card(card: &AgentCard) -> Result<Self, AgentError> {
        Self::new(RemoteAgentConfig::from_card(card))
    }

    /// Create a proxy over an existing transport
    ///
    /// The transport's base URL must be the invocation URL.
    pub fn with_transport<T: Transport>(
        config: RemoteAgentConfig,
        transport: T,
    ) -> Result<Self, AgentError> {
        let client = AgentClientBuilder::new(config.url.clone())
            .with_transport(transport)
            .with_credential_provider(config.credential.into_provider())
            .with_timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            name: config.name,
            description: config.description,
            url: config.url,
            params: config.params,
            context_id: Arc::new(Mutex::new(None)),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Context id of the conversation with the agent
    pub fn context_id(&self) -> Option<String> {
        self.context_id
            .lock()
            .ok()
            .and_then(|context| context.clone())
    }

    fn message(&self, message: &ChatMessage) -> Message {
        let mut outgoing = Message::user(message.text()).with_message_id(message.id());

        if let Some(context_id) = self.context_id() {
            outgoing = outgoing.with_context_id(context_id);
        }
        if let Some(params) = self.params.to_model_params() {
            outgoing = outgoing.with_metadata(MODEL_PARAMS_KEY, params);
        }

        outgoing
    }
}

fn remember(slot: &Mutex<Option<String>>, context_id: Option<&str>) {
    if let (Some(context_id), Ok(mut current)) = (context_id, slot.lock()) {
        *current = Some(context_id.to_string());
    }
}

#[async_trait]
impl Agent for RemoteAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    async fn run(&mut self, message: ChatMessage) -> Result<AgentRunResponse, AgentError> {
        let outgoing = self.message(&message);
        let result = self.client.send_message(outgoing).await?.ensure_success()?;

        remember(&self.context_id, result.context_id());

        let text = result.text();
        if text.is_empty() {
            return Err(AgentError::EmptyResponse);
        }

        Ok(AgentRunResponse::new(ChatMessage::assistant(text))
            .with_context_id(result.context_id().map(str::to_string))
            .with_task_id(result.task_id().map(str::to_string))
            .with_usage(result.usage()))
    }

    async fn run_stream(&mut self, message: ChatMessage) -> Result<ResponseStream, AgentError> {
        let outgoing = self.message(&message);
        let response = self.client.send_message_streaming(outgoing).await?;

        let context = self.context_id.clone();
        let updates = response.events.map(move |event| {
            let event = event?;
            if let Some(failure) = event.failure() {
                return Err(failure);
            }
            remember(&context, event.context_id());
            Ok(ResponseUpdate::from_event(event))
        });

        Ok(Box::pin(updates))
    }
}
