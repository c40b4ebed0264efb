//! Chat agents backed by a model deployment behind the gateway's load balancer

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::TryStreamExt;

use crate::{
    agent::{Agent, AgentRunResponse, ResponseStream, ResponseUpdate},
    client::{AgentClient, AgentClientBuilder, AgentService},
    codec::ChatCompletionCodec,
    config::{GatewayConfig, GenerationParams},
    credential::CredentialProvider,
    protocol::{
        chat::{ChatCompletionMessage, ChatCompletionRequest},
        error::AgentError,
        message::ChatMessage,
    },
    transport::{HttpTransport, Transport},
};

/// Client for a model deployment behind the gateway
///
/// Holds the connection settings; [`ChatClient::create_agent`] wraps them
/// into agents with a name and instructions.
pub struct ChatClient<T: Transport = HttpTransport> {
    transport: T,
    deployment: String,
    api_version: Option<String>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    timeout: Duration,
}

impl ChatClient<HttpTransport> {
    /// Create a client for the configured gateway and deployment
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: GatewayConfig) -> Result<Self, AgentError> {
        let transport = HttpTransport::with_timeout(config.base_url.clone(), config.timeout)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> ChatClient<T> {
    /// Create a client over an existing transport
    ///
    /// The transport's base URL is used instead of `config.base_url`.
    pub fn with_transport(config: GatewayConfig, transport: T) -> Self {
        Self {
            transport,
            deployment: config.deployment,
            api_version: config.api_version,
            credentials: config.credential.into_provider(),
            timeout: config.timeout,
        }
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    /// Create an agent that answers through this client's deployment
    ///
    /// # Errors
    ///
    /// Returns an error if the client stack cannot be built
    pub fn create_agent(&self, options: AgentOptions) -> Result<ChatAgent, AgentError> {
        let client = AgentClientBuilder::new(self.transport.base_url().clone())
            .with_transport(self.transport.clone())
            .with_codec(Arc::new(ChatCompletionCodec::new()))
            .with_credential_provider(self.credentials.clone())
            .with_timeout(self.timeout)
            .build()?;

        Ok(ChatAgent {
            client,
            deployment: self.deployment.clone(),
            api_version: self.api_version.clone(),
            options,
            thread_id: None,
        })
    }
}

/// Name, instructions and generation parameters of a chat agent
#[derive(Debug, Clone, Default)]
pub struct AgentOptions {
    pub name: String,
    pub description: Option<String>,

    /// Sent as a system message ahead of every user message
    pub instructions: Option<String>,

    pub params: GenerationParams,
}

impl AgentOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }
}

/// An agent answering through chat completions
///
/// The gateway keeps conversation state keyed by the `x-thread-id` header.
/// The agent remembers the thread id of the last response and sends it
/// with the next request.
pub struct ChatAgent {
    client: AgentClient<AgentService>,
    deployment: String,
    api_version: Option<String>,
    options: AgentOptions,
    thread_id: Option<String>,
}

impl ChatAgent {
    /// Thread id the gateway assigned to this conversation
    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    fn request(&self, message: &ChatMessage) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(instructions) = &self.options.instructions {
            let system = ChatMessage::system(instructions.as_str());
            messages.push(ChatCompletionMessage::from(&system));
        }
        messages.push(ChatCompletionMessage::from(message));

        let mut request = ChatCompletionRequest::new(messages);
        self.options.params.apply(&mut request);
        request
    }

    fn remember_thread(&mut self, thread_id: Option<String>) {
        if thread_id.is_some() {
            self.thread_id = thread_id;
        }
    }
}

#[async_trait]
impl Agent for ChatAgent {
    fn name(&self) -> &str {
        &self.options.name
    }

    fn description(&self) -> Option<&str> {
        self.options.description.as_deref()
    }

    async fn run(&mut self, message: ChatMessage) -> Result<AgentRunResponse, AgentError> {
        let request = self.request(&message);
        let completion = self
            .client
            .chat_completion(
                self.deployment.as_str(),
                self.api_version.clone(),
                request,
                self.thread_id.as_deref(),
            )
            .await?;

        self.remember_thread(completion.thread_id.clone());

        let text = completion
            .text()
            .filter(|text| !text.is_empty())
            .ok_or(AgentError::EmptyResponse)?;

        Ok(AgentRunResponse::new(ChatMessage::assistant(text))
            .with_context_id(completion.thread_id.clone())
            .with_usage(completion.usage.clone()))
    }

    async fn run_stream(&mut self, message: ChatMessage) -> Result<ResponseStream, AgentError> {
        let request = self.request(&message);
        let response = self
            .client
            .chat_completion_stream(
                self.deployment.as_str(),
                self.api_version.clone(),
                request,
                self.thread_id.as_deref(),
            )
            .await?;

        self.remember_thread(response.thread_id.clone());

        Ok(Box::pin(response.events.map_ok(ResponseUpdate::from_event)))
    }
}
