//! High-level gateway client

use tower::ServiceExt;
use tower_service::Service;

use crate::{
    client::config::ClientConfig,
    protocol::{
        chat::{ChatCompletion, ChatCompletionRequest, THREAD_ID_HEADER},
        AgentCard, AgentError, AgentOperation, AgentRegistry, Message, SendMessageResult,
    },
    service::{AgentRequest, AgentResponse, RequestContext, StreamingResponse},
};

/// High-level client for the gateway's agent and chat endpoints
///
/// This client wraps a Tower service and provides one method per operation.
/// The service is generic over any implementation that satisfies the Service
/// trait bounds; [`AgentClientBuilder`](crate::client::AgentClientBuilder)
/// assembles the default stack.
///
/// # Example
///
/// ```rust,no_run
/// use tower_chat_agent::prelude::*;
///
/// # async fn example() -> Result<(), AgentError> {
/// let url = "http://localhost:8080/api/v1/dev/aigateway/agents/ai-gk-chatbot/invoke"
///     .parse()
///     .unwrap();
/// let mut client = AgentClientBuilder::new_http(url).build()?;
///
/// let result = client.send_message(Message::user("Tell me a joke about rain")).await?;
/// println!("{}", result.text());
/// # Ok(())
/// # }
/// ```
pub struct AgentClient<S> {
    service: S,
    config: ClientConfig,
}

impl<S> AgentClient<S>
where
    S: Service<AgentRequest, Response = AgentResponse, Error = AgentError>,
{
    /// Create a new agent client
    ///
    /// # Arguments
    ///
    /// * `service` - The Tower service that handles requests
    /// * `config` - Client configuration
    pub fn new(service: S, config: ClientConfig) -> Self {
        Self { service, config }
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a request context from the client configuration
    fn build_context(&self) -> RequestContext {
        // Credentials are set by the AuthLayer
        RequestContext::new(self.config.agent_url.clone())
    }

    async fn call(&mut self, request: AgentRequest) -> Result<AgentResponse, AgentError> {
        self.service.ready().await?.call(request).await
    }

    async fn execute(&mut self, operation: AgentOperation) -> Result<AgentResponse, AgentError> {
        let request = AgentRequest::new(operation, self.build_context());
        self.call(request).await
    }

    /// Send a message to an A2A agent and wait for the result
    ///
    /// # Arguments
    ///
    /// * `message` - The message to send to the agent
    ///
    /// # Returns
    ///
    /// The task or direct message the agent answered with
    ///
    /// # Errors
    ///
    /// Returns an error if the message fails to send or the response is invalid
    pub async fn send_message(
        &mut self,
        message: Message,
    ) -> Result<SendMessageResult, AgentError> {
        let operation = AgentOperation::SendMessage {
            message,
            stream: false,
        };

        self.execute(operation)
            .await?
            .into_send_result()
            .ok_or_else(|| {
                AgentError::Protocol("Expected task or message response from send_message".into())
            })
    }

    /// Send a message with streaming enabled (`message/stream`)
    ///
    /// # Returns
    ///
    /// The open event stream. Events arrive as the agent produces them.
    pub async fn send_message_streaming(
        &mut self,
        message: Message,
    ) -> Result<StreamingResponse, AgentError> {
        let operation = AgentOperation::SendMessage {
            message,
            stream: true,
        };

        self.execute(operation)
            .await?
            .into_stream()
            .ok_or_else(|| {
                AgentError::Protocol("Expected event stream from send_message_streaming".into())
            })
    }

    /// Fetch an agent card
    ///
    /// # Arguments
    ///
    /// * `path` - Card path relative to the client's URL
    pub async fn get_agent_card(
        &mut self,
        path: impl Into<String>,
    ) -> Result<AgentCard, AgentError> {
        let operation = AgentOperation::GetAgentCard { path: path.into() };

        self.execute(operation)
            .await?
            .into_agent_card()
            .ok_or_else(|| AgentError::Protocol("Expected agent card response".into()))
    }

    /// Fetch the gateway's agent registry
    pub async fn list_agents(&mut self) -> Result<AgentRegistry, AgentError> {
        self.execute(AgentOperation::ListAgents)
            .await?
            .into_agent_registry()
            .ok_or_else(|| AgentError::Protocol("Expected agent registry response".into()))
    }

    fn chat_request(
        &self,
        deployment: impl Into<String>,
        api_version: Option<String>,
        request: ChatCompletionRequest,
        thread_id: Option<&str>,
    ) -> AgentRequest {
        let operation = AgentOperation::ChatCompletion {
            deployment: deployment.into(),
            api_version,
            request,
        };

        let mut context = self.build_context();
        if let Some(thread_id) = thread_id {
            context = context.with_metadata(THREAD_ID_HEADER, thread_id);
        }

        AgentRequest::new(operation, context)
    }

    /// Run a chat completion against a model deployment
    ///
    /// # Arguments
    ///
    /// * `deployment` - Model deployment name
    /// * `api_version` - Optional `api-version` query parameter
    /// * `request` - The completion request
    /// * `thread_id` - Conversation thread to continue, sent as `x-thread-id`
    ///
    /// # Returns
    ///
    /// The completion, with the thread id the gateway answered with
    pub async fn chat_completion(
        &mut self,
        deployment: impl Into<String>,
        api_version: Option<String>,
        request: ChatCompletionRequest,
        thread_id: Option<&str>,
    ) -> Result<ChatCompletion, AgentError> {
        let request = self.chat_request(deployment, api_version, request, thread_id);

        self.call(request)
            .await?
            .into_chat_completion()
            .ok_or_else(|| AgentError::Protocol("Expected chat completion response".into()))
    }

    /// Run a streaming chat completion
    ///
    /// The request is switched to streaming with usage reporting.
    pub async fn chat_completion_stream(
        &mut self,
        deployment: impl Into<String>,
        api_version: Option<String>,
        request: ChatCompletionRequest,
        thread_id: Option<&str>,
    ) -> Result<StreamingResponse, AgentError> {
        let request = self.chat_request(deployment, api_version, request.streaming(), thread_id);

        self.call(request)
            .await?
            .into_stream()
            .ok_or_else(|| AgentError::Protocol("Expected event stream response".into()))
    }
}
