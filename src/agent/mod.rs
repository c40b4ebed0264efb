//! Agent handles
//!
//! An [`Agent`] answers one chat message at a time, either with a complete
//! [`AgentRunResponse`] or with a [`ResponseStream`] of text fragments.
//! [`ChatAgent`] talks to a model deployment behind the gateway's load
//! balancer; [`RemoteAgent`] talks to an A2A agent exposed by the gateway.

pub mod chat;
pub mod remote;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

pub use chat::{AgentOptions, ChatAgent, ChatClient};
pub use remote::RemoteAgent;

use crate::protocol::{
    chat::Usage, error::AgentError, event::StreamEvent, message::ChatMessage,
};

/// A lazy, finite stream of response fragments
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<ResponseUpdate, AgentError>> + Send>>;

/// A callable agent
///
/// Calls take `&mut self`: agents carry conversation state (the gateway's
/// thread id or the A2A context id) from one call to the next.
#[async_trait]
pub trait Agent: Send {
    /// Display name of the agent
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str>;

    /// Send a message and wait for the complete response
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the agent reports a failed
    /// task or the response carries no text
    async fn run(&mut self, message: ChatMessage) -> Result<AgentRunResponse, AgentError>;

    /// Send a message and stream the response as it is produced
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be opened. Failures after that
    /// arrive as stream items.
    async fn run_stream(&mut self, message: ChatMessage) -> Result<ResponseStream, AgentError>;
}

/// Complete response of an agent run
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRunResponse {
    /// The agent's reply
    pub message: ChatMessage,

    /// Conversation the reply belongs to: the A2A context id or the
    /// gateway's thread id
    pub context_id: Option<String>,

    pub task_id: Option<String>,

    pub usage: Option<Usage>,
}

impl AgentRunResponse {
    pub fn new(message: ChatMessage) -> Self {
        Self {
            message,
            context_id: None,
            task_id: None,
            usage: None,
        }
    }

    pub fn with_context_id(mut self, context_id: Option<String>) -> Self {
        self.context_id = context_id;
        self
    }

    pub fn with_task_id(mut self, task_id: Option<String>) -> Self {
        self.task_id = task_id;
        self
    }

    pub fn with_usage(mut self, usage: Option<Usage>) -> Self {
        self.usage = usage;
        self
    }

    /// Text of the reply
    pub fn text(&self) -> &str {
        self.message.text()
    }
}

/// One fragment of a streamed response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseUpdate {
    /// Text carried by this fragment, if any
    pub text: Option<String>,

    /// The protocol event this fragment was produced from
    pub event: Option<StreamEvent>,
}

impl ResponseUpdate {
    /// A fragment carrying only text
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            event: None,
        }
    }

    pub fn from_event(event: StreamEvent) -> Self {
        Self {
            text: event.text(),
            event: Some(event),
        }
    }

    /// Text of this fragment, empty when it carries none
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::protocol::task::{TaskState, TaskStatus, TaskStatusUpdateEvent};

    use super::*;

    #[test]
    fn test_status_update_carries_no_text() {
        let event = StreamEvent::StatusUpdate(TaskStatusUpdateEvent::new(
            "task-1",
            TaskStatus::new(TaskState::Working),
            false,
        ));
        let update = ResponseUpdate::from_event(event);

        assert!(update.is_empty());
        assert_eq!(update.text(), "");
        assert!(update.event.is_some());
    }

    #[test]
    fn test_run_response_text() {
        let response = AgentRunResponse::new(ChatMessage::assistant("Arr, matey"))
            .with_context_id(Some("ctx-1".into()));

        assert_eq!(response.text(), "Arr, matey");
        assert_eq!(response.context_id.as_deref(), Some("ctx-1"));
    }
}
