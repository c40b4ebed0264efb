//! Gateway service response types

use std::fmt;

use crate::{
    codec::EventStream,
    protocol::{
        agent::{AgentCard, AgentRegistry},
        chat::ChatCompletion,
        event::SendMessageResult,
        message::Message,
        task::Task,
    },
};

/// Response from a gateway service operation
pub enum AgentResponse {
    /// Task result of `message/send`
    Task(Box<Task>),

    /// Direct message result of `message/send`
    Message(Box<Message>),

    /// Agent card
    AgentCard(Box<AgentCard>),

    /// Agent registry (`/.well-known/agents.json`)
    AgentRegistry(AgentRegistry),

    /// Complete chat completion
    ChatCompletion(Box<ChatCompletion>),

    /// Streamed response of `message/stream` or a streaming chat completion
    Stream(StreamingResponse),

    /// Empty response (for operations with no return value)
    Empty,
}

impl AgentResponse {
    /// Extract a `message/send` result from the response, if present
    pub fn into_send_result(self) -> Option<SendMessageResult> {
        match self {
            AgentResponse::Task(task) => Some(SendMessageResult::Task(task)),
            AgentResponse::Message(message) => Some(SendMessageResult::Message(message)),
            _ => None,
        }
    }

    /// Extract an agent card from the response, if present
    pub fn into_agent_card(self) -> Option<AgentCard> {
        match self {
            AgentResponse::AgentCard(card) => Some(*card),
            _ => None,
        }
    }

    /// Extract the agent registry from the response, if present
    pub fn into_agent_registry(self) -> Option<AgentRegistry> {
        match self {
            AgentResponse::AgentRegistry(registry) => Some(registry),
            _ => None,
        }
    }

    /// Extract a chat completion from the response, if present
    pub fn into_chat_completion(self) -> Option<ChatCompletion> {
        match self {
            AgentResponse::ChatCompletion(completion) => Some(*completion),
            _ => None,
        }
    }

    /// Extract an event stream from the response, if present
    pub fn into_stream(self) -> Option<StreamingResponse> {
        match self {
            AgentResponse::Stream(stream) => Some(stream),
            _ => None,
        }
    }

    /// Check if the response is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, AgentResponse::Empty)
    }
}

impl fmt::Debug for AgentResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentResponse::Task(task) => f.debug_tuple("Task").field(task).finish(),
            AgentResponse::Message(message) => f.debug_tuple("Message").field(message).finish(),
            AgentResponse::AgentCard(card) => f.debug_tuple("AgentCard").field(card).finish(),
            AgentResponse::AgentRegistry(registry) => {
                f.debug_tuple("AgentRegistry").field(registry).finish()
            }
            AgentResponse::ChatCompletion(completion) => {
                f.debug_tuple("ChatCompletion").field(completion).finish()
            }
            AgentResponse::Stream(stream) => f.debug_tuple("Stream").field(stream).finish(),
            AgentResponse::Empty => f.write_str("Empty"),
        }
    }
}

/// An open event stream plus the response metadata that arrived with it
pub struct StreamingResponse {
    /// Decoded events, in arrival order
    pub events: EventStream,

    /// Value of the `x-thread-id` response header
    pub thread_id: Option<String>,
}

impl StreamingResponse {
    pub fn new(events: EventStream) -> Self {
        Self {
            events,
            thread_id: None,
        }
    }

    pub fn with_thread_id(mut self, thread_id: Option<String>) -> Self {
        self.thread_id = thread_id;
        self
    }
}

impl fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("thread_id", &self.thread_id)
            .finish_non_exhaustive()
    }
}
