//! Results of message invocation: blocking results and streamed events

use serde_json::{Map, Value};

use super::{
    chat::{ChatCompletionChunk, Usage},
    error::AgentError,
    message::{Message, Role},
    task::{non_empty, Task, TaskArtifactUpdateEvent, TaskState, TaskStatusUpdateEvent},
};

/// Result of a blocking `message/send`: either a task or a direct reply
#[derive(Debug, Clone, PartialEq)]
pub enum SendMessageResult {
    Task(Box<Task>),
    Message(Box<Message>),
}

impl SendMessageResult {
    /// Decode a JSON-RPC `result` value by its `kind`
    pub fn from_value(value: Value) -> Result<Self, AgentError> {
        match StreamEvent::from_value(value)? {
            StreamEvent::Task(task) => Ok(SendMessageResult::Task(task)),
            StreamEvent::Message(message) => Ok(SendMessageResult::Message(message)),
            other => Err(AgentError::Protocol(format!(
                "Unexpected '{}' result for message/send",
                other.kind()
            ))),
        }
    }

    /// Response text: artifact text for tasks, part text for messages
    pub fn text(&self) -> String {
        match self {
            SendMessageResult::Task(task) => task.artifact_text(),
            SendMessageResult::Message(message) => message.text(),
        }
    }

    pub fn context_id(&self) -> Option<&str> {
        match self {
            SendMessageResult::Task(task) => task.context(),
            SendMessageResult::Message(message) => non_empty(message.context_id.as_deref()),
        }
    }

    pub fn task_id(&self) -> Option<&str> {
        match self {
            SendMessageResult::Task(task) => Some(&task.id),
            SendMessageResult::Message(message) => message.task_id.as_deref(),
        }
    }

    /// Token usage reported in artifact or task metadata
    pub fn usage(&self) -> Option<Usage> {
        match self {
            SendMessageResult::Task(task) => task
                .artifacts
                .iter()
                .find_map(|artifact| usage_from(artifact.metadata.as_ref()))
                .or_else(|| usage_from(task.metadata.as_ref())),
            SendMessageResult::Message(_) => None,
        }
    }

    /// Fail when the task ended without producing a result
    pub fn ensure_success(self) -> Result<Self, AgentError> {
        if let SendMessageResult::Task(task) = &self {
            if task.status.state.is_unsuccessful() {
                return Err(AgentError::TaskFailed {
                    state: task.status.state,
                    message: task.status.message_text(),
                });
            }
        }
        Ok(self)
    }
}

/// One event of a streamed response
///
/// A2A streams deliver tasks, status updates, artifact updates and
/// messages; chat completion streams deliver chunks.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Task(Box<Task>),
    StatusUpdate(TaskStatusUpdateEvent),
    ArtifactUpdate(TaskArtifactUpdateEvent),
    Message(Box<Message>),
    ChatChunk(ChatCompletionChunk),
}

impl StreamEvent {
    /// Decode an A2A result object by its `kind` discriminator
    pub fn from_value(value: Value) -> Result<Self, AgentError> {
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let event = match kind.as_str() {
            "task" => StreamEvent::Task(Box::new(serde_json::from_value(value)?)),
            "status-update" => StreamEvent::StatusUpdate(serde_json::from_value(value)?),
            "artifact-update" => StreamEvent::ArtifactUpdate(serde_json::from_value(value)?),
            "message" => StreamEvent::Message(Box::new(serde_json::from_value(value)?)),
            "" if value.get("status").is_some() => {
                StreamEvent::Task(Box::new(serde_json::from_value(value)?))
            }
            "" if value.get("parts").is_some() => {
                StreamEvent::Message(Box::new(serde_json::from_value(value)?))
            }
            other => {
                return Err(AgentError::Protocol(format!(
                    "Unknown result kind '{}'",
                    other
                )))
            }
        };

        Ok(event)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Task(_) => "task",
            StreamEvent::StatusUpdate(_) => "status-update",
            StreamEvent::ArtifactUpdate(_) => "artifact-update",
            StreamEvent::Message(_) => "message",
            StreamEvent::ChatChunk(_) => "chat-chunk",
        }
    }

    /// Response text carried by this event
    ///
    /// Status updates only carry progress notes and never contribute text.
    /// A task contributes its artifacts, which is how cached responses arrive.
    pub fn text(&self) -> Option<String> {
        let text = match self {
            StreamEvent::Task(task) => Some(task.artifact_text()),
            StreamEvent::StatusUpdate(_) => None,
            StreamEvent::ArtifactUpdate(update) => Some(update.artifact.text()),
            StreamEvent::Message(message) if message.role == Role::Agent => Some(message.text()),
            StreamEvent::Message(_) => None,
            StreamEvent::ChatChunk(chunk) => chunk.text().map(str::to_string),
        };
        text.filter(|text| !text.is_empty())
    }

    /// Whether the producer marked this as the last event
    pub fn is_final(&self) -> bool {
        match self {
            StreamEvent::Task(task) => task.is_terminal(),
            StreamEvent::StatusUpdate(update) => update.is_final,
            _ => false,
        }
    }

    /// Conversation id carried by this event
    pub fn context_id(&self) -> Option<&str> {
        let context = match self {
            StreamEvent::Task(task) => task.context_id.as_deref(),
            StreamEvent::StatusUpdate(update) => update.context_id.as_deref(),
            StreamEvent::ArtifactUpdate(update) => update.context_id.as_deref(),
            StreamEvent::Message(message) => message.context_id.as_deref(),
            StreamEvent::ChatChunk(_) => None,
        };
        non_empty(context)
    }

    /// Terminal state when the event reports an unsuccessful task
    pub fn failure(&self) -> Option<AgentError> {
        let status = match self {
            StreamEvent::Task(task) => &task.status,
            StreamEvent::StatusUpdate(update) => &update.status,
            _ => return None,
        };
        status
            .state
            .is_unsuccessful()
            .then(|| AgentError::TaskFailed {
                state: status.state,
                message: status.message_text(),
            })
    }

    /// Token usage, from chat chunks or from the final status update
    pub fn usage(&self) -> Option<Usage> {
        match self {
            StreamEvent::ChatChunk(chunk) => chunk.usage.clone(),
            StreamEvent::StatusUpdate(update) => usage_from(update.metadata.as_ref()),
            _ => None,
        }
    }

    /// The task state reported by this event, if any
    pub fn state(&self) -> Option<TaskState> {
        match self {
            StreamEvent::Task(task) => Some(task.status.state),
            StreamEvent::StatusUpdate(update) => Some(update.status.state),
            _ => None,
        }
    }
}

fn usage_from(metadata: Option<&Map<String, Value>>) -> Option<Usage> {
    metadata
        .and_then(|m| m.get("usage"))
        .filter(|usage| usage.is_object())
        .and_then(|usage| serde_json::from_value(usage.clone()).ok())
}
