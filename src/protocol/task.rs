//! A2A task types and streaming update events

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::message::{collect_text, Message, Part};

/// A task in the A2A protocol
///
/// The gateway answers every message with a task. Blocking calls receive it
/// already completed with the response in `artifacts`; streaming calls receive
/// it first in the `submitted` state and then follow-up update events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Object discriminator, always `task`
    #[serde(default = "Task::kind_tag")]
    pub kind: String,

    /// Unique identifier for the task
    pub id: String,

    /// Conversation identifier (the gateway's thread id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    /// Current status of the task
    pub status: TaskStatus,

    /// Messages exchanged so far
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Message>,

    /// Outputs produced by the agent
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl Task {
    fn kind_tag() -> String {
        "task".to_string()
    }

    /// Create a new task in the given state
    pub fn new(id: impl Into<String>, state: TaskState) -> Self {
        Self {
            kind: Self::kind_tag(),
            id: id.into(),
            context_id: None,
            status: TaskStatus::new(state),
            history: Vec::new(),
            artifacts: Vec::new(),
            metadata: None,
        }
    }

    /// Set the context ID
    pub fn with_context_id(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }

    /// Append an artifact
    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.push(artifact);
        self
    }

    /// Replace the status
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Check if the task is in a terminal state
    pub fn is_terminal(&self) -> bool {
        self.status.state.is_terminal()
    }

    /// Concatenated text of all artifacts
    pub fn artifact_text(&self) -> String {
        self.artifacts.iter().map(Artifact::text).collect()
    }

    /// Context identifier, ignoring the empty string the gateway sends
    /// when no thread exists
    pub fn context(&self) -> Option<&str> {
        non_empty(self.context_id.as_deref())
    }
}

/// Status of a task: its state plus an optional progress message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskStatus {
    pub state: TaskState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl TaskStatus {
    /// Create a status stamped with the current time
    pub fn new(state: TaskState) -> Self {
        Self {
            state,
            message: None,
            timestamp: Some(Utc::now()),
        }
    }

    /// Attach a progress message
    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }

    /// Text of the status message, if any
    pub fn message_text(&self) -> String {
        self.message.as_ref().map(Message::text).unwrap_or_default()
    }
}

/// Task lifecycle states
///
/// submitted → working → completed/failed/canceled/rejected, with
/// input-required and auth-required as interrupted states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    Submitted,
    Working,
    InputRequired,
    AuthRequired,
    Completed,
    Canceled,
    Failed,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl TaskState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Canceled | TaskState::Failed | TaskState::Rejected
        )
    }

    /// Check if this state means the agent did not produce a result
    pub fn is_unsuccessful(&self) -> bool {
        matches!(
            self,
            TaskState::Canceled | TaskState::Failed | TaskState::Rejected
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Submitted => "submitted",
            TaskState::Working => "working",
            TaskState::InputRequired => "input-required",
            TaskState::AuthRequired => "auth-required",
            TaskState::Completed => "completed",
            TaskState::Canceled => "canceled",
            TaskState::Failed => "failed",
            TaskState::Rejected => "rejected",
            TaskState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Artifacts represent task outputs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Unique identifier of the Artifact
    pub artifact_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Contents of the Artifact
    #[serde(default)]
    pub parts: Vec<Part>,

    /// Gateway metadata; carries token `usage` for completed calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
}

impl Artifact {
    /// Create a text artifact
    pub fn text_artifact(artifact_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            artifact_id: artifact_id.into(),
            name: None,
            description: None,
            parts: vec![Part::text(text)],
            metadata: None,
            extensions: Vec::new(),
        }
    }

    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        collect_text(&self.parts)
    }
}

/// Status change of a streaming task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusUpdateEvent {
    #[serde(default = "TaskStatusUpdateEvent::kind_tag")]
    pub kind: String,

    pub task_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    pub status: TaskStatus,

    /// Set on the last event of a stream
    #[serde(rename = "final", default)]
    pub is_final: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl TaskStatusUpdateEvent {
    fn kind_tag() -> String {
        "status-update".to_string()
    }

    pub fn new(task_id: impl Into<String>, status: TaskStatus, is_final: bool) -> Self {
        Self {
            kind: Self::kind_tag(),
            task_id: task_id.into(),
            context_id: None,
            status,
            is_final,
            metadata: None,
        }
    }
}

/// A chunk of artifact content produced by a streaming task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskArtifactUpdateEvent {
    #[serde(default = "TaskArtifactUpdateEvent::kind_tag")]
    pub kind: String,

    pub task_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    pub artifact: Artifact,

    /// Whether this chunk extends a previously sent artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub append: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_chunk: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl TaskArtifactUpdateEvent {
    fn kind_tag() -> String {
        "artifact-update".to_string()
    }

    pub fn new(task_id: impl Into<String>, artifact: Artifact) -> Self {
        Self {
            kind: Self::kind_tag(),
            task_id: task_id.into(),
            context_id: None,
            artifact,
            append: None,
            last_chunk: None,
            metadata: None,
        }
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
