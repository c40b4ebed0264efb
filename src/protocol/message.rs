//! Chat and A2A message types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Role of a chat participant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instructions that steer the agent
    System,

    /// Message from a user
    User,

    /// Message produced by the agent
    Assistant,
}

/// A single chat message sent to an agent
///
/// Chat messages are immutable once constructed: the identifier, role and
/// text are only readable through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    id: String,
    role: ChatRole,
    text: String,
}

impl ChatMessage {
    /// Create a message with an explicit identifier
    pub fn new(id: impl Into<String>, role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            text: text.into(),
        }
    }

    /// Create a user message with a generated identifier
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Uuid::now_v7().to_string(), ChatRole::User, text)
    }

    /// Create a system message with a generated identifier
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Uuid::now_v7().to_string(), ChatRole::System, text)
    }

    /// Create an assistant message with a generated identifier
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Uuid::now_v7().to_string(), ChatRole::Assistant, text)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> ChatRole {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl From<&str> for ChatMessage {
    fn from(text: &str) -> Self {
        Self::user(text)
    }
}

impl From<String> for ChatMessage {
    fn from(text: String) -> Self {
        Self::user(text)
    }
}

/// Role of an A2A message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message from a user
    User,

    /// Message from an AI agent
    Agent,
}

/// A message in the A2A protocol
///
/// Messages carry one or more parts and are correlated to a conversation
/// through `contextId` and to a unit of work through `taskId`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Object discriminator, always `message`
    #[serde(default = "Message::kind_tag")]
    pub kind: String,

    /// Role of the message sender
    pub role: Role,

    /// Message content parts
    pub parts: Vec<Part>,

    /// Message identifier
    #[serde(default)]
    pub message_id: String,

    /// Task this message belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// Conversation this message belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    /// Optional metadata, e.g. `modelParams` for the gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,

    /// URIs of protocol extensions used by this message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
}

impl Message {
    fn kind_tag() -> String {
        "message".to_string()
    }

    /// Create a new message with text content and a generated identifier
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            kind: Self::kind_tag(),
            role,
            parts: vec![Part::text(text)],
            message_id: Uuid::now_v7().to_string(),
            task_id: None,
            context_id: None,
            metadata: None,
            extensions: Vec::new(),
        }
    }

    /// Create a user message with text content
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create an agent message with text content
    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(Role::Agent, text)
    }

    /// Override the message identifier
    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = id.into();
        self
    }

    /// Attach the message to an existing conversation
    pub fn with_context_id(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }

    /// Attach the message to an existing task
    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    /// Add a metadata field to the message
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }

    /// Add a message part
    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        collect_text(&self.parts)
    }
}

impl From<&ChatMessage> for Message {
    fn from(chat: &ChatMessage) -> Self {
        let role = match chat.role() {
            ChatRole::Assistant => Role::Agent,
            ChatRole::User | ChatRole::System => Role::User,
        };
        Message::new(role, chat.text()).with_message_id(chat.id())
    }
}

/// File content for file parts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Base64-encoded file content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<String>,

    /// URI reference to the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// A part of a message or artifact, discriminated by `kind`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Part {
    /// Text content
    Text { text: String },

    /// File reference or inline file
    File { file: FileContent },

    /// Structured data
    Data { data: Value },
}

impl Part {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a data part
    pub fn data(data: Value) -> Self {
        Self::Data { data }
    }

    /// The text of a text part
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Concatenate the text parts of a part list, skipping everything else
pub(crate) fn collect_text(parts: &[Part]) -> String {
    parts.iter().filter_map(Part::as_text).collect()
}
