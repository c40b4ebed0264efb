//! Wire types for the gateway's agent protocols

pub mod agent;
pub mod chat;
pub mod error;
pub mod event;
pub mod message;
pub mod operation;
pub mod task;

pub use agent::{AgentCapabilities, AgentCard, AgentRegistry, AgentSkill, RegistryEntry};
pub use chat::{ChatCompletion, ChatCompletionChunk, ChatCompletionRequest, Usage};
pub use error::AgentError;
pub use event::{SendMessageResult, StreamEvent};
pub use message::{ChatMessage, ChatRole, Message, Part, Role};
pub use operation::AgentOperation;
pub use task::{Artifact, Task, TaskState, TaskStatus};
