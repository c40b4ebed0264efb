//! Tower Service implementations

pub mod core;
pub mod request;
pub mod response;

pub use core::AgentProtocolService;
pub use request::{AgentRequest, RequestContext};
pub use response::{AgentResponse, StreamingResponse};
