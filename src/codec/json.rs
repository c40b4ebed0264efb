//! JSON codec for the gateway's discovery documents

use bytes::Bytes;

use crate::{
    codec::Codec,
    protocol::{
        agent::{AgentCard, AgentRegistry},
        error::AgentError,
        operation::AgentOperation,
    },
    service::response::AgentResponse,
};

/// JSON codec for agent cards and the agent registry
///
/// Both documents are fetched with `GET`, so requests carry no body.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Create a new JSON codec
    pub fn new() -> Self {
        Self
    }
}

impl Codec for JsonCodec {
    fn encode_request(&self, operation: &AgentOperation) -> Result<Bytes, AgentError> {
        match operation {
            AgentOperation::GetAgentCard { .. } | AgentOperation::ListAgents => Ok(Bytes::new()),
            other => Err(AgentError::Protocol(format!(
                "JSON codec cannot encode '{}'",
                other.name()
            ))),
        }
    }

    fn decode_response(
        &self,
        body: &[u8],
        operation: &AgentOperation,
    ) -> Result<AgentResponse, AgentError> {
        if body.is_empty() {
            return Err(AgentError::Protocol(format!(
                "Empty '{}' document",
                operation.name()
            )));
        }

        match operation {
            AgentOperation::GetAgentCard { .. } => {
                let card: AgentCard = serde_json::from_slice(body)?;
                Ok(AgentResponse::AgentCard(Box::new(card)))
            }
            AgentOperation::ListAgents => {
                let registry: AgentRegistry = serde_json::from_slice(body)?;
                Ok(AgentResponse::AgentRegistry(registry))
            }
            other => Err(AgentError::Protocol(format!(
                "JSON codec cannot decode '{}'",
                other.name()
            ))),
        }
    }

    fn content_type(&self) -> &str {
        "application/json"
    }
}
