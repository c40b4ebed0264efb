//! Validation layer for gateway requests and responses

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower_layer::Layer;
use tower_service::Service;

use crate::{
    protocol::{error::AgentError, message::Part, operation::AgentOperation},
    service::{AgentRequest, AgentResponse},
};

/// Layer that validates gateway requests and responses
#[derive(Clone, Debug, Default)]
pub struct AgentValidationLayer;

impl AgentValidationLayer {
    /// Create a new validation layer
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for AgentValidationLayer {
    type Service = AgentValidationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AgentValidationService { inner }
    }
}

/// Validation service that wraps an inner service
#[derive(Clone)]
pub struct AgentValidationService<S> {
    inner: S,
}

impl<S> AgentValidationService<S> {
    /// Validate a request before it leaves the client
    fn validate_request(req: &AgentRequest) -> Result<(), AgentError> {
        match &req.operation {
            AgentOperation::SendMessage { message, .. } => {
                if message.parts.is_empty() {
                    return Err(AgentError::Validation(
                        "Message must have at least one part".into(),
                    ));
                }

                for part in &message.parts {
                    match part {
                        Part::Text { text } => {
                            if text.is_empty() {
                                return Err(AgentError::Validation(
                                    "Text part cannot be empty".into(),
                                ));
                            }
                        }
                        Part::File { file } => {
                            if file.uri.is_none() && file.bytes.is_none() {
                                return Err(AgentError::Validation(
                                    "File must have either URI or bytes content".into(),
                                ));
                            }
                        }
                        Part::Data { .. } => {}
                    }
                }
            }
            AgentOperation::ChatCompletion {
                deployment,
                request,
                ..
            } => {
                if deployment.is_empty() {
                    return Err(AgentError::Validation("Deployment cannot be empty".into()));
                }
                if request.messages.is_empty() {
                    return Err(AgentError::Validation(
                        "Chat completion needs at least one message".into(),
                    ));
                }
            }
            AgentOperation::GetAgentCard { path } => {
                if path.trim_start_matches('/').is_empty() {
                    return Err(AgentError::Validation("Card path cannot be empty".into()));
                }
            }
            AgentOperation::ListAgents => {}
        }

        if req.context.agent_url.is_empty() {
            return Err(AgentError::Validation("Agent URL cannot be empty".into()));
        }

        Ok(())
    }

    /// Validate a decoded response
    fn validate_response(resp: &AgentResponse) -> Result<(), AgentError> {
        match resp {
            AgentResponse::Task(task) => {
                if task.id.is_empty() {
                    return Err(AgentError::Validation("Task ID cannot be empty".into()));
                }
            }
            AgentResponse::AgentCard(card) => {
                if card.name.is_empty() {
                    return Err(AgentError::Validation("Agent name cannot be empty".into()));
                }
            }
            _ => {}
        }

        Ok(())
    }
}

impl<S> Service<AgentRequest> for AgentValidationService<S>
where
    S: Service<AgentRequest, Response = AgentResponse, Error = AgentError> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = AgentResponse;
    type Error = AgentError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: AgentRequest) -> Self::Future {
        if let Err(e) = Self::validate_request(&req) {
            return Box::pin(async move { Err(e) });
        }

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move {
            let response = inner.call(req).await?;
            Self::validate_response(&response)?;
            Ok(response)
        })
    }
}
