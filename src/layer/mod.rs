//! Tower Layer implementations for gateway requests

pub mod auth;
pub mod validation;

pub use auth::{AuthCredentials, AuthLayer, AuthService};
pub use validation::{AgentValidationLayer, AgentValidationService};
