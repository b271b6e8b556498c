use economy::{Provider, RawUsage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub context: Option<String>,
    pub session_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            session_id: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Token figures as reported on the provider's wire. Left as floats because
/// providers have been seen returning fractional or junk values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProviderUsage {
    pub prompt_tokens: f64,
    pub completion_tokens: f64,
    pub total_tokens: f64,
}

impl From<ProviderUsage> for RawUsage {
    fn from(usage: ProviderUsage) -> Self {
        RawUsage {
            input_tokens: Some(usage.prompt_tokens),
            output_tokens: Some(usage.completion_tokens),
            cost_estimate: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    pub session_id: Option<String>,
    pub usage: Option<ProviderUsage>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
    #[error("Provider rate limited")]
    RateLimited,
    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

/// Boundary to an upstream chat model. Implementations do the actual
/// network call; the service layer never sees transport details.
pub trait ChatProvider {
    fn provider(&self) -> Provider;
    fn send(&mut self, request: &ChatRequest) -> Result<ChatReply, ProviderError>;
}
