//! Reasoning-engine abstraction.
//!
//! The agent loop and the tag classifier talk to a [`ReasoningEngine`]; the
//! production implementation is [`gemini::GeminiClient`]. Tests substitute a
//! scripted engine.

pub mod gemini;
pub mod types;

use async_trait::async_trait;

pub use gemini::GeminiClient;
pub use types::{GenerateRequest, ModelTurn, ResponseFormat, ToolDeclaration, ToolInvocation, Turn};

/// Errors from a model round-trip.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("model returned no usable candidate: {0}")]
    EmptyResponse(String),
    #[error("failed to build model client: {0}")]
    Config(String),
}

/// A conversational model that can request tool calls.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// Send the whole conversation and wait for the model's next turn.
    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<ModelTurn, LlmError>;
}
