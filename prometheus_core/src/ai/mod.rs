//! AI assistant backed by an OpenAI-compatible chat completion API

pub mod assistant;
pub mod client;
pub mod prompts;

pub use assistant::{AiAssistant, AssistantAnswer, Capabilities};
pub use client::{ChatCompletion, ChatRequest, OpenAiClient};
pub use prompts::{AssistantInput, ChatMessage, Intent};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("no AI provider configured")]
    Unavailable,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("AI provider returned an empty answer")]
    EmptyAnswer,

    #[error("AI provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("AI transport error: {0}")]
    Transport(String),

    #[error("invalid AI provider response: {0}")]
    Decode(String),
}
