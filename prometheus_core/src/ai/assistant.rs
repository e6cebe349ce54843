use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use super::client::{ChatCompletion, ChatRequest, OpenAiClient};
use super::prompts::{build_messages, build_task_instruction, infer_topic, AssistantInput, Intent};
use super::AiError;
use crate::config::AiConfig;

pub const MAX_TOKENS: u32 = 500;
const DEFAULT_PROVIDER: &str = "openai";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantAnswer {
    pub answer: String,
    pub model: String,
    pub intent: Intent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capabilities {
    pub available: bool,
    pub provider: &'static str,
    pub model: String,
    pub intents: Vec<&'static str>,
}

#[derive(Clone)]
pub struct AiAssistant {
    client: Option<Arc<dyn ChatCompletion>>,
    model: String,
}

impl std::fmt::Debug for AiAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiAssistant")
            .field("available", &self.is_available())
            .field("model", &self.model)
            .finish()
    }
}

impl AiAssistant {
    pub fn new(client: Option<Arc<dyn ChatCompletion>>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn disabled(model: impl Into<String>) -> Self {
        Self::new(None, model)
    }

    /// Builds an OpenAI-backed assistant, or a disabled one when no key is configured.
    pub fn from_config(config: &AiConfig) -> Self {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            info!("AI assistant disabled: no API key configured");
            return Self::disabled(config.model.clone());
        }

        let timeout = Duration::from_secs(config.request_timeout_seconds);
        match OpenAiClient::new(api_key, &config.base_url, timeout) {
            Ok(client) => {
                info!("AI assistant enabled with model {}", config.model);
                Self::new(Some(Arc::new(client)), config.model.clone())
            }
            Err(err) => {
                error!("Failed to build AI client: {}", err);
                Self::disabled(config.model.clone())
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            available: self.is_available(),
            provider: self
                .client
                .as_ref()
                .map(|client| client.provider())
                .unwrap_or(DEFAULT_PROVIDER),
            model: self.model.clone(),
            intents: Intent::ALL.iter().map(Intent::as_str).collect(),
        }
    }

    /// Runs the intent named by the caller; a missing or blank name means tutor.
    pub async fn run_requested(
        &self,
        requested: Option<&str>,
        input: &AssistantInput,
    ) -> Result<AssistantAnswer, AiError> {
        self.client()?;

        let intent = match requested.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => name.parse()?,
            None => Intent::Tutor,
        };
        self.run(intent, input).await
    }

    pub async fn run(
        &self,
        intent: Intent,
        input: &AssistantInput,
    ) -> Result<AssistantAnswer, AiError> {
        let client = self.client()?;

        let topic = infer_topic(input.context.as_deref());
        let task = build_task_instruction(intent, topic, input)?;
        let request = ChatRequest {
            model: self.model.clone(),
            temperature: intent.temperature(),
            max_tokens: MAX_TOKENS,
            messages: build_messages(intent, input.history.as_ref(), task),
        };

        debug!(intent = %intent, topic, "Sending assistant request");
        let answer = client.complete(&request).await?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(AiError::EmptyAnswer);
        }

        Ok(AssistantAnswer {
            answer: answer.to_string(),
            model: self.model.clone(),
            intent,
        })
    }

    fn client(&self) -> Result<&Arc<dyn ChatCompletion>, AiError> {
        self.client.as_ref().ok_or(AiError::Unavailable)
    }
}
