use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{parse_llm_provider_model, LlmConfig};
use crate::error::{CovwatchError, Result};
use crate::llm::api::{default_base_url, LlmApiClient};

/// Raw text completion: the only thing the analysis pipeline needs from a model.
#[async_trait]
pub trait LlmCapability: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAI,
    OpenRouter,
    Ollama,
    LmStudio,
    OpenAICompatible { base_url: String },
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Clone)]
pub struct LlmProvider {
    backend: LlmBackend,
    config: Option<Arc<LlmConfig>>,
    client: Option<LlmApiClient>,
}

impl std::fmt::Debug for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmProvider")
            .field("backend", &self.backend)
            .field("model", &self.config.as_ref().map(|c| c.model.as_str()))
            .finish()
    }
}

impl LlmProvider {
    pub fn new(config: Option<&LlmConfig>) -> Self {
        let Some(config) = config else {
            return Self::unavailable("No LLM configuration provided");
        };

        let (provider, _model) = parse_llm_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "openai" => LlmBackend::OpenAI,
            "openrouter" => LlmBackend::OpenRouter,
            "ollama" => LlmBackend::Ollama,
            "lmstudio" => LlmBackend::LmStudio,
            _ => {
                if let Some(base_url) = &config.base_url {
                    LlmBackend::OpenAICompatible {
                        base_url: base_url.clone(),
                    }
                } else {
                    LlmBackend::Unavailable {
                        reason: format!("Unknown provider in model: {}", config.model),
                    }
                }
            }
        };

        if matches!(backend, LlmBackend::Unavailable { .. }) {
            return Self {
                backend,
                config: Some(Arc::new(config.clone())),
                client: None,
            };
        }

        match LlmApiClient::new(config) {
            Ok(client) => Self {
                backend,
                config: Some(Arc::new(config.clone())),
                client: Some(client),
            },
            Err(error) => {
                tracing::warn!(error = %error, model = %config.model, "Failed to build LLM client");
                Self {
                    backend: LlmBackend::Unavailable {
                        reason: error.to_string(),
                    },
                    config: Some(Arc::new(config.clone())),
                    client: None,
                }
            }
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: LlmBackend::Unavailable {
                reason: reason.to_string(),
            },
            config: None,
            client: None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, LlmBackend::Unavailable { .. }) && self.client.is_some()
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    pub fn config(&self) -> Option<&LlmConfig> {
        self.config.as_deref()
    }

    pub fn base_url(&self) -> Option<&str> {
        match &self.backend {
            LlmBackend::Unavailable { .. } => None,
            LlmBackend::OpenAICompatible { base_url } => Some(base_url.as_str()),
            _ => {
                let config = self.config()?;
                match &config.base_url {
                    Some(base_url) => Some(base_url.as_str()),
                    None => {
                        let (provider, _) = parse_llm_provider_model(&config.model);
                        Some(default_base_url(provider))
                    }
                }
            }
        }
    }

    fn options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.config().and_then(|config| config.temperature),
            max_tokens: None,
        }
    }

    fn unavailable_reason(&self) -> String {
        match &self.backend {
            LlmBackend::Unavailable { reason } => reason.clone(),
            _ => "LLM client was not initialized".to_string(),
        }
    }
}

#[async_trait]
impl LlmCapability for LlmProvider {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let Some(client) = self.client.as_ref().filter(|_| self.is_available()) else {
            return Err(CovwatchError::LlmUnavailable(self.unavailable_reason()));
        };

        let options = self.options();
        client
            .complete(user_prompt, Some(system_prompt), Some(&options))
            .await
    }
}
