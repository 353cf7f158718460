//! LLM abstraction layer
//!
//! A backend performs one atomic generation call. Retries and backoff are the
//! backend's own concern; failures surface to callers as errors.

mod ollama;
mod openai;

pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::models::ModelPreferences;

/// Generation settings for one call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParams {
    /// Drives model selection
    #[serde(default)]
    pub model_preferences: ModelPreferences,

    /// Sampling temperature (backend default when unset)
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate (backend default when unset)
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl RequestParams {
    pub fn new(model_preferences: ModelPreferences) -> Self {
        Self {
            model_preferences,
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A single generation request as seen by a backend
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Name of the agent issuing the call (for logging)
    pub agent: String,
    /// Model identifier chosen by the selector
    pub model: String,
    /// Agent instruction
    pub system_prompt: Option<String>,
    /// User prompt
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Trait for LLM backends
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Backend kind, matched against `ModelVariant::backend`
    fn kind(&self) -> &str;

    /// Generate a complete text response
    async fn generate(&self, request: GenerateRequest) -> Result<String>;
}

/// Build the backend named in config
pub fn build_backend(config: &LlmConfig) -> Result<Arc<dyn LlmBackend>> {
    match config.backend.as_str() {
        "ollama" => Ok(Arc::new(OllamaBackend::new(&config.url))),
        "openai" => {
            let api_key = std::env::var(&config.api_key_env).ok();
            if api_key.is_none() {
                tracing::warn!(
                    "{} is not set; requests to {} will be unauthenticated",
                    config.api_key_env,
                    config.url
                );
            }
            Ok(Arc::new(OpenAiBackend::new(&config.url, api_key)))
        }
        other => bail!("Unknown LLM backend '{}' (expected 'ollama' or 'openai')", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_known_backends() {
        let mut config = LlmConfig::default();
        assert_eq!(build_backend(&config).unwrap().kind(), "ollama");

        config.backend = "openai".to_string();
        config.url = "http://localhost:8080".to_string();
        assert_eq!(build_backend(&config).unwrap().kind(), "openai");
    }

    #[test]
    fn test_build_unknown_backend_fails() {
        let config = LlmConfig {
            backend: "carrier-pigeon".to_string(),
            ..Default::default()
        };
        let err = build_backend(&config).err().unwrap();
        assert!(err.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn test_request_params_builder() {
        let params = RequestParams::new(ModelPreferences::new(0.8, 0.1, 0.1).unwrap())
            .with_temperature(0.2)
            .with_max_tokens(512);
        assert_eq!(params.temperature, Some(0.2));
        assert_eq!(params.max_tokens, Some(512));
        assert_eq!(params.model_preferences.intelligence_priority, 0.8);
    }
}
