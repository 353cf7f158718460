//! Ollama LLM implementation

use anyhow::{Context, Result};
use async_trait::async_trait;
use ollama_rs::{
    generation::chat::{request::ChatMessageRequest, ChatMessage},
    models::ModelOptions,
    Ollama,
};

use super::{GenerateRequest, LlmBackend};

/// Ollama backend
pub struct OllamaBackend {
    client: Ollama,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(url: &str) -> Self {
        let (host, port) = split_host_port(url);
        Self {
            client: Ollama::new(host, port),
        }
    }
}

/// Parse URL to extract scheme+host and port
fn split_host_port(url: &str) -> (String, u16) {
    match url::Url::parse(url) {
        Ok(url) => {
            let host = url.host_str().unwrap_or("localhost");
            (
                format!("{}://{}", url.scheme(), host),
                url.port().unwrap_or(11434),
            )
        }
        Err(_) => ("http://localhost".to_string(), 11434),
    }
}

fn build_messages(request: &GenerateRequest) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(ref system) = request.system_prompt {
        messages.push(ChatMessage::system(system.clone()));
    }
    messages.push(ChatMessage::user(request.prompt.clone()));
    messages
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    fn kind(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let mut options = ModelOptions::default();
        if let Some(temperature) = request.temperature {
            options = options.temperature(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            options = options.num_predict(max_tokens as i32);
        }

        let chat = ChatMessageRequest::new(request.model.clone(), build_messages(&request))
            .options(options);

        tracing::debug!("Ollama chat: agent={} model={}", request.agent, request.model);

        let response = self
            .client
            .send_chat_messages(chat)
            .await
            .with_context(|| format!("Ollama chat with model '{}' failed", request.model))?;

        Ok(response.message.content)
    }
}
