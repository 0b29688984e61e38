use crate::error::{Result, VelocityError};
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::models::LlmMessage;
use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use reqwest::Client;
use serde_json::Value;
use std::pin::Pin;
use tracing::{debug, info};

/// Configuration for connecting to an Ollama server
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
    pub timeout: Option<std::time::Duration>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("OLLAMA_HOST")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            model: "qwen3:32b".to_string(),
            timeout: None,
        }
    }
}

/// Gateway for the Ollama local LLM service.
///
/// Implements the chat contract over `/api/chat`, bare-prompt generation over
/// `/api/generate`, and chunked streaming over the line-delimited variant of
/// `/api/chat`.
pub struct OllamaGateway {
    client: Client,
    config: OllamaConfig,
}

impl OllamaGateway {
    /// Create a new Ollama gateway with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(OllamaConfig::default())
    }

    /// Create a new Ollama gateway with custom configuration
    pub fn with_config(config: OllamaConfig) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder
            .build()
            .map_err(|e| VelocityError::ConfigError(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create a gateway for a specific model on the default host
    pub fn with_model(model: impl Into<String>) -> Result<Self> {
        Self::with_config(OllamaConfig {
            model: model.into(),
            ..Default::default()
        })
    }

    fn options(config: &CompletionConfig) -> Value {
        serde_json::json!({
            "temperature": config.temperature,
            "top_p": config.top_p,
            "top_k": config.top_k,
            "num_predict": config.max_output_tokens,
        })
    }
}

#[async_trait]
impl LlmGateway for OllamaGateway {
    async fn chat(&self, messages: &[LlmMessage], config: &CompletionConfig) -> Result<String> {
        info!("Delegating to Ollama for chat completion");
        debug!("Model: {}, Message count: {}", self.config.model, messages.len());

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "options": Self::options(config),
            "stream": false
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.config.host))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VelocityError::GatewayError(format!(
                "Ollama API error: {}",
                response.status()
            )));
        }

        let response_body: Value = response.json().await?;

        response_body["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| VelocityError::GatewayError("No content in response".to_string()))
    }

    async fn generate(&self, prompt: &str, config: &CompletionConfig) -> Result<String> {
        debug!("Model: {}, prompt generation", self.config.model);

        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "options": Self::options(config),
            "stream": false
        });

        let response = self
            .client
            .post(format!("{}/api/generate", self.config.host))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VelocityError::GatewayError(format!(
                "Ollama API error: {}",
                response.status()
            )));
        }

        let response_body: Value = response.json().await?;

        response_body["response"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| VelocityError::GatewayError("No content in response".to_string()))
    }

    fn chat_stream<'a>(
        &'a self,
        messages: &'a [LlmMessage],
        config: &'a CompletionConfig,
    ) -> Pin<Box<dyn Stream<Item = Result<String>> + Send + 'a>> {
        Box::pin(async_stream::stream! {
            let body = serde_json::json!({
                "model": self.config.model,
                "messages": messages,
                "options": Self::options(config),
                "stream": true
            });

            let response = match self
                .client
                .post(format!("{}/api/chat", self.config.host))
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    yield Err(e.into());
                    return;
                }
            };

            if !response.status().is_success() {
                yield Err(VelocityError::GatewayError(format!(
                    "Ollama API error: {}",
                    response.status()
                )));
                return;
            }

            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(e.into());
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&chunk));

                // Ollama streams one JSON object per line
                while let Some(newline) = buffer.find('\n') {
                    let line: String = buffer.drain(..=newline).collect();
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let value: Value = match serde_json::from_str(line) {
                        Ok(v) => v,
                        Err(e) => {
                            yield Err(e.into());
                            return;
                        }
                    };

                    if let Some(content) = value["message"]["content"].as_str() {
                        if !content.is_empty() {
                            yield Ok(content.to_string());
                        }
                    }

                    if value["done"].as_bool() == Some(true) {
                        return;
                    }
                }
            }
        })
    }
}
