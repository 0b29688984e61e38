use crate::error::Result;
use crate::llm::models::LlmMessage;
use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;

/// Configuration for LLM completion
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

/// Abstract interface for LLM providers.
///
/// The only required operation is [`chat`](LlmGateway::chat): given an ordered
/// list of role-tagged messages, produce a text reply. Prompt-style generation
/// and streaming are provided on top of it and may be overridden by gateways
/// that support them natively.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Complete a conversation with a text response
    async fn chat(&self, messages: &[LlmMessage], config: &CompletionConfig) -> Result<String>;

    /// Complete a bare prompt with a text response
    async fn generate(&self, prompt: &str, config: &CompletionConfig) -> Result<String> {
        self.chat(&[LlmMessage::user(prompt)], config).await
    }

    /// Complete a conversation as a stream of text fragments.
    ///
    /// The stream is finite and non-restartable; the concatenation of its
    /// fragments equals the [`chat`](LlmGateway::chat) result. The default
    /// implementation yields the whole reply as a single fragment.
    fn chat_stream<'a>(
        &'a self,
        messages: &'a [LlmMessage],
        config: &'a CompletionConfig,
    ) -> Pin<Box<dyn Stream<Item = Result<String>> + Send + 'a>> {
        Box::pin(async_stream::stream! {
            yield self.chat(messages, config).await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream::StreamExt;

    struct EchoGateway;

    #[async_trait]
    impl LlmGateway for EchoGateway {
        async fn chat(
            &self,
            messages: &[LlmMessage],
            _config: &CompletionConfig,
        ) -> Result<String> {
            Ok(messages.last().map(|m| m.content.clone()).unwrap_or_default())
        }
    }

    #[test]
    fn test_completion_config_default() {
        let config = CompletionConfig::default();

        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.top_p, 0.95);
        assert_eq!(config.top_k, 40);
        assert_eq!(config.max_output_tokens, 8192);
    }

    #[test]
    fn test_completion_config_clone() {
        let config1 = CompletionConfig {
            temperature: 0.5,
            top_p: 0.9,
            top_k: 20,
            max_output_tokens: 1024,
        };

        let config2 = config1.clone();

        assert_eq!(config1.temperature, config2.temperature);
        assert_eq!(config1.top_p, config2.top_p);
        assert_eq!(config1.top_k, config2.top_k);
        assert_eq!(config1.max_output_tokens, config2.max_output_tokens);
    }

    #[tokio::test]
    async fn test_generate_delegates_to_chat() {
        let gateway = EchoGateway;
        let result = gateway.generate("hello", &CompletionConfig::default()).await.unwrap();

        assert_eq!(result, "hello");
    }

    #[tokio::test]
    async fn test_default_stream_matches_chat() {
        let gateway = EchoGateway;
        let messages = vec![LlmMessage::user("streamed reply")];
        let config = CompletionConfig::default();

        let chat_result = gateway.chat(&messages, &config).await.unwrap();

        let mut stream = gateway.chat_stream(&messages, &config);
        let mut streamed = String::new();
        while let Some(chunk) = stream.next().await {
            streamed.push_str(&chunk.unwrap());
        }

        assert_eq!(streamed, chat_result);
    }
}
