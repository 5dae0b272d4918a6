use crate::config::ProviderConfig;
use crate::error::{IngestError, ProviderErrorKind};
use crate::providers::{ensure_credential, http_client, resolve_api_key, send_json, LlmProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider from configuration
    pub fn new(config: &ProviderConfig, timeout: Option<Duration>) -> Result<Self, IngestError> {
        // Try config first, then fall back to environment variable
        let api_key = resolve_api_key(config.api_key.as_deref(), &["ANTHROPIC_API_KEY"])?;

        Ok(AnthropicProvider {
            client: http_client(timeout)?,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| "https://api.anthropic.com".to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        AnthropicProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.7,
            max_tokens: 4000,
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, prompt: &str) -> Result<String, IngestError> {
        ensure_credential(&self.api_key, "ANTHROPIC_API_KEY")?;

        let request = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "temperature": self.temperature,
                "messages": [
                    {
                        "role": "user",
                        "content": prompt
                    }
                ]
            }));

        let response_body = send_json(request, self.provider_name()).await?;

        // Extract text from the first text content block
        let text = response_body["content"]
            .as_array()
            .and_then(|blocks| {
                blocks
                    .iter()
                    .find(|b| b["type"] == "text")
                    .and_then(|b| b["text"].as_str())
            })
            .ok_or_else(|| {
                IngestError::provider(
                    ProviderErrorKind::Other,
                    "Failed to extract content from Anthropic response",
                )
            })?
            .to_string();

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn test_provider_name() {
        let mut config = ProviderConfig::new("claude-sonnet-4-5");
        config.api_key = Some("test-key".to_string());

        let provider = AnthropicProvider::new(&config, None).unwrap();
        assert_eq!(provider.provider_name(), "anthropic");
    }

    #[tokio::test]
    async fn test_complete_reads_first_text_block() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", "2023-06-01")
            .with_status(200)
            .with_body(r#"{"content": [{"type": "thinking", "thinking": "hmm"}, {"type": "text", "text": "{}"}]}"#)
            .create_async()
            .await;

        let provider = AnthropicProvider::with_base_url(
            "test-key".to_string(),
            server.url(),
            "claude-sonnet-4-5".to_string(),
        );
        assert_eq!(provider.complete("hi").await.unwrap(), "{}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_overloaded_rate_limit() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(429)
            .with_body(r#"{"type":"error","error":{"type":"rate_limit_error","message":"slow down"}}"#)
            .create_async()
            .await;

        let provider = AnthropicProvider::with_base_url(
            "test-key".to_string(),
            server.url(),
            "claude-sonnet-4-5".to_string(),
        );
        match provider.complete("hi").await {
            Err(IngestError::Provider { kind, .. }) => {
                assert_eq!(kind, ProviderErrorKind::QuotaExceeded)
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }
}
