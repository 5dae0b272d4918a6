use crate::config::{AiConfig, ProviderConfig};
use crate::error::IngestError;
use crate::providers::{
    AnthropicProvider, GoogleProvider, LlmProvider, OllamaProvider, OpenAIProvider,
};
use std::time::Duration;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
        timeout: Option<Duration>,
    ) -> Result<Box<dyn LlmProvider>, IngestError> {
        // Validate that provider is enabled
        if !config.enabled {
            return Err(IngestError::Configuration(format!(
                "Provider '{}' is not enabled in configuration",
                provider_name
            )));
        }

        match provider_name {
            "google" => Ok(Box::new(GoogleProvider::new(config, timeout)?)),
            "openai" => Ok(Box::new(OpenAIProvider::new(config, timeout)?)),
            "anthropic" => Ok(Box::new(AnthropicProvider::new(config, timeout)?)),
            "ollama" => Ok(Box::new(OllamaProvider::new(config, timeout)?)),
            _ => Err(IngestError::Configuration(format!(
                "Unknown provider: {}",
                provider_name
            ))),
        }
    }

    /// Get the default provider from configuration
    pub fn get_default_provider(config: &AiConfig) -> Result<Box<dyn LlmProvider>, IngestError> {
        let provider_config = config.default_provider_config();
        Self::create(
            &config.default_provider,
            &provider_config,
            config.timeout.map(Duration::from_secs),
        )
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["google", "openai", "anthropic", "ollama"]
    }
}
