use std::str::FromStr;
use std::time::Duration;

use crate::config::{load_config, AiConfig, ProviderConfig};
use crate::error::IngestError;
use crate::pipelines::Orchestrator;
use crate::providers::{default_model, ProviderFactory};

/// Model providers selectable through the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    OpenAI,
    Anthropic,
    Ollama,
}

impl Provider {
    /// Convert to provider name string used by the factory
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Ollama => "ollama",
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" | "gemini" => Ok(Provider::Google),
            "openai" => Ok(Provider::OpenAI),
            "anthropic" => Ok(Provider::Anthropic),
            "ollama" => Ok(Provider::Ollama),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// Builder for configuring an [`Orchestrator`]
#[derive(Debug, Default)]
pub struct OrchestratorBuilder {
    config: Option<AiConfig>,
    provider: Option<Provider>,
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    min_import_chars: Option<usize>,
}

impl OrchestratorBuilder {
    /// Use this configuration instead of loading `config.toml` and the
    /// environment
    pub fn config(mut self, config: AiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the model provider
    ///
    /// # Example
    /// ```
    /// use recipe_wildcard::{Provider, RecipeWildcard};
    ///
    /// let builder = RecipeWildcard::builder().provider(Provider::Anthropic);
    /// ```
    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the API key for the provider
    ///
    /// This allows passing the API key directly instead of relying on
    /// environment variables or config files. An empty key is kept as given
    /// and rejected when building.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model name for the provider
    ///
    /// # Example
    /// ```
    /// use recipe_wildcard::{Provider, RecipeWildcard};
    ///
    /// let builder = RecipeWildcard::builder()
    ///     .provider(Provider::OpenAI)
    ///     .model("gpt-4.1-mini");
    /// ```
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Send provider requests to a different host, e.g. a proxy
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set a timeout for HTTP requests; there is none by default
    ///
    /// # Example
    /// ```
    /// use recipe_wildcard::RecipeWildcard;
    /// use std::time::Duration;
    ///
    /// let builder = RecipeWildcard::builder().timeout(Duration::from_secs(30));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Minimum length of text accepted for import
    pub fn min_import_chars(mut self, min_chars: usize) -> Self {
        self.min_import_chars = Some(min_chars);
        self
    }

    /// Build the orchestrator
    ///
    /// # Errors
    /// Returns `IngestError` if:
    /// - The configuration file or environment cannot be read
    /// - The provider is unknown or disabled
    /// - No API key can be found for a provider that needs one
    ///
    /// # Example
    /// ```no_run
    /// # use recipe_wildcard::{FreeFormRequest, RecipeWildcard};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let orchestrator = RecipeWildcard::builder().api_key("your-api-key").build()?;
    /// let draft = orchestrator.generate(FreeFormRequest::new("a cozy lentil soup")).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<Orchestrator, IngestError> {
        let config = match self.config {
            Some(config) => config,
            None => load_config()?,
        };

        let provider_name = self
            .provider
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| config.default_provider.clone());

        let mut provider_config = config
            .providers
            .get(&provider_name)
            .cloned()
            .unwrap_or_else(|| ProviderConfig::new(default_model(&provider_name)));

        if let Some(api_key) = self.api_key {
            provider_config.api_key = Some(api_key);
        }
        if let Some(model) = self.model {
            provider_config.model = model;
        }
        if let Some(base_url) = self.base_url {
            provider_config.base_url = Some(base_url);
        }

        let timeout = self
            .timeout
            .or_else(|| config.timeout.map(Duration::from_secs));
        let provider = ProviderFactory::create(&provider_name, &provider_config, timeout)?;

        Ok(Orchestrator::new(provider)
            .with_min_import_chars(self.min_import_chars.unwrap_or(config.min_import_chars))
            .with_fetch_timeout(timeout))
    }
}

/// Main entry point for the builder API
pub struct RecipeWildcard;

impl RecipeWildcard {
    /// Creates a new builder for an orchestrator
    ///
    /// # Example
    /// ```
    /// use recipe_wildcard::RecipeWildcard;
    ///
    /// let builder = RecipeWildcard::builder();
    /// ```
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_with_explicit_key() {
        let orchestrator = RecipeWildcard::builder()
            .config(AiConfig::default())
            .provider(Provider::OpenAI)
            .api_key("test-key")
            .model("gpt-4.1-mini")
            .build()
            .unwrap();
        assert_eq!(orchestrator.provider_name(), "openai");
    }

    #[test]
    fn test_default_provider_is_google() {
        let orchestrator = RecipeWildcard::builder()
            .config(AiConfig::default())
            .api_key("test-key")
            .build()
            .unwrap();
        assert_eq!(orchestrator.provider_name(), "google");
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let result = RecipeWildcard::builder()
            .config(AiConfig::default())
            .provider(Provider::Anthropic)
            .api_key("")
            .build();
        assert!(matches!(result, Err(IngestError::Configuration(_))));
    }

    #[test]
    fn test_disabled_provider_is_rejected() {
        let mut config = AiConfig::default();
        let mut provider_config = ProviderConfig::new("llama3.1");
        provider_config.enabled = false;
        config.providers.insert("ollama".to_string(), provider_config);

        let result = RecipeWildcard::builder()
            .config(config)
            .provider(Provider::Ollama)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Gemini".parse::<Provider>(), Ok(Provider::Google));
        assert_eq!("openai".parse::<Provider>(), Ok(Provider::OpenAI));
        assert!("azure".parse::<Provider>().is_err());
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let orchestrator = RecipeWildcard::builder()
            .config(AiConfig::default())
            .provider(Provider::Ollama)
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(orchestrator.provider_name(), "ollama");
    }
}
