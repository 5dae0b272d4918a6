use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

/// Main AI configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    /// Default provider to use when not specified
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Optional request timeout in seconds for model calls.
    /// When unset, the provider's own timeout governs.
    #[serde(default)]
    pub timeout: Option<u64>,
    /// Minimum trimmed length of pasted or uploaded recipe text
    #[serde(default = "default_min_import_chars")]
    pub min_import_chars: usize,
    /// Backend used to persist recipes and read the wildcard catalog
    #[serde(default)]
    pub backend: Option<BackendConfig>,
}

/// Configuration for a specific AI provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Model identifier (e.g., "gemini-2.5-flash", "gpt-4.1-mini")
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn new(model: impl Into<String>) -> Self {
        ProviderConfig {
            enabled: true,
            model: model.into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
        }
    }
}

/// REST backend the recipes are written to
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Project URL, e.g. https://xyz.supabase.co
    pub url: String,
    /// Anonymous (public) API key
    pub anon_key: String,
    /// Access token of the signed-in user, if any
    #[serde(default)]
    pub access_token: Option<String>,
    /// Id of the signed-in user; recipes are saved anonymously without it
    #[serde(default)]
    pub user_id: Option<String>,
}

// Default value functions
fn default_provider() -> String {
    "google".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_min_import_chars() -> usize {
    crate::acquire::MIN_IMPORT_TEXT_CHARS
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            default_provider: default_provider(),
            providers: HashMap::new(),
            timeout: None,
            min_import_chars: default_min_import_chars(),
            backend: None,
        }
    }
}

impl AiConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_WILDCARD__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_WILDCARD__PROVIDERS__GOOGLE__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Configuration of the default provider, or a stock one if the file does not list it
    pub fn default_provider_config(&self) -> ProviderConfig {
        self.providers
            .get(&self.default_provider)
            .cloned()
            .unwrap_or_else(|| {
                ProviderConfig::new(crate::providers::default_model(&self.default_provider))
            })
    }
}

/// Load configuration from file and environment variables
pub fn load_config() -> Result<AiConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: RECIPE_WILDCARD__PROVIDERS__GOOGLE__API_KEY
        .add_source(
            Environment::with_prefix("RECIPE_WILDCARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
