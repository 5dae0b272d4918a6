//! UniFFI bindings for recipe-wildcard
//!
//! This module provides FFI-compatible types and functions for use with iOS and Android.
//! It wraps the async Rust API with synchronous functions that manage their own tokio runtime.

use std::fmt;
use std::time::Duration;

use crate::model::{
    FreeFormRequest, IngredientDraft, InstructionDraft, Intensity, RecipeDraft, RecipeSource,
    WildcardCatalogEntry,
};
use crate::{IngestError, Orchestrator, Provider, RecipeWildcard};

// Re-export UniFFI macro
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

/// FFI-compatible ingredient line
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiIngredient {
    pub name: String,
    /// Free text such as "1/2" or "to taste"
    pub quantity: String,
    pub unit: String,
    pub is_wildcard: bool,
    pub wildcard_reason: Option<String>,
    pub order_index: u32,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiInstruction {
    pub step_number: u32,
    pub content: String,
}

/// FFI-compatible recipe draft
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiRecipeDraft {
    pub title: String,
    pub description: String,
    /// One of user_uploaded, ai_generated, wildcard_modified, template, imported
    pub source: String,
    pub source_url: Option<String>,
    pub prep_time_minutes: Option<u32>,
    pub cook_time_minutes: Option<u32>,
    pub servings: Option<u32>,
    pub cuisine: Option<String>,
    /// easy, medium or hard
    pub difficulty: Option<String>,
    pub is_public: bool,
    pub ingredients: Vec<FfiIngredient>,
    pub instructions: Vec<FfiInstruction>,
}

impl From<RecipeDraft> for FfiRecipeDraft {
    fn from(draft: RecipeDraft) -> Self {
        FfiRecipeDraft {
            title: draft.title,
            description: draft.description,
            source: draft.source.as_str().to_string(),
            source_url: draft.source_url,
            prep_time_minutes: draft.prep_time_minutes,
            cook_time_minutes: draft.cook_time_minutes,
            servings: draft.servings,
            cuisine: draft.cuisine,
            difficulty: draft.difficulty.map(|d| d.as_str().to_string()),
            is_public: draft.is_public,
            ingredients: draft
                .ingredients
                .into_iter()
                .map(|ing| FfiIngredient {
                    name: ing.name,
                    quantity: ing.quantity,
                    unit: ing.unit,
                    is_wildcard: ing.is_wildcard,
                    wildcard_reason: ing.wildcard_reason,
                    order_index: ing.order_index,
                })
                .collect(),
            instructions: draft
                .instructions
                .into_iter()
                .map(|inst| FfiInstruction {
                    step_number: inst.step_number,
                    content: inst.content,
                })
                .collect(),
        }
    }
}

impl From<FfiRecipeDraft> for RecipeDraft {
    fn from(ffi: FfiRecipeDraft) -> Self {
        let source = serde_json::from_value(serde_json::Value::String(ffi.source))
            .unwrap_or(RecipeSource::UserUploaded);

        let mut draft = RecipeDraft {
            title: ffi.title,
            description: ffi.description,
            source,
            source_url: ffi.source_url,
            prep_time_minutes: ffi.prep_time_minutes,
            cook_time_minutes: ffi.cook_time_minutes,
            servings: ffi.servings,
            cuisine: ffi.cuisine,
            difficulty: ffi.difficulty.and_then(|d| d.parse().ok()),
            is_public: ffi.is_public,
            ingredients: ffi
                .ingredients
                .into_iter()
                .map(|ing| IngredientDraft {
                    name: ing.name,
                    quantity: ing.quantity,
                    unit: ing.unit,
                    is_wildcard: ing.is_wildcard,
                    wildcard_reason: ing.wildcard_reason,
                    order_index: ing.order_index,
                })
                .collect(),
            instructions: ffi
                .instructions
                .into_iter()
                .map(|inst| InstructionDraft {
                    step_number: inst.step_number,
                    content: inst.content,
                })
                .collect(),
        };
        // Callers may have reordered rows without renumbering them
        draft.reindex();
        draft
    }
}

/// FFI-compatible wildcard catalog entry
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiWildcard {
    pub name: String,
    pub category: String,
    pub flavor_profile: Vec<String>,
    pub pairs_with: Vec<String>,
    pub description: String,
    pub usage_tips: String,
    /// subtle, medium or bold
    pub intensity: String,
}

impl From<WildcardCatalogEntry> for FfiWildcard {
    fn from(entry: WildcardCatalogEntry) -> Self {
        let intensity = match entry.intensity {
            Intensity::Subtle => "subtle",
            Intensity::Medium => "medium",
            Intensity::Bold => "bold",
        };
        FfiWildcard {
            name: entry.name,
            category: entry.category,
            flavor_profile: entry.flavor_profile,
            pairs_with: entry.pairs_with,
            description: entry.description,
            usage_tips: entry.usage_tips,
            intensity: intensity.to_string(),
        }
    }
}

/// FFI-compatible provider enum
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum FfiProvider {
    Google,
    OpenAI,
    Anthropic,
    Ollama,
}

impl From<FfiProvider> for Provider {
    fn from(provider: FfiProvider) -> Self {
        match provider {
            FfiProvider::Google => Provider::Google,
            FfiProvider::OpenAI => Provider::OpenAI,
            FfiProvider::Anthropic => Provider::Anthropic,
            FfiProvider::Ollama => Provider::Ollama,
        }
    }
}

/// Free-form generation request
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiGenerateRequest {
    pub prompt: String,
    pub cuisine: Option<String>,
    pub dietary_restrictions: Vec<String>,
    pub difficulty: Option<String>,
    pub include_wildcard: bool,
}

impl From<FfiGenerateRequest> for FreeFormRequest {
    fn from(req: FfiGenerateRequest) -> Self {
        FreeFormRequest {
            prompt_text: req.prompt,
            cuisine: req.cuisine,
            dietary_restrictions: req.dietary_restrictions,
            difficulty: req.difficulty.and_then(|d| d.parse().ok()),
            include_wildcard: req.include_wildcard,
        }
    }
}

/// Provider settings for a call
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiConfig {
    /// Optional provider (uses default if not specified)
    pub provider: Option<FfiProvider>,
    /// Optional API key (uses environment variable if not specified)
    pub api_key: Option<String>,
    /// Optional model name (uses provider default if not specified)
    pub model: Option<String>,
    /// Optional timeout in seconds (none if not specified)
    pub timeout_seconds: Option<u64>,
    /// Optional provider base URL, e.g. a proxy
    pub base_url: Option<String>,
}

/// FFI-compatible error type; `message` is ready to show to the user
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
pub enum FfiIngestError {
    /// Missing API key or bad configuration
    ConfigurationError { message: String },
    /// The model provider refused or failed the request; `detail` is the
    /// provider's own message
    ProviderError {
        kind: String,
        message: String,
        detail: String,
    },
    /// The model reply did not contain a usable recipe
    ExtractionError { message: String },
    /// Invalid input provided
    InvalidInput { message: String },
    /// Failed to fetch or save
    NetworkError { message: String },
    /// Runtime error (tokio)
    RuntimeError { message: String },
}

impl fmt::Display for FfiIngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiIngestError::ConfigurationError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            FfiIngestError::ProviderError {
                kind,
                message,
                detail,
            } => write!(f, "Provider error ({}): {} ({})", kind, message, detail),
            FfiIngestError::ExtractionError { message } => {
                write!(f, "Extraction error: {}", message)
            }
            FfiIngestError::InvalidInput { message } => write!(f, "Invalid input: {}", message),
            FfiIngestError::NetworkError { message } => write!(f, "Network error: {}", message),
            FfiIngestError::RuntimeError { message } => write!(f, "Runtime error: {}", message),
        }
    }
}

impl std::error::Error for FfiIngestError {}

impl From<IngestError> for FfiIngestError {
    fn from(err: IngestError) -> Self {
        let message = err.user_message();
        match err {
            IngestError::Configuration(_) | IngestError::Builder(_) | IngestError::Config(_) => {
                FfiIngestError::ConfigurationError { message }
            }
            IngestError::Provider { kind, message: detail } => FfiIngestError::ProviderError {
                kind: kind.as_str().to_string(),
                message,
                detail,
            },
            IngestError::NoJsonFound
            | IngestError::MalformedJson(_)
            | IngestError::Normalization(_) => FfiIngestError::ExtractionError { message },
            IngestError::InvalidInput(_) => FfiIngestError::InvalidInput { message },
            IngestError::Acquisition(_) | IngestError::Persistence(_) => {
                FfiIngestError::NetworkError { message }
            }
        }
    }
}

/// Create a new tokio runtime for FFI calls
fn create_runtime() -> Result<tokio::runtime::Runtime, FfiIngestError> {
    tokio::runtime::Runtime::new().map_err(|e| FfiIngestError::RuntimeError {
        message: format!("Failed to create async runtime: {}", e),
    })
}

fn orchestrator(config: Option<FfiConfig>) -> Result<Orchestrator, FfiIngestError> {
    let config = config.unwrap_or_default();

    let mut builder = RecipeWildcard::builder();

    if let Some(provider) = config.provider {
        builder = builder.provider(provider.into());
    }

    if let Some(api_key) = config.api_key {
        builder = builder.api_key(api_key);
    }

    if let Some(model) = config.model {
        builder = builder.model(model);
    }

    if let Some(timeout_secs) = config.timeout_seconds {
        builder = builder.timeout(Duration::from_secs(timeout_secs));
    }

    if let Some(base_url) = config.base_url {
        builder = builder.base_url(base_url);
    }

    Ok(builder.build()?)
}

/// Generate a recipe from a free-form description
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn generate_recipe(
    request: FfiGenerateRequest,
    config: Option<FfiConfig>,
) -> Result<FfiRecipeDraft, FfiIngestError> {
    let orchestrator = orchestrator(config)?;
    let rt = create_runtime()?;
    rt.block_on(async {
        let draft = orchestrator.generate(request.into()).await?;
        Ok(draft.into())
    })
}

/// Parse pasted or uploaded recipe text
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn parse_recipe_text(
    text: String,
    config: Option<FfiConfig>,
) -> Result<FfiRecipeDraft, FfiIngestError> {
    let orchestrator = orchestrator(config)?;
    let rt = create_runtime()?;
    rt.block_on(async {
        let draft = orchestrator.import_text(&text).await?;
        Ok(draft.into())
    })
}

/// Fetch a recipe page and parse it
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn import_recipe_url(
    url: String,
    config: Option<FfiConfig>,
) -> Result<FfiRecipeDraft, FfiIngestError> {
    let orchestrator = orchestrator(config)?;
    let rt = create_runtime()?;
    rt.block_on(async {
        let draft = orchestrator.import_url(&url).await?;
        Ok(draft.into())
    })
}

/// Merge one or two wildcard ingredients into a recipe
///
/// The input is not modified; on error the caller still has it.
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn add_wildcard_to_recipe(
    recipe: FfiRecipeDraft,
    config: Option<FfiConfig>,
) -> Result<FfiRecipeDraft, FfiIngestError> {
    let orchestrator = orchestrator(config)?;
    let rt = create_runtime()?;
    let existing: RecipeDraft = recipe.into();
    rt.block_on(async {
        let draft = orchestrator.augment(&existing).await?;
        Ok(draft.into())
    })
}

/// The built-in wildcard catalog
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn fallback_wildcards() -> Vec<FfiWildcard> {
    crate::wildcard::fallback_catalog()
        .into_iter()
        .map(FfiWildcard::from)
        .collect()
}

/// Get the library version
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Check if a provider is available (has required environment variables)
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn is_provider_available(provider: FfiProvider) -> bool {
    let set = |name: &str| std::env::var(name).map(|v| !v.trim().is_empty()).unwrap_or(false);
    match provider {
        FfiProvider::Google => set("GEMINI_API_KEY") || set("GOOGLE_API_KEY"),
        FfiProvider::OpenAI => set("OPENAI_API_KEY"),
        FfiProvider::Anthropic => set("ANTHROPIC_API_KEY"),
        // Ollama doesn't require API key
        FfiProvider::Ollama => true,
    }
}
