pub mod acquire;
pub mod builder;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod pipelines;
pub mod prompt;
pub mod providers;
pub mod store;
pub mod wildcard;
pub mod wizard;

// UniFFI bindings for mobile platforms
pub mod uniffi_bindings;

pub use builder::{OrchestratorBuilder, Provider, RecipeWildcard};
pub use config::{AiConfig, BackendConfig, ProviderConfig};
pub use error::{ErrorCategory, IngestError, ProviderErrorKind};
pub use model::{
    Difficulty, FreeFormRequest, GenerationRequest, IngredientDraft, InstructionDraft, Intensity,
    PersistedRecipe, RecipeDraft, RecipeSource, WildcardCatalogEntry, WildcardSuggestion,
};
pub use pipelines::{IngestionRun, Orchestrator, PipelineState};
pub use providers::LlmProvider;
pub use store::{RecipeStore, RestRecipeStore};
pub use wizard::{Wizard, WizardError, WizardKind, WizardStep};

// Re-export UniFFI types when feature is enabled
#[cfg(feature = "uniffi")]
pub use uniffi_bindings::*;

/// Generate a recipe with the provider configured in `config.toml` or the
/// environment
pub async fn generate_recipe(request: FreeFormRequest) -> Result<RecipeDraft, IngestError> {
    let config = config::load_config()?;
    Orchestrator::from_config(&config)?.generate(request).await
}

/// Import a recipe page with the configured provider
pub async fn import_recipe(url: &str) -> Result<RecipeDraft, IngestError> {
    let config = config::load_config()?;
    Orchestrator::from_config(&config)?.import_url(url).await
}
