use super::Orchestrator;
use crate::error::IngestError;
use crate::model::{FreeFormRequest, GenerationRequest, RecipeDraft};
use log::info;

impl Orchestrator {
    /// Create a new recipe from a free-form description
    ///
    /// The draft is tagged `ai_generated`, or `wildcard_modified` when the
    /// request asks for a wildcard ingredient.
    pub async fn generate(&self, request: FreeFormRequest) -> Result<RecipeDraft, IngestError> {
        if request.prompt_text.trim().is_empty() {
            return Err(IngestError::InvalidInput(
                "Describe the recipe you would like to create".to_string(),
            ));
        }
        info!(
            "Generating recipe with {} (wildcard: {})",
            self.provider_name(),
            request.include_wildcard
        );
        self.ingest(&GenerationRequest::FreeForm(request)).await
    }
}
