use super::Orchestrator;
use crate::error::IngestError;
use crate::model::{GenerationRequest, RecipeDraft};
use log::info;

impl Orchestrator {
    /// Ask the model for one or two wildcard ingredients and merge them into
    /// a copy of `recipe`.
    ///
    /// `recipe` itself is never touched, so a failed call leaves the caller
    /// with the draft it had.
    pub async fn augment(&self, recipe: &RecipeDraft) -> Result<RecipeDraft, IngestError> {
        info!(
            "Adding wildcard ingredients to '{}' ({} ingredients)",
            recipe.title,
            recipe.ingredients.len()
        );
        self.ingest(&GenerationRequest::Augment {
            existing_recipe: recipe.clone(),
        })
        .await
    }
}
