use super::Orchestrator;
use crate::acquire::{fetch_url_text, is_valid_url};
use crate::error::IngestError;
use crate::model::{GenerationRequest, RecipeDraft};
use log::info;

impl Orchestrator {
    /// Parse pasted or uploaded recipe text into a draft tagged `imported`
    pub async fn import_text(&self, source_text: &str) -> Result<RecipeDraft, IngestError> {
        self.ingest(&GenerationRequest::Import {
            source_text: source_text.trim().to_string(),
        })
        .await
    }

    /// Fetch a recipe page, reduce it to text, and parse that text.
    ///
    /// The draft remembers the page in `source_url`.
    pub async fn import_url(&self, url: &str) -> Result<RecipeDraft, IngestError> {
        let url = url.trim();
        if !is_valid_url(url) {
            return Err(IngestError::InvalidInput(
                "Please enter a valid URL starting with http:// or https://".to_string(),
            ));
        }

        info!("Importing recipe from {}", url);
        let text = fetch_url_text(url, self.fetch_timeout).await?;
        let mut draft = self.import_text(&text).await?;
        draft.source_url = Some(url.to_string());
        Ok(draft)
    }
}
