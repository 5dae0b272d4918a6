//! Persistence of finished drafts.
//!
//! [`RestRecipeStore`] talks to a PostgREST backend: one insert for the
//! recipe row, then its ingredient and instruction rows keyed by the new id.

use crate::config::BackendConfig;
use crate::error::IngestError;
use crate::model::{PersistedRecipe, RecipeDraft, WildcardCatalogEntry};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};

#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Insert the recipe with its ingredients and instructions
    async fn create_recipe(&self, draft: &RecipeDraft) -> Result<PersistedRecipe, IngestError>;

    /// Add the recipe to the signed-in user's saved list
    async fn save_bookmark(&self, recipe_id: &str) -> Result<(), IngestError>;

    async fn fetch_wildcard_catalog(&self) -> Result<Vec<WildcardCatalogEntry>, IngestError>;
}

pub struct RestRecipeStore {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
    user_id: Option<String>,
}

impl RestRecipeStore {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        RestRecipeStore {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            access_token: None,
            user_id: None,
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        let mut store = RestRecipeStore::new(&config.url, &config.anon_key);
        store.access_token = config.access_token.clone();
        store.user_id = config.user_id.clone();
        store
    }

    /// Act as a signed-in user
    pub fn with_session(mut self, user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.access_token = Some(access_token.into());
        self
    }

    fn table(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        request
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<String, IngestError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| IngestError::Persistence(format!("{what}: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| IngestError::Persistence(format!("{what}: {e}")))?;
        debug!("{} responded {}: {}", what, status, body);

        if !status.is_success() {
            return Err(IngestError::Persistence(format!(
                "{what} returned {status}: {}",
                body.trim()
            )));
        }
        Ok(body)
    }

    async fn insert_rows(&self, table: &str, rows: Vec<Value>) -> Result<(), IngestError> {
        if rows.is_empty() {
            return Ok(());
        }
        let request = self
            .client
            .post(self.table(table))
            .header("Prefer", "return=minimal")
            .json(&rows);
        self.send(request, &format!("insert into {table}")).await?;
        Ok(())
    }

    async fn insert_children(&self, recipe_id: &str, draft: &RecipeDraft) -> Result<(), IngestError> {
        let ingredients = draft
            .ingredients
            .iter()
            .map(|ing| {
                json!({
                    "recipe_id": recipe_id,
                    "name": ing.name,
                    "quantity": ing.quantity,
                    "unit": ing.unit,
                    "is_wildcard": ing.is_wildcard,
                    "wildcard_reason": ing.wildcard_reason,
                    "order_index": ing.order_index,
                })
            })
            .collect();
        self.insert_rows("ingredients", ingredients).await?;

        let instructions = draft
            .instructions
            .iter()
            .map(|inst| {
                json!({
                    "recipe_id": recipe_id,
                    "step_number": inst.step_number,
                    "content": inst.content,
                })
            })
            .collect();
        self.insert_rows("instructions", instructions).await
    }

    /// Remove a recipe row; ingredient and instruction rows cascade on the backend
    pub async fn delete_recipe(&self, recipe_id: &str) -> Result<(), IngestError> {
        let request = self
            .client
            .delete(self.table("recipes"))
            .query(&[("id", format!("eq.{recipe_id}"))]);
        self.send(request, "delete from recipes").await?;
        Ok(())
    }
}

#[async_trait]
impl RecipeStore for RestRecipeStore {
    async fn create_recipe(&self, draft: &RecipeDraft) -> Result<PersistedRecipe, IngestError> {
        let request = self
            .client
            .post(self.table("recipes"))
            .header("Prefer", "return=representation")
            .json(&recipe_row(draft, self.user_id.as_deref()));
        let body = self.send(request, "insert into recipes").await?;

        let persisted = parse_persisted(&body)?;

        if let Err(e) = self.insert_children(&persisted.id, draft).await {
            warn!("Rolling back recipe {} after failed insert: {}", persisted.id, e);
            if let Err(cleanup) = self.delete_recipe(&persisted.id).await {
                warn!("Could not remove partial recipe {}: {}", persisted.id, cleanup);
            }
            return Err(e);
        }

        info!("Saved recipe '{}' as {}", persisted.title, persisted.id);
        Ok(persisted)
    }

    async fn save_bookmark(&self, recipe_id: &str) -> Result<(), IngestError> {
        let user_id = self.user_id.as_deref().ok_or_else(|| {
            IngestError::Persistence("Must be logged in to save recipes".to_string())
        })?;
        self.insert_rows(
            "saved_recipes",
            vec![json!({"user_id": user_id, "recipe_id": recipe_id})],
        )
        .await
    }

    async fn fetch_wildcard_catalog(&self) -> Result<Vec<WildcardCatalogEntry>, IngestError> {
        let request = self
            .client
            .get(self.table("wildcard_catalog"))
            .query(&[("select", "*"), ("order", "name")]);
        let body = self.send(request, "select from wildcard_catalog").await?;

        serde_json::from_str(&body)
            .map_err(|e| IngestError::Persistence(format!("unreadable wildcard catalog: {e}")))
    }
}

fn recipe_row(draft: &RecipeDraft, user_id: Option<&str>) -> Value {
    json!({
        "user_id": user_id,
        "title": draft.title,
        "description": draft.description,
        "source": draft.source,
        "source_url": draft.source_url,
        "prep_time_minutes": draft.prep_time_minutes,
        "cook_time_minutes": draft.cook_time_minutes,
        "servings": draft.servings,
        "cuisine": draft.cuisine,
        "difficulty": draft.difficulty,
        "is_public": draft.is_public,
        "is_anonymous": user_id.is_none(),
    })
}

/// PostgREST returns the inserted rows as an array unless asked for an object
fn parse_persisted(body: &str) -> Result<PersistedRecipe, IngestError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| IngestError::Persistence(format!("unreadable recipe row: {e}")))?;
    let row = match value {
        Value::Array(mut rows) if !rows.is_empty() => rows.swap_remove(0),
        Value::Object(_) => value,
        _ => {
            return Err(IngestError::Persistence(
                "backend did not return the new recipe".to_string(),
            ))
        }
    };

    // Ids may be uuids or bigints depending on the schema
    let id = match &row["id"] {
        Value::String(id) => id.clone(),
        Value::Number(id) => id.to_string(),
        _ => {
            return Err(IngestError::Persistence(
                "recipe row has no id".to_string(),
            ))
        }
    };

    Ok(PersistedRecipe {
        id,
        title: row["title"].as_str().unwrap_or_default().to_string(),
        source: serde_json::from_value(row["source"].clone()).ok(),
        created_at: row["created_at"].as_str().map(str::to_string),
    })
}
