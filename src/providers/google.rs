use crate::config::ProviderConfig;
use crate::error::{IngestError, ProviderErrorKind};
use crate::providers::{ensure_credential, http_client, resolve_api_key, send_json, LlmProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GoogleProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GoogleProvider {
    /// Create a new Google Gemini provider from configuration
    pub fn new(config: &ProviderConfig, timeout: Option<Duration>) -> Result<Self, IngestError> {
        // Try config first, then fall back to environment variables
        let api_key =
            resolve_api_key(config.api_key.as_deref(), &["GEMINI_API_KEY", "GOOGLE_API_KEY"])?;

        Ok(GoogleProvider {
            client: http_client(timeout)?,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        GoogleProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

#[async_trait]
impl LlmProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn complete(&self, prompt: &str) -> Result<String, IngestError> {
        ensure_credential(&self.api_key, "GEMINI_API_KEY")?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({
                "contents": [{
                    "parts": [{ "text": prompt }]
                }],
                "generationConfig": {
                    "temperature": self.temperature,
                    "maxOutputTokens": self.max_tokens
                }
            }));

        let response_body = send_json(request, self.provider_name()).await?;
        candidate_text(&response_body)
    }
}

/// Concatenate the text parts of the first candidate
fn candidate_text(body: &Value) -> Result<String, IngestError> {
    let text: String = body["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = body["promptFeedback"]["blockReason"]
            .as_str()
            .or_else(|| body["candidates"][0]["finishReason"].as_str())
            .unwrap_or("no candidates");
        return Err(IngestError::provider(
            ProviderErrorKind::Other,
            format!("Failed to extract content from Google Gemini response ({reason})"),
        ));
    }
    Ok(text)
}
