mod anthropic;
mod factory;
mod google;
mod ollama;
mod open_ai;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use google::GoogleProvider;
pub use ollama::OllamaProvider;
pub use open_ai::OpenAIProvider;

use crate::error::{IngestError, ProviderErrorKind};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Unified trait for all text-generation providers.
///
/// One call is one outbound request: no retries, no fallback to another
/// provider. The caller decides whether to let the user try again.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "google", "openai")
    fn provider_name(&self) -> &str;

    /// Send `prompt` and return the raw text the model produced
    async fn complete(&self, prompt: &str) -> Result<String, IngestError>;
}

/// Model used when the configuration does not name one
pub fn default_model(provider_name: &str) -> &'static str {
    match provider_name {
        "openai" => "gpt-4.1-mini",
        "anthropic" => "claude-sonnet-4-5",
        "ollama" => "llama3.1",
        _ => "gemini-2.5-flash",
    }
}

/// Pick the configured key, or the first non-empty environment variable.
///
/// An explicitly configured key is used as given, even when blank, so a
/// caller passing `""` gets a configuration error rather than a key from the
/// environment.
pub(crate) fn resolve_api_key(
    configured: Option<&str>,
    env_vars: &[&str],
) -> Result<String, IngestError> {
    let key = match configured {
        Some(key) => key.to_string(),
        None => env_vars
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
            .unwrap_or_default(),
    };
    ensure_credential(&key, env_vars.first().copied().unwrap_or("API key"))?;
    Ok(key)
}

/// Fails before any network traffic when the credential is blank
pub(crate) fn ensure_credential(key: &str, name: &str) -> Result<(), IngestError> {
    if key.trim().is_empty() {
        return Err(IngestError::Configuration(format!(
            "{name} is not configured"
        )));
    }
    Ok(())
}

pub(crate) fn http_client(timeout: Option<Duration>) -> Result<Client, IngestError> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| IngestError::Builder(format!("Failed to create HTTP client: {e}")))
}

/// Send a request and return the JSON body, classifying non-2xx responses
pub(crate) async fn send_json(request: RequestBuilder, provider: &str) -> Result<Value, IngestError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    debug!("{} responded {}: {}", provider, status, body);

    if !status.is_success() {
        let kind = classify_failure(status, &body);
        return Err(IngestError::provider(
            kind,
            format!("{provider} returned {status}: {}", error_message(&body)),
        ));
    }

    serde_json::from_str(&body).map_err(|e| {
        IngestError::provider(
            ProviderErrorKind::Other,
            format!("{provider} returned an unreadable body: {e}"),
        )
    })
}

/// Map an HTTP failure to the category the UI reports.
///
/// Provider status strings win over the HTTP status, since Gemini reports
/// an invalid key as a plain 400.
pub fn classify_failure(status: StatusCode, body: &str) -> ProviderErrorKind {
    let upper = body.to_uppercase();
    if upper.contains("API_KEY_INVALID")
        || upper.contains("INVALID_API_KEY")
        || upper.contains("API KEY NOT VALID")
        || upper.contains("AUTHENTICATION_ERROR")
    {
        return ProviderErrorKind::InvalidCredential;
    }
    if upper.contains("QUOTA_EXCEEDED")
        || upper.contains("RESOURCE_EXHAUSTED")
        || upper.contains("INSUFFICIENT_QUOTA")
        || upper.contains("RATE_LIMIT")
    {
        return ProviderErrorKind::QuotaExceeded;
    }
    if upper.contains("PERMISSION_DENIED") {
        return ProviderErrorKind::PermissionDenied;
    }

    match status {
        StatusCode::UNAUTHORIZED => ProviderErrorKind::InvalidCredential,
        StatusCode::FORBIDDEN => ProviderErrorKind::PermissionDenied,
        StatusCode::TOO_MANY_REQUESTS => ProviderErrorKind::QuotaExceeded,
        _ => ProviderErrorKind::Other,
    }
}

fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v["error"]["message"]
                .as_str()
                .or_else(|| v["error"].as_str())
                .or_else(|| v["message"].as_str())
        })
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_invalid_key_is_a_400() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT", "details": [{"reason": "API_KEY_INVALID"}]}}"#;
        assert_eq!(
            classify_failure(StatusCode::BAD_REQUEST, body),
            ProviderErrorKind::InvalidCredential
        );
    }

    #[test]
    fn test_status_fallbacks() {
        assert_eq!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, ""),
            ProviderErrorKind::QuotaExceeded
        );
        assert_eq!(
            classify_failure(StatusCode::FORBIDDEN, "{}"),
            ProviderErrorKind::PermissionDenied
        );
        assert_eq!(
            classify_failure(StatusCode::UNAUTHORIZED, "{}"),
            ProviderErrorKind::InvalidCredential
        );
        assert_eq!(
            classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ProviderErrorKind::Other
        );
    }

    #[test]
    fn test_status_strings_in_body() {
        assert_eq!(
            classify_failure(StatusCode::BAD_REQUEST, r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#),
            ProviderErrorKind::QuotaExceeded
        );
        assert_eq!(
            classify_failure(StatusCode::BAD_REQUEST, r#"{"error":{"status":"PERMISSION_DENIED"}}"#),
            ProviderErrorKind::PermissionDenied
        );
    }

    #[test]
    fn test_error_message_prefers_nested_message() {
        assert_eq!(error_message(r#"{"error":{"message":"nope"}}"#), "nope");
        assert_eq!(error_message(r#"{"error":"flat"}"#), "flat");
        assert_eq!(error_message("  plain text "), "plain text");
    }

    #[test]
    fn test_explicit_blank_key_is_not_replaced_by_env() {
        let result = resolve_api_key(Some(""), &["PATH"]);
        assert!(matches!(result, Err(IngestError::Configuration(_))));
        assert_eq!(resolve_api_key(Some("k"), &[]).unwrap(), "k");
    }

    #[test]
    fn test_default_models() {
        assert_eq!(default_model("google"), "gemini-2.5-flash");
        assert_eq!(default_model("openai"), "gpt-4.1-mini");
        assert_eq!(default_model("unknown"), "gemini-2.5-flash");
    }
}
