use thiserror::Error;

/// Category a provider reported for a failed completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The credential was rejected by the provider
    InvalidCredential,
    /// The account ran out of quota or was rate limited
    QuotaExceeded,
    /// The credential is valid but not allowed to use the model
    PermissionDenied,
    /// Any other provider or transport failure
    Other,
}

impl ProviderErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderErrorKind::InvalidCredential => "invalid credential",
            ProviderErrorKind::QuotaExceeded => "quota exceeded",
            ProviderErrorKind::PermissionDenied => "permission denied",
            ProviderErrorKind::Other => "provider error",
        }
    }
}

/// Coarse grouping of errors, used by the UI to pick a remedy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing credential or bad configuration; fix the setup
    Configuration,
    /// Quota or permission trouble; try again later
    TransientProvider,
    /// Any other provider failure
    Provider,
    /// The model output did not match the expected contract; try different input
    Extraction,
    /// The caller supplied unusable input
    Input,
    /// The backend rejected a read or write
    Persistence,
}

/// Errors that can occur while generating, importing or augmenting recipes
#[derive(Error, Debug)]
pub enum IngestError {
    /// No usable credential for the model provider
    #[error("Not configured: {0}")]
    Configuration(String),

    /// The model provider reported a failure
    #[error("Provider error ({}): {message}", kind.as_str())]
    Provider {
        kind: ProviderErrorKind,
        message: String,
    },

    /// The model output contained no `{ ... }` span
    #[error("No JSON found in model response")]
    NoJsonFound,

    /// The `{ ... }` span did not parse as JSON
    #[error("Malformed JSON in model response: {0}")]
    MalformedJson(String),

    /// The parsed object could not be shaped into a recipe draft
    #[error("Failed to normalize recipe: {0}")]
    Normalization(String),

    /// Caller input was rejected before reaching the model
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Fetching recipe text from a URL failed
    #[error("Failed to acquire recipe text: {0}")]
    Acquisition(String),

    /// The persistence backend rejected a request
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    Builder(String),

    /// Configuration file or environment could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl IngestError {
    pub fn provider(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        IngestError::Provider {
            kind,
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            IngestError::Configuration(_) | IngestError::Builder(_) | IngestError::Config(_) => {
                ErrorCategory::Configuration
            }
            IngestError::Provider { kind, .. } => match kind {
                ProviderErrorKind::QuotaExceeded | ProviderErrorKind::PermissionDenied => {
                    ErrorCategory::TransientProvider
                }
                ProviderErrorKind::InvalidCredential => ErrorCategory::Configuration,
                ProviderErrorKind::Other => ErrorCategory::Provider,
            },
            IngestError::NoJsonFound
            | IngestError::MalformedJson(_)
            | IngestError::Normalization(_) => ErrorCategory::Extraction,
            IngestError::InvalidInput(_) | IngestError::Acquisition(_) => ErrorCategory::Input,
            IngestError::Persistence(_) => ErrorCategory::Persistence,
        }
    }

    /// Human-readable message suitable for an alert
    pub fn user_message(&self) -> String {
        match self {
            IngestError::Configuration(_) | IngestError::Config(_) | IngestError::Builder(_) => {
                "The AI service is not configured. Add an API key and try again.".to_string()
            }
            IngestError::Provider { kind, message } => match kind {
                ProviderErrorKind::InvalidCredential => {
                    "The AI service rejected the API key. Please check your configuration."
                        .to_string()
                }
                ProviderErrorKind::QuotaExceeded => {
                    "The AI service quota is exhausted. Please try again later.".to_string()
                }
                ProviderErrorKind::PermissionDenied => {
                    "Access to the AI service was denied. Please try again later.".to_string()
                }
                ProviderErrorKind::Other => format!("The AI service failed: {}", message),
            },
            IngestError::NoJsonFound
            | IngestError::MalformedJson(_)
            | IngestError::Normalization(_) => {
                "Could not read a recipe from the AI response. Try again, or paste the recipe text instead of a URL."
                    .to_string()
            }
            IngestError::InvalidInput(msg) => msg.clone(),
            IngestError::Acquisition(_) => {
                "Could not load that page. The site may block automated access; try pasting the recipe text instead."
                    .to_string()
            }
            IngestError::Persistence(_) => "Failed to save recipe. Please try again.".to_string(),
        }
    }
}

impl From<reqwest::Error> for IngestError {
    fn from(err: reqwest::Error) -> Self {
        IngestError::provider(ProviderErrorKind::Other, err.to_string())
    }
}
