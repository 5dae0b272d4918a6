//! The ingestion orchestrator.
//!
//! Every entry point runs the same four steps in order: build the prompt,
//! call the model, pull the JSON out of its reply, and normalize it into a
//! [`RecipeDraft`]. The variants only differ in the prompt they build and the
//! provenance they stamp on the result.

pub mod augment;
pub mod generate;
pub mod import;

use crate::acquire::{validate_source_text, MIN_IMPORT_TEXT_CHARS};
use crate::config::AiConfig;
use crate::error::IngestError;
use crate::extract::extract_json;
use crate::model::{GenerationRequest, RecipeDraft, RecipeSource};
use crate::normalize::normalize;
use crate::prompt::build_prompt;
use crate::providers::{LlmProvider, ProviderFactory};
use log::{debug, warn};
use std::fmt;
use std::time::Duration;

/// Where a single invocation currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Prompting,
    AwaitingModel,
    Extracting,
    Normalizing,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Prompting => "prompting",
            PipelineState::AwaitingModel => "awaiting_model",
            PipelineState::Extracting => "extracting",
            PipelineState::Normalizing => "normalizing",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// State machine of one orchestrator invocation.
///
/// Transitions are strictly sequential; once `Done` or `Failed` is reached
/// the run does not move again.
#[derive(Debug, Clone)]
pub struct IngestionRun {
    kind: &'static str,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl IngestionRun {
    pub fn new(kind: &'static str) -> Self {
        IngestionRun {
            kind,
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state the run has been in, oldest first
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    fn advance(&mut self, next: PipelineState) {
        if self.state.is_terminal() {
            return;
        }
        debug!("{} run: {} -> {}", self.kind, self.state, next);
        self.state = next;
        self.history.push(next);
    }

    fn fail(&mut self, error: &IngestError) {
        if self.state.is_terminal() {
            return;
        }
        warn!("{} run failed while {}: {}", self.kind, self.state, error);
        self.state = PipelineState::Failed;
        self.history.push(PipelineState::Failed);
    }
}

/// Runs generation, import and augmentation against one model provider
pub struct Orchestrator {
    provider: Box<dyn LlmProvider>,
    min_import_chars: usize,
    fetch_timeout: Option<Duration>,
}

impl Orchestrator {
    pub fn new(provider: Box<dyn LlmProvider>) -> Self {
        Orchestrator {
            provider,
            min_import_chars: MIN_IMPORT_TEXT_CHARS,
            fetch_timeout: None,
        }
    }

    /// Build an orchestrator around the default provider of `config`
    pub fn from_config(config: &AiConfig) -> Result<Self, IngestError> {
        let provider = ProviderFactory::get_default_provider(config)?;
        Ok(Orchestrator::new(provider)
            .with_min_import_chars(config.min_import_chars)
            .with_fetch_timeout(config.timeout.map(Duration::from_secs)))
    }

    pub fn with_min_import_chars(mut self, min_chars: usize) -> Self {
        self.min_import_chars = min_chars;
        self
    }

    /// Timeout used when fetching pages for URL import
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub(crate) fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    /// Run any request variant to completion
    pub async fn ingest(&self, request: &GenerationRequest) -> Result<RecipeDraft, IngestError> {
        let mut run = IngestionRun::new(request.kind());
        self.execute(request, &mut run).await
    }

    /// Like [`Orchestrator::ingest`], but drives a caller-owned run so its
    /// final state can be inspected
    pub async fn execute(
        &self,
        request: &GenerationRequest,
        run: &mut IngestionRun,
    ) -> Result<RecipeDraft, IngestError> {
        let result = self.steps(request, run).await;
        match &result {
            Ok(draft) => {
                run.advance(PipelineState::Done);
                debug!(
                    "{} run produced '{}' with {} ingredients and {} steps",
                    run.kind(),
                    draft.title,
                    draft.ingredients.len(),
                    draft.instructions.len()
                );
            }
            Err(e) => run.fail(e),
        }
        result
    }

    async fn steps(
        &self,
        request: &GenerationRequest,
        run: &mut IngestionRun,
    ) -> Result<RecipeDraft, IngestError> {
        run.advance(PipelineState::Prompting);
        if let GenerationRequest::Import { source_text } = request {
            validate_source_text(source_text, self.min_import_chars)?;
        }
        let prompt = build_prompt(request);

        run.advance(PipelineState::AwaitingModel);
        let raw = self.provider.complete(&prompt).await?;

        run.advance(PipelineState::Extracting);
        let parsed = extract_json(&raw)?;

        run.advance(PipelineState::Normalizing);
        let merge_into = match request {
            GenerationRequest::Augment { existing_recipe } => Some(existing_recipe),
            _ => None,
        };
        normalize(&parsed, provenance(request), merge_into)
    }
}

/// Provenance stamped on drafts; the model never chooses it
pub fn provenance(request: &GenerationRequest) -> RecipeSource {
    match request {
        GenerationRequest::FreeForm(req) if req.include_wildcard => RecipeSource::WildcardModified,
        GenerationRequest::FreeForm(_) => RecipeSource::AiGenerated,
        GenerationRequest::Import { .. } => RecipeSource::Imported,
        GenerationRequest::Augment { .. } => RecipeSource::WildcardModified,
    }
}
