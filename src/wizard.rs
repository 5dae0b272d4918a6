//! Step state for the create screens (import from URL, upload, generate).
//!
//! Each screen owns one [`Wizard`]. It holds the in-progress draft and an
//! in-flight flag, and only moves forward through the orchestrator or an
//! explicit skip:
//!
//! ```text
//! Collecting -> Previewing -> OfferingWildcard -> Final -> (save) -> Collecting
//! ```

use crate::error::IngestError;
use crate::model::{GenerationRequest, PersistedRecipe, RecipeDraft};
use crate::pipelines::Orchestrator;
use crate::store::RecipeStore;
use log::{debug, info, warn};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Collecting,
    Previewing,
    OfferingWildcard,
    Final,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::Collecting => "collecting",
            WizardStep::Previewing => "previewing",
            WizardStep::OfferingWildcard => "offering_wildcard",
            WizardStep::Final => "final",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardKind {
    ImportUrl,
    Upload,
    Generate,
}

impl WizardKind {
    /// The generate screen also bookmarks what it saves and saves straight
    /// from its preview
    fn is_generate(&self) -> bool {
        matches!(self, WizardKind::Generate)
    }
}

#[derive(Error, Debug)]
pub enum WizardError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Cannot go from {from} to {to}")]
    InvalidTransition { from: WizardStep, to: WizardStep },

    #[error("Another request is still running")]
    Busy,

    #[error("There is no recipe draft yet")]
    NoDraft,

    #[error("{0}")]
    NotSavable(String),
}

impl WizardError {
    /// Message to show the user
    pub fn user_message(&self) -> String {
        match self {
            WizardError::Ingest(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Shared view of the in-flight flag, for disabling controls
#[derive(Debug, Clone, Default)]
pub struct BusyHandle {
    flag: Arc<AtomicBool>,
}

impl BusyHandle {
    pub fn is_busy(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Claim the flag; `None` if something else holds it
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard {
                flag: self.flag.clone(),
            })
    }
}

/// Releases the in-flight flag when dropped, including when the future
/// holding it is dropped mid-flight
#[derive(Debug)]
pub struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct Wizard {
    kind: WizardKind,
    step: WizardStep,
    draft: Option<RecipeDraft>,
    last_error: Option<String>,
    busy: BusyHandle,
    bookmark_after_save: bool,
}

impl Wizard {
    pub fn new(kind: WizardKind) -> Self {
        Wizard {
            kind,
            step: WizardStep::Collecting,
            draft: None,
            last_error: None,
            busy: BusyHandle::default(),
            bookmark_after_save: kind.is_generate(),
        }
    }

    pub fn kind(&self) -> WizardKind {
        self.kind
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> Option<&RecipeDraft> {
        self.draft.as_ref()
    }

    /// User-facing message of the last failed action
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn busy_handle(&self) -> BusyHandle {
        self.busy.clone()
    }

    pub fn set_bookmark_after_save(&mut self, bookmark: bool) {
        self.bookmark_after_save = bookmark;
    }

    /// Run the orchestrator on the collected input and preview the result
    pub async fn submit(
        &mut self,
        orchestrator: &Orchestrator,
        request: GenerationRequest,
    ) -> Result<&RecipeDraft, WizardError> {
        self.collect(orchestrator.ingest(&request)).await
    }

    /// Like [`Wizard::submit`], for a recipe page URL
    pub async fn submit_url(
        &mut self,
        orchestrator: &Orchestrator,
        url: &str,
    ) -> Result<&RecipeDraft, WizardError> {
        self.collect(orchestrator.import_url(url)).await
    }

    async fn collect<F>(&mut self, invocation: F) -> Result<&RecipeDraft, WizardError>
    where
        F: Future<Output = Result<RecipeDraft, IngestError>>,
    {
        self.expect_step(&[WizardStep::Collecting], WizardStep::Previewing)?;
        let _guard = self.busy.try_acquire().ok_or(WizardError::Busy)?;

        match invocation.await {
            Ok(draft) => {
                self.last_error = None;
                self.move_to(WizardStep::Previewing);
                Ok(self.draft.insert(draft))
            }
            Err(e) => Err(self.record(e)),
        }
    }

    pub fn continue_to_wildcard(&mut self) -> Result<(), WizardError> {
        self.expect_step(&[WizardStep::Previewing], WizardStep::OfferingWildcard)?;
        self.require_draft()?;
        self.move_to(WizardStep::OfferingWildcard);
        Ok(())
    }

    /// Merge wildcard ingredients into the draft.
    ///
    /// On failure the step and the draft stay as they were, so the user can
    /// still skip.
    pub async fn augment(&mut self, orchestrator: &Orchestrator) -> Result<&RecipeDraft, WizardError> {
        self.expect_step(&[WizardStep::OfferingWildcard], WizardStep::Final)?;
        let _guard = self.busy.try_acquire().ok_or(WizardError::Busy)?;
        let current = self.require_draft()?;

        match orchestrator.augment(current).await {
            Ok(augmented) => {
                self.last_error = None;
                self.move_to(WizardStep::Final);
                Ok(self.draft.insert(augmented))
            }
            Err(e) => Err(self.record(e)),
        }
    }

    pub fn skip_wildcard(&mut self) -> Result<(), WizardError> {
        self.expect_step(&[WizardStep::OfferingWildcard], WizardStep::Final)?;
        self.require_draft()?;
        self.move_to(WizardStep::Final);
        Ok(())
    }

    /// Go back to an earlier step; the draft is kept
    pub fn back_to(&mut self, step: WizardStep) -> Result<(), WizardError> {
        if step >= self.step {
            return Err(WizardError::InvalidTransition {
                from: self.step,
                to: step,
            });
        }
        self.move_to(step);
        Ok(())
    }

    /// Edit the draft in place; indices are re-derived afterwards
    pub fn edit_draft<F>(&mut self, edit: F) -> Result<(), WizardError>
    where
        F: FnOnce(&mut RecipeDraft),
    {
        if !matches!(self.step, WizardStep::Previewing | WizardStep::Final) {
            return Err(WizardError::InvalidTransition {
                from: self.step,
                to: self.step,
            });
        }
        let draft = self.draft.as_mut().ok_or(WizardError::NoDraft)?;
        edit(draft);
        draft.reindex();
        Ok(())
    }

    /// Persist the final draft and start over.
    ///
    /// A failed save keeps the wizard in place with its draft, so the save
    /// can be retried without generating again.
    pub async fn save(&mut self, store: &dyn RecipeStore) -> Result<PersistedRecipe, WizardError> {
        let mut allowed = vec![WizardStep::Final];
        if self.kind.is_generate() {
            allowed.push(WizardStep::Previewing);
        }
        self.expect_step(&allowed, WizardStep::Collecting)?;

        let draft = self.require_draft()?;
        draft.validate_savable().map_err(WizardError::NotSavable)?;
        let _guard = self.busy.try_acquire().ok_or(WizardError::Busy)?;

        let persisted = match store.create_recipe(draft).await {
            Ok(persisted) => persisted,
            Err(e) => return Err(self.record(e)),
        };

        if self.bookmark_after_save {
            if let Err(e) = store.save_bookmark(&persisted.id).await {
                warn!("Could not bookmark recipe {}: {}", persisted.id, e);
            }
        }

        info!("{:?} wizard saved recipe {}", self.kind, persisted.id);
        self.reset();
        Ok(persisted)
    }

    /// Back to an empty form
    pub fn reset(&mut self) {
        self.move_to(WizardStep::Collecting);
        self.draft = None;
        self.last_error = None;
    }

    fn expect_step(&self, allowed: &[WizardStep], to: WizardStep) -> Result<(), WizardError> {
        if allowed.contains(&self.step) {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition {
                from: self.step,
                to,
            })
        }
    }

    fn require_draft(&self) -> Result<&RecipeDraft, WizardError> {
        self.draft.as_ref().ok_or(WizardError::NoDraft)
    }

    fn move_to(&mut self, step: WizardStep) {
        debug!("{:?} wizard: {} -> {}", self.kind, self.step, step);
        self.step = step;
    }

    fn record(&mut self, error: IngestError) -> WizardError {
        self.last_error = Some(error.user_message());
        error.into()
    }
}
