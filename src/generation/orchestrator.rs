//! Generation Orchestrator
//!
//! Drives one deck generation: extract text, call the deck service, publish
//! the deck. Runs are sequential and one at a time per orchestrator.
//!
//! ## Flow
//! ```text
//! Idle -> Extracting -> Requesting -> Synthesizing -> Complete
//!            \              \
//!             +--------------+-------------------> Failed
//! ```
//!
//! The deck reaches the store only at Complete. A failed run leaves the
//! store as it was.

use super::error::GenerationError;
use super::progress::{step_percent, steps_for, GenerationPhase, GenerationProgress, ProgressStep};
use super::store::DeckStore;
use super::types::{Deck, GenerationConfig, Language};
use crate::ai::prompts::build_generation_request;
use crate::ai::service::DeckService;
use crate::extract::TextExtractor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Receives every progress notification of every attempt
pub type ProgressCallback = Arc<dyn Fn(GenerationProgress) + Send + Sync>;

/// Result of a start or retry request
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Complete(Deck),
    Failed(GenerationError),
    /// No file in the config; the caller should go back to the upload step
    NeedsUpload,
    /// A run was already triggered; nothing new was launched
    AlreadyStarted,
}

#[derive(Debug)]
struct RunState {
    phase: GenerationPhase,
    attempts: u32,
    last_error: Option<GenerationError>,
    config: Option<GenerationConfig>,
    run_id: Option<Uuid>,
}

/// Releases the in-flight flag when a run ends or its future is dropped
///
/// A run abandoned mid-way is recorded as failed so it can be retried.
struct InFlightGuard<'a> {
    orchestrator: &'a GenerationOrchestrator,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.orchestrator.state();
            if !state.phase.is_terminal() {
                tracing::warn!(
                    phase = ?state.phase,
                    "[Orchestrator] Run abandoned before finishing"
                );
                state.phase = GenerationPhase::Failed;
                state.last_error = Some(GenerationError::Interrupted);
            }
        }
        self.orchestrator.in_flight.store(false, Ordering::SeqCst);
    }
}

pub struct GenerationOrchestrator {
    extractor: Arc<dyn TextExtractor>,
    service: Arc<dyn DeckService>,
    store: DeckStore,
    language: Language,
    /// Set by the first accepted start; duplicate starts are refused
    started: AtomicBool,
    /// Held for the duration of a run
    in_flight: AtomicBool,
    state: Mutex<RunState>,
    progress: Option<ProgressCallback>,
}

impl GenerationOrchestrator {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        service: Arc<dyn DeckService>,
        store: DeckStore,
        language: Language,
    ) -> Self {
        Self {
            extractor,
            service,
            store,
            language,
            started: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
            state: Mutex::new(RunState {
                phase: GenerationPhase::Idle,
                attempts: 0,
                last_error: None,
                config: None,
                run_id: None,
            }),
            progress: None,
        }
    }

    pub fn with_progress(
        mut self,
        callback: impl Fn(GenerationProgress) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    fn state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self) -> GenerationPhase {
        self.state().phase
    }

    pub fn last_error(&self) -> Option<GenerationError> {
        self.state().last_error.clone()
    }

    /// Number of attempts run so far, including retries
    pub fn attempts(&self) -> u32 {
        self.state().attempts
    }

    pub fn run_id(&self) -> Option<Uuid> {
        self.state().run_id
    }

    pub fn store(&self) -> &DeckStore {
        &self.store
    }

    /// Start the first generation for `config`
    pub async fn start(&self, config: GenerationConfig) -> GenerationOutcome {
        if config.file.is_none() {
            tracing::info!("[Orchestrator] No file in config, upload required");
            return GenerationOutcome::NeedsUpload;
        }

        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("[Orchestrator] Duplicate start ignored");
            return GenerationOutcome::AlreadyStarted;
        }

        self.in_flight.store(true, Ordering::SeqCst);
        let _guard = InFlightGuard { orchestrator: self };
        self.state().config = Some(config.clone());
        self.run(config).await
    }

    /// Re-run the whole pipeline from the retained config
    ///
    /// Accepted after a failure or a completed run. Extraction runs again.
    pub async fn retry(&self) -> GenerationOutcome {
        let Some(config) = self.state().config.clone() else {
            return GenerationOutcome::NeedsUpload;
        };

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("[Orchestrator] Retry ignored, a run is in flight");
            return GenerationOutcome::AlreadyStarted;
        }

        let _guard = InFlightGuard { orchestrator: self };
        tracing::info!(attempt = self.attempts() + 1, "[Orchestrator] Retrying generation");
        self.run(config).await
    }

    async fn run(&self, config: GenerationConfig) -> GenerationOutcome {
        let run_id = Uuid::new_v4();
        let attempt = {
            let mut state = self.state();
            state.attempts += 1;
            state.phase = GenerationPhase::Idle;
            state.last_error = None;
            state.run_id = Some(run_id);
            state.attempts
        };

        tracing::info!(
            %run_id,
            attempt,
            file = config.file.as_ref().map(|f| f.name()).unwrap_or_default(),
            style = config.style.as_str(),
            slide_count = config.slide_count.get(),
            "[Orchestrator] Generation started"
        );

        let steps = steps_for(config.include_video);
        match self.execute(&config, &steps, attempt).await {
            Ok(deck) => {
                self.store.set_result(deck.clone());
                self.state().phase = GenerationPhase::Complete;
                self.emit_step(attempt, GenerationPhase::Complete, &steps, ProgressStep::Complete);
                tracing::info!(
                    %run_id,
                    slides = deck.slides.len(),
                    "[Orchestrator] Generation complete: '{}'",
                    deck.title
                );
                GenerationOutcome::Complete(deck)
            }
            Err(err) => {
                {
                    let mut state = self.state();
                    state.phase = GenerationPhase::Failed;
                    state.last_error = Some(err.clone());
                }
                self.emit(GenerationProgress {
                    attempt,
                    phase: GenerationPhase::Failed,
                    step: None,
                    percent: 0,
                    message: err.to_string(),
                });
                tracing::warn!(%run_id, class = ?err.class(), "[Orchestrator] Generation failed: {}", err);
                GenerationOutcome::Failed(err)
            }
        }
    }

    async fn execute(
        &self,
        config: &GenerationConfig,
        steps: &[ProgressStep],
        attempt: u32,
    ) -> Result<Deck, GenerationError> {
        let file = config.file.as_ref().ok_or(GenerationError::MissingFile)?;

        self.enter(attempt, GenerationPhase::Extracting, steps, ProgressStep::Analyzing);
        let document_content = self.extractor.extract(file).await?;
        tracing::debug!(chars = document_content.len(), "[Orchestrator] Extraction finished");

        self.enter(attempt, GenerationPhase::Requesting, steps, ProgressStep::Designing);
        let request = build_generation_request(
            document_content,
            config.style,
            config.slide_count,
            self.language,
        );
        let draft = self.service.generate(&request).await?;

        self.enter(attempt, GenerationPhase::Synthesizing, steps, ProgressStep::Images);
        if config.include_video {
            self.emit_step(attempt, GenerationPhase::Synthesizing, steps, ProgressStep::Video);
        }
        self.emit_step(attempt, GenerationPhase::Synthesizing, steps, ProgressStep::Composing);

        Ok(Deck::from_draft(draft))
    }

    fn enter(&self, attempt: u32, phase: GenerationPhase, steps: &[ProgressStep], step: ProgressStep) {
        self.state().phase = phase;
        self.emit_step(attempt, phase, steps, step);
    }

    fn emit_step(&self, attempt: u32, phase: GenerationPhase, steps: &[ProgressStep], step: ProgressStep) {
        self.emit(GenerationProgress {
            attempt,
            phase,
            step: Some(step),
            percent: step_percent(steps, step),
            message: step.label(self.language).to_string(),
        });
    }

    fn emit(&self, progress: GenerationProgress) {
        if let Some(ref callback) = self.progress {
            callback(progress);
        }
    }
}
