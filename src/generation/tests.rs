//! Generation pipeline tests
//!
//! End-to-end runs through the orchestrator with:
//! - the real content extractor over text uploads
//! - scripted deck services (no network)
//! - hosted-endpoint replies classified by the real decoder

use super::error::{ApplicationErrorKind, ErrorClass, GenerationError};
use super::orchestrator::{GenerationOrchestrator, GenerationOutcome};
use super::progress::{GenerationPhase, GenerationProgress, ProgressStep};
use super::store::DeckStore;
use super::types::{Deck, DeckDraft, GenerationConfig, Language, SlideCount, SlideDraft, Style};
use crate::ai::prompts::GenerationRequest;
use crate::ai::service::{decode_endpoint_response, DeckService, RATE_LIMIT_MESSAGE};
use crate::extract::{ContentExtractor, ExtractError, TextExtractor, UploadedFile};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Real extractor that counts its invocations and records what it produced
#[derive(Default)]
struct CountingExtractor {
    inner: ContentExtractor,
    calls: AtomicUsize,
}

impl CountingExtractor {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for CountingExtractor {
    async fn extract(&self, file: &UploadedFile) -> Result<String, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.extract(file).await
    }
}

type Script = Box<dyn Fn(&GenerationRequest) -> Result<DeckDraft, GenerationError> + Send + Sync>;

/// Deck service answering from a closure, keeping every request it saw
struct ScriptedService {
    script: Script,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedService {
    fn new(
        script: impl Fn(&GenerationRequest) -> Result<DeckDraft, GenerationError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Honors the requested slide count, three slides when automatic
    fn honoring_count() -> Self {
        Self::new(|request| {
            let count = if request.slide_count.is_auto() {
                3
            } else {
                request.slide_count.get() as usize
            };
            Ok(draft(count))
        })
    }

    /// Replays a raw hosted-endpoint reply through the endpoint decoder
    fn endpoint_reply(status: u16, body: &'static str) -> Self {
        Self::new(move |_| decode_endpoint_response(status, body))
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeckService for ScriptedService {
    async fn generate(&self, request: &GenerationRequest) -> Result<DeckDraft, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.script)(request)
    }
}

/// Service that blocks until released, for observing an in-flight run
struct GatedService {
    gate: Arc<Notify>,
}

#[async_trait]
impl DeckService for GatedService {
    async fn generate(&self, _request: &GenerationRequest) -> Result<DeckDraft, GenerationError> {
        self.gate.notified().await;
        Ok(draft(5))
    }
}

fn draft(count: usize) -> DeckDraft {
    DeckDraft {
        title: "Hello World".to_string(),
        slides: (0..count)
            .map(|i| SlideDraft {
                title: format!("Point {}", i + 1),
                content: vec!["first".into(), "second".into(), "third".into()],
                image_prompt: "a simple greeting card".into(),
                notes: "greet the audience".into(),
            })
            .collect(),
        summary: "A greeting".to_string(),
    }
}

fn notes_config(style: Style, slides: u32) -> GenerationConfig {
    GenerationConfig::new(UploadedFile::from_bytes("notes.txt", "Hello world"))
        .with_style(style)
        .with_slide_count(SlideCount::new(slides).unwrap())
}

fn orchestrator(
    extractor: Arc<CountingExtractor>,
    service: Arc<dyn DeckService>,
    store: DeckStore,
) -> GenerationOrchestrator {
    GenerationOrchestrator::new(extractor, service, store, Language::English)
}

fn previous_deck() -> Deck {
    Deck::from_draft(DeckDraft {
        title: "Previous".to_string(),
        ..draft(2)
    })
}

#[tokio::test]
async fn test_text_upload_produces_requested_slides() {
    let extractor = Arc::new(CountingExtractor::default());
    let service = Arc::new(ScriptedService::honoring_count());
    let store = DeckStore::new();
    let orch = orchestrator(extractor.clone(), service.clone(), store.clone());

    let outcome = orch.start(notes_config(Style::Minimal, 5)).await;

    let deck = match outcome {
        GenerationOutcome::Complete(deck) => deck,
        other => panic!("expected a deck, got {:?}", other),
    };
    assert_eq!(orch.phase(), GenerationPhase::Complete);

    let stored = store.result().expect("deck should be stored");
    assert_eq!(stored, deck);
    let ids: Vec<&str> = stored.slides.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["slide-1", "slide-2", "slide-3", "slide-4", "slide-5"]);

    // Plain text reaches the service unchanged
    let requests = service.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].document_content, "Hello world");
    assert_eq!(requests[0].style, Style::Minimal);
    assert_eq!(requests[0].language, Language::English);
    assert_eq!(extractor.calls(), 1);
}

#[tokio::test]
async fn test_rate_limit_fails_and_keeps_previous_deck() {
    let store = DeckStore::new();
    store.set_result(previous_deck());

    let service = Arc::new(ScriptedService::endpoint_reply(
        429,
        r#"{"error":"Rate limit exceeded. Please try again later."}"#,
    ));
    let orch = orchestrator(Arc::new(CountingExtractor::default()), service, store.clone());

    let outcome = orch.start(notes_config(Style::Corporate, 0)).await;

    match outcome {
        GenerationOutcome::Failed(GenerationError::Application { message, kind }) => {
            assert_eq!(message, RATE_LIMIT_MESSAGE);
            assert_eq!(kind, ApplicationErrorKind::RateLimited);
        }
        other => panic!("expected rate-limit failure, got {:?}", other),
    }
    assert_eq!(orch.phase(), GenerationPhase::Failed);
    assert_eq!(orch.last_error().unwrap().class(), ErrorClass::Application);
    assert_eq!(store.result().unwrap().title, "Previous");
}

#[tokio::test]
async fn test_non_json_success_is_schema_error() {
    let store = DeckStore::new();
    let service = Arc::new(ScriptedService::endpoint_reply(200, "<html>not a deck</html>"));
    let orch = orchestrator(Arc::new(CountingExtractor::default()), service, store.clone());

    let outcome = orch.start(notes_config(Style::Creative, 10)).await;

    let err = match outcome {
        GenerationOutcome::Failed(err) => err,
        other => panic!("expected failure, got {:?}", other),
    };
    assert_eq!(err.class(), ErrorClass::Schema);
    assert_ne!(err.class(), ErrorClass::Transport);
    assert!(store.result().is_none());
}

#[tokio::test]
async fn test_retry_reruns_extraction_each_attempt() {
    let extractor = Arc::new(CountingExtractor::default());
    let service = Arc::new(ScriptedService::endpoint_reply(500, "upstream unavailable"));
    let orch = orchestrator(extractor.clone(), service.clone(), DeckStore::new());

    let first = orch.start(notes_config(Style::Academic, 5)).await;
    assert_eq!(
        first,
        GenerationOutcome::Failed(GenerationError::Gateway { status: 500 })
    );
    assert_eq!(extractor.calls(), 1);

    orch.retry().await;
    orch.retry().await;

    assert_eq!(extractor.calls(), 3);
    assert_eq!(service.requests().len(), 3);
    assert_eq!(orch.attempts(), 3);
    assert_eq!(orch.phase(), GenerationPhase::Failed);
}

#[tokio::test]
async fn test_retry_after_success_regenerates() {
    let extractor = Arc::new(CountingExtractor::default());
    let orch = orchestrator(
        extractor.clone(),
        Arc::new(ScriptedService::honoring_count()),
        DeckStore::new(),
    );

    assert!(matches!(
        orch.start(notes_config(Style::Corporate, 10)).await,
        GenerationOutcome::Complete(_)
    ));
    match orch.retry().await {
        GenerationOutcome::Complete(deck) => assert_eq!(deck.slides.len(), 10),
        other => panic!("expected a regenerated deck, got {:?}", other),
    }
    assert_eq!(extractor.calls(), 2);
}

#[tokio::test]
async fn test_missing_file_needs_upload() {
    let extractor = Arc::new(CountingExtractor::default());
    let service = Arc::new(ScriptedService::honoring_count());
    let orch = orchestrator(extractor.clone(), service.clone(), DeckStore::new());

    assert_eq!(
        orch.start(GenerationConfig::default()).await,
        GenerationOutcome::NeedsUpload
    );
    assert_eq!(orch.retry().await, GenerationOutcome::NeedsUpload);
    assert_eq!(orch.phase(), GenerationPhase::Idle);
    assert_eq!(extractor.calls(), 0);
    assert!(service.requests().is_empty());
}

#[tokio::test]
async fn test_duplicate_triggers_do_not_launch_parallel_runs() {
    let gate = Arc::new(Notify::new());
    let extractor = Arc::new(CountingExtractor::default());
    let orch = Arc::new(orchestrator(
        extractor.clone(),
        Arc::new(GatedService { gate: gate.clone() }),
        DeckStore::new(),
    ));

    let running = {
        let orch = orch.clone();
        tokio::spawn(async move { orch.start(notes_config(Style::Cyberpunk, 5)).await })
    };

    while orch.phase() != GenerationPhase::Requesting {
        tokio::task::yield_now().await;
    }

    assert_eq!(
        orch.start(notes_config(Style::Cyberpunk, 5)).await,
        GenerationOutcome::AlreadyStarted
    );
    assert_eq!(orch.retry().await, GenerationOutcome::AlreadyStarted);

    gate.notify_one();
    let outcome = running.await.unwrap();
    assert!(matches!(outcome, GenerationOutcome::Complete(_)));
    assert_eq!(extractor.calls(), 1);

    // A later start is still a duplicate trigger of the same flow
    assert_eq!(
        orch.start(notes_config(Style::Cyberpunk, 5)).await,
        GenerationOutcome::AlreadyStarted
    );
}

#[tokio::test]
async fn test_abandoned_run_can_be_retried() {
    let gate = Arc::new(Notify::new());
    let extractor = Arc::new(CountingExtractor::default());
    let store = DeckStore::new();
    let orch = orchestrator(
        extractor.clone(),
        Arc::new(GatedService { gate: gate.clone() }),
        store.clone(),
    );

    // The caller gives up while the service call is still pending
    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        orch.start(notes_config(Style::Minimal, 5)),
    )
    .await;
    assert!(abandoned.is_err());
    assert_eq!(orch.phase(), GenerationPhase::Failed);
    assert_eq!(orch.last_error(), Some(GenerationError::Interrupted));
    assert!(store.result().is_none());

    gate.notify_one();
    match orch.retry().await {
        GenerationOutcome::Complete(deck) => assert_eq!(deck.slides.len(), 5),
        other => panic!("expected the retry to complete, got {:?}", other),
    }
    assert_eq!(orch.phase(), GenerationPhase::Complete);
    assert_eq!(extractor.calls(), 2);
    assert!(store.has_result());
}

#[tokio::test]
async fn test_progress_markers_follow_phases() {
    let seen: Arc<Mutex<Vec<GenerationProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let orch = GenerationOrchestrator::new(
        Arc::new(CountingExtractor::default()),
        Arc::new(ScriptedService::honoring_count()),
        DeckStore::new(),
        Language::Chinese,
    )
    .with_progress(move |p| sink.lock().unwrap().push(p));

    let config = notes_config(Style::Minimal, 5).with_video(false);
    orch.start(config).await;

    let seen = seen.lock().unwrap();
    let steps: Vec<ProgressStep> = seen.iter().filter_map(|p| p.step).collect();
    assert_eq!(
        steps,
        vec![
            ProgressStep::Analyzing,
            ProgressStep::Designing,
            ProgressStep::Images,
            ProgressStep::Composing,
            ProgressStep::Complete,
        ]
    );

    let last = seen.last().unwrap();
    assert_eq!(last.phase, GenerationPhase::Complete);
    assert_eq!(last.percent, 100);
    assert_eq!(last.message, "生成完成！");
    assert!(seen.windows(2).all(|w| w[0].percent <= w[1].percent));
}

#[tokio::test]
async fn test_failure_emits_error_message() {
    let seen: Arc<Mutex<Vec<GenerationProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let orch = GenerationOrchestrator::new(
        Arc::new(CountingExtractor::default()),
        Arc::new(ScriptedService::endpoint_reply(402, "")),
        DeckStore::new(),
        Language::English,
    )
    .with_progress(move |p| sink.lock().unwrap().push(p));

    orch.start(notes_config(Style::Corporate, 0)).await;

    let seen = seen.lock().unwrap();
    let last = seen.last().unwrap();
    assert_eq!(last.phase, GenerationPhase::Failed);
    assert_eq!(
        last.message,
        "Payment required. Please add credits to your workspace."
    );
    assert!(!seen.iter().any(|p| p.phase == GenerationPhase::Synthesizing));
}

#[tokio::test]
async fn test_unreadable_upload_is_extraction_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("vanished.md");
    let service = Arc::new(ScriptedService::honoring_count());
    let orch = orchestrator(
        Arc::new(CountingExtractor::default()),
        service.clone(),
        DeckStore::new(),
    );

    let outcome = orch.start(GenerationConfig::new(UploadedFile::from_path(missing))).await;

    match outcome {
        GenerationOutcome::Failed(err) => assert_eq!(err.class(), ErrorClass::Extraction),
        other => panic!("expected extraction failure, got {:?}", other),
    }
    assert!(service.requests().is_empty());
}

#[tokio::test]
async fn test_markdown_file_on_disk_is_sent_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.md");
    std::fs::write(&path, "# Plan\n\n- ship it").unwrap();

    let service = Arc::new(ScriptedService::honoring_count());
    let orch = orchestrator(
        Arc::new(CountingExtractor::default()),
        service.clone(),
        DeckStore::new(),
    );

    let outcome = orch.start(GenerationConfig::new(UploadedFile::from_path(&path))).await;
    assert!(matches!(outcome, GenerationOutcome::Complete(ref d) if d.slides.len() == 3));
    assert_eq!(service.requests()[0].document_content, "# Plan\n\n- ship it");
}
