//! `deckgen generate` and `deckgen placeholder`

use crate::ai::chat_client::ChatCompletionClient;
use crate::ai::endpoint_client::EndpointClient;
use crate::ai::http_client::build_client;
use crate::ai::service::DeckService;
use crate::config::AppConfig;
use crate::extract::{is_accepted, ContentExtractor, UploadedFile, ACCEPTED_EXTENSIONS};
use crate::generation::orchestrator::{GenerationOrchestrator, GenerationOutcome};
use crate::generation::progress::{GenerationPhase, GenerationProgress, ImageSlotAnimation};
use crate::generation::store::{placeholder_deck, DeckStore};
use crate::generation::types::{Deck, GenerationConfig, Language, SlideCount, Style};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Which service produces the deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Hosted analyze endpoint (DECKGEN_ENDPOINT_URL)
    Endpoint,
    /// OpenAI-compatible gateway called directly (AI_GATEWAY_URL)
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Document to turn into a deck
    pub file: PathBuf,

    /// corporate, creative, cyberpunk, minimal or academic
    #[arg(short, long, default_value = "corporate")]
    pub style: Style,

    /// 0 (auto), 5, 10 or 15
    #[arg(long, default_value = "auto")]
    pub slides: SlideCount,

    /// Deck language (en or cn); defaults to DECKGEN_LANGUAGE
    #[arg(short, long)]
    pub language: Option<Language>,

    /// Skip the video step
    #[arg(long)]
    pub no_video: bool,

    #[arg(short, long, value_enum, default_value = "endpoint")]
    pub backend: Backend,

    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Retries issued after a failed attempt
    #[arg(long, default_value = "0")]
    pub retries: u32,

    /// Do not print progress to stderr
    #[arg(short, long)]
    pub quiet: bool,
}

fn build_service(backend: Backend, config: &AppConfig) -> Result<Arc<dyn DeckService>, String> {
    let client = build_client(config.timeout_secs)?;

    let service: Arc<dyn DeckService> = match backend {
        Backend::Endpoint => {
            let url = config.require_endpoint_url().map_err(|e| e.to_string())?;
            Arc::new(EndpointClient::with_client(
                client,
                url,
                config.endpoint_key.clone(),
            ))
        }
        Backend::Chat => {
            let key = config.require_gateway_key().map_err(|e| {
                format!("{} (set it in the environment or run `deckgen set-key`)", e)
            })?;
            Arc::new(ChatCompletionClient::with_client(
                client,
                &config.gateway_url,
                key,
                &config.model,
            ))
        }
    };

    Ok(service)
}

pub async fn generate(args: GenerateArgs, config: &AppConfig) -> Result<(), String> {
    let upload = UploadedFile::from_path(&args.file);
    if !is_accepted(upload.name()) {
        return Err(format!(
            "Unsupported file '{}'. Accepted: {}",
            upload.name(),
            ACCEPTED_EXTENSIONS
                .iter()
                .map(|e| format!(".{}", e))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    let language = args.language.unwrap_or(config.language);
    let service = build_service(args.backend, config)?;

    let generation_config = GenerationConfig::new(upload)
        .with_style(args.style)
        .with_slide_count(args.slides)
        .with_video(!args.no_video);

    let store = DeckStore::new();
    store.set_config(generation_config.clone());

    let quiet = args.quiet;
    let orchestrator = GenerationOrchestrator::new(
        Arc::new(ContentExtractor::new()),
        service,
        store.clone(),
        language,
    )
    .with_progress(move |progress| {
        if !quiet {
            report(&progress);
        }
    });

    let animation = (!quiet).then(|| tokio::spawn(animate_image_slots()));

    let mut outcome = orchestrator.start(generation_config).await;
    let mut retries_left = args.retries;
    while matches!(outcome, GenerationOutcome::Failed(_)) && retries_left > 0 {
        retries_left -= 1;
        outcome = orchestrator.retry().await;
    }

    if let Some(handle) = animation {
        handle.abort();
    }

    match outcome {
        GenerationOutcome::Complete(deck) => print_deck(&deck, args.format),
        GenerationOutcome::Failed(err) => Err(format!(
            "Generation failed after {} attempt(s): {}",
            orchestrator.attempts(),
            err
        )),
        GenerationOutcome::NeedsUpload => Err("No file provided".to_string()),
        GenerationOutcome::AlreadyStarted => Err("Generation already started".to_string()),
    }
}

pub fn print_placeholder(language: Language, format: OutputFormat) -> Result<(), String> {
    print_deck(&placeholder_deck(language), format)
}

fn print_deck(deck: &Deck, format: OutputFormat) -> Result<(), String> {
    println!("{}", render_deck(deck, format)?);
    Ok(())
}

fn render_deck(deck: &Deck, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(deck)
            .map_err(|e| format!("Failed to serialize deck: {}", e)),
        OutputFormat::Markdown => Ok(deck.to_markdown()),
    }
}

fn report(progress: &GenerationProgress) {
    match progress.phase {
        GenerationPhase::Failed => {
            eprintln!("[attempt {}] failed: {}", progress.attempt, progress.message)
        }
        _ => eprintln!(
            "[attempt {}] {:>3}% {}",
            progress.attempt, progress.percent, progress.message
        ),
    }
}

/// Cosmetic per-image bars on stderr until every slot is full
async fn animate_image_slots() {
    let mut animation = ImageSlotAnimation::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(500));

    while !animation.is_done() {
        ticker.tick().await;
        let slots = animation.tick();
        tracing::debug!(?slots, "[Generate] Image slots");
        eprintln!("{}", format_image_slots(&slots));
    }
}

/// One stderr line with a ten-cell bar per image slot
fn format_image_slots(slots: &[u8]) -> String {
    let bars: Vec<String> = slots
        .iter()
        .map(|percent| {
            let filled = usize::from((*percent).min(100)) / 10;
            format!("[{}{}] {:>3}%", "#".repeat(filled), "-".repeat(10 - filled), percent)
        })
        .collect();
    format!("  images {}", bars.join(" "))
}
