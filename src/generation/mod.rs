//! Deck generation pipeline
//!
//! Upload -> extract text -> structured generation -> deck in the store.

pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{ApplicationErrorKind, ErrorClass, GenerationError};
pub use orchestrator::{GenerationOrchestrator, GenerationOutcome, ProgressCallback};
pub use progress::{GenerationPhase, GenerationProgress, ImageSlotAnimation, ProgressStep};
pub use store::{placeholder_deck, DeckStore};
pub use types::{Deck, GenerationConfig, Language, Slide, SlideCount, Style};
