//! Deck State Store
//!
//! Session-scoped holder of the current generation config and the last
//! generated deck. Handed to views and the orchestrator explicitly; clones
//! share the same state.

use super::types::{Deck, GenerationConfig, Language, Slide};
use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct StoreState {
    config: Option<GenerationConfig>,
    result: Option<Deck>,
    updated_at: Option<DateTime<Utc>>,
}

/// Shared {config, deck} pair for one application session
#[derive(Debug, Clone, Default)]
pub struct DeckStore {
    inner: Arc<RwLock<StoreState>>,
}

impl DeckStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_config(&self, config: GenerationConfig) {
        self.write().config = Some(config);
    }

    /// Publish a finished deck, replacing any previous one
    pub fn set_result(&self, deck: Deck) {
        let mut state = self.write();
        tracing::debug!(
            "[DeckStore] Storing deck '{}' ({} slides)",
            deck.title,
            deck.slides.len()
        );
        state.result = Some(deck);
        state.updated_at = Some(Utc::now());
    }

    /// Drop both the config and the deck, used when abandoning a generation flow
    pub fn clear(&self) {
        let mut state = self.write();
        state.config = None;
        state.result = None;
        state.updated_at = None;
    }

    pub fn config(&self) -> Option<GenerationConfig> {
        self.read().config.clone()
    }

    pub fn result(&self) -> Option<Deck> {
        self.read().result.clone()
    }

    pub fn has_result(&self) -> bool {
        self.read().result.is_some()
    }

    /// When the current deck was published
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.read().updated_at
    }

    /// The stored deck, or the fixed sample deck when nothing was generated
    pub fn deck_or_placeholder(&self, language: Language) -> Deck {
        self.result().unwrap_or_else(|| placeholder_deck(language))
    }
}

/// Sample deck shown by the editor before any generation ran
pub fn placeholder_deck(language: Language) -> Deck {
    const SLIDES: [(&str, &str, &str, &str); 5] = [
        ("AI Revolution 2024", "AI革命 2024", "The Future of Technology", "技术的未来"),
        ("Key Insights", "核心洞察", "Data-driven decision making", "数据驱动决策"),
        ("Video Showcase", "视频展示", "AI Generated Content", "AI生成内容"),
        ("Market Analysis", "市场分析", "Growth projections and trends", "增长预测与趋势"),
        ("Conclusion", "结论", "Next steps and recommendations", "下一步与建议"),
    ];

    let slides = SLIDES
        .iter()
        .enumerate()
        .map(|(index, (title_en, title_cn, body_en, body_cn))| Slide {
            id: format!("slide-{}", index + 1),
            title: language.pick(title_en, title_cn).to_string(),
            content: vec![language.pick(body_en, body_cn).to_string()],
            image_prompt: String::new(),
            notes: String::new(),
            image_url: None,
        })
        .collect();

    Deck {
        title: language.pick("AI Revolution 2024", "AI革命 2024").to_string(),
        slides,
        summary: String::new(),
    }
}
