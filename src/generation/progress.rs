//! Progress markers for a generation run
//!
//! Only the phase is authoritative. Step labels and percentages past
//! `Requesting` are presentation: the service does no image or video work.

use super::types::Language;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Where a generation attempt currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPhase {
    Idle,
    Extracting,
    Requesting,
    Synthesizing,
    Complete,
    Failed,
}

impl GenerationPhase {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Extracting | Self::Requesting | Self::Synthesizing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

/// Display steps shown while a run is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStep {
    Analyzing,
    Designing,
    Images,
    Video,
    Composing,
    Complete,
}

impl ProgressStep {
    pub fn label(&self, language: Language) -> &'static str {
        match self {
            Self::Analyzing => language.pick("Analyzing Document Structure...", "正在分析文档结构..."),
            Self::Designing => language.pick("Designing Schema...", "正在设计大纲 Schema..."),
            Self::Images => language.pick("Generating Images in Parallel...", "并行生成配图..."),
            Self::Video => language.pick("Synthesizing Video Workflow...", "合成 AI 视频流..."),
            Self::Composing => language.pick("Final Composition...", "最终合成渲染..."),
            Self::Complete => language.pick("Generation Complete!", "生成完成！"),
        }
    }
}

/// Steps for a run; the video step only appears when video was requested
pub fn steps_for(include_video: bool) -> Vec<ProgressStep> {
    let mut steps = vec![
        ProgressStep::Analyzing,
        ProgressStep::Designing,
        ProgressStep::Images,
    ];
    if include_video {
        steps.push(ProgressStep::Video);
    }
    steps.push(ProgressStep::Composing);
    steps.push(ProgressStep::Complete);
    steps
}

/// Percentage shown for a step, by its 1-based position in the run's step list
pub fn step_percent(steps: &[ProgressStep], step: ProgressStep) -> u8 {
    match steps.iter().position(|s| *s == step) {
        Some(index) if !steps.is_empty() => (((index + 1) * 100) / steps.len()) as u8,
        _ => 0,
    }
}

/// One progress notification
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationProgress {
    pub attempt: u32,
    pub phase: GenerationPhase,
    pub step: Option<ProgressStep>,
    pub percent: u8,
    pub message: String,
}

/// Number of image placeholders animated during a run
pub const IMAGE_SLOTS: usize = 4;

/// Fake per-image progress bars; cosmetic only
#[derive(Debug)]
pub struct ImageSlotAnimation {
    slots: [u8; IMAGE_SLOTS],
    rng: StdRng,
}

impl Default for ImageSlotAnimation {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSlotAnimation {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            slots: [0; IMAGE_SLOTS],
            rng,
        }
    }

    /// Advance every unfinished slot by 10-30 points, capped at 100
    pub fn tick(&mut self) -> [u8; IMAGE_SLOTS] {
        for slot in self.slots.iter_mut() {
            if *slot < 100 {
                let step: u8 = self.rng.random_range(10..=30);
                *slot = slot.saturating_add(step).min(100);
            }
        }
        self.slots
    }

    pub fn slots(&self) -> [u8; IMAGE_SLOTS] {
        self.slots
    }

    pub fn is_done(&self) -> bool {
        self.slots.iter().all(|s| *s >= 100)
    }

    pub fn reset(&mut self) {
        self.slots = [0; IMAGE_SLOTS];
    }
}
