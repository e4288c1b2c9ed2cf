//! Shared types for the generation pipeline

use super::error::GenerationError;
use crate::extract::UploadedFile;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named tonal profile the generated text must follow
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    #[default]
    Corporate,
    Creative,
    Cyberpunk,
    Minimal,
    Academic,
}

impl Style {
    pub const ALL: [Style; 5] = [
        Style::Corporate,
        Style::Creative,
        Style::Cyberpunk,
        Style::Minimal,
        Style::Academic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Corporate => "corporate",
            Self::Creative => "creative",
            Self::Cyberpunk => "cyberpunk",
            Self::Minimal => "minimal",
            Self::Academic => "academic",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Corporate => "Corporate",
            Self::Creative => "Creative",
            Self::Cyberpunk => "Cyberpunk",
            Self::Minimal => "Minimal",
            Self::Academic => "Academic",
        }
    }

    /// One-line tone description handed to the model
    pub fn tone(&self) -> &'static str {
        match self {
            Self::Corporate => "Professional, clean, business-focused with formal language",
            Self::Creative => "Bold, expressive, using metaphors and creative language",
            Self::Cyberpunk => {
                "Futuristic, tech-forward, using technical jargon and neon aesthetic descriptions"
            }
            Self::Minimal => "Clean, concise, focusing on key points with minimal text",
            Self::Academic => "Scholarly, well-researched, with citations and detailed explanations",
        }
    }
}

impl FromStr for Style {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Style::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GenerationError::InvalidOption(format!("unknown style '{}'", s)))
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output language of every generated text field
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "cn")]
    Chinese,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Chinese => "cn",
        }
    }

    /// Pick the variant of a bilingual string pair
    pub fn pick<'a>(&self, en: &'a str, cn: &'a str) -> &'a str {
        match self {
            Self::English => en,
            Self::Chinese => cn,
        }
    }
}

impl FromStr for Language {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "cn" | "zh" | "chinese" => Ok(Self::Chinese),
            other => Err(GenerationError::InvalidOption(format!(
                "unsupported language '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Requested number of slides; 0 lets the model decide
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SlideCount(u32);

impl SlideCount {
    pub const AUTO: SlideCount = SlideCount(0);
    pub const ALLOWED: [u32; 4] = [0, 5, 10, 15];

    pub fn new(count: u32) -> Result<Self, GenerationError> {
        if Self::ALLOWED.contains(&count) {
            Ok(Self(count))
        } else {
            Err(GenerationError::InvalidOption(format!(
                "slide count must be one of {:?}, got {}",
                Self::ALLOWED,
                count
            )))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn is_auto(&self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u32> for SlideCount {
    type Error = GenerationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SlideCount> for u32 {
    fn from(count: SlideCount) -> Self {
        count.0
    }
}

impl FromStr for SlideCount {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::AUTO);
        }
        let count = s
            .parse::<u32>()
            .map_err(|_| GenerationError::InvalidOption(format!("invalid slide count '{}'", s)))?;
        Self::new(count)
    }
}

/// The user's chosen inputs for one generation attempt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip)]
    pub file: Option<UploadedFile>,
    pub style: Style,
    pub include_video: bool,
    pub slide_count: SlideCount,
}

impl GenerationConfig {
    pub fn new(file: UploadedFile) -> Self {
        Self {
            file: Some(file),
            include_video: true,
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_slide_count(mut self, slide_count: SlideCount) -> Self {
        self.slide_count = slide_count;
        self
    }

    pub fn with_video(mut self, include_video: bool) -> Self {
        self.include_video = include_video;
        self
    }
}

/// One slide of a generated deck
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// Position-derived id (`slide-1`, `slide-2`, ...), unique within one deck
    pub id: String,
    pub title: String,
    /// Bullet points in display order
    pub content: Vec<String>,
    /// English image-generation prompt, whatever the deck language
    pub image_prompt: String,
    /// Speaker notes
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A generated presentation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub title: String,
    pub slides: Vec<Slide>,
    pub summary: String,
}

/// Slide as returned by the generation service, before local ids are assigned
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlideDraft {
    pub title: String,
    pub content: Vec<String>,
    pub image_prompt: String,
    pub notes: String,
}

/// Validated deck-shaped payload from the generation service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeckDraft {
    pub title: String,
    pub slides: Vec<SlideDraft>,
    pub summary: String,
}

impl Deck {
    /// Build a deck from a service draft, assigning 1-based position ids
    pub fn from_draft(draft: DeckDraft) -> Self {
        let slides = draft
            .slides
            .into_iter()
            .enumerate()
            .map(|(index, slide)| Slide {
                id: format!("slide-{}", index + 1),
                title: slide.title,
                content: slide.content,
                image_prompt: slide.image_prompt,
                notes: slide.notes,
                image_url: None,
            })
            .collect();

        Self {
            title: draft.title,
            slides,
            summary: draft.summary,
        }
    }

    /// Render the deck as a Markdown outline
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n\n{}\n", self.title, self.summary);

        for (index, slide) in self.slides.iter().enumerate() {
            out.push_str(&format!("\n## {}. {}\n\n", index + 1, slide.title));
            for bullet in &slide.content {
                out.push_str(&format!("- {}\n", bullet));
            }
            if !slide.notes.is_empty() {
                out.push_str(&format!("\n> Notes: {}\n", slide.notes));
            }
            if !slide.image_prompt.is_empty() {
                out.push_str(&format!("\n_Image: {}_\n", slide.image_prompt));
            }
        }

        out
    }
}
