//! Generation Request Builder
//!
//! Pure functions turning extracted text plus the user's options into the
//! request sent to the structured-generation service.

use crate::generation::types::{Language, SlideCount, Style};
use serde::Serialize;

/// JSON shape the model must return, embedded verbatim in the user prompt
pub const RESPONSE_SCHEMA: &str = r#"{
  "title": "Presentation title",
  "slides": [
    {
      "title": "Slide title",
      "content": ["Bullet point 1", "Bullet point 2", "Bullet point 3"],
      "imagePrompt": "A detailed prompt for generating a relevant image in {style} style...",
      "notes": "Speaker notes for this slide..."
    }
  ],
  "summary": "Brief summary of the presentation"
}"#;

/// Rendered chat prompts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptSet {
    pub system: String,
    pub user: String,
}

/// Everything needed for one generation call
///
/// Serializes to the hosted endpoint's wire body
/// (`documentContent`, `style`, `slideCount`, `language`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub document_content: String,
    pub style: Style,
    pub slide_count: SlideCount,
    pub language: Language,
    /// Prompts for direct chat-completion calls, not part of the wire body
    #[serde(skip)]
    pub prompt: PromptSet,
}

/// Build a generation request
pub fn build_generation_request(
    document_content: String,
    style: Style,
    slide_count: SlideCount,
    language: Language,
) -> GenerationRequest {
    let prompt = PromptSet {
        system: build_system_prompt(style, language),
        user: build_user_prompt(&document_content, style, slide_count),
    };

    GenerationRequest {
        document_content,
        style,
        slide_count,
        language,
        prompt,
    }
}

pub fn slide_count_instruction(slide_count: SlideCount) -> String {
    if slide_count.is_auto() {
        "determine the optimal number of slides based on the content (typically 5-10 slides)"
            .to_string()
    } else {
        format!("create exactly {} slides", slide_count.get())
    }
}

pub fn language_instruction(language: Language) -> &'static str {
    match language {
        Language::English => "Generate all content in English.",
        Language::Chinese => {
            "Generate all content in Chinese (Simplified Chinese). All titles, content, and notes should be in Chinese."
        }
    }
}

/// System prompt: role, language and style rules, per-slide requirements
pub fn build_system_prompt(style: Style, language: Language) -> String {
    let profiles = Style::ALL
        .iter()
        .map(|s| format!("- {}: {}", s.label(), s.tone()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an expert presentation designer. Your task is to analyze documents and create professional slide content.

{}

Style: {}
{}

For each slide, provide:
1. A compelling title
2. 3-5 bullet points of key content
3. A detailed image generation prompt (in English, for AI image generation)
4. Speaker notes"#,
        language_instruction(language),
        style.as_str(),
        profiles
    )
}

/// User prompt: the document, the slide-count instruction and the response schema
pub fn build_user_prompt(document_content: &str, style: Style, slide_count: SlideCount) -> String {
    format!(
        r#"Analyze this document and {}:

{}

Return a JSON response with this exact structure:
{}"#,
        slide_count_instruction(slide_count),
        document_content,
        RESPONSE_SCHEMA.replace("{style}", style.as_str())
    )
}
