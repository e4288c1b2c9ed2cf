//! Direct chat-completion backend
//!
//! Does what the hosted analyze endpoint does: sends the system/user prompts
//! to an OpenAI-compatible `/v1/chat/completions` gateway asking for a strict
//! JSON object, then decodes the model's JSON as a deck.

use super::http_client::generation_client;
use super::json_parser::extract_json_object;
use super::prompts::GenerationRequest;
use super::service::{decode_deck, status_error, DeckService};
use crate::generation::error::GenerationError;
use crate::generation::types::DeckDraft;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat-completion client
pub struct ChatCompletionClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_client(generation_client().clone(), base_url, api_key, model)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn build_body(&self, request: &GenerationRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.prompt.system.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.prompt.user.clone(),
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        }
    }
}

#[async_trait]
impl DeckService for ChatCompletionClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<DeckDraft, GenerationError> {
        tracing::info!(
            model = %self.model,
            style = request.style.as_str(),
            slide_count = request.slide_count.get(),
            language = request.language.code(),
            "[ChatClient] Analyzing document"
        );

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| GenerationError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(format!("Failed to read response: {}", e)))?;

        interpret_chat_response(status, &body)
    }
}

/// Classify a chat-completion reply and decode the deck it carries
pub fn interpret_chat_response(status: u16, body: &str) -> Result<DeckDraft, GenerationError> {
    if !(200..300).contains(&status) {
        if status != 429 && status != 402 {
            tracing::error!("[ChatClient] AI gateway error: {} {}", status, body);
        }
        return Err(status_error(status));
    }

    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| GenerationError::InvalidResponse("No content in AI response".to_string()))?;

    let json = extract_json_object(&content).map_err(GenerationError::InvalidResponse)?;

    decode_deck(&json).inspect_err(|_| {
        tracing::error!("[ChatClient] Failed to parse AI response as JSON: {}", content);
    })
}

// API request/response types

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
