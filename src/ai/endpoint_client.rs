//! Hosted analyze-endpoint client
//!
//! POSTs `{ documentContent, style, slideCount, language }` to the hosted
//! generation function and classifies the reply.

use super::http_client::generation_client;
use super::prompts::GenerationRequest;
use super::service::{decode_endpoint_response, DeckService};
use crate::generation::error::GenerationError;
use crate::generation::types::DeckDraft;
use async_trait::async_trait;
use reqwest::Client;

/// Client for the hosted structured-generation endpoint
pub struct EndpointClient {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl EndpointClient {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self::with_client(generation_client().clone(), url, api_key)
    }

    pub fn with_client(client: Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl DeckService for EndpointClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<DeckDraft, GenerationError> {
        tracing::info!(
            style = request.style.as_str(),
            slide_count = request.slide_count.get(),
            language = request.language.code(),
            chars = request.document_content.len(),
            "[EndpointClient] Sending document for analysis"
        );

        let mut builder = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(request);

        if let Some(ref key) = self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GenerationError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(format!("Failed to read response: {}", e)))?;

        tracing::debug!(
            "[EndpointClient] Response status {} ({} bytes)",
            status,
            body.len()
        );

        decode_endpoint_response(status, &body).inspect_err(|e| {
            tracing::warn!(status, class = ?e.class(), "[EndpointClient] Generation failed: {}", e);
        })
    }
}
