//! Generation Service Client contract
//!
//! A [`DeckService`] performs one round trip to a structured-generation
//! backend. Responses are decoded strictly here, at the boundary: a missing or
//! mistyped field becomes [`GenerationError::InvalidResponse`] instead of
//! surfacing later in the pipeline.

use crate::ai::prompts::GenerationRequest;
use crate::generation::error::GenerationError;
use crate::generation::types::{DeckDraft, SlideDraft};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";
pub const PAYMENT_REQUIRED_MESSAGE: &str =
    "Payment required. Please add credits to your workspace.";

/// One-shot structured generation. No retries, no caching.
#[async_trait]
pub trait DeckService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<DeckDraft, GenerationError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSlide {
    title: String,
    content: Vec<String>,
    image_prompt: String,
    notes: String,
}

#[derive(Deserialize)]
struct RawDeck {
    title: String,
    slides: Vec<RawSlide>,
    summary: String,
}

/// Strictly decode a deck-shaped JSON value
pub fn decode_deck_value(value: Value) -> Result<DeckDraft, GenerationError> {
    let raw: RawDeck = serde_json::from_value(value)
        .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

    if raw.slides.is_empty() {
        return Err(GenerationError::InvalidResponse(
            "response contains no slides".to_string(),
        ));
    }

    Ok(DeckDraft {
        title: raw.title,
        slides: raw
            .slides
            .into_iter()
            .map(|s| SlideDraft {
                title: s.title,
                content: s.content,
                image_prompt: s.image_prompt,
                notes: s.notes,
            })
            .collect(),
        summary: raw.summary,
    })
}

/// Strictly decode a deck from JSON text
pub fn decode_deck(body: &str) -> Result<DeckDraft, GenerationError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidResponse(format!("body is not valid JSON: {}", e)))?;
    decode_deck_value(value)
}

/// Pull an application-level error message out of a response body
fn error_message(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        Value::Object(obj) => Some(
            obj.get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(obj.clone()).to_string()),
        ),
        other => Some(other.to_string()),
    }
}

/// Map a fixed-message status (429/402) to its application error
pub fn status_error(status: u16) -> GenerationError {
    match status {
        429 => GenerationError::application(RATE_LIMIT_MESSAGE, status),
        402 => GenerationError::application(PAYMENT_REQUIRED_MESSAGE, status),
        _ => GenerationError::Gateway { status },
    }
}

/// Classify the hosted endpoint's reply
///
/// - `{ "error": ... }` at any status: application error, message verbatim
/// - other non-2xx: rate-limit / payment messages for 429 / 402, gateway error otherwise
/// - 2xx: strict deck decode
pub fn decode_endpoint_response(status: u16, body: &str) -> Result<DeckDraft, GenerationError> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if let Some(message) = parsed.as_ref().and_then(error_message) {
        return Err(GenerationError::application(message, status));
    }

    if !(200..300).contains(&status) {
        return Err(status_error(status));
    }

    match parsed {
        Some(value) => decode_deck_value(value),
        None => Err(GenerationError::InvalidResponse(
            "body is not valid JSON".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::error::{ApplicationErrorKind, ErrorClass};
    use serde_json::json;

    fn deck_json(slides: usize) -> String {
        json!({
            "title": "Launch Plan",
            "slides": (0..slides).map(|i| json!({
                "title": format!("Slide {}", i + 1),
                "content": ["one", "two", "three"],
                "imagePrompt": "a rocket on a launch pad",
                "notes": "keep it short"
            })).collect::<Vec<_>>(),
            "summary": "How we launch"
        })
        .to_string()
    }

    #[test]
    fn test_valid_deck_decodes() {
        let draft = decode_endpoint_response(200, &deck_json(3)).unwrap();
        assert_eq!(draft.title, "Launch Plan");
        assert_eq!(draft.slides.len(), 3);
        assert_eq!(draft.slides[0].image_prompt, "a rocket on a launch pad");
    }

    #[test]
    fn test_error_field_is_application_error() {
        let body = r#"{"error": "Rate limit exceeded. Please try again later."}"#;
        let err = decode_endpoint_response(429, body).unwrap_err();
        assert_eq!(err.to_string(), RATE_LIMIT_MESSAGE);
        assert_eq!(
            err,
            GenerationError::Application {
                message: RATE_LIMIT_MESSAGE.to_string(),
                kind: ApplicationErrorKind::RateLimited,
            }
        );
    }

    #[test]
    fn test_error_field_on_success_status() {
        let err = decode_endpoint_response(200, r#"{"error": "LOVABLE_API_KEY is not configured"}"#)
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Application);
        assert_eq!(err.to_string(), "LOVABLE_API_KEY is not configured");
    }

    #[test]
    fn test_payment_required_without_body() {
        let err = decode_endpoint_response(402, "").unwrap_err();
        assert_eq!(err.to_string(), PAYMENT_REQUIRED_MESSAGE);
    }

    #[test]
    fn test_other_status_is_gateway_error() {
        let err = decode_endpoint_response(503, "<html>Service Unavailable</html>").unwrap_err();
        assert_eq!(err, GenerationError::Gateway { status: 503 });
        assert_eq!(err.class(), ErrorClass::Transport);
    }

    #[test]
    fn test_non_json_success_is_schema_error() {
        let err = decode_endpoint_response(200, "not json at all").unwrap_err();
        assert_eq!(err.class(), ErrorClass::Schema);
    }

    #[test]
    fn test_missing_field_is_schema_error() {
        let body = json!({"title": "T", "slides": [{"title": "S", "content": ["a"], "notes": "n"}], "summary": "s"});
        let err = decode_endpoint_response(200, &body.to_string()).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Schema);
        assert!(err.to_string().contains("imagePrompt"));
    }

    #[test]
    fn test_mistyped_field_is_schema_error() {
        let body = json!({"title": "T", "slides": [{"title": "S", "content": "a", "imagePrompt": "p", "notes": "n"}], "summary": "s"});
        let err = decode_deck(&body.to_string()).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Schema);

        let body = json!({"title": null, "slides": [], "summary": "s"});
        assert!(decode_deck(&body.to_string()).is_err());
    }

    #[test]
    fn test_empty_slides_is_schema_error() {
        let err = decode_deck(&deck_json(0)).unwrap_err();
        assert_eq!(
            err,
            GenerationError::InvalidResponse("response contains no slides".to_string())
        );
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let mut value: Value = serde_json::from_str(&deck_json(1)).unwrap();
        value["theme"] = json!("dark");
        value["slides"][0]["layout"] = json!("split");
        assert!(decode_deck_value(value).is_ok());
    }
}
