//! Locating the JSON object inside model output
//!
//! JSON mode usually yields a bare object, but some models still wrap it in a
//! Markdown fence or add a sentence around it.

/// Body of the first Markdown code fence, with any language tag dropped
fn fenced_body(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_ticks = &text[open + 3..];
    // The info string (`json`, `JSON`, nothing) runs to the end of the line
    let body_start = after_ticks.find('\n').map(|i| i + 1)?;
    let body = &after_ticks[body_start..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

/// Outermost `{ ... }` span of `text`
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Extract the JSON object from a model reply
pub fn extract_json_object(text: &str) -> Result<String, String> {
    let candidate = fenced_body(text).unwrap_or(text);

    brace_span(candidate)
        .map(str::to_string)
        .ok_or_else(|| "No JSON object found in response".to_string())
}
