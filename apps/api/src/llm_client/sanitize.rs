//! Response sanitization: fence stripping and payload parsing.

use serde_json::Value;

use super::LlmError;

const FENCE: &str = "```";
const PREVIEW_CHARS: usize = 80;

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
///
/// The opening fence may carry a format tag (`json`, `JSON`, `javascript`, ...).
/// Prose before the first fence is dropped, and a missing closing fence is tolerated.
/// The closing fence is the last marker in the text, so markers inside the
/// payload (code in a string value) stay part of the body.
pub fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(open) = text.find(FENCE) else {
        return text;
    };

    let body = skip_format_tag(&text[open + FENCE.len()..]);
    let body = match body.rfind(FENCE) {
        Some(close) => &body[..close],
        None => body,
    };
    body.trim()
}

/// Removes every fence marker and the format tag after an opening one;
/// used for free-text answers. Text around and between fences is kept.
pub fn strip_all_fences(text: &str) -> String {
    text.split(FENCE)
        .enumerate()
        .map(|(i, part)| if i % 2 == 1 { skip_line_tag(part) } else { part })
        .collect::<String>()
        .trim()
        .to_string()
}

fn tag_len(s: &str) -> usize {
    s.find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(s.len())
}

fn skip_format_tag(s: &str) -> &str {
    let len = tag_len(s);
    if len == 0 {
        return s;
    }
    // Only a tag when followed by whitespace or the payload itself, so a
    // fenced bare scalar like ```true``` survives.
    match s[len..].chars().next() {
        Some(c) if c.is_whitespace() || c == '{' || c == '[' => &s[len..],
        _ => s,
    }
}

/// In prose a tag must end its line; ```Review closures``` keeps its words.
fn skip_line_tag(s: &str) -> &str {
    let len = tag_len(s);
    match s[len..].chars().next() {
        Some('\n') | Some('\r') if len > 0 => &s[len..],
        _ => s,
    }
}

/// Parses raw model text as JSON.
///
/// Tries, in order: the text as-is, the fenced body, and the outermost
/// `{...}` / `[...]` span inside the fenced body and then the whole text.
pub fn parse_payload(raw: &str) -> Result<Value, LlmError> {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let body = strip_fences(trimmed);
    let first_err = match serde_json::from_str(body) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    for candidate in [body, trimmed] {
        if let Some(span) = outermost_json_span(candidate) {
            if let Ok(value) = serde_json::from_str(span) {
                return Ok(value);
            }
        }
    }

    let preview: String = body.chars().take(PREVIEW_CHARS).collect();
    Err(LlmError::MalformedPayload(format!(
        "{first_err} (payload starts with {preview:?})"
    )))
}

fn outermost_json_span(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c == '{' || c == '[')?;
    let closer = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(closer)?;
    (end > start).then(|| &text[start..=end])
}
