//! Fence stripping for model replies that wrap JSON in Markdown code blocks.
//!
//! Precedence: a ```` ```json ```` fence wins over a bare ```` ``` ```` fence,
//! which wins over the raw text. An unclosed fence runs to the end of the text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

static RE_JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json(.*?)(?:```|\z)").unwrap());
static RE_ANY_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(.*?)(?:```|\z)").unwrap());

/// Which rule produced the extracted slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Json,
    Bare,
    Raw,
}

#[derive(Debug, Error)]
#[error("reply is not valid JSON after fence stripping ({kind:?}): {source}")]
pub struct FenceParseError {
    pub kind: FenceKind,
    pub extracted: String,
    #[source]
    pub source: serde_json::Error,
}

/// Returns the JSON candidate inside `text` and the rule that matched.
pub fn extract_fenced(text: &str) -> (&str, FenceKind) {
    if let Some(caps) = RE_JSON_FENCE.captures(text) {
        if let Some(inner) = caps.get(1) {
            return (inner.as_str().trim(), FenceKind::Json);
        }
    }
    if let Some(caps) = RE_ANY_FENCE.captures(text) {
        if let Some(inner) = caps.get(1) {
            return (inner.as_str().trim(), FenceKind::Bare);
        }
    }
    (text, FenceKind::Raw)
}

/// Strips fences and parses the remainder as JSON.
pub fn parse_fenced_json(text: &str) -> Result<Value, FenceParseError> {
    let (candidate, kind) = extract_fenced(text);
    serde_json::from_str(candidate).map_err(|source| FenceParseError {
        kind,
        extracted: candidate.to_string(),
        source,
    })
}
