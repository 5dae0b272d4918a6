//! Pulls the JSON object out of free-form model output.
//!
//! The candidate span runs from the first `{` to the last `}` in the text.
//! This is not a brace-depth match: prose containing stray braces before or
//! after the object ends up inside the span and makes it fail to parse.
//! An opening brace with no closing brace after it yields the rest of the
//! text as the candidate, which then fails as malformed.

use crate::error::IngestError;
use log::debug;
use serde_json::Value;

/// The greedy `{ ... }` candidate, or `None` when the text has no `{`
pub fn json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    match raw.rfind('}') {
        Some(end) if end > start => Some(&raw[start..=end]),
        _ => Some(&raw[start..]),
    }
}

pub fn extract_json(raw: &str) -> Result<Value, IngestError> {
    let candidate = json_span(raw).ok_or(IngestError::NoJsonFound)?;
    debug!("Extracted {} byte JSON candidate", candidate.len());
    serde_json::from_str(candidate).map_err(|e| IngestError::MalformedJson(e.to_string()))
}
