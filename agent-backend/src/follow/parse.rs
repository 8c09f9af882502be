//! Pull a JSON object out of free-form model output.

use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// No `{ ... }` span in the text
    NoJsonFound,
    /// A span was found but is not valid JSON
    ParseFailure(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::NoJsonFound => write!(f, "no JSON object in model output"),
            ExtractError::ParseFailure(e) => write!(f, "model output JSON did not parse: {}", e),
        }
    }
}

/// Locate the candidate object span.
///
/// Starts at the first `{` and scans for its balanced `}`, ignoring braces
/// inside string literals. If the object never closes, falls back to the
/// span ending at the last `}` in the text.
pub fn find_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Extract and strictly decode the first JSON object in `text`
pub fn extract_json_object(text: &str) -> Result<Value, ExtractError> {
    let span = find_object_span(text).ok_or(ExtractError::NoJsonFound)?;
    serde_json::from_str(span).map_err(|e| ExtractError::ParseFailure(e.to_string()))
}
