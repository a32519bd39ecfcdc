//! # Response Validator
//!
//! Parses a model's raw text response into an `ExtractionResult` and checks
//! that the document type's required top-level keys are present.

use crate::{
    errors::PromptError,
    templates::TemplateStore,
    types::{DocumentType, ExtractionResult},
};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Matches the body of the first fenced code block, with or without a language tag.
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```[A-Za-z0-9_-]*[ \t]*\r?\n?([\s\S]*?)```").expect("code fence regex is valid")
});

/// Parses `raw_text` for the given document type.
///
/// Tries the whole text first, then the first fenced code block, then the
/// outermost braces (tolerating prose before or after a single JSON object). Required keys may hold `null`; only their
/// absence is an error.
pub fn parse(
    store: &TemplateStore,
    raw_text: &str,
    document_type: &DocumentType,
) -> Result<ExtractionResult, PromptError> {
    let template = store.get_template(document_type)?;
    let value = extract_json(raw_text)?;

    let Value::Object(map) = value else {
        return Err(PromptError::SchemaMismatch {
            document_type: document_type.to_string(),
            missing: template.required_keys().to_vec(),
        });
    };

    let missing: Vec<String> = template
        .required_keys()
        .iter()
        .filter(|key| !map.contains_key(key.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        warn!(kind = %document_type, ?missing, "Model response is missing required keys");
        return Err(PromptError::SchemaMismatch {
            document_type: document_type.to_string(),
            missing,
        });
    }

    debug!(kind = %document_type, keys = map.len(), "Validated model response");
    Ok(ExtractionResult::from_map(map))
}

/// Locates and decodes the JSON payload inside a model response.
pub fn extract_json(raw_text: &str) -> Result<Value, PromptError> {
    let trimmed = raw_text.trim();

    // Well-formed JSON wins, even when a string value quotes a code fence.
    let first_error = match serde_json::from_str(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if let Some(body) = CODE_FENCE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
    {
        return serde_json::from_str(body).map_err(|e| malformed(e, body));
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            let candidate = &trimmed[start..=end];
            debug!("Retrying JSON parse on the outermost braces of the response");
            return serde_json::from_str(candidate).map_err(|e| malformed(e, candidate));
        }
    }

    Err(malformed(first_error, trimmed))
}

fn malformed(err: serde_json::Error, text: &str) -> PromptError {
    let preview: String = text.chars().take(80).collect();
    PromptError::MalformedJson(format!("{err} (response starts with {preview:?})"))
}
