#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared setup for the library's integration tests.

use dotenvy::dotenv;
use metaprompt::{client::ExtractionClient, Extractor, TemplateStore};
use metaprompt_test_utils::MockAiProvider;
use serde_json::{json, Value};
use std::sync::Once;
use std::time::Duration;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// Builds an `Extractor` over the builtin templates backed by `provider`.
pub fn mock_extractor(provider: &MockAiProvider, timeout: Duration) -> Extractor {
    let client = ExtractionClient::new(Box::new(provider.clone()), timeout);
    Extractor::new(TemplateStore::builtin(), client)
}

/// An OpenAI-style `chat/completions` response carrying `content`.
pub fn chat_completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

/// A Gemini `generateContent` response carrying `text`.
pub fn gemini_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]}
        }]
    })
}
