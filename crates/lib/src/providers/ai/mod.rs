pub mod gemini;
pub mod openai;

use crate::{errors::PromptError, types::ImageInput};
use async_trait::async_trait;
use dyn_clone::DynClone;
use reqwest::{header::HeaderMap, StatusCode};
use std::fmt::Debug;
use std::time::Duration;

pub use gemini::GeminiProvider;
pub use openai::OpenAiCompatibleProvider;

/// Per-call sampling overrides. `None` keeps the provider's configured default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SamplingOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl SamplingOptions {
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            ..Default::default()
        }
    }
}

/// A trait for interacting with a remote text-completion provider.
///
/// Implementations send one request per call and map provider failures onto
/// the `PromptError` taxonomy. They never retry and never inspect the
/// generated text.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response with the provider's default sampling settings.
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, PromptError> {
        self.generate_with(system_prompt, user_prompt, SamplingOptions::default())
            .await
    }

    /// Generates a response with explicit sampling overrides.
    async fn generate_with(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: SamplingOptions,
    ) -> Result<String, PromptError>;

    /// Generates a response for a prompt with an attached image.
    ///
    /// Providers without vision support reject the call.
    async fn generate_with_image(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _image: &ImageInput,
        _options: SamplingOptions,
    ) -> Result<String, PromptError> {
        Err(PromptError::UnsupportedDocument(format!(
            "model '{}' does not accept image input",
            self.model()
        )))
    }

    /// The model identifier, for logging.
    fn model(&self) -> &str;
}

dyn_clone::clone_trait_object!(AiProvider);

/// Maps a non-success HTTP response onto the error taxonomy.
pub(crate) fn error_from_status(status: StatusCode, headers: &HeaderMap, body: &str) -> PromptError {
    let detail = if body.trim().is_empty() {
        status.to_string()
    } else {
        format!("{status}: {}", body.trim())
    };
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PromptError::AuthenticationFailed(detail),
        StatusCode::TOO_MANY_REQUESTS => PromptError::RateLimited {
            retry_after: headers
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs),
            message: detail,
        },
        _ => PromptError::UpstreamError(detail),
    }
}

/// Maps a transport-level `reqwest` failure onto the error taxonomy.
pub(crate) fn error_from_transport(err: reqwest::Error, timeout: Option<Duration>) -> PromptError {
    if err.is_timeout() {
        PromptError::Timeout(timeout.unwrap_or_default())
    } else {
        PromptError::UpstreamError(format!("request to AI provider failed: {err}"))
    }
}

/// Shortens an API key for logging, e.g. `sk-or...a1b2c`.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 10 {
        let head: String = chars[..5].iter().collect();
        let tail: String = chars[chars.len() - 5..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, RETRY_AFTER};

    #[test]
    fn statuses_map_to_distinct_kinds() {
        let empty = HeaderMap::new();
        assert!(matches!(
            error_from_status(StatusCode::UNAUTHORIZED, &empty, "bad key"),
            PromptError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            error_from_status(StatusCode::FORBIDDEN, &empty, ""),
            PromptError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            error_from_status(StatusCode::BAD_GATEWAY, &empty, ""),
            PromptError::UpstreamError(_)
        ));
        assert!(matches!(
            error_from_status(StatusCode::NOT_FOUND, &empty, "no such model"),
            PromptError::UpstreamError(_)
        ));
    }

    #[test]
    fn rate_limit_reads_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("12"));
        match error_from_status(StatusCode::TOO_MANY_REQUESTS, &headers, "") {
            PromptError::RateLimited { retry_after, .. } => {
                assert_eq!(retry_after, Some(Duration::from_secs(12)))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn api_keys_are_masked() {
        assert_eq!(mask_api_key("sk-or-v1-0123456789abcdef"), "sk-or...bcdef");
        assert_eq!(mask_api_key("short"), "***");
    }
}
