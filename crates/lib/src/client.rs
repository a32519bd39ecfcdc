//! # Extraction Client
//!
//! The only component that talks to the network. It forwards a `Prompt` to the
//! configured AI provider under a deadline and returns the raw response text.

use crate::{
    errors::PromptError,
    prompts::extraction::EXTRACTION_SYSTEM_PROMPT,
    providers::ai::{AiProvider, SamplingOptions},
    types::{ImageInput, Prompt},
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Sends assembled prompts to a completion provider.
///
/// Cloning is cheap; clones share the underlying provider.
#[derive(Clone, Debug)]
pub struct ExtractionClient {
    provider: Arc<dyn AiProvider>,
    timeout: Duration,
}

impl ExtractionClient {
    pub fn new(provider: Box<dyn AiProvider>, timeout: Duration) -> Self {
        Self {
            provider: Arc::from(provider),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Sends `prompt` and returns the model's raw text.
    ///
    /// Dropping the returned future abandons the request.
    pub async fn extract(&self, prompt: &Prompt) -> Result<String, PromptError> {
        debug!(
            model = %self.provider.model(),
            kind = %prompt.document_type(),
            user_prompt = %prompt,
            "--> Sending extraction prompt to AI provider"
        );
        self.with_deadline(self.provider.generate(EXTRACTION_SYSTEM_PROMPT, prompt.as_str()))
            .await
    }

    /// Sends `prompt` together with `image` to a vision-capable model.
    pub async fn extract_image(
        &self,
        prompt: &Prompt,
        image: &ImageInput,
    ) -> Result<String, PromptError> {
        debug!(
            model = %self.provider.model(),
            kind = %prompt.document_type(),
            image = ?image,
            "--> Sending image extraction prompt to AI provider"
        );
        self.with_deadline(self.provider.generate_with_image(
            EXTRACTION_SYSTEM_PROMPT,
            prompt.as_str(),
            image,
            SamplingOptions::default(),
        ))
        .await
    }

    async fn with_deadline(
        &self,
        call: impl Future<Output = Result<String, PromptError>>,
    ) -> Result<String, PromptError> {
        let raw = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                warn!(timeout = ?self.timeout, "AI provider call exceeded its deadline");
                PromptError::Timeout(self.timeout)
            })??;
        debug!("<-- Raw response from AI provider: {}", raw);
        Ok(raw)
    }
}
