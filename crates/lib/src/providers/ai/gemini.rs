use super::{error_from_status, error_from_transport, AiProvider, SamplingOptions};
use crate::{errors::PromptError, types::ImageInput};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

// --- Gemini-specific request and response structures ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    InlineData {
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: ContentResponse,
}

#[derive(Deserialize, Debug)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize, Debug)]
struct PartResponse {
    text: String,
}

// --- Gemini Provider implementation ---

/// A provider for interacting with the Google Gemini API.
#[derive(Clone, Debug)]
pub struct GeminiProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Option<Duration>,
}

impl GeminiProvider {
    /// Creates a new `GeminiProvider`.
    ///
    /// If `api_url` is `None`, the public `generateContent` endpoint for `model` is used.
    pub fn new(
        api_url: Option<String>,
        api_key: String,
        model: String,
        timeout: Option<Duration>,
    ) -> Result<Self, PromptError> {
        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(PromptError::ReqwestClientBuild)?;
        let api_url = api_url.unwrap_or_else(|| {
            format!("https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent")
        });
        Ok(Self {
            client,
            api_url,
            api_key,
            model,
            temperature: 0.0,
            max_tokens: 2048,
            timeout,
        })
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

impl GeminiProvider {
    async fn generate_content(
        &self,
        system_prompt: &str,
        user_parts: Vec<Part>,
        options: SamplingOptions,
    ) -> Result<String, PromptError> {
        let request_body = GeminiRequest {
            system_instruction: Content {
                parts: vec![Part::Text {
                    text: system_prompt.to_string(),
                }],
            },
            contents: vec![Content { parts: user_parts }],
            generation_config: GenerationConfig {
                temperature: options.temperature.unwrap_or(self.temperature),
                max_output_tokens: options.max_tokens.unwrap_or(self.max_tokens),
            },
        };

        debug!(model = %self.model, "--> Sending Gemini generateContent request");
        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", &self.api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| error_from_transport(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let error_text = response.text().await.unwrap_or_default();
            return Err(error_from_status(status, &headers, &error_text));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                error_from_transport(e, self.timeout)
            } else {
                PromptError::UpstreamError(format!("malformed Gemini envelope: {e}"))
            }
        })?;

        gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| {
                PromptError::UpstreamError("Gemini response has no candidates".to_string())
            })
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    async fn generate_with(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: SamplingOptions,
    ) -> Result<String, PromptError> {
        let parts = vec![Part::Text {
            text: user_prompt.to_string(),
        }];
        self.generate_content(system_prompt, parts, options).await
    }

    async fn generate_with_image(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        image: &ImageInput,
        options: SamplingOptions,
    ) -> Result<String, PromptError> {
        let parts = vec![
            Part::Text {
                text: user_prompt.to_string(),
            },
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.media_type.clone(),
                    data: image.to_base64(),
                },
            },
        ];
        self.generate_content(system_prompt, parts, options).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}
