use super::{error_from_status, error_from_transport, mask_api_key, AiProvider, SamplingOptions};
use crate::{errors::PromptError, types::ImageInput};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, info};

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: MessageContent<'a>,
}

/// Plain text, or a list of parts for multimodal (vision) requests.
#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

// --- Provider implementation ---

/// A provider for OpenRouter, OpenAI, or any local server speaking the
/// `chat/completions` protocol.
#[derive(Clone, Debug)]
pub struct OpenAiCompatibleProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Option<Duration>,
    referer: Option<String>,
    title: Option<String>,
}

impl OpenAiCompatibleProvider {
    /// Creates a new `OpenAiCompatibleProvider` with default sampling settings.
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        model: String,
        timeout: Option<Duration>,
    ) -> Result<Self, PromptError> {
        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(PromptError::ReqwestClientBuild)?;

        info!(
            model = %model,
            api_url = %api_url,
            api_key = %api_key.as_deref().map(mask_api_key).unwrap_or_else(|| "<none>".to_string()),
            "Initialized OpenAI-compatible provider"
        );

        Ok(Self {
            client,
            api_url,
            api_key,
            model,
            temperature: 0.0,
            max_tokens: 2048,
            timeout,
            referer: None,
            title: None,
        })
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the `HTTP-Referer` and `X-Title` headers OpenRouter uses for app attribution.
    pub fn with_attribution(mut self, referer: Option<String>, title: Option<String>) -> Self {
        self.referer = referer;
        self.title = title;
        self
    }
}

impl OpenAiCompatibleProvider {
    async fn chat(
        &self,
        messages: Vec<ChatMessage<'_>>,
        options: SamplingOptions,
    ) -> Result<String, PromptError> {
        let request_body = ChatRequest {
            messages,
            model: &self.model,
            temperature: options.temperature.unwrap_or(self.temperature),
            max_tokens: options.max_tokens.unwrap_or(self.max_tokens),
            stream: false,
        };

        let mut request_builder = self.client.post(&self.api_url);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }
        if let Some(referer) = &self.referer {
            request_builder = request_builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            request_builder = request_builder.header("X-Title", title);
        }

        debug!(model = %self.model, "--> Sending chat completion request");
        let response = request_builder
            .json(&request_body)
            .send()
            .await
            .map_err(|e| error_from_transport(e, self.timeout))?;

        let status = response.status();
        debug!(%status, "<-- Chat completion response");
        if !status.is_success() {
            let headers = response.headers().clone();
            let error_text = response.text().await.unwrap_or_default();
            return Err(error_from_status(status, &headers, &error_text));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                error_from_transport(e, self.timeout)
            } else {
                PromptError::UpstreamError(format!("malformed completion envelope: {e}"))
            }
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                PromptError::UpstreamError(
                    "completion envelope has no choices or message content".to_string(),
                )
            })
    }
}

#[async_trait]
impl AiProvider for OpenAiCompatibleProvider {
    async fn generate_with(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: SamplingOptions,
    ) -> Result<String, PromptError> {
        let messages = vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(system_prompt),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Text(user_prompt),
            },
        ];
        self.chat(messages, options).await
    }

    async fn generate_with_image(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        image: &ImageInput,
        options: SamplingOptions,
    ) -> Result<String, PromptError> {
        debug!(media_type = %image.media_type, bytes = image.data.len(), "Attaching image");
        let messages = vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(system_prompt),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text { text: user_prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.to_data_url(),
                        },
                    },
                ]),
            },
        ];
        self.chat(messages, options).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}
