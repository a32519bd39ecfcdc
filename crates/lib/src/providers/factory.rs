//! # AI Provider Factory
//!
//! Centralizes the creation of AI provider instances from settings so that the
//! server and the CLI build providers the same way.

use crate::{
    errors::PromptError,
    providers::ai::{AiProvider, GeminiProvider, OpenAiCompatibleProvider},
};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

/// The default OpenAI-compatible endpoint.
pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
/// The default model on OpenRouter.
pub const DEFAULT_MODEL: &str = "anthropic/claude-3-haiku@20240307";

/// The wire protocol a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-style `chat/completions`: OpenRouter, OpenAI, or a local server.
    #[default]
    #[serde(alias = "openrouter", alias = "local")]
    OpenAi,
    Gemini,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "openrouter" | "local" => Ok(ProviderKind::OpenAi),
            "gemini" => Ok(ProviderKind::Gemini),
            other => Err(format!("unsupported AI provider type '{other}'")),
        }
    }
}

fn default_model_name() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_timeout_secs() -> u64 {
    60
}

/// Connection and sampling settings for one provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub provider: ProviderKind,
    /// The API URL. Optional: OpenAI-compatible providers default to OpenRouter,
    /// Gemini derives it from the model name.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub referer: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            api_url: None,
            api_key: None,
            model_name: default_model_name(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            referer: None,
            title: None,
        }
    }
}

impl ProviderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    // An empty string (e.g. an unset `${VAR}`) counts as missing.
    fn api_key(&self) -> Option<String> {
        self.api_key.clone().filter(|k| !k.trim().is_empty())
    }

    fn api_url(&self) -> Option<String> {
        self.api_url.clone().filter(|u| !u.trim().is_empty())
    }
}

/// Creates a provider from its settings.
pub fn create_provider(settings: &ProviderSettings) -> Result<Box<dyn AiProvider>, PromptError> {
    let timeout = Some(settings.timeout());
    let provider: Box<dyn AiProvider> = match settings.provider {
        ProviderKind::OpenAi => {
            let api_url = settings
                .api_url()
                .unwrap_or_else(|| OPENROUTER_URL.to_string());
            Box::new(
                OpenAiCompatibleProvider::new(
                    api_url,
                    settings.api_key(),
                    settings.model_name.clone(),
                    timeout,
                )?
                .with_sampling(settings.temperature, settings.max_tokens)
                .with_attribution(settings.referer.clone(), settings.title.clone()),
            )
        }
        ProviderKind::Gemini => {
            let api_key = settings.api_key().ok_or_else(|| {
                PromptError::AuthenticationFailed(
                    "an API key is required for the gemini provider".to_string(),
                )
            })?;
            Box::new(
                GeminiProvider::new(
                    settings.api_url(),
                    api_key,
                    settings.model_name.clone(),
                    timeout,
                )?
                .with_sampling(settings.temperature, settings.max_tokens),
            )
        }
    };
    Ok(provider)
}

/// Creates one provider per backup model, reusing the primary's endpoint and key.
///
/// Models equal to the primary model are skipped.
pub fn create_backup_providers(
    settings: &ProviderSettings,
    backup_models: &[String],
) -> Result<Vec<Box<dyn AiProvider>>, PromptError> {
    backup_models
        .iter()
        .filter(|model| **model != settings.model_name)
        .map(|model| {
            info!(model = %model, "Configuring backup model");
            let backup = ProviderSettings {
                model_name: model.clone(),
                api_url: match settings.provider {
                    // A Gemini URL embeds the model name, so derive it again.
                    ProviderKind::Gemini => None,
                    ProviderKind::OpenAi => settings.api_url.clone(),
                },
                ..settings.clone()
            };
            create_provider(&backup)
        })
        .collect()
}
