use anyhow::Result;
use clap::Args;
use metaprompt::providers::{
    ai::AiProvider,
    factory::{create_backup_providers, create_provider, ProviderKind, ProviderSettings, DEFAULT_MODEL},
};
use tracing::info;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Connection flags shared by the commands that call an AI provider.
#[derive(Args, Debug, Clone)]
pub struct ProviderArgs {
    /// The provider protocol: openrouter, openai, local or gemini
    #[arg(long, env = "AI_PROVIDER", default_value = "openrouter")]
    pub provider: ProviderKind,
    /// The provider endpoint. Defaults to OpenRouter, or is derived from the model for Gemini.
    #[arg(long, env = "AI_API_URL")]
    pub api_url: Option<String>,
    /// The provider API key
    #[arg(long, env = "AI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// The model name
    #[arg(long, env = "AI_MODEL")]
    pub model: Option<String>,
    /// The deadline for a single provider call, in seconds
    #[arg(long, env = "AI_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout_secs: u64,
}

impl ProviderArgs {
    pub fn settings(&self) -> ProviderSettings {
        let model_name = self.model.clone().unwrap_or_else(|| {
            match self.provider {
                ProviderKind::OpenAi => DEFAULT_MODEL,
                ProviderKind::Gemini => DEFAULT_GEMINI_MODEL,
            }
            .to_string()
        });
        ProviderSettings {
            provider: self.provider,
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            model_name,
            timeout_secs: self.timeout_secs,
            ..Default::default()
        }
    }

    pub fn build(&self) -> Result<Box<dyn AiProvider>> {
        let provider = create_provider(&self.settings())?;
        info!(model = %provider.model(), "Configured AI provider");
        Ok(provider)
    }

    pub fn build_backups(&self, models: &[String]) -> Result<Vec<Box<dyn AiProvider>>> {
        Ok(create_backup_providers(&self.settings(), models)?)
    }
}
