//! # Application Configuration
//!
//! This module defines the configuration structure for the `metaprompt-server`
//! and the logic for loading it from a YAML file and environment variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use metaprompt::providers::factory::ProviderSettings;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Overridden by the `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The log filter used when `RUST_LOG` is unset. Overridden by `LOG_LEVEL`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// The deadline for a single call to the AI provider.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// The primary AI provider.
    #[serde(default)]
    pub provider: ProviderSettings,
    /// Models tried in order when prompt generation with the primary model fails.
    #[serde(default)]
    pub backup_models: Vec<String>,
    /// Extra extraction templates keyed by document type.
    #[serde(default)]
    pub templates: BTreeMap<String, TemplateConfig>,
}

/// A custom extraction template loaded from a file.
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateConfig {
    pub path: String,
    #[serde(default)]
    pub required_keys: Vec<String>,
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_port() -> u16 {
    9090
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

static ENV_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").expect("placeholder regex is valid")
});

// Reads a file and substitutes `${VAR}` with the variable's value (empty if unset).
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let expanded = ENV_PLACEHOLDER.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(Some(expanded.into_owned()))
}

/// Loads the application configuration from a file and environment variables.
///
/// Layers, lowest priority first:
/// - defaults (`port` 9090, `log_level` info, `request_timeout_secs` 60);
/// - the main YAML file: `config_path_override`, else `config.yml` next to the
///   crate manifest, else `config.{AI_PROVIDER}.yml` (default `openrouter`);
/// - top-level environment variables such as `PORT` and `LOG_LEVEL`;
/// - `METAPROMPT_`-prefixed variables for nested keys,
///   e.g. `METAPROMPT_PROVIDER__MODEL_NAME`.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");
    let mut builder = ConfigBuilder::builder().set_default("log_level", default_log_level())?;

    let main_config_path = if let Some(override_path) = config_path_override {
        override_path.to_string()
    } else {
        let user_config_path = format!("{base_path}/config.yml");
        if Path::new(&user_config_path).exists() {
            info!("Loading user-defined configuration from '{user_config_path}'.");
            user_config_path
        } else {
            let provider = env::var("AI_PROVIDER").unwrap_or_else(|_| "openrouter".to_string());
            let fallback_path = format!("{base_path}/config.{provider}.yml");
            info!("'{user_config_path}' not found. Falling back to '{fallback_path}' based on AI_PROVIDER='{provider}'.");
            fallback_path
        }
    };

    let main_content = read_and_substitute(&main_config_path)?.ok_or_else(|| {
        ConfigError::NotFound(format!(
            "Main config file not found at '{main_config_path}'. Please ensure 'config.yml' exists or set AI_PROVIDER to 'openrouter' or 'gemini'."
        ))
    })?;
    builder = builder.add_source(File::from_str(&main_content, FileFormat::Yaml));

    let settings = builder
        .add_source(Environment::default())
        .add_source(
            Environment::with_prefix("METAPROMPT")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    Ok(config)
}
