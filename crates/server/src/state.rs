//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. Everything in it is read-only after startup, so
//! handlers share it without locks.

use crate::config::AppConfig;
use anyhow::Context;
use metaprompt::{
    providers::factory::{create_backup_providers, create_provider},
    ExtractionClient, Extractor, PromptGenerator, Template, TemplateStore,
};
use std::sync::Arc;
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// The template registry, including templates added through configuration.
    pub store: Arc<TemplateStore>,
    /// Runs extraction requests against the primary provider.
    pub extractor: Extractor,
    /// Writes new extraction prompts, falling back to the backup models.
    pub generator: PromptGenerator,
}

/// Builds the template store: the builtin templates plus any configured ones.
///
/// A configured template whose key matches a builtin replaces it.
pub fn build_template_store(config: &AppConfig) -> anyhow::Result<TemplateStore> {
    let builtin = TemplateStore::builtin();
    let mut builder = TemplateStore::builder().with_builtins();
    for (kind, template_config) in &config.templates {
        let template = Template::from_file(
            kind.as_str(),
            &template_config.path,
            template_config.required_keys.as_slice(),
        )
        .with_context(|| format!("Failed to load template '{kind}'"))?;

        builder = if builtin.contains(template.kind()) {
            builder.override_template(template)
        } else {
            builder.register(template)?
        };
    }
    Ok(builder.build())
}

/// Builds the shared application state from the configuration.
///
/// This function initializes all necessary services:
/// - the template store;
/// - the primary AI provider and the extraction client around it;
/// - one provider per backup model for prompt generation.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let store = Arc::new(build_template_store(&config)?);
    info!(kinds = ?store.kinds(), "Initialized template store");

    let primary = create_provider(&config.provider)?;
    let backups = create_backup_providers(&config.provider, &config.backup_models)?;
    info!(
        model = %primary.model(),
        backups = backups.len(),
        timeout = ?config.request_timeout(),
        "Initialized AI providers"
    );

    let client = ExtractionClient::new(primary.clone(), config.request_timeout());
    let extractor = Extractor::new(store.clone(), client);
    let generator = PromptGenerator::new(primary, store.clone()).with_backups(backups);

    Ok(AppState {
        config: Arc::new(config),
        store,
        extractor,
        generator,
    })
}
