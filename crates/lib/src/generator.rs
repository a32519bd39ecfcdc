//! # Meta-Prompt Generator
//!
//! Writes new extraction prompts from a free-form task description. The
//! primary provider is asked first, then each backup provider in order. When
//! every provider fails, a builtin template chosen by keyword, or a generic
//! prompt embedding the description, is returned instead.

use crate::{
    errors::PromptError,
    prompts::{
        meta::{
            ENHANCED_QUERY_TEMPLATE, GENERATION_TEMPERATURE, GENERIC_EXTRACTION_TEMPLATE,
            META_SYSTEM_PROMPT,
        },
        CONTENT_PLACEHOLDER,
    },
    providers::ai::{AiProvider, SamplingOptions},
    templates::TemplateStore,
    types::DocumentType,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Where a generated prompt came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "detail", rename_all = "snake_case")]
pub enum PromptSource {
    Primary,
    /// The zero-based index of the backup provider that answered.
    Backup(usize),
    /// A builtin template matched by keyword.
    Template(DocumentType),
    Generic,
}

/// The result of prompt generation.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPrompt {
    pub prompt: String,
    pub source: PromptSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Keywords mapping a task description to a builtin template, checked in order.
const KEYWORD_ROUTES: &[(&[&str], &str)] = &[
    (&["invoice", "bill", "receipt"], DocumentType::INVOICE),
    (&["email", "message"], DocumentType::EMAIL),
    (&["legal", "contract", "agreement"], DocumentType::LEGAL),
];

/// Generates extraction prompts with a model, falling back to templates.
#[derive(Clone, Debug)]
pub struct PromptGenerator {
    primary: Box<dyn AiProvider>,
    backups: Vec<Box<dyn AiProvider>>,
    store: Arc<TemplateStore>,
}

impl PromptGenerator {
    pub fn new(primary: Box<dyn AiProvider>, store: Arc<TemplateStore>) -> Self {
        Self {
            primary,
            backups: Vec::new(),
            store,
        }
    }

    pub fn with_backups(mut self, backups: Vec<Box<dyn AiProvider>>) -> Self {
        self.backups = backups;
        self
    }

    /// Generates a post-processed extraction prompt for `user_query`.
    ///
    /// Never fails: provider errors are logged and the fallback chain is used.
    pub async fn generate_extraction_prompt(
        &self,
        user_query: &str,
        temperature: Option<f32>,
    ) -> GeneratedPrompt {
        let enhanced_query = enhance_user_query(user_query);
        let options =
            SamplingOptions::with_temperature(temperature.unwrap_or(GENERATION_TEMPERATURE));

        info!(model = %self.primary.model(), "Generating extraction prompt");
        match self.ask(self.primary.as_ref(), &enhanced_query, options).await {
            Ok(prompt) => {
                return GeneratedPrompt {
                    prompt: post_process_prompt(&prompt),
                    source: PromptSource::Primary,
                    model: Some(self.primary.model().to_string()),
                }
            }
            Err(e) => warn!("Primary model failed, trying backup models: {e}"),
        }

        for (index, backup) in self.backups.iter().enumerate() {
            info!(model = %backup.model(), "Trying backup model");
            match self.ask(backup.as_ref(), &enhanced_query, options).await {
                Ok(prompt) => {
                    info!(model = %backup.model(), "Generated prompt with backup model");
                    return GeneratedPrompt {
                        prompt: post_process_prompt(&prompt),
                        source: PromptSource::Backup(index),
                        model: Some(backup.model().to_string()),
                    };
                }
                Err(e) => error!(model = %backup.model(), "Backup model failed: {e}"),
            }
        }

        let fallback = self.fallback_prompt(user_query);
        GeneratedPrompt {
            prompt: post_process_prompt(&fallback.prompt),
            ..fallback
        }
    }

    async fn ask(
        &self,
        provider: &dyn AiProvider,
        enhanced_query: &str,
        options: SamplingOptions,
    ) -> Result<String, PromptError> {
        let prompt = provider
            .generate_with(META_SYSTEM_PROMPT, enhanced_query, options)
            .await?;
        if prompt.trim().is_empty() {
            return Err(PromptError::UpstreamError(
                "model returned an empty prompt".to_string(),
            ));
        }
        Ok(prompt)
    }

    /// Picks a builtin template by keyword, or builds a generic prompt.
    pub fn fallback_prompt(&self, user_query: &str) -> GeneratedPrompt {
        info!("Generating fallback prompt based on templates");
        let query = user_query.to_lowercase();

        let routed = KEYWORD_ROUTES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| query.contains(k)))
            .map(|(_, kind)| DocumentType::new(kind));

        if let Some(kind) = routed {
            if let Ok(template) = self.store.get_template(&kind) {
                return GeneratedPrompt {
                    prompt: template.text().to_string(),
                    source: PromptSource::Template(kind),
                    model: None,
                };
            }
        }

        GeneratedPrompt {
            prompt: GENERIC_EXTRACTION_TEMPLATE.replace("{user_query}", user_query),
            source: PromptSource::Generic,
            model: None,
        }
    }
}

/// Wraps a task description with the requirements for the generated prompt.
pub fn enhance_user_query(user_query: &str) -> String {
    ENHANCED_QUERY_TEMPLATE.replace("{user_query}", user_query)
}

/// Ensures a generated prompt references the content placeholder.
///
/// Prompts that already contain it are returned unchanged. Otherwise common
/// phrases for the input document are rewritten to point at it.
pub fn post_process_prompt(prompt: &str) -> String {
    if prompt.contains(CONTENT_PLACEHOLDER) {
        return prompt.to_string();
    }
    let rewritten = prompt
        .replace("the input document", "the input document provided in {file_content}")
        .replace("the provided document", "the provided document in {file_content}");
    // Avoid rewriting the phrases above a second time.
    let mut out = String::with_capacity(rewritten.len());
    let mut rest = rewritten.as_str();
    while let Some(pos) = rest.find("the document") {
        let (before, after) = rest.split_at(pos);
        out.push_str(before);
        out.push_str("the document provided in {file_content}");
        rest = &after["the document".len()..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enhanced_query_embeds_request_and_placeholder() {
        let enhanced = enhance_user_query("Extract invoice details");
        assert!(enhanced.contains("\"Extract invoice details\""));
        assert!(enhanced.contains(CONTENT_PLACEHOLDER));
        assert!(enhanced.contains("JSON"));
    }

    #[test]
    fn post_process_keeps_prompts_with_placeholder() {
        let prompt = "Analyze the document in {file_content} and extract data.";
        assert_eq!(post_process_prompt(prompt), prompt);
    }

    #[test]
    fn post_process_rewrites_document_phrases() {
        assert_eq!(
            post_process_prompt("Analyze the document and extract data."),
            "Analyze the document provided in {file_content} and extract data."
        );
        assert_eq!(
            post_process_prompt("Analyze the input document and extract data."),
            "Analyze the input document provided in {file_content} and extract data."
        );
        assert_eq!(
            post_process_prompt("Read the provided document."),
            "Read the provided document in {file_content}."
        );
    }

    #[test]
    fn post_process_leaves_unrelated_prompts_alone() {
        assert_eq!(post_process_prompt("Summarize this."), "Summarize this.");
    }
}
