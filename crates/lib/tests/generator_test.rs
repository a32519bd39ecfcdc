//! # Prompt Generator Tests
//!
//! Covers the provider chain and the template fallbacks of `PromptGenerator`.

mod common;

use common::setup_tracing;
use metaprompt::{
    prompts::{extraction::INVOICE_TEMPLATE, meta::META_SYSTEM_PROMPT},
    providers::ai::AiProvider,
    DocumentType, PromptError, PromptGenerator, PromptSource, TemplateStore,
};
use metaprompt_test_utils::MockAiProvider;

fn failing_provider(model: &str) -> MockAiProvider {
    let provider = MockAiProvider::new().with_model(model);
    provider.push_error(|| PromptError::UpstreamError("503 Service Unavailable".to_string()));
    provider
}

#[tokio::test]
async fn test_primary_model_prompt_is_post_processed() {
    setup_tracing();
    let primary = MockAiProvider::new().with_model("primary/model");
    primary.push_response("Read the document and return the sender as JSON.");
    let generator = PromptGenerator::new(Box::new(primary.clone()), TemplateStore::builtin());

    let generated = generator
        .generate_extraction_prompt("Extract the sender of each letter", None)
        .await;

    assert_eq!(generated.source, PromptSource::Primary);
    assert_eq!(generated.model.as_deref(), Some("primary/model"));
    assert_eq!(
        generated.prompt,
        "Read the document provided in {file_content} and return the sender as JSON."
    );

    let calls = primary.get_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, META_SYSTEM_PROMPT);
    assert!(calls[0].1.contains("\"Extract the sender of each letter\""));
    assert_eq!(primary.get_options()[0].temperature, Some(0.5));
}

#[tokio::test]
async fn test_explicit_temperature_is_forwarded() {
    let primary = MockAiProvider::new();
    primary.push_response("Extract totals from {file_content}.");
    let generator = PromptGenerator::new(Box::new(primary.clone()), TemplateStore::builtin());

    generator
        .generate_extraction_prompt("Extract totals", Some(0.9))
        .await;
    assert_eq!(primary.get_options()[0].temperature, Some(0.9));
}

#[tokio::test]
async fn test_backup_models_are_tried_in_order() {
    let primary = failing_provider("primary/model");
    let first_backup = failing_provider("backup/one");
    let second_backup = MockAiProvider::new().with_model("backup/two");
    second_backup.push_response("Extract the shipment id from {file_content}.");

    let backups: Vec<Box<dyn AiProvider>> = vec![
        Box::new(first_backup.clone()),
        Box::new(second_backup.clone()),
    ];
    let generator = PromptGenerator::new(Box::new(primary.clone()), TemplateStore::builtin())
        .with_backups(backups);

    let generated = generator
        .generate_extraction_prompt("Extract shipment ids", None)
        .await;

    assert_eq!(generated.source, PromptSource::Backup(1));
    assert_eq!(generated.model.as_deref(), Some("backup/two"));
    assert_eq!(generated.prompt, "Extract the shipment id from {file_content}.");
    assert_eq!(primary.get_calls().len(), 1);
    assert_eq!(first_backup.get_calls().len(), 1);
    assert_eq!(second_backup.get_calls().len(), 1);
}

#[tokio::test]
async fn test_empty_model_output_counts_as_failure() {
    let primary = MockAiProvider::new();
    primary.push_response("   ");
    let generator = PromptGenerator::new(Box::new(primary), TemplateStore::builtin());

    let generated = generator
        .generate_extraction_prompt("Pull the receipt totals", None)
        .await;
    assert_eq!(
        generated.source,
        PromptSource::Template(DocumentType::new("invoice"))
    );
    assert_eq!(generated.prompt, INVOICE_TEMPLATE);
}

#[tokio::test]
async fn test_keyword_fallbacks_pick_builtin_templates() {
    let cases = [
        ("Extract line items from a supplier bill", "invoice"),
        ("Summarize each customer message", "email"),
        ("Find the termination clause in the agreement", "legal"),
    ];

    for (query, kind) in cases {
        let generator =
            PromptGenerator::new(Box::new(failing_provider("p")), TemplateStore::builtin());
        let generated = generator.generate_extraction_prompt(query, None).await;
        assert_eq!(
            generated.source,
            PromptSource::Template(DocumentType::new(kind)),
            "query {query:?}"
        );
        assert!(generated.model.is_none());
        assert!(generated.prompt.contains("{file_content}"));
    }
}

#[tokio::test]
async fn test_unmatched_query_gets_generic_prompt() {
    let generator =
        PromptGenerator::new(Box::new(failing_provider("p")), TemplateStore::builtin());
    let generated = generator
        .generate_extraction_prompt("List every chemical compound and its CAS number", None)
        .await;

    assert_eq!(generated.source, PromptSource::Generic);
    assert!(generated
        .prompt
        .contains("List every chemical compound and its CAS number"));
    assert!(generated.prompt.contains("{file_content}"));
}
