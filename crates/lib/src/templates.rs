//! # Template Store
//!
//! An immutable registry mapping document types to extraction templates.
//! The store is built once at startup and shared read-only afterwards, so
//! lookups never need a lock.

use crate::{
    errors::PromptError,
    prompts::{extraction::*, CONTENT_PLACEHOLDER},
    types::DocumentType,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

/// An extraction template for one document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    kind: DocumentType,
    text: Arc<str>,
    required_keys: Arc<[String]>,
}

impl Template {
    /// Creates a template, checking that the placeholder occurs exactly once.
    pub fn new<S: AsRef<str>>(
        kind: impl Into<DocumentType>,
        text: impl Into<String>,
        required_keys: &[S],
    ) -> Result<Self, PromptError> {
        let kind = kind.into();
        let text = text.into();
        if kind.as_str().is_empty() {
            return Err(PromptError::InvalidTemplate {
                kind: String::new(),
                reason: "document type key is empty".to_string(),
            });
        }
        let occurrences = text.matches(CONTENT_PLACEHOLDER).count();
        if occurrences != 1 {
            return Err(PromptError::InvalidTemplate {
                kind: kind.to_string(),
                reason: format!(
                    "expected exactly one '{CONTENT_PLACEHOLDER}' placeholder, found {occurrences}"
                ),
            });
        }
        Ok(Self {
            kind,
            text: text.into(),
            required_keys: required_keys
                .iter()
                .map(|k| k.as_ref().to_string())
                .collect(),
        })
    }

    /// Reads a template from a file.
    pub fn from_file<S: AsRef<str>>(
        kind: impl Into<DocumentType>,
        path: impl AsRef<Path>,
        required_keys: &[S],
    ) -> Result<Self, PromptError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "Read template file");
        Self::new(kind, text, required_keys)
    }

    pub fn kind(&self) -> &DocumentType {
        &self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Top-level keys a model response must contain for this document type.
    pub fn required_keys(&self) -> &[String] {
        &self.required_keys
    }
}

/// The process-wide registry of builtin templates.
static BUILTIN: LazyLock<Arc<TemplateStore>> = LazyLock::new(|| {
    let store = TemplateStore::builder()
        .with_builtins()
        .build();
    Arc::new(store)
});

/// A read-only registry of templates keyed by document type.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: BTreeMap<DocumentType, Template>,
}

impl TemplateStore {
    pub fn builder() -> TemplateStoreBuilder {
        TemplateStoreBuilder::default()
    }

    /// Returns the shared store holding the `legal`, `email` and `invoice` templates.
    pub fn builtin() -> Arc<TemplateStore> {
        Arc::clone(&BUILTIN)
    }

    /// Looks up the template registered for a document type.
    pub fn get_template(&self, document_type: &DocumentType) -> Result<&Template, PromptError> {
        self.templates
            .get(document_type)
            .ok_or_else(|| PromptError::UnknownTemplateKind(document_type.to_string()))
    }

    /// Registered document types, in sorted order.
    pub fn kinds(&self) -> Vec<&DocumentType> {
        self.templates.keys().collect()
    }

    pub fn contains(&self, document_type: &DocumentType) -> bool {
        self.templates.contains_key(document_type)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Collects templates before freezing them into a `TemplateStore`.
#[derive(Debug, Default)]
pub struct TemplateStoreBuilder {
    templates: BTreeMap<DocumentType, Template>,
}

impl TemplateStoreBuilder {
    /// Adds the builtin templates.
    pub fn with_builtins(mut self) -> Self {
        let builtins = [
            (DocumentType::INVOICE, INVOICE_TEMPLATE, INVOICE_REQUIRED_KEYS),
            (DocumentType::EMAIL, EMAIL_TEMPLATE, EMAIL_REQUIRED_KEYS),
            (DocumentType::LEGAL, LEGAL_TEMPLATE, LEGAL_REQUIRED_KEYS),
        ];
        for (kind, text, required_keys) in builtins {
            let kind = DocumentType::new(kind);
            self.templates.insert(
                kind.clone(),
                Template {
                    kind,
                    text: text.into(),
                    required_keys: required_keys.iter().map(|k| k.to_string()).collect(),
                },
            );
        }
        self
    }

    /// Registers a new template. Fails if its document type is already taken.
    pub fn register(mut self, template: Template) -> Result<Self, PromptError> {
        if self.templates.contains_key(template.kind()) {
            return Err(PromptError::DuplicateTemplate(template.kind().to_string()));
        }
        info!(kind = %template.kind(), "Registered extraction template");
        self.templates.insert(template.kind().clone(), template);
        Ok(self)
    }

    /// Registers a template, replacing any existing one with the same document type.
    pub fn override_template(mut self, template: Template) -> Self {
        if self
            .templates
            .insert(template.kind().clone(), template.clone())
            .is_some()
        {
            info!(kind = %template.kind(), "Overrode extraction template");
        }
        self
    }

    pub fn build(self) -> TemplateStore {
        TemplateStore {
            templates: self.templates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_store_has_three_kinds() {
        let store = TemplateStore::builtin();
        let kinds: Vec<&str> = store.kinds().iter().map(|k| k.as_str()).collect();
        assert_eq!(kinds, vec!["email", "invoice", "legal"]);
    }

    #[test]
    fn every_builtin_template_has_one_placeholder() {
        let store = TemplateStore::builtin();
        for kind in store.kinds() {
            let template = store.get_template(kind).unwrap();
            assert_eq!(
                template.text().matches(CONTENT_PLACEHOLDER).count(),
                1,
                "template '{kind}' must contain exactly one placeholder"
            );
            assert!(template.text().contains("```json"));
            assert!(!template.required_keys().is_empty());
        }
    }

    #[test]
    fn unknown_kind_is_reported() {
        let store = TemplateStore::builtin();
        let err = store
            .get_template(&DocumentType::new("contract_x"))
            .unwrap_err();
        assert!(matches!(err, PromptError::UnknownTemplateKind(k) if k == "contract_x"));
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let err = Template::new("receipt", "no placeholder here", &["total"]).unwrap_err();
        assert!(matches!(err, PromptError::InvalidTemplate { .. }));

        let twice = format!("{CONTENT_PLACEHOLDER} and {CONTENT_PLACEHOLDER}");
        assert!(Template::new("receipt", twice, &["total"]).is_err());
    }

    #[test]
    fn duplicate_registration_fails_but_override_replaces() {
        let receipt = Template::new("receipt", "Extract: {file_content}", &["total"]).unwrap();
        let builder = TemplateStore::builder()
            .with_builtins()
            .register(receipt.clone())
            .unwrap();
        let err = builder.register(receipt).unwrap_err();
        assert!(matches!(err, PromptError::DuplicateTemplate(k) if k == "receipt"));

        let custom_invoice =
            Template::new("invoice", "Custom: {file_content}", &["invoice"]).unwrap();
        let store = TemplateStore::builder()
            .with_builtins()
            .override_template(custom_invoice)
            .build();
        let invoice = store.get_template(&DocumentType::new("invoice")).unwrap();
        assert_eq!(invoice.text(), "Custom: {file_content}");
        assert_eq!(store.len(), 3);
    }
}
