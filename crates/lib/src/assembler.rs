//! # Prompt Assembler
//!
//! Turns a document type and raw document content into a ready-to-send `Prompt`.

use crate::{
    errors::PromptError,
    prompts::{CONTENT_PLACEHOLDER, IMAGE_CONTENT_REFERENCE},
    templates::TemplateStore,
    types::{DocumentType, Prompt},
};
use tracing::debug;

/// Substitutes `content` into the template registered for `document_type`.
///
/// Content is inserted verbatim. The document type is resolved first, then
/// empty or whitespace-only content is rejected.
pub fn assemble(
    store: &TemplateStore,
    document_type: &DocumentType,
    content: &str,
) -> Result<Prompt, PromptError> {
    let template = store.get_template(document_type)?;
    if content.trim().is_empty() {
        return Err(PromptError::EmptyContent);
    }

    let text = template.text().replacen(CONTENT_PLACEHOLDER, content, 1);
    debug!(
        kind = %document_type,
        content_chars = content.chars().count(),
        prompt_chars = text.chars().count(),
        "Assembled extraction prompt"
    );
    Ok(Prompt::new(document_type.clone(), text))
}

/// Builds the text half of an image extraction.
///
/// The placeholder is replaced with a reference to the attached image, since
/// the document itself is sent alongside the prompt.
pub fn assemble_for_image(
    store: &TemplateStore,
    document_type: &DocumentType,
) -> Result<Prompt, PromptError> {
    let template = store.get_template(document_type)?;
    let text = template
        .text()
        .replacen(CONTENT_PLACEHOLDER, IMAGE_CONTENT_REFERENCE, 1);
    debug!(kind = %document_type, "Assembled image extraction prompt");
    Ok(Prompt::new(document_type.clone(), text))
}
