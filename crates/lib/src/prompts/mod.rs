//! # Prompt Template Modules
//!
//! This module organizes all prompt text used by the `metaprompt` library.
//! It is divided into sub-modules based on the purpose of the prompts.

pub mod extraction;
pub mod meta;

/// The token in every extraction template that is replaced by document content.
pub const CONTENT_PLACEHOLDER: &str = "{file_content}";

/// Stands in for the placeholder when the document travels as an attached image.
pub const IMAGE_CONTENT_REFERENCE: &str = "the image I'm providing";
