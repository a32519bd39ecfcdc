//! # Document Extraction Prompts
//!
//! This crate selects a task-specific extraction template for a document type,
//! interpolates document content into it, sends the composed prompt to a remote
//! completion API and validates the structured JSON that comes back.
//!
//! ```no_run
//! use metaprompt::{
//!     providers::factory::{create_provider, ProviderSettings},
//!     ExtractionClient, ExtractionRequest, Extractor, TemplateStore,
//! };
//!
//! # async fn run() -> Result<(), metaprompt::PromptError> {
//! let settings = ProviderSettings::default();
//! let client = ExtractionClient::new(create_provider(&settings)?, settings.timeout());
//! let extractor = Extractor::new(TemplateStore::builtin(), client);
//!
//! let outcome = extractor
//!     .extract(&ExtractionRequest::new("invoice", "Invoice INV-1 ..."))
//!     .await?;
//! println!("{}", outcome.result.into_value());
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod client;
pub mod errors;
pub mod generator;
pub mod loader;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod templates;
pub mod types;

pub use assembler::assemble;
pub use client::ExtractionClient;
pub use errors::{ErrorKind, PromptError};
pub use generator::{GeneratedPrompt, PromptGenerator, PromptSource};
pub use loader::{load_bytes, load_document, DocumentFormat, LoadedDocument};
pub use parser::parse;
pub use pipeline::{ExtractionFailure, ExtractionOutcome, Extractor, RequestLifecycle, RequestState};
pub use templates::{Template, TemplateStore, TemplateStoreBuilder};
pub use types::{DocumentType, ExtractionRequest, ExtractionResult, ImageInput, Prompt};
