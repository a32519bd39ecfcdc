use crate::provider::ProviderArgs;
use anyhow::{Context, Result};
use clap::Args;
use metaprompt::{
    assemble, assembler::assemble_for_image, load_document, DocumentType, ExtractionClient, ExtractionRequest, Extractor,
    TemplateStore,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// The document to extract from (.txt, .eml, .md, .pdf, .png, .jpg, ...)
    #[arg(long, required = true)]
    pub file: PathBuf,
    /// The document type: invoice, email or legal
    #[arg(long = "type", required = true)]
    pub document_type: String,
    #[command(flatten)]
    pub provider: ProviderArgs,
}

#[derive(Args, Debug)]
pub struct AssembleArgs {
    /// The document to build the prompt from
    #[arg(long, required = true)]
    pub file: PathBuf,
    /// The document type: invoice, email or legal
    #[arg(long = "type", required = true)]
    pub document_type: String,
}

/// Runs one extraction and prints the result as pretty JSON.
pub async fn handle_extract(args: &ExtractArgs) -> Result<()> {
    let document = load_document(&args.file)
        .await
        .with_context(|| format!("Failed to load '{}'", args.file.display()))?;

    let client = ExtractionClient::new(
        args.provider.build()?,
        Duration::from_secs(args.provider.timeout_secs),
    );
    let extractor = Extractor::new(TemplateStore::builtin(), client);
    let request = match document.image {
        Some(image) => ExtractionRequest::from_image(args.document_type.as_str(), image),
        None => ExtractionRequest::new(args.document_type.as_str(), document.content),
    };

    let outcome = extractor.extract(&request).await?;
    info!(request_id = %outcome.request_id, "Extraction succeeded");
    println!("{}", serde_json::to_string_pretty(&outcome.result)?);
    Ok(())
}

/// Prints the assembled prompt without contacting a provider.
pub async fn handle_assemble(args: &AssembleArgs) -> Result<()> {
    let document = load_document(&args.file)
        .await
        .with_context(|| format!("Failed to load '{}'", args.file.display()))?;
    let store = TemplateStore::builtin();
    let document_type = DocumentType::new(&args.document_type);
    let prompt = match document.image {
        Some(_) => assemble_for_image(&store, &document_type)?,
        None => assemble(&store, &document_type, &document.content)?,
    };
    println!("{prompt}");
    Ok(())
}
