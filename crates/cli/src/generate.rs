use crate::provider::ProviderArgs;
use anyhow::{bail, Result};
use clap::Args;
use metaprompt::{PromptGenerator, TemplateStore};
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

const DEFAULT_OUTPUT: &str = "prompt_output.txt";

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// A description of the data to extract, e.g. "Extract line items from purchase orders".
    /// Read from stdin when omitted.
    #[arg(long)]
    pub query: Option<String>,
    /// The file the prompt is written to; `-` prints it to stdout instead
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,
    /// Sampling temperature between 0.0 and 1.0
    #[arg(long)]
    pub temperature: Option<f32>,
    /// Models to try, in order, when the primary model fails
    #[arg(long = "backup-model", env = "AI_BACKUP_MODELS", value_delimiter = ',')]
    pub backup_models: Vec<String>,
    #[command(flatten)]
    pub provider: ProviderArgs,
}

pub async fn handle_generate(args: &GenerateArgs) -> Result<()> {
    let query = match &args.query {
        Some(query) => query.clone(),
        None => read_query().await?,
    };
    let query = query.trim();
    if query.is_empty() {
        bail!("the query must not be empty");
    }
    if let Some(temperature) = args.temperature {
        if !(0.0..=1.0).contains(&temperature) {
            bail!("--temperature must be between 0.0 and 1.0, got {temperature}");
        }
    }

    let generator = PromptGenerator::new(args.provider.build()?, TemplateStore::builtin())
        .with_backups(args.provider.build_backups(&args.backup_models)?);
    let generated = generator
        .generate_extraction_prompt(query, args.temperature)
        .await;
    info!(source = ?generated.source, "Generated extraction prompt");

    if args.output == Path::new("-") {
        println!("{}", generated.prompt);
        return Ok(());
    }
    tokio::fs::write(&args.output, &generated.prompt).await?;
    // Provenance goes to stdout so scripts can tell a fallback apart.
    let summary = json!({
        "output": args.output.display().to_string(),
        "source": generated.source,
        "model": generated.model,
    });
    println!("{summary}");
    Ok(())
}

/// Asks for the query on stderr and reads one line from stdin.
async fn read_query() -> Result<String> {
    let mut stderr = tokio::io::stderr();
    stderr
        .write_all(b"Describe the data to extract: ")
        .await?;
    stderr.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line)
}
