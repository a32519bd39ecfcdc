//! # metaprompt: A CLI for `metaprompt`
//!
//! Assembles extraction prompts, runs them against an AI provider, and writes
//! new prompts from a task description. Results go to stdout as JSON; logs go
//! to `metaprompt-cli.log`.

mod extract;
mod generate;
mod provider;

use anyhow::Result;
use clap::{Parser, Subcommand};
use metaprompt::TemplateStore;
use std::fs::File;
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(name = "metaprompt", author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract structured data from a document file
    Extract(extract::ExtractArgs),
    /// Print the prompt that `extract` would send, without calling a provider
    Assemble(extract::AssembleArgs),
    /// List the registered document types
    Templates,
    /// Generate a new extraction prompt from a task description
    Generate(generate::GenerateArgs),
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Log to a file so stdout stays clean for JSON output.
    let log_file = File::create("metaprompt-cli.log")?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))
    });
    let subscriber = fmt::Subscriber::builder()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let (action, result) = match &cli.command {
        Commands::Extract(args) => ("Extraction", extract::handle_extract(args).await),
        Commands::Assemble(args) => ("Assembly", extract::handle_assemble(args).await),
        Commands::Templates => ("Listing templates", handle_templates()),
        Commands::Generate(args) => ("Prompt generation", generate::handle_generate(args).await),
    };

    if let Err(e) = result {
        tracing::error!("{action} failed: {e:?}");
        eprintln!("{action} failed: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn handle_templates() -> Result<()> {
    let store = TemplateStore::builtin();
    for kind in store.kinds() {
        let template = store.get_template(kind)?;
        println!("{kind}\t{}", template.required_keys().join(", "));
    }
    Ok(())
}
