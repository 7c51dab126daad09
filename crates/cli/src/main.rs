//! repliq CLI — the main entry point.
//!
//! Commands:
//! - `serve` — Start the HTTP gateway (SSE streaming API)
//! - `query` — Run one query over a context and stream events to stdout

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "repliq",
    about = "repliq — answer questions over long contexts via a model-driven REPL loop",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run a single query and stream its events as JSON lines
    Query {
        /// The question to answer
        #[arg(short, long)]
        query: String,

        /// Inline context text
        #[arg(long, conflicts_with = "context_file")]
        context: Option<String>,

        /// Read the context from a file
        #[arg(long)]
        context_file: Option<PathBuf>,

        /// Override the configured iteration budget
        #[arg(long)]
        max_iterations: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Query {
            query,
            context,
            context_file,
            max_iterations,
        } => commands::query::run(query, context, context_file, max_iterations).await?,
    }

    Ok(())
}
