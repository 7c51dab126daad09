//! `repliq query` — Run one query and stream events to stdout.
//!
//! Events print as JSON lines as they occur; the final answer prints last.
//! A failed run exits non-zero after the partial event stream.

use repliq_agent::{RunRequest, StreamItem, start_run};
use repliq_config::AppConfig;
use std::path::PathBuf;

pub async fn run(
    query: String,
    context: Option<String>,
    context_file: Option<PathBuf>,
    max_iterations: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let context = match (context, context_file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
        (None, None) => return Err("Provide --context or --context-file".into()),
    };

    let request = RunRequest {
        context,
        query,
        model: None,
        recursive_model: None,
        max_iterations,
    };

    let mut stream = start_run(&config, request)?;

    while let Some(item) = stream.next().await {
        match item {
            StreamItem::Event(event) => {
                println!("{}", serde_json::to_string(&event)?);
            }
            StreamItem::Complete { answer, events } => {
                tracing::info!(events = events.len(), "Run complete");
                println!("\n{answer}");
            }
            StreamItem::Failed { error } => {
                return Err(format!("Run failed: {error}").into());
            }
        }
    }

    Ok(())
}
