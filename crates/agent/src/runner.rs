//! The run entry point — validation and collaborator wiring.
//!
//! Callers (the gateway, the CLI) hand a [`RunRequest`] to [`start_run`].
//! Input validation happens here, synchronously, before any worker is
//! spawned: a rejected request produces zero events and no stream.

use crate::bridge::{self, RunStream};
use crate::orchestrator::Orchestrator;
use repliq_config::AppConfig;
use repliq_core::error::Error;
use repliq_core::executor::Executor;
use repliq_core::model::Model;
use repliq_executor::PythonSession;
use repliq_providers::OpenAiCompatModel;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// One run's inputs. Deserializes directly from the gateway request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    /// The material the model explores. Required (empty is rejected).
    #[serde(default)]
    pub context: String,

    /// The question to answer. Required (empty is rejected).
    #[serde(default)]
    pub query: String,

    /// Override the configured loop model.
    #[serde(default)]
    pub model: Option<String>,

    /// Override the configured sandbox sub-query model.
    #[serde(default)]
    pub recursive_model: Option<String>,

    /// Override the configured iteration budget.
    #[serde(default)]
    pub max_iterations: Option<u32>,
}

/// Validate the request, wire up the collaborators, and launch the run.
///
/// Missing context or query is a caller error reported here — it never
/// surfaces as a stream or an event.
pub fn start_run(config: &AppConfig, request: RunRequest) -> Result<RunStream, Error> {
    if request.context.trim().is_empty() {
        return Err(Error::Validation {
            message: "context is required".into(),
        });
    }
    if request.query.trim().is_empty() {
        return Err(Error::Validation {
            message: "query is required".into(),
        });
    }

    let api_key = config.api_key.clone().unwrap_or_default();
    let model_name = request
        .model
        .unwrap_or_else(|| config.default_model.clone());
    let recursive_model = request
        .recursive_model
        .unwrap_or_else(|| config.recursive_model.clone());
    let max_iterations = request.max_iterations.unwrap_or(config.max_iterations);

    let model: Arc<dyn Model> = Arc::new(OpenAiCompatModel::new(
        &config.base_url,
        api_key.clone(),
        model_name,
    ));

    let session = PythonSession::new(&request.context)?
        .with_python_bin(&config.executor.python_bin)
        .with_timeout(Duration::from_secs(config.executor.timeout_secs))
        .with_recursive_model(recursive_model, &config.base_url, api_key);
    let executor: Arc<dyn Executor> = Arc::new(session);

    let orchestrator = Orchestrator::new(model, executor).with_max_iterations(max_iterations);

    let query = request.query;
    Ok(bridge::start(move |observer| async move {
        orchestrator.run(&query, observer).await
    }))
}
