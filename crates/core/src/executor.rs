//! Executor trait — the abstraction over the code sandbox.
//!
//! An Executor accepts source text, runs it in a persistent session, and
//! returns the captured output. It also exposes its full ordered history of
//! [`ExecutionRecord`]s: the agent loop snapshots `record_count()` before a
//! dispatch and reads only the records produced after it, so executions are
//! never re-logged.

use crate::error::ExecutorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One sandbox invocation's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// The source text that was executed.
    pub code: String,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Wall-clock duration in seconds.
    pub execution_time: f64,
}

/// The code-sandbox collaborator.
///
/// Implementations maintain their own session state across calls within one
/// run (later code may depend on variables earlier code defined), and append
/// every completed execution to a monotonically growing record history.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Execute one code block in the session, returning its record.
    ///
    /// The record is also appended to the history before this returns.
    async fn execute(&self, code: &str) -> Result<ExecutionRecord, ExecutorError>;

    /// Number of records in the history so far.
    fn record_count(&self) -> usize;

    /// Records appended at or after index `start`, in production order.
    fn records_since(&self, start: usize) -> Vec<ExecutionRecord>;
}
