//! Python subprocess session.
//!
//! Session state persists across executions by replay: every successful
//! snippet joins the session source, and each new snippet runs with that
//! source ahead of it. The new snippet's output is the capture minus the
//! replayed prefix, so records carry only what the snippet itself printed.
//! This requires earlier snippets to be deterministic, which holds for the
//! exploration code the loop produces; a snippet that fails does not join
//! the session.
//!
//! The run's context is materialized to a file and bound as a `context`
//! variable in the session preamble. Sub-query wiring (recursive model,
//! endpoint, key) is exported to the subprocess environment so executed
//! code can issue its own model calls.

use async_trait::async_trait;
use repliq_core::error::ExecutorError;
use repliq_core::executor::{ExecutionRecord, Executor};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// A persistent Python session scoped to one run.
pub struct PythonSession {
    python_bin: String,
    timeout: Duration,
    context_path: PathBuf,
    env: Vec<(String, String)>,
    state: Mutex<SessionState>,
}

struct SessionState {
    /// Successful snippets, replayed ahead of each new one.
    history: Vec<String>,
    /// Byte offsets of the capture already attributed to the history.
    stdout_offset: usize,
    stderr_offset: usize,
    records: Vec<ExecutionRecord>,
}

impl PythonSession {
    /// Create a session holding `context` as a Python variable.
    ///
    /// The context is written to a per-session file under the system temp
    /// directory; it is removed when the session drops.
    pub fn new(context: &str) -> Result<Self, ExecutorError> {
        let context_path =
            std::env::temp_dir().join(format!("repliq-context-{}.txt", uuid::Uuid::new_v4()));
        std::fs::write(&context_path, context).map_err(|e| ExecutorError::Io(e.to_string()))?;

        Ok(Self {
            python_bin: "python3".into(),
            timeout: Duration::from_secs(60),
            context_path,
            env: Vec::new(),
            state: Mutex::new(SessionState {
                history: Vec::new(),
                stdout_offset: 0,
                stderr_offset: 0,
                records: Vec::new(),
            }),
        })
    }

    /// Override the interpreter binary.
    pub fn with_python_bin(mut self, bin: impl Into<String>) -> Self {
        self.python_bin = bin.into();
        self
    }

    /// Set the per-execution timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Export sub-query wiring to the subprocess environment.
    pub fn with_recursive_model(
        mut self,
        model: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        self.env.push(("REPLIQ_RECURSIVE_MODEL".into(), model.into()));
        self.env.push(("REPLIQ_BASE_URL".into(), base_url.into()));
        self.env.push(("REPLIQ_API_KEY".into(), api_key.into()));
        self
    }

    /// The preamble run ahead of every snippet: binds `context`.
    fn preamble(&self) -> String {
        format!(
            "context = open({path:?}, encoding=\"utf-8\").read()",
            path = self.context_path
        )
    }

    fn assemble_source(&self, history: &[String], code: &str) -> String {
        let mut source = self.preamble();
        for snippet in history {
            source.push('\n');
            source.push_str(snippet);
        }
        source.push('\n');
        source.push_str(code);
        source
    }
}

/// The portion of `full` past `offset`, falling back to the whole capture
/// if the offset no longer lines up (non-deterministic replay output).
fn capture_tail(full: &str, offset: usize) -> String {
    full.get(offset..).unwrap_or(full).to_string()
}

#[async_trait]
impl Executor for PythonSession {
    async fn execute(&self, code: &str) -> Result<ExecutionRecord, ExecutorError> {
        let history = {
            let state = self
                .state
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            state.history.clone()
        };

        let source = self.assemble_source(&history, code);

        debug!(
            snippet_len = code.len(),
            replayed = history.len(),
            "Executing code block"
        );

        let mut cmd = Command::new(&self.python_bin);
        cmd.arg("-c").arg(&source).kill_on_drop(true);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        let started = Instant::now();
        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| ExecutorError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|e| ExecutorError::Spawn(e.to_string()))?;
        let execution_time = started.elapsed().as_secs_f64();

        let full_stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let full_stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let success = output.status.success();

        if !success {
            warn!(
                exit_code = output.status.code().unwrap_or(-1),
                "Code block exited with failure"
            );
        }

        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let record = ExecutionRecord {
            code: code.to_string(),
            stdout: capture_tail(&full_stdout, state.stdout_offset),
            stderr: capture_tail(&full_stderr, state.stderr_offset),
            execution_time,
        };

        if success {
            state.history.push(code.to_string());
            state.stdout_offset = full_stdout.len();
            state.stderr_offset = full_stderr.len();
        }

        state.records.push(record.clone());
        Ok(record)
    }

    fn record_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .records
            .len()
    }

    fn records_since(&self, start: usize) -> Vec<ExecutionRecord> {
        let state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.records.get(start..).unwrap_or(&[]).to_vec()
    }
}

impl Drop for PythonSession {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.context_path);
    }
}
