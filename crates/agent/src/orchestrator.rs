//! The agent loop implementation.
//!
//! Each iteration: call the model, extract fenced code, dispatch it to the
//! executor, then check for a final answer — in that order, so the answer
//! check always runs against the iteration's latest state. Every step
//! appends an event to the log, and each append reaches the log's observer
//! synchronously before the loop proceeds; a downstream streamer depends on
//! receiving events as they occur.

use crate::{answer, parser, prompts};
use repliq_core::error::Error;
use repliq_core::event::{Event, EventLog, Observer};
use repliq_core::executor::Executor;
use repliq_core::message::Message;
use repliq_core::model::Model;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The core loop that orchestrates model calls and code execution.
pub struct Orchestrator {
    /// The language model driving the loop
    model: Arc<dyn Model>,

    /// The sandbox session for this run
    executor: Arc<dyn Executor>,

    /// Maximum loop iterations before the forced answer call
    max_iterations: u32,
}

/// The result of a completed run.
pub struct RunOutcome {
    /// The final answer text.
    pub answer: String,
    /// The full ordered event history.
    pub events: Vec<Event>,
}

impl Orchestrator {
    /// Create a new orchestrator for one run.
    pub fn new(model: Arc<dyn Model>, executor: Arc<dyn Executor>) -> Self {
        Self {
            model,
            executor,
            max_iterations: 10,
        }
    }

    /// Set the maximum number of loop iterations.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Drive the loop to a final answer.
    ///
    /// Returns the answer together with the full event log. A model or
    /// executor fault aborts the run; events appended before the fault have
    /// already reached the observer.
    pub async fn run(&self, query: &str, observer: Observer) -> Result<RunOutcome, Error> {
        let mut log = EventLog::with_observer(observer);
        log.log_query_start(query);

        let mut messages = prompts::build_system_prompt();

        info!(max_iterations = self.max_iterations, "Agent loop starting");

        for iteration in 0..self.max_iterations {
            debug!(iteration, "Agent loop iteration");

            // The next-action instruction is appended for this call only;
            // the persistent conversation grows below.
            let mut prompt = messages.clone();
            prompt.push(prompts::next_action_prompt(query, iteration));

            let response = self.model.complete(&prompt).await?;

            let code_blocks = parser::find_code_blocks(&response);
            log.log_model_response(&response, !code_blocks.is_empty());

            // Every model reply becomes either a code dispatch or a
            // conversation turn, never both, never neither.
            let mut latest_stdout: Option<String> = None;
            if code_blocks.is_empty() {
                messages.push(Message::assistant(format!("You responded with:\n{response}")));
            } else {
                messages.push(Message::assistant(&response));

                let before = self.executor.record_count();
                for code in &code_blocks {
                    self.executor.execute(code).await?;
                }

                // Log only the records this dispatch produced, in order.
                let new_records = self.executor.records_since(before);
                for record in &new_records {
                    log.log_code_execution(
                        &record.code,
                        &record.stdout,
                        &record.stderr,
                        Some(record.execution_time),
                    );
                    messages.push(Message::user(format!(
                        "Execution output:\nstdout:\n{}\nstderr:\n{}",
                        record.stdout, record.stderr
                    )));
                }
                latest_stdout = new_records.last().map(|r| r.stdout.clone());
            }

            // The answer check runs last within an iteration, against the
            // response and the newest execution output.
            if let Some(answer) = answer::detect(&response, latest_stdout.as_deref()) {
                info!(iteration, "Final answer found");
                log.log_final_answer(&answer);
                return Ok(RunOutcome {
                    answer,
                    events: log.into_events(),
                });
            }
        }

        // Budget exhausted: one forced call, its output is the answer
        // unconditionally. No further code-execution pass.
        warn!(
            max_iterations = self.max_iterations,
            "Max iterations reached, forcing final answer"
        );

        messages.push(prompts::forced_answer_prompt(query));
        let answer = self.model.complete(&messages).await?;
        log.log_final_answer(&answer);

        Ok(RunOutcome {
            answer,
            events: log.into_events(),
        })
    }
}
