//! The event model — an append-only, ordered record of everything a run did.
//!
//! Every step of the agent loop (model replied, code ran, final answer
//! found) appends one [`Event`] to the [`EventLog`]. A downstream streamer
//! depends on seeing events as they occur, so every append invokes the
//! log's observer synchronously, before the loop proceeds.
//!
//! Wire format per event:
//!
//! ```json
//! { "type": "code_execution", "data": { ... }, "timestamp": "...", "step": 2 }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The typed payload of an event — one variant per recognized `type`,
/// serialized adjacently so the payload lands under a `data` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventData {
    /// A new query started (run-level).
    QueryStart { query: String },

    /// The model replied with a full response text.
    ModelResponse {
        response: String,
        has_tool_calls: bool,
    },

    /// One sandbox invocation completed.
    CodeExecution {
        code: String,
        stdout: String,
        stderr: String,
        execution_time: Option<f64>,
    },

    /// Raw sandbox session output outside a tracked execution.
    ReplOutput { output: String },

    /// The run produced its final answer (run-level).
    FinalAnswer { answer: String },

    /// An error was recorded mid-run (run-level).
    Error { error: String },

    /// An auxiliary tool ran (e.g. answer-extraction helpers).
    ToolExecution { tool: String, result: String },
}

impl EventData {
    /// The wire `type` string for this payload.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::QueryStart { .. } => "query_start",
            Self::ModelResponse { .. } => "model_response",
            Self::CodeExecution { .. } => "code_execution",
            Self::ReplOutput { .. } => "repl_output",
            Self::FinalAnswer { .. } => "final_answer",
            Self::Error { .. } => "error",
            Self::ToolExecution { .. } => "tool_execution",
        }
    }
}

/// One immutable record of something that happened during a run.
///
/// `step` carries the iteration the event belongs to; run-level events
/// (query start, final answer, error) have none. Once appended to the log
/// an event is never mutated or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(flatten)]
    pub data: EventData,

    /// Creation instant, monotonically non-decreasing within a run.
    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
}

/// Observer invoked synchronously with each just-appended event.
///
/// Always present — a no-op by default — so the log never has to probe
/// for a callback at append time.
pub type Observer = Arc<dyn Fn(&Event) + Send + Sync>;

/// Append-only event log for one run.
///
/// No threading inside this component: it is written only by the run's
/// worker. Thread-safety of the hand-off to a consumer is the stream
/// bridge's responsibility.
pub struct EventLog {
    events: Vec<Event>,
    step: u32,
    observer: Observer,
}

impl EventLog {
    /// Create a log with a no-op observer.
    pub fn new() -> Self {
        Self::with_observer(Arc::new(|_| {}))
    }

    /// Create a log whose observer is invoked once per append.
    pub fn with_observer(observer: Observer) -> Self {
        Self {
            events: Vec::new(),
            step: 0,
            observer,
        }
    }

    fn append(&mut self, data: EventData, step: Option<u32>) {
        self.events.push(Event {
            data,
            timestamp: Utc::now(),
            step,
        });
        if let Some(event) = self.events.last() {
            (self.observer)(event);
        }
    }

    /// Log the start of a new query. Resets the step counter.
    pub fn log_query_start(&mut self, query: impl Into<String>) {
        self.step = 0;
        self.append(
            EventData::QueryStart {
                query: query.into(),
            },
            None,
        );
    }

    /// Log a model response. Advances the step counter.
    pub fn log_model_response(&mut self, response: impl Into<String>, has_tool_calls: bool) {
        self.step += 1;
        self.append(
            EventData::ModelResponse {
                response: response.into(),
                has_tool_calls,
            },
            Some(self.step),
        );
    }

    /// Log one sandbox execution under the current step.
    pub fn log_code_execution(
        &mut self,
        code: impl Into<String>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        execution_time: Option<f64>,
    ) {
        self.append(
            EventData::CodeExecution {
                code: code.into(),
                stdout: stdout.into(),
                stderr: stderr.into(),
                execution_time,
            },
            Some(self.step),
        );
    }

    /// Log raw session output under the current step.
    pub fn log_repl_output(&mut self, output: impl Into<String>) {
        self.append(
            EventData::ReplOutput {
                output: output.into(),
            },
            Some(self.step),
        );
    }

    /// Log the final answer.
    pub fn log_final_answer(&mut self, answer: impl Into<String>) {
        self.append(
            EventData::FinalAnswer {
                answer: answer.into(),
            },
            None,
        );
    }

    /// Log an error.
    pub fn log_error(&mut self, error: impl Into<String>) {
        self.append(
            EventData::Error {
                error: error.into(),
            },
            None,
        );
    }

    /// Log an auxiliary tool execution under the current step.
    pub fn log_tool_execution(&mut self, tool: impl Into<String>, result: impl Into<String>) {
        self.append(
            EventData::ToolExecution {
                tool: tool.into(),
                result: result.into(),
            },
            Some(self.step),
        );
    }

    /// All events appended so far, in order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Consume the log, yielding the full ordered event history.
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// The current step counter.
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Reset events and step counter. Only relevant when a log is reused
    /// across runs, which callers are expected to avoid.
    pub fn clear(&mut self) {
        self.events.clear();
        self.step = 0;
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn event_serialization_query_start() {
        let event = Event {
            data: EventData::QueryStart {
                query: "What is the capital of France?".into(),
            },
            timestamp: Utc::now(),
            step: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"query_start""#));
        assert!(json.contains(r#""query":"What is the capital of France?""#));
        // Run-level event: no step key at all
        assert!(!json.contains(r#""step""#));
    }

    #[test]
    fn event_serialization_code_execution() {
        let event = Event {
            data: EventData::CodeExecution {
                code: "print(1 + 1)".into(),
                stdout: "2\n".into(),
                stderr: String::new(),
                execution_time: Some(0.03),
            },
            timestamp: Utc::now(),
            step: Some(2),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"code_execution""#));
        assert!(json.contains(r#""step":2"#));
        assert!(json.contains(r#""stdout":"2\n""#));
    }

    #[test]
    fn event_roundtrip_is_lossless() {
        let event = Event {
            data: EventData::ModelResponse {
                response: "Let me check.".into(),
                has_tool_calls: true,
            },
            timestamp: Utc::now(),
            step: Some(1),
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn event_type_names() {
        let cases: Vec<(EventData, &str)> = vec![
            (
                EventData::QueryStart { query: "q".into() },
                "query_start",
            ),
            (
                EventData::FinalAnswer { answer: "a".into() },
                "final_answer",
            ),
            (
                EventData::ReplOutput { output: "o".into() },
                "repl_output",
            ),
            (EventData::Error { error: "e".into() }, "error"),
            (
                EventData::ToolExecution {
                    tool: "t".into(),
                    result: "r".into(),
                },
                "tool_execution",
            ),
        ];
        for (data, expected) in cases {
            assert_eq!(data.event_type(), expected);
        }
    }

    #[test]
    fn log_appends_in_order_with_steps() {
        let mut log = EventLog::new();
        log.log_query_start("q");
        log.log_model_response("r1", false);
        log.log_code_execution("print(1)", "1\n", "", Some(0.01));
        log.log_model_response("r2", false);
        log.log_final_answer("done");

        let events = log.events();
        assert_eq!(events.len(), 5);
        assert_eq!(events[0].step, None);
        assert_eq!(events[1].step, Some(1));
        assert_eq!(events[2].step, Some(1));
        assert_eq!(events[3].step, Some(2));
        assert_eq!(events[4].step, None);
    }

    #[test]
    fn timestamps_are_non_decreasing() {
        let mut log = EventLog::new();
        for i in 0..10 {
            log.log_model_response(format!("r{i}"), false);
        }
        let events = log.events();
        for pair in events.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    #[test]
    fn observer_sees_every_append_synchronously() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let mut log = EventLog::with_observer(Arc::new(move |event: &Event| {
            seen_clone
                .lock()
                .unwrap()
                .push(event.data.event_type().to_string());
        }));

        log.log_query_start("q");
        log.log_model_response("r", false);
        log.log_final_answer("a");

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            ["query_start", "model_response", "final_answer"]
        );
    }

    #[test]
    fn clear_resets_events_and_step() {
        let mut log = EventLog::new();
        log.log_query_start("q");
        log.log_model_response("r", false);
        assert_eq!(log.step(), 1);

        log.clear();
        assert!(log.events().is_empty());
        assert_eq!(log.step(), 0);
    }
}
