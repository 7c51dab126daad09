//! End-to-end: the orchestrator running inside the stream bridge, observed
//! from the consumer side only.

use async_trait::async_trait;
use repliq_agent::bridge::{self, StreamItem};
use repliq_agent::orchestrator::Orchestrator;
use repliq_core::error::{ExecutorError, ModelError};
use repliq_core::event::EventData;
use repliq_core::executor::{ExecutionRecord, Executor};
use repliq_core::message::Message;
use repliq_core::model::Model;
use std::sync::{Arc, Mutex};

struct ScriptedModel {
    responses: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(responses: Vec<&str>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
        })
    }
}

#[async_trait]
impl Model for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _messages: &[Message]) -> Result<String, ModelError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok("nothing left to say".into())
        } else {
            Ok(responses.remove(0))
        }
    }
}

struct EchoExecutor {
    records: Mutex<Vec<ExecutionRecord>>,
}

impl EchoExecutor {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Executor for EchoExecutor {
    async fn execute(&self, code: &str) -> Result<ExecutionRecord, ExecutorError> {
        let record = ExecutionRecord {
            code: code.to_string(),
            stdout: format!("{code}\n"),
            stderr: String::new(),
            execution_time: 0.0,
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn records_since(&self, start: usize) -> Vec<ExecutionRecord> {
        self.records.lock().unwrap()[start..].to_vec()
    }
}

async fn drain(
    mut stream: bridge::RunStream,
) -> (Vec<&'static str>, Option<StreamItem>) {
    let mut types = Vec::new();
    let mut terminal = None;
    while let Some(item) = stream.next().await {
        match item {
            StreamItem::Event(event) => types.push(event.data.event_type()),
            other => {
                assert!(terminal.is_none(), "second terminal item: {other:?}");
                terminal = Some(other);
            }
        }
    }
    (types, terminal)
}

#[tokio::test]
async fn immediate_answer_streams_three_events_then_complete() {
    let model = ScriptedModel::new(vec!["FINAL_ANSWER: Paris"]);
    let executor = EchoExecutor::new();
    let orchestrator = Orchestrator::new(model, executor).with_max_iterations(5);

    let stream = bridge::start(move |observer| async move {
        orchestrator
            .run("What is the capital of France?", observer)
            .await
    });

    let (types, terminal) = drain(stream).await;
    assert_eq!(types, ["query_start", "model_response", "final_answer"]);

    match terminal {
        Some(StreamItem::Complete { answer, events }) => {
            assert_eq!(answer, "Paris");
            assert_eq!(events.len(), 3);
        }
        other => panic!("Expected Complete, got {other:?}"),
    }
}

#[tokio::test]
async fn exploration_run_streams_executions_live() {
    let model = ScriptedModel::new(vec![
        "Probing:\n```python\nlen(context)\n```",
        "One more:\n```python\ncontext[:10]\n```",
        "FINAL_ANSWER: found it",
    ]);
    let executor = EchoExecutor::new();
    let orchestrator = Orchestrator::new(model, executor).with_max_iterations(10);

    let stream = bridge::start(move |observer| async move {
        orchestrator.run("what is in the context?", observer).await
    });

    let (types, terminal) = drain(stream).await;
    assert_eq!(
        types,
        [
            "query_start",
            "model_response",
            "code_execution",
            "model_response",
            "code_execution",
            "model_response",
            "final_answer"
        ]
    );
    assert!(matches!(terminal, Some(StreamItem::Complete { .. })));
}

#[tokio::test]
async fn exhausted_run_ends_with_forced_answer() {
    let model = ScriptedModel::new(vec!["pondering 1", "pondering 2", "the forced answer"]);
    let executor = EchoExecutor::new();
    let orchestrator = Orchestrator::new(model, executor).with_max_iterations(2);

    let stream =
        bridge::start(move |observer| async move { orchestrator.run("q", observer).await });

    let (types, terminal) = drain(stream).await;
    assert_eq!(
        types,
        ["query_start", "model_response", "model_response", "final_answer"]
    );

    match terminal {
        Some(StreamItem::Complete { answer, events }) => {
            assert_eq!(answer, "the forced answer");
            // The final_answer event is the last event, after all others
            assert!(matches!(
                events.last().map(|e| &e.data),
                Some(EventData::FinalAnswer { .. })
            ));
        }
        other => panic!("Expected Complete, got {other:?}"),
    }
}
