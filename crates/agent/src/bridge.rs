//! The stream bridge — runs a loop on a worker task and relays its events
//! to a consumer, live and in order, with exactly one terminal item.
//!
//! The queue is created before the worker is spawned so no early event can
//! be missed; the log observer pushes each event synchronously as it is
//! appended, and the unbounded channel means the push never blocks the
//! loop on a slow consumer. Completion is a tagged item carried in the same
//! queue — [`StreamItem::Complete`] or [`StreamItem::Failed`] — so there is
//! no sentinel/flag pair for readers to race on. After the terminal item,
//! [`RunStream::next`] joins the worker to guarantee it has fully exited.

use crate::orchestrator::RunOutcome;
use repliq_core::error::Error;
use repliq_core::event::{Event, Observer};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// One item in a run's event stream.
///
/// A stream is zero or more `Event` items followed by exactly one terminal
/// item — `Complete` or `Failed`, never both, never neither, never more
/// than once.
#[derive(Debug, Clone)]
pub enum StreamItem {
    /// An event the loop just appended.
    Event(Event),

    /// The run finished with an answer. Carries the full event history.
    Complete { answer: String, events: Vec<Event> },

    /// The run aborted. Events delivered before the fault stand.
    Failed { error: String },
}

impl StreamItem {
    /// Whether this item ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Failed { .. })
    }
}

/// The consumer half of a running bridge.
pub struct RunStream {
    rx: mpsc::UnboundedReceiver<StreamItem>,
    worker: Option<JoinHandle<()>>,
    finished: bool,
}

impl RunStream {
    /// The next stream item, in emission order.
    ///
    /// Yields the terminal item exactly once, after every event that
    /// preceded it, then `None` forever. If the worker dies without
    /// sending a terminal item (a panic), that surfaces as `Failed`.
    pub async fn next(&mut self) -> Option<StreamItem> {
        if self.finished {
            return None;
        }

        match self.rx.recv().await {
            Some(item) => {
                if item.is_terminal() {
                    self.finish().await;
                }
                Some(item)
            }
            None => {
                // Channel closed with no terminal item: the worker panicked
                // before reporting. Convert that into the error terminal.
                let reason = self.finish().await;
                Some(StreamItem::Failed {
                    error: reason.unwrap_or_else(|| "worker exited unexpectedly".into()),
                })
            }
        }
    }

    /// Join the worker so the caller knows it has fully exited. Returns a
    /// panic description if the worker did not shut down cleanly.
    async fn finish(&mut self) -> Option<String> {
        self.finished = true;
        let worker = self.worker.take()?;
        match worker.await {
            Ok(()) => None,
            Err(join_err) => {
                error!(error = %join_err, "Run worker did not exit cleanly");
                Some(format!("run worker panicked: {join_err}"))
            }
        }
    }
}

/// Launch `run_fn` on a worker task and return the consumer stream.
///
/// `run_fn` receives the observer to register on its event log and
/// performs the full run, returning the answer or the fatal error. Both
/// outcomes become the stream's single terminal item; a collaborator fault
/// never crashes the consumer or leaves the queue undrained.
pub fn start<F, Fut>(run_fn: F) -> RunStream
where
    F: FnOnce(Observer) -> Fut + Send + 'static,
    Fut: Future<Output = Result<RunOutcome, Error>> + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();

    let observer_tx = tx.clone();
    let observer: Observer = Arc::new(move |event: &Event| {
        // The consumer may have gone away (client disconnect); the loop
        // keeps running and the send result is intentionally ignored.
        let _ = observer_tx.send(StreamItem::Event(event.clone()));
    });

    let run_id = uuid::Uuid::new_v4();
    info!(run_id = %run_id, "Launching run worker");

    let worker = tokio::spawn(async move {
        let terminal = match run_fn(observer).await {
            Ok(outcome) => {
                debug!(run_id = %run_id, events = outcome.events.len(), "Run completed");
                StreamItem::Complete {
                    answer: outcome.answer,
                    events: outcome.events,
                }
            }
            Err(e) => {
                error!(run_id = %run_id, error = %e, "Run failed");
                StreamItem::Failed {
                    error: e.to_string(),
                }
            }
        };
        let _ = tx.send(terminal);
    });

    RunStream {
        rx,
        worker: Some(worker),
        finished: false,
    }
}
