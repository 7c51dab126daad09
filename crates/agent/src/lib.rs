//! # repliq Agent
//!
//! The core of repliq: the bounded agent loop that prompts a model,
//! executes the code it writes, and decides when a final answer exists —
//! plus the stream bridge that relays the loop's events to a consumer
//! live, in order, with a single terminal signal.

pub mod answer;
pub mod bridge;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod runner;

pub use answer::{FINAL_ANSWER_MARKER, find_final_answer};
pub use bridge::{RunStream, StreamItem};
pub use orchestrator::{Orchestrator, RunOutcome};
pub use parser::find_code_blocks;
pub use runner::{RunRequest, start_run};
