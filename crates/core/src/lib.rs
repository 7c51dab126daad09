//! # repliq Core
//!
//! Domain types, traits, and error definitions for the repliq agent loop.
//! This crate has **zero framework dependencies** — it defines the domain
//! model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two external collaborators — the language model and the code sandbox —
//! are defined as traits here. Implementations live in their respective
//! crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod event;
pub mod executor;
pub mod message;
pub mod model;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ExecutorError, ModelError, Result};
pub use event::{Event, EventData, EventLog, Observer};
pub use executor::{ExecutionRecord, Executor};
pub use message::{Message, Role};
pub use model::Model;
