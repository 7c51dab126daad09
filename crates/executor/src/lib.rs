//! Sandboxed Python REPL executor for repliq.
//!
//! [`PythonSession`] implements the core `Executor` trait by running code
//! blocks through a Python interpreter subprocess, capturing stdout, stderr,
//! and wall-clock duration, and keeping the ordered record history the agent
//! loop diffs against.

pub mod session;

pub use session::PythonSession;
