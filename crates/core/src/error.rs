//! Error types for the repliq domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator has its own error enum feeding the top-level `Error`.

use thiserror::Error;

/// The top-level error type for all repliq operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Model collaborator errors ---
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    // --- Executor collaborator errors ---
    #[error("Executor error: {0}")]
    Executor(#[from] ExecutorError),

    // --- Caller-side input validation ---
    #[error("Validation error: {message}")]
    Validation { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Collaborator errors ---

/// Faults from the language-model collaborator. All are fatal to a run:
/// the loop performs no internal retry.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Faults from the code-sandbox collaborator. The loop does not catch these
/// per code block; they abort the run like a model fault.
#[derive(Debug, Clone, Error)]
pub enum ExecutorError {
    #[error("Failed to launch interpreter: {0}")]
    Spawn(String),

    #[error("Execution I/O failed: {0}")]
    Io(String),

    #[error("Execution timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_displays_correctly() {
        let err = Error::Model(ModelError::Api {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn executor_error_displays_correctly() {
        let err = Error::Executor(ExecutorError::Timeout { timeout_secs: 30 });
        assert!(err.to_string().contains("30"));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn validation_error_displays_message() {
        let err = Error::Validation {
            message: "context must not be empty".into(),
        };
        assert!(err.to_string().contains("context must not be empty"));
    }
}
