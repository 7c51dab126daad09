//! Model trait — the abstraction over the text-completion backend.
//!
//! A Model takes an ordered conversation and returns the next completion
//! as plain text. The agent loop calls `complete()` without knowing which
//! backend is configured — pure polymorphism.
//!
//! Implementations: OpenAI-compatible endpoints, mocks in tests.

use crate::error::ModelError;
use crate::message::Message;
use async_trait::async_trait;

/// The core Model trait.
///
/// Faults are fatal for a run: the loop performs no internal retry, so an
/// implementation should not mask transient errors by blocking forever.
#[async_trait]
pub trait Model: Send + Sync {
    /// A human-readable name for this backend (e.g. "openai", "mock").
    fn name(&self) -> &str;

    /// Send the conversation and return the completion text.
    async fn complete(&self, messages: &[Message]) -> Result<String, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoModel;

    #[async_trait]
    impl Model for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, messages: &[Message]) -> Result<String, ModelError> {
            Ok(messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn trait_object_dispatch() {
        let model: Box<dyn Model> = Box::new(EchoModel);
        let reply = model
            .complete(&[Message::user("ping")])
            .await
            .unwrap();
        assert_eq!(reply, "ping");
        assert_eq!(model.name(), "echo");
    }
}
