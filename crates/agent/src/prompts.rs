//! Prompt construction for the agent loop.
//!
//! The system prompt establishes the REPL protocol; the next-action prompt
//! is appended (not persisted) each iteration; the forced-answer prompt is
//! used exactly once when the iteration budget runs out.

use crate::answer::FINAL_ANSWER_MARKER;
use repliq_core::message::Message;

/// The conversation seed: explains the session contract to the model.
pub fn build_system_prompt() -> Vec<Message> {
    vec![Message::system(format!(
        "You are answering a question about a document that is too large to \
         read at once. It is loaded into a persistent Python session as the \
         string variable `context`. To inspect it, reply with Python code in \
         a fenced ```python block; the code runs in the session and you see \
         its output on the next turn. Variables persist between turns. When \
         you know the answer, reply with a line starting with \
         `{FINAL_ANSWER_MARKER}` followed by the answer."
    ))]
}

/// The per-iteration instruction, appended to the conversation for one
/// model call only.
pub fn next_action_prompt(query: &str, iteration: u32) -> Message {
    Message::user(format!(
        "Question: {query}\n\nThis is iteration {iteration}. Decide your next \
         action: explore the context with a ```python block, or finish with a \
         `{FINAL_ANSWER_MARKER}` line."
    ))
}

/// The one forced call after the iteration budget is exhausted. Its output
/// is taken as the final answer unconditionally.
pub fn forced_answer_prompt(query: &str) -> Message {
    Message::user(format!(
        "You have run out of exploration steps. Based on everything above, \
         answer the question now.\n\nQuestion: {query}\n\nReply with only the \
         answer."
    ))
}
