//! Final-answer recognition.
//!
//! A run terminates when the model (or its executed code) emits a line
//! beginning with [`FINAL_ANSWER_MARKER`]; everything after the marker,
//! trimmed, is the answer. The response text is checked first, then the
//! newest execution's stdout — always after code execution, so the check
//! runs against the latest state of the iteration.

/// The marker a response must carry to terminate the loop.
pub const FINAL_ANSWER_MARKER: &str = "FINAL_ANSWER:";

/// Extract the final answer from one text, if the marker is present.
///
/// The marker must start a line (leading whitespace allowed). The answer is
/// the remainder of the text after the marker, so multi-line answers
/// survive intact.
pub fn find_final_answer(text: &str) -> Option<String> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with(FINAL_ANSWER_MARKER) {
            let indent = line.len() - trimmed.len();
            let start = offset + indent + FINAL_ANSWER_MARKER.len();
            return Some(text[start..].trim().to_string());
        }
        offset += line.len();
    }
    None
}

/// Apply the recognition rule to an iteration's output: the model response
/// first, then the latest execution stdout.
pub fn detect(response: &str, latest_output: Option<&str>) -> Option<String> {
    find_final_answer(response).or_else(|| latest_output.and_then(find_final_answer))
}
