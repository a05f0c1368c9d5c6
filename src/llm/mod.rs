//! Reasoning service integration.

mod agent;
mod openai_chat;

pub use agent::ReasoningAgent;
pub use openai_chat::SqlChatAgent;

/// Strip a response to the portion after the last `Final Answer:` marker,
/// when present. Agents prompted in the ReAct style terminate with that
/// marker; anything before it is scratchpad text.
pub fn extract_final_answer(text: &str) -> &str {
    match text.rsplit_once("Final Answer:") {
        Some((_, tail)) => tail.trim(),
        None => text.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_after_marker() {
        let raw = "Thought: count rows\nAction: execute_sql\nFinal Answer: There are 42 trips.";
        assert_eq!(extract_final_answer(raw), "There are 42 trips.");
    }

    #[test]
    fn uses_last_marker_when_repeated() {
        let raw = "Final Answer: draft\nFinal Answer: 17 riders";
        assert_eq!(extract_final_answer(raw), "17 riders");
    }

    #[test]
    fn passes_through_without_marker() {
        assert_eq!(extract_final_answer("  just an answer  "), "just an answer");
    }
}
