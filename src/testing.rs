//! Test harness: a configurable [`ReasoningAgent`] stub and store helpers.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::ReasoningAgent;

/// A configurable reasoning agent stub for tests.
///
/// Supports a fixed response, call counting via [`calls()`](Self::calls),
/// and runtime failure toggling via [`set_failing()`](Self::set_failing).
pub struct StubAgent {
    model_name: String,
    response: String,
    call_count: AtomicU32,
    should_fail: AtomicBool,
}

impl StubAgent {
    /// A stub that returns the given response on every call.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            model_name: "stub-model".to_string(),
            response: response.into(),
            call_count: AtomicU32::new(0),
            should_fail: AtomicBool::new(false),
        }
    }

    /// A stub that always fails.
    pub fn failing() -> Self {
        let stub = Self::new(String::new());
        stub.should_fail.store(true, Ordering::SeqCst);
        stub
    }

    /// Number of `answer` calls that reached this stub.
    pub fn calls(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Toggle failure mode at runtime.
    pub fn set_failing(&self, failing: bool) {
        self.should_fail.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReasoningAgent for StubAgent {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn answer(&self, _question: &str, _schema: &str) -> Result<String, AgentError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(AgentError::RequestFailed {
                reason: "stub failure".to_string(),
            });
        }
        Ok(self.response.clone())
    }

    async fn clear_memory(&self) {}
}
