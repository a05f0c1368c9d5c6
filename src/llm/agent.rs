//! Capability interface for the external reasoning service.

use async_trait::async_trait;

use crate::error::AgentError;

/// A reasoning service that turns a natural-language question into an
/// answer, given a textual description of the available tables.
///
/// The gateway depends only on this trait, never on a concrete vendor.
#[async_trait]
pub trait ReasoningAgent: Send + Sync {
    /// The model identifier this agent was configured with.
    fn model_name(&self) -> &str;

    /// Answer a question. `schema` is the table/column metadata forwarded
    /// alongside the question.
    async fn answer(&self, question: &str, schema: &str) -> Result<String, AgentError>;

    /// Discard accumulated conversational context.
    async fn clear_memory(&self);
}
