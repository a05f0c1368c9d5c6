//! SQL-answering agent over an OpenAI-compatible Chat Completions endpoint.
//!
//! The model is given one tool, `execute_sql`, which runs read-only SQL
//! against the local trip store and feeds the rendered rows back as a tool
//! message. At most [`LlmConfig::max_iterations`] tool rounds run per
//! question; the HTTP client enforces the per-request timeout.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::LlmConfig;
use crate::db::Store;
use crate::error::AgentError;
use crate::llm::agent::ReasoningAgent;

const EXECUTE_SQL_TOOL: &str = "execute_sql";

/// Concrete [`ReasoningAgent`] driving an OpenAI-compatible endpoint.
pub struct SqlChatAgent {
    client: Client,
    config: LlmConfig,
    store: Arc<Store>,
    /// Prior user/assistant turns, kept until explicitly cleared.
    history: Mutex<Vec<ChatMessage>>,
}

impl SqlChatAgent {
    pub fn new(config: LlmConfig, store: Arc<Store>) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AgentError::RequestFailed {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            config,
            store,
            history: Mutex::new(Vec::new()),
        })
    }

    fn api_url(&self) -> String {
        chat_completions_url(&self.config.base_url)
    }

    fn system_prompt(&self, schema: &str) -> String {
        format!(
            "You are a helpful SQL assistant for ride-sharing data analysis.\n\
             You answer questions by calling the `{EXECUTE_SQL_TOOL}` tool with \
             SQLite SELECT statements and reading the results.\n\n\
             Available tables:\n{schema}\n\n\
             Guidelines:\n\
             1. Always use proper JOINs when combining data from multiple tables\n\
             2. Use descriptive column aliases in your results\n\
             3. Include LIMIT clauses for large result sets\n\
             4. Handle NULL values appropriately\n\
             5. Provide clear, formatted responses\n\n\
             When you know the answer, reply with plain text ending in the line\n\
             `Final Answer: <the answer>`."
        )
    }

    async fn send(&self, messages: &[ChatMessage]) -> Result<AssistantMessage, AgentError> {
        let tools = [sql_tool_definition()];
        let body = ChatRequest {
            model: &self.config.model,
            messages,
            tools: &tools,
            tool_choice: "auto",
            temperature: 0.0,
        };

        let response = self
            .client
            .post(self.api_url())
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::Timeout {
                        seconds: self.config.request_timeout_secs,
                    }
                } else {
                    AgentError::RequestFailed {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AgentError::RequestFailed {
                reason: format!("{status}: {}", truncate(&detail, 500)),
            });
        }

        let parsed: ChatResponse =
            response.json().await.map_err(|e| AgentError::RequestFailed {
                reason: format!("malformed response body: {e}"),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or(AgentError::EmptyResponse)
    }
}

#[async_trait]
impl ReasoningAgent for SqlChatAgent {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn answer(&self, question: &str, schema: &str) -> Result<String, AgentError> {
        let mut history = self.history.lock().await;

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt(schema)));
        messages.extend(history.iter().cloned());
        messages.push(ChatMessage::user(question));

        for iteration in 0..self.config.max_iterations {
            let reply = self.send(&messages).await?;

            let tool_calls = reply.tool_calls.clone().unwrap_or_default();
            if tool_calls.is_empty() {
                let content = reply.content.unwrap_or_default();
                if content.trim().is_empty() {
                    return Err(AgentError::EmptyResponse);
                }
                history.push(ChatMessage::user(question));
                history.push(ChatMessage::assistant(&content));
                return Ok(content);
            }

            messages.push(ChatMessage::from_assistant(reply));
            for call in tool_calls {
                let observation = self.run_tool_call(&call).await;
                tracing::debug!(
                    iteration,
                    tool = %call.function.name,
                    "tool round completed"
                );
                messages.push(ChatMessage::tool(&call.id, &observation));
            }
        }

        Err(AgentError::IterationLimit {
            max_iterations: self.config.max_iterations,
        })
    }

    async fn clear_memory(&self) {
        self.history.lock().await.clear();
        tracing::info!("conversation memory cleared");
    }
}

impl SqlChatAgent {
    /// Execute one tool call. Failures become observations the model can
    /// react to rather than aborting the question.
    async fn run_tool_call(&self, call: &ToolCall) -> String {
        if call.function.name != EXECUTE_SQL_TOOL {
            return format!("Error: unknown tool '{}'", call.function.name);
        }

        let args: SqlArguments = match serde_json::from_str(&call.function.arguments) {
            Ok(args) => args,
            Err(e) => return format!("Error: invalid tool arguments: {e}"),
        };

        match self.store.execute_query(&args.sql).await {
            Ok(rendered) => rendered,
            Err(e) => format!("Error: {e}"),
        }
    }
}

/// Build the chat-completions URL, tolerating base URLs that already end
/// in `/v1`.
fn chat_completions_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{base}/chat/completions")
    } else {
        format!("{base}/v1/chat/completions")
    }
}

fn truncate(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ==================== Wire types ====================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    tools: &'a [serde_json::Value],
    tool_choice: &'a str,
    temperature: f64,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    fn system(content: String) -> Self {
        Self {
            role: "system",
            content: Some(content),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    fn user(content: &str) -> Self {
        Self {
            role: "user",
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    fn assistant(content: &str) -> Self {
        Self {
            role: "assistant",
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    fn from_assistant(reply: AssistantMessage) -> Self {
        Self {
            role: "assistant",
            content: reply.content,
            tool_calls: reply.tool_calls,
            tool_call_id: None,
        }
    }

    fn tool(call_id: &str, content: &str) -> Self {
        Self {
            role: "tool",
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: Some(call_id.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct SqlArguments {
    sql: String,
}

fn sql_tool_definition() -> serde_json::Value {
    serde_json::json!({
        "type": "function",
        "function": {
            "name": EXECUTE_SQL_TOOL,
            "description": "Execute a read-only SQLite SELECT statement against the trip database and return the rows as text.",
            "parameters": {
                "type": "object",
                "properties": {
                    "sql": {
                        "type": "string",
                        "description": "The SELECT statement to run."
                    }
                },
                "required": ["sql"]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_handles_v1_suffix() {
        assert_eq!(
            chat_completions_url("https://api.openai.com"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            chat_completions_url("http://localhost:4000/v1/"),
            "http://localhost:4000/v1/chat/completions"
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 3), "hel");
    }

    #[test]
    fn tool_call_round_trips() {
        let json = r#"{"id":"call_1","type":"function","function":{"name":"execute_sql","arguments":"{\"sql\":\"SELECT 1\"}"}}"#;
        let call: ToolCall = serde_json::from_str(json).unwrap();
        assert_eq!(call.function.name, "execute_sql");
        let args: SqlArguments = serde_json::from_str(&call.function.arguments).unwrap();
        assert_eq!(args.sql, "SELECT 1");
    }
}
