//! Query gateway: validates questions, delegates to the reasoning agent,
//! and records per-call analytics.
//!
//! One gateway instance owns the append-only query log and the aggregate
//! counters for its lifetime; both live in process memory and reset on
//! restart.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::llm::{ReasoningAgent, extract_final_answer};

/// How many log entries the analytics accessor returns.
const RECENT_QUERIES: usize = 10;

/// One record of a question-answering attempt. Append-only.
#[derive(Debug, Clone, Serialize)]
pub struct QueryLogEntry {
    pub id: Uuid,
    #[serde(serialize_with = "serialize_ts")]
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub success: bool,
    /// Elapsed wall-clock seconds for the attempt.
    pub response_time: f64,
    /// Length of the raw agent response, 0 for failures.
    pub response_length: usize,
}

/// Aggregate counters across all attempts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryStats {
    pub total_queries: u64,
    pub successful_queries: u64,
    pub failed_queries: u64,
    pub avg_response_time: f64,
}

/// Counters plus the most recent log entries.
#[derive(Debug, Serialize)]
pub struct AnalyticsSnapshot {
    pub stats: QueryStats,
    pub recent_queries: Vec<QueryLogEntry>,
    pub total_queries: u64,
}

/// Result of one query attempt, shaped for the JSON contract.
#[derive(Debug, Serialize)]
pub struct QueryOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub query_type: &'static str,
    /// The configured model label, echoed as-is. Says what was requested,
    /// not which model actually answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub timestamp: String,
    pub response_time: f64,
}

/// Wraps a [`ReasoningAgent`] with input validation, final-answer
/// extraction, and analytics.
pub struct QueryGateway {
    agent: Arc<dyn ReasoningAgent>,
    schema: String,
    history: Vec<QueryLogEntry>,
    stats: QueryStats,
    total_time: f64,
}

impl QueryGateway {
    pub fn new(agent: Arc<dyn ReasoningAgent>, schema: String) -> Self {
        Self {
            agent,
            schema,
            history: Vec::new(),
            stats: QueryStats::default(),
            total_time: 0.0,
        }
    }

    /// Process one natural-language question. Never fails: agent errors are
    /// caught and reported as structured failure outcomes.
    pub async fn process_query(&mut self, question: &str) -> QueryOutcome {
        let start = Instant::now();

        if question.trim().is_empty() {
            let elapsed = start.elapsed().as_secs_f64();
            self.log_query(question, false, elapsed, 0);
            return self.failure("Please provide a valid question.".to_string(), elapsed);
        }

        tracing::info!(question, "processing query");

        match self.agent.answer(question, &self.schema).await {
            Ok(raw) => {
                let elapsed = start.elapsed().as_secs_f64();
                let answer = extract_final_answer(&raw).to_string();
                self.log_query(question, true, elapsed, raw.len());
                QueryOutcome {
                    success: true,
                    response: Some(answer),
                    error: None,
                    query_type: "nl_sql",
                    model: Some(self.agent.model_name().to_string()),
                    timestamp: fmt_ts(&Utc::now()),
                    response_time: elapsed,
                }
            }
            Err(e) => {
                let elapsed = start.elapsed().as_secs_f64();
                tracing::warn!(question, error = %e, "query failed");
                self.log_query(question, false, elapsed, 0);
                self.failure(format!("Error processing query: {e}"), elapsed)
            }
        }
    }

    /// Textual description of the tables the agent queries.
    pub fn schema_info(&self) -> &str {
        &self.schema
    }

    /// Counters plus the last [`RECENT_QUERIES`] log entries.
    pub fn analytics(&self) -> AnalyticsSnapshot {
        let skip = self.history.len().saturating_sub(RECENT_QUERIES);
        AnalyticsSnapshot {
            stats: self.stats.clone(),
            recent_queries: self.history[skip..].to_vec(),
            total_queries: self.history.len() as u64,
        }
    }

    /// Discard the agent's conversational context. The query log and
    /// counters are unaffected.
    pub async fn clear_memory(&self) {
        self.agent.clear_memory().await;
    }

    fn failure(&self, message: String, elapsed: f64) -> QueryOutcome {
        QueryOutcome {
            success: false,
            response: None,
            error: Some(message),
            query_type: "nl_sql",
            model: None,
            timestamp: fmt_ts(&Utc::now()),
            response_time: elapsed,
        }
    }

    fn log_query(&mut self, question: &str, success: bool, elapsed: f64, response_length: usize) {
        self.history.push(QueryLogEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            question: question.to_string(),
            success,
            response_time: elapsed,
            response_length,
        });

        self.stats.total_queries += 1;
        if success {
            self.stats.successful_queries += 1;
        } else {
            self.stats.failed_queries += 1;
        }
        self.total_time += elapsed;
        self.stats.avg_response_time = self.total_time / self.stats.total_queries as f64;
    }
}

pub(crate) fn fmt_ts(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn serialize_ts<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&fmt_ts(dt))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::StubAgent;

    fn gateway_with(agent: StubAgent) -> (QueryGateway, Arc<StubAgent>) {
        let agent = Arc::new(agent);
        let gateway = QueryGateway::new(agent.clone(), "trips(trip_id)".to_string());
        (gateway, agent)
    }

    #[tokio::test]
    async fn successful_query_appends_one_log_entry() {
        let (mut gateway, agent) = gateway_with(StubAgent::new("Final Answer: 42"));

        let outcome = gateway.process_query("How many total trips are there?").await;

        assert!(outcome.success);
        assert_eq!(outcome.response.as_deref(), Some("42"));
        assert_eq!(agent.calls(), 1);

        let analytics = gateway.analytics();
        assert_eq!(analytics.total_queries, 1);
        assert_eq!(analytics.stats.successful_queries, 1);
        assert_eq!(analytics.stats.failed_queries, 0);
        assert_eq!(analytics.recent_queries.len(), 1);
        assert!(analytics.recent_queries[0].success);
    }

    #[tokio::test]
    async fn empty_question_never_reaches_the_agent() {
        let (mut gateway, agent) = gateway_with(StubAgent::new("unused"));

        for question in ["", "   ", "\t\n"] {
            let outcome = gateway.process_query(question).await;
            assert!(!outcome.success);
            assert_eq!(
                outcome.error.as_deref(),
                Some("Please provide a valid question.")
            );
        }

        assert_eq!(agent.calls(), 0);
        // Still logged as failed attempts.
        assert_eq!(gateway.analytics().stats.failed_queries, 3);
    }

    #[tokio::test]
    async fn agent_errors_become_structured_failures() {
        let (mut gateway, agent) = gateway_with(StubAgent::failing());

        let outcome = gateway.process_query("anything").await;

        assert!(!outcome.success);
        assert!(outcome.error.as_deref().unwrap().contains("Error processing query"));
        assert_eq!(agent.calls(), 1);
        assert_eq!(gateway.analytics().stats.failed_queries, 1);
    }

    #[tokio::test]
    async fn counters_balance_across_mixed_outcomes() {
        let agent = Arc::new(StubAgent::new("Final Answer: ok"));
        let mut gateway = QueryGateway::new(agent.clone(), String::new());

        for _ in 0..3 {
            gateway.process_query("valid question").await;
        }
        agent.set_failing(true);
        for _ in 0..2 {
            gateway.process_query("valid question").await;
        }

        let stats = gateway.analytics().stats;
        assert_eq!(stats.total_queries, 5);
        assert_eq!(stats.successful_queries, 3);
        assert_eq!(stats.failed_queries, 2);
        assert_eq!(
            stats.total_queries,
            stats.successful_queries + stats.failed_queries
        );
    }

    #[tokio::test]
    async fn analytics_returns_only_recent_entries() {
        let (mut gateway, _) = gateway_with(StubAgent::new("Final Answer: ok"));

        for i in 0..13 {
            gateway.process_query(&format!("question {i}")).await;
        }

        let analytics = gateway.analytics();
        assert_eq!(analytics.total_queries, 13);
        assert_eq!(analytics.recent_queries.len(), 10);
        // Oldest retained entry is number 3.
        assert_eq!(analytics.recent_queries[0].question, "question 3");
        assert_eq!(analytics.recent_queries[9].question, "question 12");
    }

    #[tokio::test]
    async fn response_without_marker_passes_through() {
        let (mut gateway, _) = gateway_with(StubAgent::new("There are 42 trips."));

        let outcome = gateway.process_query("count trips").await;
        assert_eq!(outcome.response.as_deref(), Some("There are 42 trips."));
    }

    #[tokio::test]
    async fn outcome_serializes_per_contract() {
        let (mut gateway, _) = gateway_with(StubAgent::new("Final Answer: 7"));

        let outcome = gateway.process_query("q").await;
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["response"], "7");
        assert_eq!(json["query_type"], "nl_sql");
        assert!(json.get("error").is_none());
        assert!(json["timestamp"].is_string());
        assert!(json["response_time"].is_number());
    }
}
