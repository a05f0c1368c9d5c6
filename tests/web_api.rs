//! HTTP front door tests with a stubbed reasoning agent.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use tower::util::ServiceExt;

use ridelens::config::LlmConfig;
use ridelens::gateway::QueryGateway;
use ridelens::testing::StubAgent;
use ridelens::web::{GatewayState, router};

fn stub_llm_config() -> LlmConfig {
    LlmConfig {
        api_key: SecretString::from("test-key"),
        base_url: "http://localhost:0".to_string(),
        model: "stub-model".to_string(),
        max_iterations: 5,
        request_timeout_secs: 60,
    }
}

fn state_with(agent: Arc<StubAgent>) -> Arc<GatewayState> {
    let gateway = QueryGateway::new(agent, "trips(trip_id, passenger_count)".to_string());
    Arc::new(GatewayState::preloaded(
        stub_llm_config(),
        "unused.db".into(),
        gateway,
    ))
}

async fn send(state: &Arc<GatewayState>, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn index_serves_the_chat_page() {
    let state = state_with(Arc::new(StubAgent::new("unused")));
    let response = router(state).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Ridelens"));
    assert!(html.contains("/api/query"));
}

#[tokio::test]
async fn get_query_answers_from_the_agent() {
    let agent = Arc::new(StubAgent::new(
        "Thought: count\nFinal Answer: There are 42 trips in the dataset.",
    ));
    let state = state_with(agent.clone());

    let (status, json) = send(&state, get("/api/query?q=How%20many%20total%20trips")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(json["response"].as_str().unwrap().contains("42"));
    assert_eq!(json["query_type"], "nl_sql");
    assert_eq!(json["model"], "stub-model");
    assert_eq!(agent.calls(), 1);
}

#[tokio::test]
async fn get_query_without_parameter_is_rejected() {
    let agent = Arc::new(StubAgent::new("unused"));
    let state = state_with(agent.clone());

    let (status, json) = send(&state, get("/api/query")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(agent.calls(), 0);
}

#[tokio::test]
async fn post_query_reads_the_question_field() {
    let agent = Arc::new(StubAgent::new("Final Answer: 9 riders"));
    let state = state_with(agent.clone());

    let (status, json) = send(
        &state,
        post_json("/api/query", r#"{"question": "How many riders?"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["response"], "9 riders");
}

#[tokio::test]
async fn post_without_question_key_has_no_side_effects() {
    let agent = Arc::new(StubAgent::new("unused"));
    let state = state_with(agent.clone());

    let (status, json) = send(&state, post_json("/api/query", "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(agent.calls(), 0);

    // Counters untouched.
    let (_, analytics) = send(&state, get("/api/analytics")).await;
    assert_eq!(analytics["analytics"]["stats"]["total_queries"], 0);
}

#[tokio::test]
async fn malformed_json_body_is_a_client_error() {
    let state = state_with(Arc::new(StubAgent::new("unused")));

    let (status, json) = send(&state, post_json("/api/query", "{not json")).await;

    assert!(status.is_client_error(), "got {status}");
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn analytics_reports_mixed_outcomes() {
    let agent = Arc::new(StubAgent::new("Final Answer: ok"));
    let state = state_with(agent.clone());

    for _ in 0..3 {
        let (status, _) = send(&state, post_json("/api/query", r#"{"question": "q"}"#)).await;
        assert_eq!(status, StatusCode::OK);
    }
    agent.set_failing(true);
    for _ in 0..2 {
        send(&state, post_json("/api/query", r#"{"question": "q"}"#)).await;
    }

    let (status, json) = send(&state, get("/api/analytics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let stats = &json["analytics"]["stats"];
    assert_eq!(stats["total_queries"], 5);
    assert_eq!(stats["successful_queries"], 3);
    assert_eq!(stats["failed_queries"], 2);
    assert_eq!(json["analytics"]["recent_queries"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn samples_returns_the_fixed_question_list() {
    let state = state_with(Arc::new(StubAgent::new("unused")));

    let (status, json) = send(&state, get("/api/samples")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let samples = json["sample_questions"].as_array().unwrap();
    assert_eq!(samples.len(), 5);
    assert!(samples.contains(&serde_json::json!("How many total trips are there?")));
}

#[tokio::test]
async fn info_describes_the_schema() {
    let state = state_with(Arc::new(StubAgent::new("unused")));

    let (status, json) = send(&state, get("/api/info")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(
        json["info"]
            .as_str()
            .unwrap()
            .contains("trips(trip_id, passenger_count)")
    );
}

#[tokio::test]
async fn clear_memory_acknowledges() {
    let state = state_with(Arc::new(StubAgent::new("unused")));

    let (status, json) = send(&state, post_json("/api/clear-memory", "")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let state = state_with(Arc::new(StubAgent::new("unused")));

    let (status, _) = send(&state, get("/api/unknown")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
