//! Endpoint handlers for the chat API.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::error::GatewayError;
use crate::web::GatewayState;
use crate::web::types::*;

/// Questions known to work well against the trip schema, shown in the UI.
pub const SAMPLE_QUESTIONS: &[&str] = &[
    "How many total trips are there?",
    "What is the average passenger count?",
    "How many trips happened on weekends?",
    "What are the busiest hours for trips?",
    "How many large group trips are there?",
];

pub async fn index_handler() -> Html<&'static str> {
    Html(include_str!("static/index.html"))
}

pub async fn query_get_handler(
    State(state): State<Arc<GatewayState>>,
    Query(params): Query<QueryParams>,
) -> Response {
    match params.q.as_deref() {
        Some(q) if !q.is_empty() => run_query(&state, q).await,
        _ => client_error("Missing question parameter"),
    }
}

pub async fn query_post_handler(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            return (rejection.status(), Json(ErrorBody::new("Invalid JSON body"))).into_response();
        }
    };

    match request.question.as_deref() {
        Some(q) if !q.is_empty() => run_query(&state, q).await,
        _ => client_error("Missing question"),
    }
}

pub async fn info_handler(State(state): State<Arc<GatewayState>>) -> Response {
    match state.lock_gateway().await {
        Ok(gateway) => Json(InfoResponse {
            success: true,
            info: format!("Database Schema:\n{}", gateway.schema_info()),
        })
        .into_response(),
        Err(e) => service_error(e),
    }
}

pub async fn samples_handler() -> Json<SamplesResponse> {
    Json(SamplesResponse {
        success: true,
        sample_questions: SAMPLE_QUESTIONS,
    })
}

pub async fn analytics_handler(State(state): State<Arc<GatewayState>>) -> Response {
    match state.lock_gateway().await {
        Ok(gateway) => Json(AnalyticsResponse {
            success: true,
            analytics: gateway.analytics(),
        })
        .into_response(),
        Err(e) => service_error(e),
    }
}

pub async fn clear_memory_handler(State(state): State<Arc<GatewayState>>) -> Response {
    match state.lock_gateway().await {
        Ok(gateway) => {
            gateway.clear_memory().await;
            Json(ClearMemoryResponse {
                success: true,
                message: "Conversation memory cleared",
            })
            .into_response()
        }
        Err(e) => service_error(e),
    }
}

async fn run_query(state: &GatewayState, question: &str) -> Response {
    match state.lock_gateway().await {
        Ok(mut gateway) => Json(gateway.process_query(question).await).into_response(),
        Err(e) => service_error(e),
    }
}

fn client_error(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(message))).into_response()
}

fn service_error(e: GatewayError) -> Response {
    tracing::error!(error = %e, "gateway unavailable");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(format!("Gateway unavailable: {e}"))),
    )
        .into_response()
}
