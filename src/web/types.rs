//! Request and response DTOs for the chat API.

use serde::{Deserialize, Serialize};

use crate::gateway::AnalyticsSnapshot;

#[derive(Debug, Deserialize)]
pub struct QueryParams {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub success: bool,
    pub info: String,
}

#[derive(Debug, Serialize)]
pub struct SamplesResponse {
    pub success: bool,
    pub sample_questions: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub success: bool,
    pub analytics: AnalyticsSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ClearMemoryResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}
