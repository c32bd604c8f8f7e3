use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct ExplainRequest {
    pub concept: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    pub session_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaseStudyRequest {
    pub session_id: String,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisualizeRequest {
    pub session_id: String,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationResponse {
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResponse {
    pub quiz: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseStudyResponse {
    #[serde(rename = "caseStudy")]
    pub case_study: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizationResponse {
    pub visualization: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of every task endpoint: the result or `{"error": ...}`, always with 200.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ApiReply<T> {
    Ok(T),
    Err(ErrorResponse),
}

impl<T> ApiReply<T> {
    pub fn error(message: impl ToString) -> Self {
        ApiReply::Err(ErrorResponse {
            error: message.to_string(),
        })
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for ApiReply<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => ApiReply::Ok(value),
            Err(e) => ApiReply::error(e),
        }
    }
}
