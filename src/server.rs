//! HTTP surface: five task endpoints plus liveness routes. Task handlers
//! never fail at the HTTP level; errors travel as `{"error": ...}` bodies.

use std::sync::Arc;

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart, State,
    },
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{Error, Result};
use crate::models::{
    ApiReply, CaseStudyRequest, CaseStudyResponse, ExplainRequest, ExplanationResponse, QuizRequest,
    QuizResponse, SummaryResponse, VisualizationResponse, VisualizeRequest,
};
use crate::settings::Settings;
use crate::tasks::Assistant;

/// Room for multipart framing on top of the largest accepted file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
}

pub fn router(assistant: Arc<Assistant>) -> Router {
    let settings = assistant.settings();
    let body_limit = settings.max_file_size + MULTIPART_OVERHEAD;
    let cors = cors_layer(settings);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/summarize_pdf/", post(summarize_pdf))
        .route("/explain_concept/", post(explain_concept))
        .route("/generate_quiz/", post(generate_quiz))
        .route("/generate_case_study/", post(generate_case_study))
        .route("/generate_visualization/", post(generate_visualization))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { assistant })
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if settings.cors_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = settings
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Log a task failure and shape the reply body.
fn reply<T>(task: &str, result: Result<T>) -> Json<ApiReply<T>> {
    if let Err(e) = &result {
        tracing::error!("Error in {}: {}", task, e);
    }
    Json(result.into())
}

async fn read_file_field(mut multipart: Multipart) -> Result<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| Error::BadRequest("file field has no file name".to_string()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::BadRequest(e.body_text()))?;
        return Ok((filename, data.to_vec()));
    }
    Err(Error::BadRequest("missing multipart field 'file'".to_string()))
}

async fn summarize_pdf(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Json<ApiReply<SummaryResponse>> {
    let result = async {
        let multipart = multipart.map_err(|e| Error::BadRequest(e.body_text()))?;
        let (filename, data) = read_file_field(multipart).await?;
        tracing::info!("Received {} ({} bytes)", filename, data.len());
        let summary = state.assistant.summarize(&filename, &data).await?;
        Ok::<_, Error>(SummaryResponse {
            summary: summary.summary,
            session_id: summary.session_id,
        })
    }
    .await;
    reply("summarize_pdf", result)
}

async fn explain_concept(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ExplainRequest>, JsonRejection>,
) -> Json<ApiReply<ExplanationResponse>> {
    let result = async {
        let Json(req) = payload.map_err(|e| Error::BadRequest(e.body_text()))?;
        let explanation = state.assistant.explain(&req.session_id, &req.concept).await?;
        Ok::<_, Error>(ExplanationResponse { explanation })
    }
    .await;
    reply("explain_concept", result)
}

async fn generate_quiz(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QuizRequest>, JsonRejection>,
) -> Json<ApiReply<QuizResponse>> {
    let result = async {
        let Json(req) = payload.map_err(|e| Error::BadRequest(e.body_text()))?;
        let quiz = state
            .assistant
            .quiz(&req.session_id, req.prompt.as_deref())
            .await?;
        Ok::<_, Error>(QuizResponse { quiz })
    }
    .await;
    reply("generate_quiz", result)
}

async fn generate_case_study(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CaseStudyRequest>, JsonRejection>,
) -> Json<ApiReply<CaseStudyResponse>> {
    let result = async {
        let Json(req) = payload.map_err(|e| Error::BadRequest(e.body_text()))?;
        let case_study = state
            .assistant
            .case_study(&req.session_id, req.prompt.as_deref())
            .await?;
        Ok::<_, Error>(CaseStudyResponse { case_study })
    }
    .await;
    reply("generate_case_study", result)
}

async fn generate_visualization(
    State(state): State<AppState>,
    payload: std::result::Result<Json<VisualizeRequest>, JsonRejection>,
) -> Json<ApiReply<VisualizationResponse>> {
    let result = async {
        let Json(req) = payload.map_err(|e| Error::BadRequest(e.body_text()))?;
        let visualization = state
            .assistant
            .visualize(&req.session_id, req.prompt.as_deref())
            .await?;
        Ok::<_, Error>(VisualizationResponse { visualization })
    }
    .await;
    reply("generate_visualization", result)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "RAG Assistant API is running" }))
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let llm_healthy = state.assistant.rag().llm_healthy().await;

    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "services": {
            "llm": llm_healthy
        }
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::llm::testing::{FailingGenerator, ScriptedGenerator};
    use crate::llm::TextGenerator;
    use crate::tasks::testing::{assistant, seeded_session};

    const BOUNDARY: &str = "X-RAG-ASSISTANT-BOUNDARY";

    fn app(root: &std::path::Path, llm: Arc<dyn TextGenerator>) -> (Router, Arc<Assistant>) {
        let assistant = Arc::new(assistant(root, llm));
        (router(Arc::clone(&assistant)), assistant)
    }

    fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn upload_request(filename: &str, contents: &str) -> Request<Body> {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
             Content-Type: text/plain\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = filename,
            c = contents
        );
        Request::builder()
            .method("POST")
            .uri("/summarize_pdf/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> Value {
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), 200);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_upload_then_ask() {
        let dir = tempfile::tempdir().unwrap();
        let (app, assistant) = app(dir.path(), Arc::new(ScriptedGenerator::new("model says")));

        let upload = upload_request("notes.txt", "Opportunity cost is the next best alternative.");
        let body = send(app.clone(), upload).await;
        assert_eq!(body["summary"], "model says");
        let token = body["session_id"].as_str().unwrap().to_string();
        assert!(assistant.sessions().exists(&token));

        let request = json!({ "concept": "opportunity cost", "session_id": token }).to_string();
        let body = send(app.clone(), json_request("/explain_concept/", &request)).await;
        assert_eq!(body, json!({ "explanation": "model says" }));

        let request = json!({ "session_id": token }).to_string();
        let body = send(app, json_request("/generate_case_study/", &request)).await;
        assert_eq!(body, json!({ "caseStudy": "model says" }));
    }

    #[tokio::test]
    async fn test_unknown_session_returns_error_body() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path(), Arc::new(ScriptedGenerator::new("unused")));

        let request =
            json!({ "session_id": "session_1_00000000", "prompt": "5 questions" }).to_string();
        let body = send(app.clone(), json_request("/generate_quiz/", &request)).await;
        assert_eq!(body, json!({ "error": "Please upload a PDF first to load context." }));

        let request = json!({ "session_id": "session_1_00000000" }).to_string();
        let body = send(app, json_request("/generate_visualization/", &request)).await;
        assert_eq!(body, json!({ "error": "Please upload a PDF or CSV first to load context." }));
    }

    #[tokio::test]
    async fn test_malformed_bodies_return_error_body() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path(), Arc::new(ScriptedGenerator::new("unused")));

        let body = send(app.clone(), json_request("/explain_concept/", "{not json")).await;
        assert!(body["error"].is_string());

        let missing_session = json_request("/explain_concept/", r#"{"concept": "x"}"#);
        let body = send(app.clone(), missing_session).await;
        assert!(body["error"].is_string());

        let request = Request::builder()
            .method("POST")
            .uri("/summarize_pdf/")
            .body(Body::empty())
            .unwrap();
        let body = send(app, request).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_visualization_over_http() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedGenerator::new("I cannot visualize data from this document."));
        let (app, assistant) = app(dir.path(), llm);
        let token = seeded_session(&assistant).await;

        let request = json!({ "session_id": token, "prompt": "ignored" }).to_string();
        let body = send(app, json_request("/generate_visualization/", &request)).await;
        assert_eq!(body["visualization"]["type"], "none");
        assert_eq!(body["visualization"]["data"], json!([]));
    }

    #[tokio::test]
    async fn test_health_reports_llm_state() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path(), Arc::new(FailingGenerator));

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let body = send(app.clone(), request).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["services"]["llm"], false);
        assert!(body["timestamp"].is_string());

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let body = send(app, request).await;
        assert_eq!(body["message"], "RAG Assistant API is running");
    }
}
