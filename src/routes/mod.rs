//! Router assembly: HTTP endpoints, static files, CORS, and HTTP tracing.

use std::{path::Path, sync::Arc};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - JSON API under `/api/v1/...`
/// - Static SPA from `static_dir` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>, static_dir: &Path) -> Router {
    let static_service = ServeDir::new(static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/generate", post(http::http_post_generate))
        .route("/api/v1/submit", post(http::http_post_submit))
        .route("/api/v1/history", get(http::http_get_history))
        .route("/api/v1/stats", get(http::http_get_stats))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Prompts;
    use crate::openai::CompletionProvider;
    use crate::store::MemoryStore;
    use crate::test_support::{ScriptedProvider, SAMPLE_COMPLETION};

    fn app(replies: Option<Vec<&str>>) -> Router {
        let provider = replies.map(|r| {
            Arc::new(ScriptedProvider::new(r.into_iter().map(|s| Ok(s.to_string())).collect()))
                as Arc<dyn CompletionProvider>
        });
        let state = AppState::new(Arc::new(MemoryStore::new()), provider, Prompts::default());
        build_router(Arc::new(state), Path::new("./static"))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = call(&app(None), "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn fenced_completion_end_to_end() {
        let app = app(Some(vec![SAMPLE_COMPLETION, "Fantastic!", "Check your subtraction."]));

        let (status, gen) = call(
            &app,
            "POST",
            "/api/v1/generate",
            Some(json!({"difficulty": "medium", "problemType": "addition"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{gen}");
        assert_eq!(gen["problem"]["final_answer"], 12.0);
        assert_eq!(gen["problem"]["problem_text"], "Ali has 5 apples...");
        assert_eq!(gen["problem"]["difficulty"], "medium");
        assert_eq!(gen["problem"]["problem_type"], "addition");
        assert_eq!(gen["problem"]["step_by_step_solution"], "Step1\nStep2");
        let session_id = gen["sessionId"].as_str().unwrap().to_string();

        let (status, ok) = call(
            &app,
            "POST",
            "/api/v1/submit",
            Some(json!({"sessionId": session_id, "userAnswer": 12.005, "hintUsed": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ok, json!({"isCorrect": true, "feedback": "Fantastic!", "correctAnswer": 12.0}));

        let (_, wrong) = call(
            &app,
            "POST",
            "/api/v1/submit",
            Some(json!({"sessionId": session_id, "userAnswer": 11.9})),
        )
        .await;
        assert_eq!(wrong["isCorrect"], false);

        let (status, hist) = call(&app, "GET", "/api/v1/history", None).await;
        assert_eq!(status, StatusCode::OK);
        let sessions = hist["sessions"].as_array().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0]["id"], session_id.as_str());
        assert_eq!(sessions[0]["correct_answer"], 12.0);
        assert_eq!(sessions[0]["submission"]["is_correct"], true);
        assert_eq!(sessions[0]["submission"]["hint_used"], true);

        let (status, stats) = call(&app, "GET", "/api/v1/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total"], 2);
        assert_eq!(stats["correct"], 1);
        assert_eq!(stats["accuracy"], 50);
        assert_eq!(stats["mediumProblems"], 2);
        assert_eq!(stats["streak"], 0);
        assert_eq!(stats["streakBest"], 1);
        assert_eq!(stats["totalXP"], 10);
    }

    #[tokio::test]
    async fn generate_with_empty_body_uses_defaults() {
        let app = app(Some(vec![r#"{"problem_text":"p","final_answer":3}"#]));
        let (status, gen) = call(&app, "POST", "/api/v1/generate", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(gen["problem"]["difficulty"], "medium");
        assert!(gen["problem"].get("problem_type").is_none());
    }

    #[tokio::test]
    async fn generate_without_key_is_500_with_message() {
        let (status, body) = call(&app(None), "POST", "/api/v1/generate", Some(json!({}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("AI not configured"));
    }

    #[tokio::test]
    async fn invalid_completion_is_generic_500() {
        let app = app(Some(vec![r#"{"final_answer": 5}"#]));
        let (status, body) = call(&app, "POST", "/api/v1/generate", Some(json!({}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to generate problem. Please try again.");
    }

    #[tokio::test]
    async fn unknown_difficulty_is_400() {
        let app = app(Some(vec![]));
        let (status, body) = call(&app, "POST", "/api/v1/generate", Some(json!({"difficulty": "extreme"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn submit_errors_map_to_status_codes() {
        let app = app(None);
        let (status, _) = call(&app, "POST", "/api/v1/submit", Some(json!({"userAnswer": 1}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(&app, "POST", "/api/v1/submit", Some(json!({"sessionId": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, body) = call(&app, "POST", "/api/v1/submit", Some(json!({"sessionId": "x", "userAnswer": 1}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Problem session not found");
    }

    #[tokio::test]
    async fn history_rejects_bad_limit_and_stats_start_empty() {
        let app = app(None);
        let (status, _) = call(&app, "GET", "/api/v1/history?limit=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, hist) = call(&app, "GET", "/api/v1/history?limit=", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(hist["sessions"], json!([]));
        let (status, hist) = call(&app, "GET", "/api/v1/history?limit=5", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(hist["sessions"], json!([]));
        let (_, stats) = call(&app, "GET", "/api/v1/stats", None).await;
        assert_eq!(stats["total"], 0);
        assert_eq!(stats["level"], 1);
    }

    #[tokio::test]
    async fn empty_limit_means_default_page() {
        let replies = vec![r#"{"problem_text":"p","final_answer":1}"#; 12];
        let app = app(Some(replies));
        for _ in 0..12 {
            let (status, _) = call(&app, "POST", "/api/v1/generate", None).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, hist) = call(&app, "GET", "/api/v1/history?limit=", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(hist["sessions"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn failed_feedback_is_500_and_records_nothing() {
        // The only scripted reply is consumed by generation; feedback gets none.
        let app = app(Some(vec![SAMPLE_COMPLETION]));
        let (_, gen) = call(&app, "POST", "/api/v1/generate", Some(json!({}))).await;
        let session_id = gen["sessionId"].as_str().unwrap().to_string();

        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/submit",
            Some(json!({"sessionId": session_id, "userAnswer": 12})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to submit answer. Please try again.");

        let (_, stats) = call(&app, "GET", "/api/v1/stats", None).await;
        assert_eq!(stats["total"], 0);
        let (_, hist) = call(&app, "GET", "/api/v1/history", None).await;
        assert!(hist["sessions"][0].get("submission").map_or(true, Value::is_null));
    }
}
