pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/benchmark", post(handlers::handle_benchmark))
        .route(
            "/api/v1/benchmark/stream",
            post(handlers::handle_benchmark_stream),
        )
        .route("/api/v1/learning-path", post(handlers::handle_learning_path))
        .route(
            "/api/v1/learning-path/stream",
            post(handlers::handle_learning_path_stream),
        )
        .route(
            "/api/v1/interview-questions",
            post(handlers::handle_interview_questions),
        )
        .route(
            "/api/v1/interview-questions/stream",
            post(handlers::handle_interview_questions_stream),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use futures_util::StreamExt;
    use serde_json::Value;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    use crate::analysis::validation::InputLimits;
    use crate::analysis::workflow::Workflow;
    use crate::config::Config;
    use crate::document::{DocumentError, DocumentExtractor};
    use crate::llm_client::{CompletionClient, CompletionOracle, LlmError, RetryOn, RetryPolicy};
    use crate::models::analysis::UploadedDocument;

    struct EchoOracle;

    #[async_trait]
    impl CompletionOracle for EchoOracle {
        async fn generate_completion(&self, prompt: &str) -> Result<String, LlmError> {
            if prompt.contains("interview questions") {
                Ok(r#"{"questions": ["Why this role?"]}"#.to_string())
            } else if prompt.contains("missing skills") {
                Ok(r#"{"recommendations": []}"#.to_string())
            } else if prompt.contains("CV Text") {
                Ok(r#"{"matched_technical_skills": ["Rust"], "matched_soft_skills": []}"#
                    .to_string())
            } else {
                Ok(r#"{"required_technical_skills": ["Rust", "Go"], "required_soft_skills": []}"#
                    .to_string())
            }
        }
    }

    struct StaticExtractor;

    #[async_trait]
    impl DocumentExtractor for StaticExtractor {
        async fn extract(&self, _document: &UploadedDocument) -> Result<String, DocumentError> {
            Ok("Rust developer".to_string())
        }
    }

    /// Holds every completion until the test releases it.
    struct GatedOracle {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl CompletionOracle for GatedOracle {
        async fn generate_completion(&self, _prompt: &str) -> Result<String, LlmError> {
            self.gate.notified().await;
            Ok(r#"{"questions": ["Why this role?"]}"#.to_string())
        }
    }

    fn test_state() -> AppState {
        state_with(Arc::new(EchoOracle))
    }

    fn state_with(oracle: Arc<dyn CompletionOracle>) -> AppState {
        let completion = CompletionClient::new(
            oracle,
            RetryPolicy {
                retry_on: RetryOn::TransientOnly,
                ..RetryPolicy::default()
            },
        );
        AppState {
            workflow: Workflow::new(completion, Arc::new(StaticExtractor), InputLimits::default()),
            config: Config {
                google_api_key: "test-key".to_string(),
                gemini_model: "gemini-pro-latest".to_string(),
                port: 0,
                rust_log: "info".to_string(),
                max_input_length: 500,
                max_upload_bytes: 1024 * 1024,
                llm_timeout_secs: 5,
                llm_retry_deadline_secs: 5,
                llm_retry_transient_only: true,
            },
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const BOUNDARY: &str = "aurora-test-boundary";

    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\nContent-Type: application/pdf\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/benchmark")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_benchmark_returns_snapshot_sequence() {
        let app = build_router(test_state());
        let body = multipart_body(&[
            ("cv", Some("cv.pdf"), &b"%PDF-1.4\nbody"[..]),
            ("job_description", None, &b"Backend engineer (Rust, Go)"[..]),
        ]);

        let response = app.oneshot(multipart_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        let states = json["states"].as_array().unwrap();
        assert_eq!(states.len(), 4);
        let last = states.last().unwrap();
        assert_eq!(last["phase"], "completed");
        assert!(last["regions"]["report_header"]["content"]
            .as_str()
            .unwrap()
            .ends_with("50.00%"));
        assert!(json["run_id"].is_string());
    }

    #[tokio::test]
    async fn test_benchmark_non_pdf_is_rendered_not_rejected() {
        let app = build_router(test_state());
        let body = multipart_body(&[
            ("cv", Some("cv.txt"), &b"plain text"[..]),
            ("job_description", None, &b"Backend engineer"[..]),
        ]);

        let response = app.oneshot(multipart_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        let states = json["states"].as_array().unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0]["phase"], "failed");
    }

    #[tokio::test]
    async fn test_benchmark_without_job_description_field_is_bad_request() {
        let app = build_router(test_state());
        let body = multipart_body(&[("cv", Some("cv.pdf"), &b"%PDF-1.4\n"[..])]);

        let response = app.oneshot(multipart_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_interview_questions_endpoint() {
        let app = build_router(test_state());
        let request = Request::post("/api/v1/interview-questions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"job_description": "Backend engineer"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        let last = json["states"].as_array().unwrap().last().unwrap().clone();
        assert_eq!(
            last["regions"]["interview_questions_output"]["content"],
            "### Interview Questions\n1. Why this role?\n"
        );
    }

    #[tokio::test]
    async fn test_learning_path_endpoint_reports_empty_input_in_view() {
        let app = build_router(test_state());
        let request = Request::post("/api/v1/learning-path")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"missing_skills": ""}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        let states = json["states"].as_array().unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(
            states[0]["regions"]["learning_path_output"]["content"],
            "Error generating learning path: Missing Skills cannot be empty."
        );
    }

    #[tokio::test]
    async fn test_interview_questions_stream_sends_progress_before_oracle_replies() {
        let gate = Arc::new(Notify::new());
        let app = build_router(state_with(Arc::new(GatedOracle { gate: gate.clone() })));
        let request = Request::post("/api/v1/interview-questions/stream")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"job_description": "Backend engineer"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );

        let mut body = response.into_body().into_data_stream();
        let first = body.next().await.unwrap().unwrap();
        let first = String::from_utf8(first.to_vec()).unwrap();
        assert!(first.starts_with("event: state\n"));
        assert!(first.contains(r#""phase":"in_progress""#));
        assert!(first.contains("### Generating Interview Questions..."));

        gate.notify_one();
        let mut rest = String::new();
        while let Some(chunk) = body.next().await {
            rest.push_str(&String::from_utf8(chunk.unwrap().to_vec()).unwrap());
        }
        assert!(rest.contains(r#""phase":"completed""#));
        assert!(rest.contains("1. Why this role?"));
    }

    #[tokio::test]
    async fn test_benchmark_stream_forwards_every_snapshot() {
        let app = build_router(test_state());
        let body = multipart_body(&[
            ("cv", Some("cv.pdf"), &b"%PDF-1.4\nbody"[..]),
            ("job_description", None, &b"Backend engineer (Rust, Go)"[..]),
        ]);
        let mut request = multipart_request(body);
        *request.uri_mut() = "/api/v1/benchmark/stream".parse().unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(text.matches("event: state\n").count(), 4);
        assert!(text.contains("Extracting text from CV..."));
        assert!(text.contains("50.00%"));
    }
}
