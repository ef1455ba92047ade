//! HTTP surface for the answer pipeline.
//!
//! | Method | Path      | Description                                  |
//! |--------|-----------|----------------------------------------------|
//! | `POST` | `/ask`    | `{"query": ...}` → `{"answer": ...}`         |
//! | `GET`  | `/health` | Liveness check, always `200 OK`.             |
//!
//! Retrieval failures map to `503`, generation failures to `502`.

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::PipelineError;
use crate::rag::AnswerPipeline;

/// Request body for POST /ask
#[derive(Debug, Default, Deserialize)]
pub struct AskRequest {
    /// Question text; a missing field is treated as an empty question
    #[serde(default)]
    pub query: Option<String>,
}

/// Response body for POST /ask
#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Pipeline failure rendered as a JSON error
struct ApiError(PipelineError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            PipelineError::Retrieval(_) => StatusCode::SERVICE_UNAVAILABLE,
            PipelineError::Generation(_) => StatusCode::BAD_GATEWAY,
        };
        let body = json!({ "error": self.0.to_string(), "kind": self.0.kind() });
        (status, Json(body)).into_response()
    }
}

/// Build the router around a shared pipeline
pub fn router(pipeline: Arc<AnswerPipeline>) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .route("/health", get(health))
        .with_state(pipeline)
}

/// Bind and serve until the process is stopped
pub async fn serve(pipeline: Arc<AnswerPipeline>, host: &str, port: u16) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(%addr, "listening");
    axum::serve(listener, router(pipeline))
        .await
        .context("HTTP server error")?;

    Ok(())
}

async fn ask(
    State(pipeline): State<Arc<AnswerPipeline>>,
    Json(req): Json<AskRequest>,
) -> std::result::Result<Json<AskResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let query = req.query.unwrap_or_default();

    let start = std::time::Instant::now();
    let answer = pipeline.answer(&query).await.map_err(|e| {
        tracing::warn!(%request_id, kind = e.kind(), error = %e, "ask request failed");
        ApiError(e)
    })?;

    tracing::info!(
        %request_id,
        duration_ms = start.elapsed().as_millis() as u64,
        "ask request completed"
    );

    Ok(Json(AskResponse { answer }))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::errors::{GenerationError, RetrievalError};
    use crate::generation::Generator;
    use crate::rag::{Passage, Retriever};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct StubRetriever {
        fail: bool,
    }

    #[async_trait]
    impl Retriever for StubRetriever {
        async fn search(&self, _query: &str, _k: usize) -> std::result::Result<Vec<Passage>, RetrievalError> {
            if self.fail {
                Err(RetrievalError::Unavailable("qdrant down".to_string()))
            } else {
                Ok(vec![Passage::new("Born in 1990.")])
            }
        }
    }

    struct StubGenerator {
        reply: std::result::Result<String, u16>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Generator for StubGenerator {
        async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(GenerationError::Rejected {
                    status: *status,
                    message: "model not found".to_string(),
                }),
            }
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    fn app(fail_retrieval: bool, reply: std::result::Result<String, u16>) -> (Router, Arc<StubGenerator>) {
        let generator = Arc::new(StubGenerator {
            reply,
            prompts: Mutex::new(Vec::new()),
        });
        let pipeline = AnswerPipeline::new(
            Arc::new(StubRetriever { fail: fail_retrieval }),
            generator.clone(),
            &PipelineConfig::default(),
        )
        .unwrap();
        (router(Arc::new(pipeline)), generator)
    }

    fn ask_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/ask")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ask_returns_answer() {
        let (app, _) = app(false, Ok("He was born in 1990.".to_string()));
        let response = app
            .oneshot(ask_request(r#"{"query":"When was he born?"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "answer": "He was born in 1990." }));
    }

    #[tokio::test]
    async fn test_ask_missing_query_is_empty_question() {
        let (app, generator) = app(false, Ok("I don't know.".to_string()));
        let response = app.oneshot(ask_request("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("User's Question:\n\n"));
    }

    #[tokio::test]
    async fn test_retrieval_failure_maps_to_503() {
        let (app, generator) = app(true, Ok("unused".to_string()));
        let response = app.oneshot(ask_request(r#"{"query":"q"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["kind"], json!("retrieval"));
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_maps_to_502() {
        let (app, _) = app(false, Err(404));
        let response = app.oneshot(ask_request(r#"{"query":"q"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["kind"], json!("generation"));
        assert!(body["error"].as_str().unwrap().contains("404"));
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app(false, Ok(String::new()));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "status": "ok" }));
    }
}
