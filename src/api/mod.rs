//! HTTP API under `/api/v1`.
//!
//! Chat endpoints take the caller's history, run the matching agent and
//! return the history extended by the (human, ai) pair of this turn.

pub mod auth;

pub use auth::{AuthError, Authenticator};

use crate::agent::ChatAgent;
use crate::models::{ChatRequest, ChatResponse, QaRequest, QaResponse};
use crate::rag::QuestionAnswerer;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

/// Shared application state, built once at startup.
pub struct AppState {
    pub user_agent: Arc<dyn ChatAgent>,
    pub employee_agent: Arc<dyn ChatAgent>,
    /// `None` when the document index could not be built.
    pub doc_qa: Option<Arc<dyn QuestionAnswerer>>,
    /// `None` when authorization is disabled.
    pub auth: Option<Arc<Authenticator>>,
}

/// Error body returned by the API.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<crate::error::StaffdeskError> for ApiError {
    fn from(err: crate::error::StaffdeskError) -> Self {
        error!("Request failed: {}", err);
        Self::internal(err.to_string())
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let doc_qa = Router::new()
        .route("/doc-qa", post(doc_qa))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_role));

    let api = Router::new()
        .route("/status", get(status))
        .route("/chat", post(chat))
        .route("/employee/chat", post(employee_chat))
        .route("/employee/help", get(employee_help))
        .merge(doc_qa);

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// === Handlers ===

async fn status() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn run_turn(agent: &dyn ChatAgent, req: ChatRequest) -> Result<Json<ChatResponse>, ApiError> {
    let output = agent.respond(&req.user_input, &req.chat_history).await?;
    Ok(Json(ChatResponse::from_turn(
        req.chat_history,
        &req.user_input,
        output,
    )))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    run_turn(state.user_agent.as_ref(), req).await
}

async fn employee_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    run_turn(state.employee_agent.as_ref(), req).await
}

async fn employee_help() -> impl IntoResponse {
    Json(json!({
        "message": "Employee Management Agent Help",
        "capabilities": [
            "📊 List all employees, active employees, or terminated employees",
            "🔍 Search employees by ID, company, status, or cost center",
            "📅 Filter employees by date ranges (admission, termination, birth dates)",
            "💰 Get detailed salary information for specific employees",
            "👥 Add new employees with comprehensive details",
            "✏️ Update existing employee information",
            "🗑️ Delete employee records",
            "🏢 Get company-specific employee lists",
            "📋 Filter by employment status or cost centers"
        ],
        "examples": [
            "List all active employees",
            "Show me employee details for ID EMP001",
            "Find all employees in Marketing department",
            "Get salary information for John Doe",
            "Add a new employee named Jane Smith",
            "Update employee EMP002's salary to 75000",
            "Show employees hired between 2023-01-01 and 2023-12-31"
        ]
    }))
}

async fn doc_qa(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QaRequest>,
) -> Result<Json<QaResponse>, ApiError> {
    let engine = state.doc_qa.as_ref().ok_or_else(|| ApiError {
        status: StatusCode::SERVICE_UNAVAILABLE,
        message: "Document Q&A is not available".to_string(),
    })?;

    let answer = engine.answer(&req.question).await?;
    Ok(Json(QaResponse { answer }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, StaffdeskError};
    use crate::models::ChatMessage;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    struct EchoAgent(&'static str);

    #[async_trait]
    impl ChatAgent for EchoAgent {
        async fn respond(&self, input: &str, history: &[ChatMessage]) -> Result<String> {
            Ok(format!("{}: {} ({} prior)", self.0, input, history.len()))
        }
    }

    struct FailingAgent;

    #[async_trait]
    impl ChatAgent for FailingAgent {
        async fn respond(&self, _input: &str, _history: &[ChatMessage]) -> Result<String> {
            Err(StaffdeskError::OpenAI("upstream unavailable".to_string()))
        }
    }

    struct FixedAnswer;

    #[async_trait]
    impl QuestionAnswerer for FixedAnswer {
        async fn answer(&self, question: &str) -> Result<String> {
            Ok(format!("Answer to '{}'", question))
        }
    }

    fn state() -> AppState {
        AppState {
            user_agent: Arc::new(EchoAgent("users")),
            employee_agent: Arc::new(EchoAgent("employees")),
            doc_qa: Some(Arc::new(FixedAnswer)),
            auth: None,
        }
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value, Option<String>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let www = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body, www)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_status() {
        let request = Request::get("/api/v1/status").body(Body::empty()).unwrap();
        let (status, body, _) = send(router(Arc::new(state())), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_chat_appends_human_then_ai() {
        let app = router(Arc::new(state()));
        let (status, body, _) = send(
            app,
            post_json("/api/v1/chat", json!({"user_input": "hello", "chat_history": []})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["agent_output"], "users: hello (0 prior)");
        assert_eq!(
            body["chat_history"],
            json!([
                {"role": "human", "content": "hello"},
                {"role": "ai", "content": "users: hello (0 prior)"}
            ])
        );
    }

    #[tokio::test]
    async fn test_employee_chat_keeps_history_and_extra_fields() {
        let app = router(Arc::new(state()));
        let history = json!([
            {"role": "human", "content": "hi", "ts": 1},
            {"role": "ai", "content": "hello"}
        ]);
        let (status, body, _) = send(
            app,
            post_json(
                "/api/v1/employee/chat",
                json!({"user_input": "list employees", "chat_history": history}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["agent_output"], "employees: list employees (2 prior)");
        let turns = body["chat_history"].as_array().unwrap();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0]["ts"], 1);
        assert_eq!(turns[2], json!({"role": "human", "content": "list employees"}));
        assert_eq!(turns[3]["role"], "ai");
    }

    #[tokio::test]
    async fn test_history_defaults_to_empty() {
        let app = router(Arc::new(state()));
        let (status, body, _) =
            send(app, post_json("/api/v1/chat", json!({"user_input": "hi"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chat_history"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_agent_failure_is_500() {
        let app = router(Arc::new(AppState {
            user_agent: Arc::new(FailingAgent),
            ..state()
        }));
        let (status, body, _) =
            send(app, post_json("/api/v1/chat", json!({"user_input": "hi"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("upstream unavailable"));
    }

    #[tokio::test]
    async fn test_employee_help() {
        let request = Request::get("/api/v1/employee/help").body(Body::empty()).unwrap();
        let (status, body, _) = send(router(Arc::new(state())), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Employee Management Agent Help");
        assert_eq!(body["capabilities"].as_array().unwrap().len(), 9);
        assert_eq!(body["examples"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_doc_qa_open_without_auth() {
        let app = router(Arc::new(state()));
        let (status, body, _) =
            send(app, post_json("/api/v1/doc-qa", json!({"question": "vacation?"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "Answer to 'vacation?'");
    }

    #[tokio::test]
    async fn test_doc_qa_without_index_is_503() {
        let app = router(Arc::new(AppState {
            doc_qa: None,
            ..state()
        }));
        let (status, body, _) =
            send(app, post_json("/api/v1/doc-qa", json!({"question": "vacation?"}))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].is_string());
    }

    fn guarded() -> Router {
        router(Arc::new(AppState {
            auth: Some(Arc::new(Authenticator::new(auth::tests::settings()))),
            ..state()
        }))
    }

    fn with_token(token: &str) -> Request<Body> {
        let mut request = post_json("/api/v1/doc-qa", json!({"question": "vacation?"}));
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );
        request
    }

    #[tokio::test]
    async fn test_doc_qa_requires_token() {
        let (status, body, www) = send(
            guarded(),
            post_json("/api/v1/doc-qa", json!({"question": "vacation?"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(www.as_deref(), Some("Bearer"));
        assert_eq!(body["detail"], "Not authenticated");
    }

    #[tokio::test]
    async fn test_doc_qa_with_role() {
        let issuer = auth::tests::settings().issuer();
        let token = auth::tests::token(&issuer, &["app-user"]);
        let (status, body, _) = send(guarded(), with_token(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "Answer to 'vacation?'");
    }

    #[tokio::test]
    async fn test_doc_qa_without_role_is_403() {
        let issuer = auth::tests::settings().issuer();
        let token = auth::tests::token(&issuer, &["guest"]);
        let (status, body, www) = send(guarded(), with_token(&token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(www.is_none());
        assert!(body["detail"].as_str().unwrap().contains("app-user"));
    }

    #[tokio::test]
    async fn test_chat_is_not_guarded() {
        let (status, _, _) =
            send(guarded(), post_json("/api/v1/chat", json!({"user_input": "hi"}))).await;
        assert_eq!(status, StatusCode::OK);
    }
}
