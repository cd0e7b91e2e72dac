//! HTTP API server.

use crate::agent::{employee_agent, user_agent, ChatAgent};
use crate::api::{router, AppState, Authenticator};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::db::Database;
use crate::docs::build_doc_qa;
use crate::rag::QuestionAnswerer;
use std::sync::Arc;
use tracing::{info, warn};

/// Run the HTTP API server until Ctrl+C.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::warning(&format!("{}", e));
        Output::info("Agent calls will fail until the key is set.");
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;

    let db = Database::connect_with_retries(&settings.database).await?;
    db.initialize().await?;

    let user_agent: Arc<dyn ChatAgent> = Arc::new(user_agent(&settings, &prompts, &db)?);
    let employee_agent: Arc<dyn ChatAgent> = Arc::new(employee_agent(&settings, &prompts, &db)?);

    let doc_qa: Option<Arc<dyn QuestionAnswerer>> = match build_doc_qa(&settings, &prompts).await {
        Ok(engine) => engine.map(|e| Arc::new(e) as Arc<dyn QuestionAnswerer>),
        Err(e) => {
            warn!("Document index could not be built, document Q&A is unavailable: {}", e);
            None
        }
    };

    let auth = if settings.auth.enabled {
        Some(Arc::new(Authenticator::new(settings.auth.clone())))
    } else {
        warn!("Authorization is disabled; /api/v1/doc-qa is open");
        None
    };

    let state = Arc::new(AppState {
        user_agent,
        employee_agent,
        doc_qa,
        auth,
    });
    let app = router(state);

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("staffdesk API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Status", "GET  /api/v1/status");
    Output::kv("User chat", "POST /api/v1/chat");
    Output::kv("Employee chat", "POST /api/v1/employee/chat");
    Output::kv("Employee help", "GET  /api/v1/employee/help");
    Output::kv("Document Q&A", "POST /api/v1/doc-qa");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing database pool");
    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
