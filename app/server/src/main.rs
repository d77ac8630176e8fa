//! HTTP host for the estate-assist chat backend.
//!
//! Routes: `POST /chat` for the assistant, `GET /health`, and the static
//! chat widget page served from `STATIC_DIR` as the fallback.

use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use estate_assist::{
    AssistConfig, ChatEngine, Embedder, EmbeddingModel, FaqIndex, HttpCatalogClient,
    InMemorySessionStore, LlmProvider, OpenAiCompatProvider, SessionStore,
};

#[derive(Clone)]
struct AppState {
    engine: Arc<ChatEngine>,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    session_id: String,
}

async fn handle_chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Json<ChatResponse> {
    // Callers without a session get a fresh one; echoing it back lets the
    // widget keep its rolling history across turns.
    let session_id = payload
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    tracing::info!(session_id = %session_id, len = payload.message.len(), "chat request");
    let response = state.engine.handle_message(&session_id, &payload.message).await;

    Json(ChatResponse {
        response,
        session_id,
    })
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AssistConfig::from_env()?;

    let faqs = match FaqIndex::load(&config.faq_path) {
        Ok(faqs) => {
            tracing::info!(count = faqs.len(), path = %config.faq_path.display(), "FAQ corpus loaded");
            faqs
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to load FAQ file; starting with an empty index");
            FaqIndex::default()
        }
    };

    let catalog = Arc::new(HttpCatalogClient::new(&config.catalog)?);
    let embedder: Arc<dyn EmbeddingModel> = Arc::new(Embedder::init());
    let llm: Arc<dyn LlmProvider> = Arc::new(OpenAiCompatProvider::new(&config.llm)?);
    let sessions: Arc<dyn SessionStore> =
        Arc::new(InMemorySessionStore::new(config.matching.history_cap));
    let engine = Arc::new(ChatEngine::new(
        faqs,
        catalog,
        embedder,
        llm,
        sessions,
        &config,
    ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string());
    let app = Router::new()
        .route("/chat", post(handle_chat))
        .route("/health", get(health))
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .with_state(AppState { engine });

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    tracing::info!(%addr, "estate-assist server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
